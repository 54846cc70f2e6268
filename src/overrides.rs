#[cfg(feature = "python")]
use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ConfigError;
use crate::weekly::{Phase, WeeklyResult};

/// Admin overrides for weekly winners.
///
/// An override replaces whatever result is published for its week. The map
/// travels with the league snapshot it was built for; nothing is shared
/// between requests.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultOverrides {
    overrides: BTreeMap<u32, WeeklyResult>,
}

impl ResultOverrides {
    pub fn new() -> Self {
        ResultOverrides {
            overrides: BTreeMap::new(),
        }
    }

    /// Read overrides from a CSV file.
    /// Format: week,phase,winner,players_remaining
    ///
    /// Blank lines and lines with the wrong number of columns are skipped.
    /// `players_remaining` may be omitted for tribal weeks.
    pub fn read_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(io_error)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line.map_err(io_error)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 3 || parts.len() > 4 {
                tracing::warn!(line, "skipping malformed override line");
                continue;
            }

            let week: u32 = parse_field("week", parts[0])?;
            let players_remaining: i64 = match parts.get(3) {
                Some(raw) if !raw.is_empty() => parse_field("players_remaining", raw)?,
                _ => 0,
            };

            let result = match Phase::parse(parts[1]) {
                Phase::Tribal => WeeklyResult::tribal(week, parts[2]),
                Phase::Individual => WeeklyResult::individual(week, parts[2], players_remaining),
            };
            self.add_override(result);
        }

        Ok(())
    }

    /// Add or replace the override for the result's week.
    pub fn add_override(&mut self, result: WeeklyResult) {
        if result.week == 0 {
            tracing::warn!(?result, "ignoring override without a week");
            return;
        }
        self.overrides.insert(result.week, result);
    }

    pub fn remove_override(&mut self, week: u32) -> Option<WeeklyResult> {
        self.overrides.remove(&week)
    }

    pub fn get(&self, week: u32) -> Option<&WeeklyResult> {
        self.overrides.get(&week)
    }

    pub fn has_override(&self, week: u32) -> bool {
        self.overrides.contains_key(&week)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Published results with every override laid over them.
    pub fn apply(&self, published: &BTreeMap<u32, WeeklyResult>) -> BTreeMap<u32, WeeklyResult> {
        let mut effective = published.clone();
        for (&week, result) in &self.overrides {
            effective.insert(week, result.clone());
        }
        effective
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl ResultOverrides {
    #[new]
    fn py_new() -> Self {
        ResultOverrides::new()
    }

    #[pyo3(name = "read_from_file")]
    fn py_read_from_file(&mut self, filepath: &str) -> PyResult<()> {
        self.read_from_file(Path::new(filepath))
            .map_err(|e| pyo3::exceptions::PyIOError::new_err(e.to_string()))
    }

    #[pyo3(name = "add_override")]
    fn py_add_override(&mut self, result: WeeklyResult) {
        self.add_override(result);
    }

    #[pyo3(name = "remove_override")]
    fn py_remove_override(&mut self, week: u32) {
        self.remove_override(week);
    }

    #[pyo3(name = "get_override")]
    fn py_get_override(&self, week: u32) -> Option<WeeklyResult> {
        self.get(week).cloned()
    }

    fn __len__(&self) -> usize {
        self.overrides.len()
    }

    fn __repr__(&self) -> String {
        format!("ResultOverrides({} overrides)", self.overrides.len())
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
