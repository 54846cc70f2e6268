//! League rule variants.
//!
//! Leagues disagree on a handful of rules (merge pick, drafting eliminated
//! contestants, locking resolved weeks). Defaults follow the current season;
//! a JSON file and then environment variables can change them.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::constants::{INITIAL_PICK_CAP, MERGE_PICK_CAP, SEASON_WEEKS, TRIBAL_BONUS, TRIBES};
use crate::error::ConfigError;

#[cfg_attr(feature = "python", pyclass(get_all, set_all))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueRules {
    /// Picks every team makes before the season starts
    pub initial_pick_cap: usize,

    /// Allow one extra pick at the merge
    pub merge_pick_enabled: bool,

    /// Refuse to draft contestants who are already out
    pub reject_eliminated: bool,

    /// Refuse weekly picks for weeks whose result is already published
    pub lock_resolved_weeks: bool,

    /// Bonus for a correct tribal-phase pick
    pub tribal_bonus: i64,

    /// Starting tribes, in display order
    pub tribes: Vec<String>,

    pub season_weeks: u32,
}

impl Default for LeagueRules {
    fn default() -> Self {
        LeagueRules {
            initial_pick_cap: INITIAL_PICK_CAP,
            merge_pick_enabled: false,
            reject_eliminated: true,
            lock_resolved_weeks: false,
            tribal_bonus: TRIBAL_BONUS,
            tribes: TRIBES.iter().map(|t| t.to_string()).collect(),
            season_weeks: SEASON_WEEKS,
        }
    }
}

impl LeagueRules {
    /// Most picks a team can hold under these rules.
    pub fn draft_cap(&self) -> usize {
        if self.merge_pick_enabled {
            self.initial_pick_cap + MERGE_PICK_CAP
        } else {
            self.initial_pick_cap
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl LeagueRules {
    #[new]
    fn py_new() -> Self {
        LeagueRules::default()
    }

    #[staticmethod]
    #[pyo3(name = "load")]
    fn py_load(path: &str) -> PyResult<Self> {
        load_rules(Path::new(path)).map_err(|e| pyo3::exceptions::PyIOError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "LeagueRules(cap={}, merge={}, tribes={:?})",
            self.draft_cap(),
            self.merge_pick_enabled,
            self.tribes
        )
    }
}

/// Load rules from a JSON file, then apply environment overrides.
///
/// A missing file is not an error: the defaults are used instead.
pub fn load_rules(path: &Path) -> Result<LeagueRules, ConfigError> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no rules file, using defaults");
        return apply_env_overrides(LeagueRules::default());
    }
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rules = serde_json::from_str::<LeagueRules>(&data).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    apply_env_overrides(rules)
}

pub fn apply_env_overrides(rules: LeagueRules) -> Result<LeagueRules, ConfigError> {
    apply_overrides_from(rules, |key| env::var(key).ok())
}

/// Apply `SURVIVOR_*` overrides read through `lookup`. Blank values are
/// ignored.
pub fn apply_overrides_from<F>(mut rules: LeagueRules, lookup: F) -> Result<LeagueRules, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(raw) = value("SURVIVOR_INITIAL_PICK_CAP") {
        rules.initial_pick_cap = parse_number("SURVIVOR_INITIAL_PICK_CAP", &raw)?;
    }
    if let Some(raw) = value("SURVIVOR_MERGE_PICK") {
        rules.merge_pick_enabled = parse_flag(&raw);
    }
    if let Some(raw) = value("SURVIVOR_REJECT_ELIMINATED") {
        rules.reject_eliminated = parse_flag(&raw);
    }
    if let Some(raw) = value("SURVIVOR_LOCK_RESOLVED_WEEKS") {
        rules.lock_resolved_weeks = parse_flag(&raw);
    }
    if let Some(raw) = value("SURVIVOR_TRIBAL_BONUS") {
        rules.tribal_bonus = parse_number("SURVIVOR_TRIBAL_BONUS", &raw)?;
    }
    if let Some(raw) = value("SURVIVOR_SEASON_WEEKS") {
        rules.season_weeks = parse_number("SURVIVOR_SEASON_WEEKS", &raw)?;
    }
    if let Some(raw) = value("SURVIVOR_TRIBES") {
        let tribes: Vec<String> = raw
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tribes.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SURVIVOR_TRIBES".to_string(),
                value: raw,
            });
        }
        rules.tribes = tribes;
    }
    Ok(rules)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
