#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::Serialize;

use crate::weekly::WeeklyPicks;

/// Share of the league that picked one tribe for a week.
///
/// `start` and `end` are cumulative percentages: laid end to end, the rows
/// cover a pie/conic chart starting at 0%.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
    pub start: f64,
    pub end: f64,
}

#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PickBreakdown {
    pub week: u32,

    /// Teams that submitted any pick for the week
    pub total_picks: usize,

    /// Non-empty rows, most picked first
    pub rows: Vec<BreakdownRow>,
}

impl PickBreakdown {
    /// `(start, end)` offsets of each row, in chart order.
    pub fn gradient_stops(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|row| (row.start, row.end)).collect()
    }
}

/// Tally how the league picked for `week`.
///
/// Only `labels` (the starting tribes) get rows, but every submitted pick
/// counts toward the total. Returns `None` when nobody picked that week.
///
/// # Arguments
/// * `week` - Week to tally
/// * `picks` - Every team's weekly picks
/// * `labels` - Closed set of labels to report, in tie-break order
pub fn pick_breakdown<'a, I>(week: u32, picks: I, labels: &[String]) -> Option<PickBreakdown>
where
    I: IntoIterator<Item = &'a WeeklyPicks>,
{
    let mut counts = vec![0usize; labels.len()];
    let mut total_picks = 0usize;

    for team_picks in picks {
        let Some(label) = team_picks.get(week) else {
            continue;
        };
        total_picks += 1;
        if let Some(i) = labels.iter().position(|l| l == label) {
            counts[i] += 1;
        }
    }

    if total_picks == 0 {
        return None;
    }

    let mut tallies: Vec<(&String, usize)> = labels
        .iter()
        .zip(counts)
        .filter(|&(_, count)| count > 0)
        .collect();
    // stable: ties keep label order
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    let total = total_picks as f64;
    let mut cumulative = 0usize;
    let rows = tallies
        .into_iter()
        .map(|(label, count)| {
            let start = cumulative as f64 * 100.0 / total;
            cumulative += count;
            BreakdownRow {
                label: label.clone(),
                count,
                percentage: count as f64 * 100.0 / total,
                start,
                end: cumulative as f64 * 100.0 / total,
            }
        })
        .collect();

    Some(PickBreakdown {
        week,
        total_picks,
        rows,
    })
}

/// Render a percentage with one decimal, e.g. `66.7%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
