//! Survivor Core - scoring library for a Survivor fantasy draft league.
//!
//! Contestant points, weekly immunity pick resolution, pick breakdowns,
//! draft admission and leaderboard standings, computed from rows already
//! fetched from the league's backend. Python bindings are available with
//! the `python` feature.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod breakdown;
pub mod coerce;
pub mod config;
pub mod constants;
pub mod contestant;
pub mod draft;
pub mod error;
pub mod league;
pub mod logging;
pub mod overrides;
pub mod standings;
pub mod store;
pub mod weekly;

pub use breakdown::{format_percent, pick_breakdown, BreakdownRow, PickBreakdown};
pub use config::{load_rules, LeagueRules};
pub use constants::{INITIAL_PICK_CAP, MERGE_PICK_CAP, TRIBAL_BONUS, TRIBES};
pub use contestant::{Contestant, Roster};
pub use draft::{DraftPickSet, DraftedContestant, PickType};
pub use error::{ConfigError, DraftRejection, PickError, StoreError};
pub use league::LeagueSnapshot;
pub use overrides::ResultOverrides;
pub use standings::{standings, FinalWager, Standing, TeamProfile, TeamScore};
pub use store::{admit_read_modify_write, admit_versioned, InMemoryPickStore, PickStore, Versioned};
pub use weekly::{resolve_pick, resolve_weekly_picks, Phase, PickRow, PickStatus, WeeklyPicks, WeeklyResult};

/// Points for a contestant on a given game day.
#[cfg(feature = "python")]
#[pyfunction]
fn contestant_points(contestant: &Contestant, current_game_day: i64) -> i64 {
    contestant.points(current_game_day)
}

/// Format a breakdown percentage, e.g. `66.7%`.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "format_percent")]
fn py_format_percent(value: f64) -> String {
    format_percent(value)
}

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn survivor_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    logging::init_logging("warn");

    // Classes
    m.add_class::<Contestant>()?;
    m.add_class::<WeeklyResult>()?;
    m.add_class::<Phase>()?;
    m.add_class::<PickStatus>()?;
    m.add_class::<PickRow>()?;
    m.add_class::<BreakdownRow>()?;
    m.add_class::<PickBreakdown>()?;
    m.add_class::<TeamScore>()?;
    m.add_class::<Standing>()?;
    m.add_class::<LeagueRules>()?;
    m.add_class::<ResultOverrides>()?;
    m.add_class::<LeagueSnapshot>()?;

    // Functions
    m.add_function(wrap_pyfunction!(contestant_points, m)?)?;
    m.add_function(wrap_pyfunction!(py_format_percent, m)?)?;

    // Constants
    m.add("TRIBES", TRIBES.to_vec())?;
    m.add("TRIBAL_BONUS", TRIBAL_BONUS)?;
    m.add("INITIAL_PICK_CAP", INITIAL_PICK_CAP)?;
    m.add("MERGE_PICK_CAP", MERGE_PICK_CAP)?;

    Ok(())
}
