#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::coerce::{coerce_string, coerce_weekly_picks, lenient_int, lenient_opt_string, lenient_week};
use crate::config::LeagueRules;
use crate::constants::bonus_label;
use crate::contestant::Roster;
use crate::error::PickError;

/// Stage of the season a weekly result belongs to.
#[cfg_attr(feature = "python", pyclass(eq, eq_int))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Picks are made over starting tribes
    Tribal,
    /// Picks are made over single contestants
    #[default]
    Individual,
}

impl Phase {
    /// Only an explicit "tribal" selects the tribal phase.
    pub fn parse(raw: &str) -> Phase {
        if raw.trim().eq_ignore_ascii_case("tribal") {
            Phase::Tribal
        } else {
            Phase::Individual
        }
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Phase::parse(&coerce_string(&Value::deserialize(d)?)))
    }
}

/// Declared outcome of one week's immunity challenge.
#[cfg_attr(feature = "python", pyclass(get_all, set_all))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyResult {
    #[serde(default, deserialize_with = "lenient_week")]
    pub week: u32,

    #[serde(default)]
    pub phase: Phase,

    /// Winning tribe, tribal phase only
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub winner_team: Option<String>,

    /// Winning contestant, individual phase only
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub winner_contestant_id: Option<String>,

    /// Players left in the game that week; the individual-phase bonus
    #[serde(default, deserialize_with = "lenient_int")]
    pub players_remaining: i64,
}

impl WeeklyResult {
    pub fn tribal(week: u32, winner_team: &str) -> Self {
        WeeklyResult {
            week,
            phase: Phase::Tribal,
            winner_team: Some(winner_team.to_string()),
            winner_contestant_id: None,
            players_remaining: 0,
        }
    }

    pub fn individual(week: u32, winner_contestant_id: &str, players_remaining: i64) -> Self {
        WeeklyResult {
            week,
            phase: Phase::Individual,
            winner_team: None,
            winner_contestant_id: Some(winner_contestant_id.to_string()),
            players_remaining,
        }
    }

    /// Points a correct pick earns for this week.
    pub fn bonus(&self, tribal_bonus: i64) -> i64 {
        match self.phase {
            Phase::Tribal => tribal_bonus,
            Phase::Individual => self.players_remaining.max(0),
        }
    }

    /// Whether `label` names the winner of this week.
    ///
    /// Individual-phase picks were stored as ids by some screens and as
    /// display names by others, so both are accepted. Name matching goes
    /// through the roster and is best-effort: a renamed contestant no longer
    /// matches picks made under the old name.
    pub fn is_won_by(&self, label: &str, roster: &Roster) -> bool {
        match self.phase {
            Phase::Tribal => self.winner_team.as_deref() == Some(label),
            Phase::Individual => {
                let Some(winner_id) = self.winner_contestant_id.as_deref() else {
                    return false;
                };
                winner_id == label
                    || roster
                        .get(winner_id)
                        .is_some_and(|winner| winner.name == label)
            }
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl WeeklyResult {
    #[new]
    #[pyo3(signature = (week, phase, winner, players_remaining = 0))]
    fn py_new(week: u32, phase: &str, winner: &str, players_remaining: i64) -> Self {
        match Phase::parse(phase) {
            Phase::Tribal => WeeklyResult::tribal(week, winner),
            Phase::Individual => WeeklyResult::individual(week, winner, players_remaining),
        }
    }

    fn __repr__(&self) -> String {
        format!("WeeklyResult(week={}, phase={:?})", self.week, self.phase)
    }
}

/// Index results by week. Later entries for the same week replace earlier
/// ones; results without a usable week are dropped.
pub fn index_results<I>(results: I) -> BTreeMap<u32, WeeklyResult>
where
    I: IntoIterator<Item = WeeklyResult>,
{
    let mut by_week = BTreeMap::new();
    for result in results {
        if result.week == 0 {
            tracing::warn!(?result, "dropping weekly result without a week");
            continue;
        }
        by_week.insert(result.week, result);
    }
    by_week
}

#[cfg_attr(feature = "python", pyclass(eq, eq_int))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Pending,
    Winner,
    Loser,
}

/// One week of a team's picks, resolved against the published result.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PickRow {
    pub week: u32,
    pub pick_label: String,
    pub status: PickStatus,

    /// Points awarded, 0 unless the pick won
    pub bonus: i64,

    /// "+N Points" for winning picks
    pub bonus_label: Option<String>,
}

/// Resolve a single pick.
pub fn resolve_pick(
    week: u32,
    label: &str,
    result: Option<&WeeklyResult>,
    roster: &Roster,
    tribal_bonus: i64,
) -> PickRow {
    let Some(result) = result else {
        return PickRow {
            week,
            pick_label: label.to_string(),
            status: PickStatus::Pending,
            bonus: 0,
            bonus_label: None,
        };
    };

    if result.is_won_by(label, roster) {
        let bonus = result.bonus(tribal_bonus);
        PickRow {
            week,
            pick_label: label.to_string(),
            status: PickStatus::Winner,
            bonus,
            bonus_label: Some(bonus_label(bonus)),
        }
    } else {
        tracing::debug!(week, label, phase = ?result.phase, "pick did not match the weekly winner");
        PickRow {
            week,
            pick_label: label.to_string(),
            status: PickStatus::Loser,
            bonus: 0,
            bonus_label: None,
        }
    }
}

/// Resolve every week a team picked, in ascending week order.
pub fn resolve_weekly_picks(
    picks: &WeeklyPicks,
    results: &BTreeMap<u32, WeeklyResult>,
    roster: &Roster,
    tribal_bonus: i64,
) -> Vec<PickRow> {
    picks
        .iter()
        .map(|(week, label)| resolve_pick(week, label, results.get(&week), roster, tribal_bonus))
        .collect()
}

/// Sum of bonuses over resolved rows.
pub fn bonus_total(rows: &[PickRow]) -> i64 {
    rows.iter().map(|row| row.bonus).fold(0, i64::saturating_add)
}

/// A team's immunity picks, one label per week.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct WeeklyPicks(BTreeMap<u32, String>);

impl WeeklyPicks {
    pub fn new() -> Self {
        WeeklyPicks::default()
    }

    pub fn get(&self, week: u32) -> Option<&str> {
        self.0.get(&week).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Picks in ascending week order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(&week, label)| (week, label.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<u32, String> {
        &self.0
    }

    /// Record a pick for `week`.
    ///
    /// A week can only be picked once. Picks for weeks that already have a
    /// published result are accepted unless the league locks them.
    pub fn submit(
        &mut self,
        week: u32,
        label: impl Into<String>,
        results: &BTreeMap<u32, WeeklyResult>,
        rules: &LeagueRules,
    ) -> Result<(), PickError> {
        if week == 0 || week > rules.season_weeks {
            return Err(PickError::InvalidWeek(week));
        }
        if self.0.contains_key(&week) {
            return Err(PickError::AlreadySubmitted(week));
        }
        if rules.lock_resolved_weeks && results.contains_key(&week) {
            return Err(PickError::WeekResolved(week));
        }
        let label = label.into();
        tracing::debug!(week, label = %label, "weekly pick submitted");
        self.0.insert(week, label);
        Ok(())
    }
}

impl From<Value> for WeeklyPicks {
    fn from(value: Value) -> Self {
        WeeklyPicks(coerce_weekly_picks(&value))
    }
}

impl From<BTreeMap<u32, String>> for WeeklyPicks {
    fn from(map: BTreeMap<u32, String>) -> Self {
        WeeklyPicks(map)
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for WeeklyPicks {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        WeeklyPicks(iter.into_iter().map(|(week, label)| (week, label.into())).collect())
    }
}

impl Serialize for WeeklyPicks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
