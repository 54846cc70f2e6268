#[cfg(feature = "python")]
use pyo3::prelude::*;
use std::collections::BTreeMap;

use crate::breakdown::{pick_breakdown, PickBreakdown};
use crate::config::LeagueRules;
use crate::contestant::{Contestant, Roster};
use crate::draft::{DraftPickSet, PickType};
use crate::error::{DraftRejection, PickError};
use crate::overrides::ResultOverrides;
use crate::standings::{score_team, standings, Standing, TeamProfile, TeamScore};
use crate::weekly::{index_results, resolve_weekly_picks, PickRow, WeeklyPicks, WeeklyResult};

/// Everything scoring needs for one read: roster, published results, the
/// admin's overrides and the league's rules.
///
/// A snapshot is built from freshly fetched rows and thrown away afterwards;
/// nothing derived from it is cached.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default)]
pub struct LeagueSnapshot {
    pub roster: Roster,

    /// Published results by week
    pub results: BTreeMap<u32, WeeklyResult>,

    pub overrides: ResultOverrides,
    pub rules: LeagueRules,

    /// Declared season winner, once the finale has aired
    pub season_winner_id: Option<String>,
}

impl LeagueSnapshot {
    pub fn new(contestants: Vec<Contestant>, results: Vec<WeeklyResult>, rules: LeagueRules) -> Self {
        LeagueSnapshot {
            roster: Roster::new(contestants),
            results: index_results(results),
            overrides: ResultOverrides::new(),
            rules,
            season_winner_id: None,
        }
    }

    /// Build a snapshot from the backend's JSON arrays of contestant and
    /// weekly result rows.
    pub fn from_json(
        contestants_json: &str,
        results_json: &str,
        rules: LeagueRules,
    ) -> Result<Self, serde_json::Error> {
        let contestants: Vec<Contestant> = serde_json::from_str(contestants_json)?;
        let results: Vec<WeeklyResult> = serde_json::from_str(results_json)?;
        Ok(LeagueSnapshot::new(contestants, results, rules))
    }

    pub fn with_overrides(mut self, overrides: ResultOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_season_winner(mut self, contestant_id: &str) -> Self {
        self.season_winner_id = Some(contestant_id.to_string());
        self
    }

    /// Create a modified copy with one week's winner overridden
    pub fn with_override(&self, result: WeeklyResult) -> Self {
        let mut new_state = self.clone();
        new_state.overrides.add_override(result);
        new_state
    }

    pub fn current_game_day(&self) -> i64 {
        self.roster.current_game_day()
    }

    pub fn contestant_points(&self, contestant: &Contestant) -> i64 {
        contestant.points(self.current_game_day())
    }

    /// Result used for scoring `week`: the override if there is one,
    /// otherwise the published result.
    pub fn effective_result(&self, week: u32) -> Option<&WeeklyResult> {
        self.overrides.get(week).or_else(|| self.results.get(&week))
    }

    pub fn effective_results(&self) -> BTreeMap<u32, WeeklyResult> {
        self.overrides.apply(&self.results)
    }

    pub fn resolve_picks(&self, picks: &WeeklyPicks) -> Vec<PickRow> {
        resolve_weekly_picks(
            picks,
            &self.effective_results(),
            &self.roster,
            self.rules.tribal_bonus,
        )
    }

    /// How the league split its picks for `week`, over the starting tribes.
    pub fn breakdown<'a, I>(&self, week: u32, picks: I) -> Option<PickBreakdown>
    where
        I: IntoIterator<Item = &'a WeeklyPicks>,
    {
        pick_breakdown(week, picks, &self.rules.tribes)
    }

    /// Draft `contestant` into `picks` under this league's rules. The live
    /// roster row is stored when there is one.
    pub fn admit(
        &self,
        picks: &mut DraftPickSet,
        contestant: &Contestant,
    ) -> Result<PickType, DraftRejection> {
        let live = self.roster.get(&contestant.id).unwrap_or(contestant);
        picks.admit(live, &self.rules)
    }

    pub fn submit_pick(
        &self,
        picks: &mut WeeklyPicks,
        week: u32,
        label: &str,
    ) -> Result<(), PickError> {
        picks.submit(week, label, &self.effective_results(), &self.rules)
    }

    pub fn team_score(&self, profile: &TeamProfile) -> TeamScore {
        score_team(profile, self, &self.effective_results(), self.current_game_day())
    }

    pub fn standings(&self, profiles: &[TeamProfile]) -> Vec<Standing> {
        standings(profiles, self)
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl LeagueSnapshot {
    #[new]
    #[pyo3(signature = (contestants, results, rules = None, overrides = None, season_winner_id = None))]
    fn py_new(
        contestants: Vec<Contestant>,
        results: Vec<WeeklyResult>,
        rules: Option<LeagueRules>,
        overrides: Option<ResultOverrides>,
        season_winner_id: Option<String>,
    ) -> Self {
        let mut snapshot = LeagueSnapshot::new(contestants, results, rules.unwrap_or_default())
            .with_overrides(overrides.unwrap_or_default());
        snapshot.season_winner_id = season_winner_id;
        snapshot
    }

    #[staticmethod]
    #[pyo3(name = "from_json", signature = (contestants_json, results_json, rules = None))]
    fn py_from_json(contestants_json: &str, results_json: &str, rules: Option<LeagueRules>) -> PyResult<Self> {
        LeagueSnapshot::from_json(contestants_json, results_json, rules.unwrap_or_default())
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[pyo3(name = "current_game_day")]
    fn py_current_game_day(&self) -> i64 {
        self.current_game_day()
    }

    #[pyo3(name = "contestant_points")]
    fn py_contestant_points(&self, contestant: &Contestant) -> i64 {
        self.contestant_points(contestant)
    }

    #[pyo3(name = "resolve_picks")]
    fn py_resolve_picks(&self, picks: BTreeMap<u32, String>) -> Vec<PickRow> {
        self.resolve_picks(&WeeklyPicks::from(picks))
    }

    #[pyo3(name = "breakdown")]
    fn py_breakdown(&self, week: u32, picks: Vec<BTreeMap<u32, String>>) -> Option<PickBreakdown> {
        let picks: Vec<WeeklyPicks> = picks.into_iter().map(WeeklyPicks::from).collect();
        self.breakdown(week, &picks)
    }

    /// Returns the team with `contestant` appended, or raises `ValueError`
    /// with the rejection reason.
    #[pyo3(name = "admit")]
    fn py_admit(&self, team: Vec<Contestant>, contestant: &Contestant) -> PyResult<Vec<Contestant>> {
        let mut picks = DraftPickSet::from_team(team, &self.rules);
        self.admit(&mut picks, contestant)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(picks.contestants())
    }

    #[pyo3(name = "with_override")]
    fn py_with_override(&self, result: WeeklyResult) -> Self {
        self.with_override(result)
    }

    /// Leaderboard for the given profile rows (a JSON array), as JSON.
    fn standings_json(&self, profiles_json: &str) -> PyResult<String> {
        let profiles: Vec<TeamProfile> = serde_json::from_str(profiles_json)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        serde_json::to_string(&self.standings(&profiles))
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "LeagueSnapshot({} contestants, {} results, {} overrides)",
            self.roster.len(),
            self.results.len(),
            self.overrides.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekly::PickStatus;

    fn make_test_league() -> LeagueSnapshot {
        let contestants = vec![
            Contestant {
                id: "42".to_string(),
                name: "Ama".to_string(),
                ..Default::default()
            },
            Contestant {
                id: "7".to_string(),
                name: "Boro".to_string(),
                is_eliminated: true,
                elim_day: Some(12),
                jury_votes_received: 1,
                ..Default::default()
            },
        ];
        let results = vec![WeeklyResult::tribal(1, "Kalo"), WeeklyResult::tribal(2, "Cila")];
        LeagueSnapshot::new(contestants, results, LeagueRules::default())
    }

    #[test]
    fn test_contestant_points_use_roster_game_day() {
        let league = make_test_league();
        assert_eq!(league.current_game_day(), 12);

        let ama = league.roster.get("42").unwrap();
        let boro = league.roster.get("7").unwrap();
        assert_eq!(league.contestant_points(ama), 12);
        assert_eq!(league.contestant_points(boro), 13);
    }

    #[test]
    fn test_override_changes_resolution() {
        let league = make_test_league();
        let picks: WeeklyPicks = [(2, "Vatu")].into_iter().collect();

        assert_eq!(league.resolve_picks(&picks)[0].status, PickStatus::Loser);

        let corrected = league.with_override(WeeklyResult::tribal(2, "Vatu"));
        assert_eq!(corrected.resolve_picks(&picks)[0].status, PickStatus::Winner);
        assert_eq!(corrected.effective_result(2).unwrap().winner_team.as_deref(), Some("Vatu"));

        // the original snapshot is unchanged
        assert_eq!(league.effective_result(2).unwrap().winner_team.as_deref(), Some("Cila"));
    }

    #[test]
    fn test_admit_stores_live_row() {
        let league = make_test_league();
        let mut picks = DraftPickSet::new();
        let stale = Contestant {
            id: "42".to_string(),
            ..Default::default()
        };

        league.admit(&mut picks, &stale).unwrap();
        assert_eq!(picks.contestants()[0].name, "Ama");

        let boro = league.roster.get("7").unwrap().clone();
        assert_eq!(league.admit(&mut picks, &boro), Err(DraftRejection::Eliminated));
    }

    #[test]
    fn test_from_json() {
        let league = LeagueSnapshot::from_json(
            r#"[{"id": 42, "name": "Ama", "elim_day": null}, {"id": 7, "name": "Boro", "is_eliminated": true, "elim_day": "4"}]"#,
            r#"[{"week": 1, "phase": "tribal", "winner_team": "Kalo", "players_remaining": 18}]"#,
            LeagueRules::default(),
        )
        .unwrap();

        assert_eq!(league.roster.len(), 2);
        assert_eq!(league.current_game_day(), 4);
        assert_eq!(league.effective_result(1).unwrap().winner_team.as_deref(), Some("Kalo"));
    }

    #[test]
    fn test_submit_pick_respects_lock() {
        let mut league = make_test_league();
        league.rules.lock_resolved_weeks = true;

        let mut picks = WeeklyPicks::new();
        assert_eq!(league.submit_pick(&mut picks, 1, "Kalo"), Err(PickError::WeekResolved(1)));
        league.submit_pick(&mut picks, 3, "Kalo").unwrap();
        assert_eq!(picks.get(3), Some("Kalo"));
    }
}
