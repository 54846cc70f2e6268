#[cfg(feature = "python")]
use pyo3::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::coerce::{lenient_int, lenient_opt_string, lenient_string};
use crate::contestant::{Contestant, Roster};
use crate::league::LeagueSnapshot;
use crate::weekly::{bonus_total, resolve_weekly_picks, PickRow, WeeklyPicks, WeeklyResult};

/// Bonus points staked on the season winner before the finale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalWager {
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: i64,

    /// Contestant id or name
    #[serde(default, deserialize_with = "lenient_string")]
    pub pick: String,
}

impl FinalWager {
    /// Signed effect on the total: `+amount` when the pick won, `-amount`
    /// when it lost, 0 while no winner is declared. The stake is capped at
    /// the bonus points the team actually holds.
    pub fn outcome(&self, bonus_points: i64, season_winner_id: Option<&str>, roster: &Roster) -> i64 {
        let Some(winner_id) = season_winner_id else {
            return 0;
        };
        let stake = self.amount.clamp(0, bonus_points.max(0));
        let won = self.pick == winner_id
            || roster
                .get(winner_id)
                .is_some_and(|winner| winner.name == self.pick);
        if won {
            stake
        } else {
            -stake
        }
    }
}

/// A team profile row. The stored point columns are denormalized copies
/// written elsewhere; only `manual_points` feeds the computed score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub player_name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub team_name: String,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub avatar_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_team")]
    pub team: Vec<Contestant>,

    #[serde(default)]
    pub weekly_picks: WeeklyPicks,

    #[serde(default, deserialize_with = "lenient_int")]
    pub team_points: i64,

    #[serde(default, deserialize_with = "lenient_int")]
    pub bonus_points: i64,

    #[serde(default, deserialize_with = "lenient_int")]
    pub manual_points: i64,

    #[serde(default, deserialize_with = "lenient_int")]
    pub total_score: i64,

    #[serde(default)]
    pub final_wager: Option<FinalWager>,
}

fn lenient_team<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Contestant>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(rows) => rows.iter().map(Contestant::from_row).collect(),
        _ => Vec::new(),
    })
}

/// Computed score for one team.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamScore {
    pub team_id: String,
    pub team_name: String,
    pub player_name: String,

    /// Days lasted plus jury votes over the drafted contestants
    pub team_points: i64,

    /// Weekly immunity bonuses
    pub bonus_points: i64,

    pub manual_points: i64,
    pub wager_points: i64,
    pub total: i64,

    /// Days lasted by each drafted contestant, longest first
    pub tiebreak: Vec<i64>,

    pub pick_rows: Vec<PickRow>,
}

/// A team's place on the leaderboard.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based; teams tied on total and tiebreak share a rank
    pub rank: usize,

    /// Total equals the top total
    pub is_leader: bool,

    pub score: TeamScore,
}

/// Score one team against pre-computed league values.
///
/// # Arguments
/// * `profile` - Team to score
/// * `league` - Roster, rules and season winner
/// * `results` - Effective weekly results (overrides already applied)
/// * `current_game_day` - Furthest elimination day in the roster
pub fn score_team(
    profile: &TeamProfile,
    league: &LeagueSnapshot,
    results: &BTreeMap<u32, WeeklyResult>,
    current_game_day: i64,
) -> TeamScore {
    let team = league.roster.hydrate_team(&profile.team);
    let team_points = team
        .iter()
        .map(|c| c.points(current_game_day))
        .fold(0, i64::saturating_add);

    let pick_rows = resolve_weekly_picks(
        &profile.weekly_picks,
        results,
        &league.roster,
        league.rules.tribal_bonus,
    );
    let bonus_points = bonus_total(&pick_rows);

    let wager_points = profile
        .final_wager
        .as_ref()
        .map(|wager| {
            wager.outcome(
                bonus_points,
                league.season_winner_id.as_deref(),
                &league.roster,
            )
        })
        .unwrap_or(0);

    let mut tiebreak: Vec<i64> = team.iter().map(|c| c.days_lasted(current_game_day)).collect();
    tiebreak.sort_unstable_by(|a, b| b.cmp(a));

    TeamScore {
        team_id: profile.id.clone(),
        team_name: profile.team_name.clone(),
        player_name: profile.player_name.clone(),
        team_points,
        bonus_points,
        manual_points: profile.manual_points,
        wager_points,
        total: team_points
            .saturating_add(bonus_points)
            .saturating_add(profile.manual_points)
            .saturating_add(wager_points),
        tiebreak,
        pick_rows,
    }
}

/// Leaderboard order: higher total first, then the team whose contestants
/// lasted longest (compared contestant by contestant), then team name.
pub fn compare_scores(a: &TeamScore, b: &TeamScore) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| b.tiebreak.cmp(&a.tiebreak))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Score every team and rank them.
///
/// Teams are scored in parallel.
pub fn standings(profiles: &[TeamProfile], league: &LeagueSnapshot) -> Vec<Standing> {
    let results = league.effective_results();
    let current_game_day = league.current_game_day();

    let mut scores: Vec<TeamScore> = profiles
        .par_iter()
        .map(|profile| score_team(profile, league, &results, current_game_day))
        .collect();
    scores.sort_by(compare_scores);

    let top = scores.first().map(|s| s.total);
    let mut standings: Vec<Standing> = Vec::with_capacity(scores.len());
    for (i, score) in scores.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.score.total == score.total && prev.score.tiebreak == score.tiebreak => {
                prev.rank
            }
            _ => i + 1,
        };
        standings.push(Standing {
            rank,
            is_leader: Some(score.total) == top,
            score,
        });
    }
    standings
}
