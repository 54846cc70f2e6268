#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::coerce::{coerce_bool, coerce_opt_int, coerce_opt_string, coerce_int, coerce_string};

/// A contestant row from the roster.
///
/// Ids are kept as strings: the backend hands them out as numbers, but picks
/// and team snapshots may carry them either way.
#[cfg_attr(feature = "python", pyclass(get_all, set_all))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Contestant {
    pub id: String,
    pub name: String,

    /// Starting tribe
    pub tribe: String,

    pub season: String,
    pub is_eliminated: bool,

    /// Day the contestant left the game, if they have
    pub elim_day: Option<i64>,

    pub jury_votes_received: i64,
    pub picture_url: Option<String>,
    pub elim_photo_url: Option<String>,
}

impl From<Value> for Contestant {
    fn from(row: Value) -> Self {
        Contestant::from_row(&row)
    }
}

impl Contestant {
    /// Build a contestant from a loosely-typed backend row.
    ///
    /// Older rows use `starting_tribe` and `elimPhoto_url`; both spellings
    /// are accepted. Missing or malformed fields fall back to defaults.
    pub fn from_row(row: &Value) -> Self {
        let field = |key: &str| row.get(key).unwrap_or(&Value::Null);
        let first_string = |keys: &[&str]| keys.iter().find_map(|key| coerce_opt_string(field(*key)));

        Contestant {
            id: coerce_string(field("id")),
            name: coerce_string(field("name")),
            tribe: first_string(&["tribe", "starting_tribe"]).unwrap_or_default(),
            season: coerce_string(field("season")),
            is_eliminated: coerce_bool(field("is_eliminated")),
            elim_day: coerce_opt_int(field("elim_day")),
            jury_votes_received: coerce_int(field("jury_votes_received")),
            picture_url: first_string(&["picture_url"]),
            elim_photo_url: first_string(&["elim_photo_url", "elimPhoto_url"]),
        }
    }

    /// Days this contestant has banked: frozen at the elimination day once
    /// out, otherwise tracking the current game day. Never negative.
    pub fn days_lasted(&self, current_game_day: i64) -> i64 {
        let base = if self.is_eliminated {
            self.elim_day.unwrap_or(0)
        } else {
            current_game_day
        };
        base.max(0)
    }

    /// Points earned: one per day lasted plus one per jury vote received.
    /// Saturates rather than overflowing on absurd backend values.
    pub fn points(&self, current_game_day: i64) -> i64 {
        self.days_lasted(current_game_day)
            .saturating_add(self.jury_votes_received.max(0))
    }

    /// Photo to show for this contestant, preferring the elimination photo
    /// once they are out.
    pub fn display_photo(&self) -> Option<&str> {
        let (first, second) = if self.is_eliminated {
            (&self.elim_photo_url, &self.picture_url)
        } else {
            (&self.picture_url, &self.elim_photo_url)
        };
        first.as_deref().or(second.as_deref())
    }

    /// Overlay the live roster row onto a stored snapshot. Live values win,
    /// except that text fields the live row leaves empty (name, tribe,
    /// season, photos) keep the snapshot's value.
    pub fn hydrated_with(&self, live: &Contestant) -> Contestant {
        let mut merged = live.clone();
        if merged.name.is_empty() {
            merged.name = self.name.clone();
        }
        if merged.tribe.is_empty() {
            merged.tribe = self.tribe.clone();
        }
        if merged.season.is_empty() {
            merged.season = self.season.clone();
        }
        if merged.picture_url.is_none() {
            merged.picture_url = self.picture_url.clone();
        }
        if merged.elim_photo_url.is_none() {
            merged.elim_photo_url = self.elim_photo_url.clone();
        }
        merged
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl Contestant {
    #[new]
    #[pyo3(signature = (id, name, tribe = String::new(), is_eliminated = false, elim_day = None, jury_votes_received = 0))]
    fn py_new(
        id: String,
        name: String,
        tribe: String,
        is_eliminated: bool,
        elim_day: Option<i64>,
        jury_votes_received: i64,
    ) -> Self {
        Contestant {
            id,
            name,
            tribe,
            is_eliminated,
            elim_day,
            jury_votes_received,
            ..Default::default()
        }
    }

    #[pyo3(name = "points")]
    fn py_points(&self, current_game_day: i64) -> i64 {
        self.points(current_game_day)
    }

    #[getter(display_photo)]
    fn py_display_photo(&self) -> Option<String> {
        self.display_photo().map(str::to_string)
    }

    fn __repr__(&self) -> String {
        format!(
            "Contestant({:?}, {:?}, eliminated={}, elim_day={:?})",
            self.id, self.name, self.is_eliminated, self.elim_day
        )
    }
}

/// The full cast, indexed by id.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    contestants: Vec<Contestant>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    pub fn new(contestants: Vec<Contestant>) -> Self {
        let by_id = contestants
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Roster { contestants, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Contestant> {
        self.by_id.get(id).map(|&i| &self.contestants[i])
    }

    pub fn contestants(&self) -> &[Contestant] {
        &self.contestants
    }

    pub fn len(&self) -> usize {
        self.contestants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contestants.is_empty()
    }

    /// Furthest elimination day seen across the cast. The roster has no day
    /// counter of its own, so this stands in for "days elapsed".
    pub fn current_game_day(&self) -> i64 {
        self.contestants
            .iter()
            .map(|c| c.elim_day.unwrap_or(0))
            .fold(0, i64::max)
    }

    /// Refresh stored team snapshots from the live roster. Snapshots whose
    /// contestant is no longer on the roster are returned as stored.
    pub fn hydrate_team(&self, team: &[Contestant]) -> Vec<Contestant> {
        team.iter()
            .map(|pick| match self.get(&pick.id) {
                Some(live) => pick.hydrated_with(live),
                None => pick.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contestant(id: &str, name: &str, elim_day: Option<i64>) -> Contestant {
        Contestant {
            id: id.to_string(),
            name: name.to_string(),
            tribe: "Kalo".to_string(),
            is_eliminated: elim_day.is_some(),
            elim_day,
            ..Default::default()
        }
    }

    #[test]
    fn test_eliminated_points_frozen() {
        let mut c = contestant("1", "Ama", Some(6));
        c.jury_votes_received = 2;

        assert_eq!(c.points(6), 8);
        assert_eq!(c.points(30), 8);
    }

    #[test]
    fn test_active_points_track_game_day() {
        let mut c = contestant("2", "Boro", None);
        assert_eq!(c.points(0), 0);
        assert_eq!(c.points(14), 14);

        c.jury_votes_received = 3;
        assert_eq!(c.points(14), 17);
    }

    #[test]
    fn test_negative_fields_floored() {
        let mut c = contestant("3", "Cy", Some(-4));
        c.jury_votes_received = -2;
        assert_eq!(c.points(10), 0);

        let active = contestant("4", "Di", None);
        assert_eq!(active.points(-5), 0);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let c: Contestant = serde_json::from_str(
            r#"{"id": 1, "is_eliminated": true, "elim_day": 9223372036854775807, "jury_votes_received": 3}"#,
        )
        .unwrap();
        assert_eq!(c.points(0), i64::MAX);

        let mut active = contestant("5", "Ed", None);
        active.jury_votes_received = i64::MAX;
        assert_eq!(active.points(i64::MAX), i64::MAX);
    }

    #[test]
    fn test_from_row_coerces_fields() {
        let c: Contestant = serde_json::from_value(json!({
            "id": 42,
            "name": "Ama",
            "starting_tribe": "Vatu",
            "season": "S50",
            "is_eliminated": "true",
            "elim_day": "9",
            "jury_votes_received": "lots",
            "elimPhoto_url": "https://cdn/ama-out.png"
        }))
        .unwrap();

        assert_eq!(c.id, "42");
        assert_eq!(c.tribe, "Vatu");
        assert!(c.is_eliminated);
        assert_eq!(c.elim_day, Some(9));
        assert_eq!(c.jury_votes_received, 0);
        assert_eq!(c.display_photo(), Some("https://cdn/ama-out.png"));
    }

    #[test]
    fn test_tribe_prefers_current_column() {
        let c = Contestant::from_row(&json!({
            "id": 1,
            "tribe": "Kalo",
            "starting_tribe": "Cila",
            "jury_votes_received": null
        }));
        assert_eq!(c.tribe, "Kalo");
        assert_eq!(c.jury_votes_received, 0);
        assert_eq!(c.elim_day, None);
    }

    #[test]
    fn test_current_game_day_is_max_elim_day() {
        let roster = Roster::new(vec![
            contestant("1", "A", Some(3)),
            contestant("2", "B", Some(11)),
            contestant("3", "C", None),
        ]);
        assert_eq!(roster.current_game_day(), 11);
        assert_eq!(Roster::default().current_game_day(), 0);
    }

    #[test]
    fn test_hydrate_team_prefers_live_rows() {
        let roster = Roster::new(vec![contestant("1", "Ama", Some(8))]);

        let mut stale = contestant("1", "Ama", None);
        stale.picture_url = Some("old.png".to_string());
        let missing = contestant("99", "Gone", None);

        let team = roster.hydrate_team(&[stale, missing.clone()]);
        assert_eq!(team.len(), 2);
        assert!(team[0].is_eliminated);
        assert_eq!(team[0].elim_day, Some(8));
        assert_eq!(team[0].picture_url.as_deref(), Some("old.png"));
        assert_eq!(team[1], missing);
    }

    #[test]
    fn test_hydration_keeps_snapshot_text_when_live_is_blank() {
        let snapshot = contestant("6", "Fay", None);
        let live = Contestant {
            id: "6".to_string(),
            is_eliminated: true,
            elim_day: Some(15),
            jury_votes_received: 2,
            ..Default::default()
        };

        let merged = Roster::new(vec![live]).hydrate_team(&[snapshot]);
        assert_eq!(merged[0].name, "Fay");
        assert_eq!(merged[0].tribe, "Kalo");
        assert!(merged[0].is_eliminated);
        assert_eq!(merged[0].points(40), 17);
    }
}
