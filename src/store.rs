//! Draft pick persistence.
//!
//! The backend stores a team's picks as one array column and the app used to
//! update it with a plain read, modify, write. Two devices drafting for the
//! same team at once both read the same array and the second write drops the
//! first pick. [`admit_read_modify_write`] keeps that behaviour so it can be
//! reproduced; [`admit_versioned`] closes it with a compare-and-swap on a
//! per-team version.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::config::LeagueRules;
use crate::constants::MAX_ADMISSION_ATTEMPTS;
use crate::contestant::Contestant;
use crate::draft::DraftPickSet;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

pub trait PickStore {
    /// Current picks for `team` and the version they were read at.
    fn load(&self, team: &str) -> Result<Versioned<DraftPickSet>, StoreError>;

    /// Unconditional overwrite. Returns the new version.
    fn save(&self, team: &str, picks: DraftPickSet) -> Result<u64, StoreError>;

    /// Overwrite only if the stored version is still `expected_version`.
    fn compare_and_swap(
        &self,
        team: &str,
        expected_version: u64,
        picks: DraftPickSet,
    ) -> Result<u64, StoreError>;
}

/// Pick store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPickStore {
    teams: Mutex<HashMap<String, Versioned<DraftPickSet>>>,
}

impl InMemoryPickStore {
    pub fn new() -> Self {
        InMemoryPickStore::default()
    }

    /// Register a team with its starting picks, at version 0.
    pub fn insert_team(&self, team: &str, picks: DraftPickSet) {
        let mut teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        teams.insert(team.to_string(), Versioned { version: 0, value: picks });
    }
}

impl PickStore for InMemoryPickStore {
    fn load(&self, team: &str) -> Result<Versioned<DraftPickSet>, StoreError> {
        let teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        teams
            .get(team)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTeam(team.to_string()))
    }

    fn save(&self, team: &str, picks: DraftPickSet) -> Result<u64, StoreError> {
        let mut teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = teams
            .get_mut(team)
            .ok_or_else(|| StoreError::UnknownTeam(team.to_string()))?;
        entry.version += 1;
        entry.value = picks;
        Ok(entry.version)
    }

    fn compare_and_swap(
        &self,
        team: &str,
        expected_version: u64,
        picks: DraftPickSet,
    ) -> Result<u64, StoreError> {
        let mut teams = self.teams.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = teams
            .get_mut(team)
            .ok_or_else(|| StoreError::UnknownTeam(team.to_string()))?;
        if entry.version != expected_version {
            return Err(StoreError::Conflict {
                team: team.to_string(),
                expected: expected_version,
                found: entry.version,
            });
        }
        entry.version += 1;
        entry.value = picks;
        Ok(entry.version)
    }
}

/// Admit with a blind read-modify-write.
///
/// Not safe against concurrent admissions for the same team: a write made
/// between this call's load and save is silently overwritten.
pub fn admit_read_modify_write<S: PickStore + ?Sized>(
    store: &S,
    team: &str,
    contestant: &Contestant,
    rules: &LeagueRules,
) -> Result<DraftPickSet, StoreError> {
    let mut picks = store.load(team)?.value;
    picks.admit(contestant, rules)?;
    store.save(team, picks.clone())?;
    Ok(picks)
}

/// Admit as a single compare-and-swap append.
///
/// If another write lands between load and swap, the picks are reloaded and
/// the admission checks run again against the fresh set, so a pick that no
/// longer fits is rejected instead of dropped.
pub fn admit_versioned<S: PickStore + ?Sized>(
    store: &S,
    team: &str,
    contestant: &Contestant,
    rules: &LeagueRules,
) -> Result<DraftPickSet, StoreError> {
    for attempt in 1..=MAX_ADMISSION_ATTEMPTS {
        let current = store.load(team)?;
        let mut picks = current.value;
        picks.admit(contestant, rules)?;

        match store.compare_and_swap(team, current.version, picks.clone()) {
            Ok(version) => {
                tracing::debug!(team, contestant = %contestant.id, version, "draft pick admitted");
                return Ok(picks);
            }
            Err(StoreError::Conflict { found, .. }) => {
                tracing::info!(team, attempt, found, "pick set changed during admission, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StoreError::RetriesExhausted {
        team: team.to_string(),
        attempts: MAX_ADMISSION_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DraftRejection;

    fn contestant(id: u32) -> Contestant {
        Contestant {
            id: id.to_string(),
            name: format!("Player {}", id),
            ..Default::default()
        }
    }

    fn store_with(team: &str, n: u32, rules: &LeagueRules) -> InMemoryPickStore {
        let mut picks = DraftPickSet::new();
        for id in 1..=n {
            picks.admit(&contestant(id), rules).unwrap();
        }
        let store = InMemoryPickStore::new();
        store.insert_team(team, picks);
        store
    }

    #[test]
    fn test_interleaved_blind_writes_lose_a_pick() {
        let rules = LeagueRules::default();
        let store = store_with("torches", 3, &rules);

        // Two devices read the same set before either writes.
        let mut first = store.load("torches").unwrap().value;
        let mut second = store.load("torches").unwrap().value;
        first.admit(&contestant(10), &rules).unwrap();
        second.admit(&contestant(11), &rules).unwrap();
        store.save("torches", first).unwrap();
        store.save("torches", second).unwrap();

        let stored = store.load("torches").unwrap().value;
        assert_eq!(stored.len(), 4);
        assert!(!stored.contains("10"));
        assert!(stored.contains("11"));
    }

    #[test]
    fn test_stale_swap_conflicts() {
        let rules = LeagueRules::default();
        let store = store_with("torches", 3, &rules);

        let stale = store.load("torches").unwrap();
        admit_versioned(&store, "torches", &contestant(10), &rules).unwrap();

        let mut picks = stale.value;
        picks.admit(&contestant(11), &rules).unwrap();
        let err = store
            .compare_and_swap("torches", stale.version, picks)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                team: "torches".to_string(),
                expected: 0,
                found: 1,
            }
        );
    }

    #[test]
    fn test_versioned_admission_fills_to_cap() {
        let rules = LeagueRules::default();
        let store = store_with("torches", 3, &rules);

        admit_versioned(&store, "torches", &contestant(10), &rules).unwrap();
        let picks = admit_versioned(&store, "torches", &contestant(11), &rules).unwrap();
        assert_eq!(picks.len(), 5);

        let err = admit_versioned(&store, "torches", &contestant(12), &rules).unwrap_err();
        assert_eq!(err, StoreError::Rejected(DraftRejection::MaximumPicksReached));
        assert_eq!(store.load("torches").unwrap().value.len(), 5);
    }

    #[test]
    fn test_unknown_team() {
        let store = InMemoryPickStore::new();
        let err = admit_read_modify_write(&store, "nobody", &contestant(1), &LeagueRules::default())
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownTeam("nobody".to_string()));
    }

    /// Store whose swaps always lose to some other writer.
    struct AlwaysConflicting(InMemoryPickStore);

    impl PickStore for AlwaysConflicting {
        fn load(&self, team: &str) -> Result<Versioned<DraftPickSet>, StoreError> {
            self.0.load(team)
        }

        fn save(&self, team: &str, picks: DraftPickSet) -> Result<u64, StoreError> {
            self.0.save(team, picks)
        }

        fn compare_and_swap(&self, team: &str, expected: u64, _: DraftPickSet) -> Result<u64, StoreError> {
            Err(StoreError::Conflict {
                team: team.to_string(),
                expected,
                found: expected + 1,
            })
        }
    }

    #[test]
    fn test_retries_are_bounded() {
        let rules = LeagueRules::default();
        let store = AlwaysConflicting(store_with("torches", 0, &rules));

        let err = admit_versioned(&store, "torches", &contestant(1), &rules).unwrap_err();
        assert_eq!(
            err,
            StoreError::RetriesExhausted {
                team: "torches".to_string(),
                attempts: MAX_ADMISSION_ATTEMPTS,
            }
        );
    }
}
