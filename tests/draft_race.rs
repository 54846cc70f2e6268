//! Two devices drafting for the same team at the same moment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use survivor_core::{
    admit_read_modify_write, admit_versioned, Contestant, DraftPickSet, DraftRejection,
    InMemoryPickStore, LeagueRules, PickStore, StoreError, Versioned,
};

const TEAM: &str = "torches";

/// Holds the first `gated` loads at a barrier until all of them have read,
/// so every gated caller works from the same snapshot.
struct GatedStore {
    inner: InMemoryPickStore,
    barrier: Barrier,
    gated: usize,
    loads: AtomicUsize,
}

impl GatedStore {
    fn new(inner: InMemoryPickStore, gated: usize) -> Self {
        GatedStore {
            inner,
            barrier: Barrier::new(gated),
            gated,
            loads: AtomicUsize::new(0),
        }
    }
}

impl PickStore for GatedStore {
    fn load(&self, team: &str) -> Result<Versioned<DraftPickSet>, StoreError> {
        let snapshot = self.inner.load(team)?;
        if self.loads.fetch_add(1, Ordering::SeqCst) < self.gated {
            self.barrier.wait();
        }
        Ok(snapshot)
    }

    fn save(&self, team: &str, picks: DraftPickSet) -> Result<u64, StoreError> {
        self.inner.save(team, picks)
    }

    fn compare_and_swap(
        &self,
        team: &str,
        expected_version: u64,
        picks: DraftPickSet,
    ) -> Result<u64, StoreError> {
        self.inner.compare_and_swap(team, expected_version, picks)
    }
}

fn contestant(id: u32) -> Contestant {
    Contestant {
        id: id.to_string(),
        name: format!("Player {}", id),
        ..Default::default()
    }
}

fn gated_store(starting_picks: u32, rules: &LeagueRules) -> Arc<GatedStore> {
    let mut picks = DraftPickSet::new();
    for id in 1..=starting_picks {
        picks.admit(&contestant(id), rules).unwrap();
    }
    let inner = InMemoryPickStore::new();
    inner.insert_team(TEAM, picks);
    Arc::new(GatedStore::new(inner, 2))
}

type Admit = fn(&GatedStore, &str, &Contestant, &LeagueRules) -> Result<DraftPickSet, StoreError>;

/// Run two admissions concurrently and return both outcomes.
fn race(
    store: &Arc<GatedStore>,
    admit: Admit,
    rules: &LeagueRules,
) -> Vec<Result<DraftPickSet, StoreError>> {
    let handles: Vec<_> = [10, 11]
        .into_iter()
        .map(|id| {
            let store = Arc::clone(store);
            let rules = rules.clone();
            thread::spawn(move || admit(&store, TEAM, &contestant(id), &rules))
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn naive(store: &GatedStore, team: &str, c: &Contestant, rules: &LeagueRules) -> Result<DraftPickSet, StoreError> {
    admit_read_modify_write(store, team, c, rules)
}

fn versioned(store: &GatedStore, team: &str, c: &Contestant, rules: &LeagueRules) -> Result<DraftPickSet, StoreError> {
    admit_versioned(store, team, c, rules)
}

#[test]
fn test_read_modify_write_loses_a_pick() {
    let rules = LeagueRules::default();
    let store = gated_store(3, &rules);

    let outcomes = race(&store, naive, &rules);
    assert!(outcomes.iter().all(Result::is_ok), "both callers are told they succeeded");

    let stored = store.load(TEAM).unwrap().value;
    assert_eq!(stored.len(), 4);
    assert!(stored.contains("10") ^ stored.contains("11"));
}

#[test]
fn test_read_modify_write_overfills_from_four() {
    let rules = LeagueRules::default();
    let store = gated_store(4, &rules);

    let outcomes = race(&store, naive, &rules);
    assert!(outcomes.iter().all(Result::is_ok));

    // Each caller filled the 5th slot in its own copy; only one survives.
    let stored = store.load(TEAM).unwrap().value;
    assert_eq!(stored.len(), 5);
    assert!(stored.contains("10") ^ stored.contains("11"));
}

#[test]
fn test_versioned_admission_keeps_both() {
    let rules = LeagueRules::default();
    let store = gated_store(3, &rules);

    let outcomes = race(&store, versioned, &rules);
    assert!(outcomes.iter().all(Result::is_ok));

    let stored = store.load(TEAM).unwrap().value;
    assert_eq!(stored.len(), 5);
    assert!(stored.contains("10") && stored.contains("11"));

    let err = admit_versioned(store.as_ref(), TEAM, &contestant(12), &rules).unwrap_err();
    assert_eq!(err, StoreError::Rejected(DraftRejection::MaximumPicksReached));
    assert_eq!(store.load(TEAM).unwrap().value.len(), 5);
}

#[test]
fn test_versioned_admission_rejects_instead_of_dropping() {
    let rules = LeagueRules::default();
    let store = gated_store(4, &rules);

    let outcomes = race(&store, versioned, &rules);
    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let rejected: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().err()).collect();

    assert_eq!(admitted, 1);
    assert_eq!(
        rejected,
        vec![&StoreError::Rejected(DraftRejection::MaximumPicksReached)]
    );

    let stored = store.load(TEAM).unwrap().value;
    assert_eq!(stored.len(), 5);
    assert!(stored.contains("10") ^ stored.contains("11"));
}
