use serde::{Deserialize, Serialize};

use crate::config::LeagueRules;
use crate::contestant::Contestant;
use crate::error::DraftRejection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickType {
    /// One of the picks made before the season starts
    Initial,
    /// The extra pick unlocked at the merge
    Merge,
}

/// A drafted contestant. The whole row is kept, not just the id, so the team
/// still renders if the roster row later disappears.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftedContestant {
    pub contestant: Contestant,
    pub pick_type: PickType,
}

/// A team's drafted contestants, in draft order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPickSet {
    picks: Vec<DraftedContestant>,
}

impl DraftPickSet {
    pub fn new() -> Self {
        DraftPickSet::default()
    }

    /// Rebuild a pick set from a stored team array. Entries past the initial
    /// cap are taken to be merge picks.
    pub fn from_team(team: Vec<Contestant>, rules: &LeagueRules) -> Self {
        let picks = team
            .into_iter()
            .enumerate()
            .map(|(i, contestant)| DraftedContestant {
                contestant,
                pick_type: if i < rules.initial_pick_cap {
                    PickType::Initial
                } else {
                    PickType::Merge
                },
            })
            .collect();
        DraftPickSet { picks }
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn contains(&self, contestant_id: &str) -> bool {
        self.picks.iter().any(|p| p.contestant.id == contestant_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftedContestant> {
        self.picks.iter()
    }

    /// Contestant snapshots in draft order, the shape stored on a profile.
    pub fn contestants(&self) -> Vec<Contestant> {
        self.picks.iter().map(|p| p.contestant.clone()).collect()
    }

    pub fn initial_count(&self) -> usize {
        self.picks
            .iter()
            .filter(|p| p.pick_type == PickType::Initial)
            .count()
    }

    pub fn has_merge_pick(&self) -> bool {
        self.picks.iter().any(|p| p.pick_type == PickType::Merge)
    }

    /// Decide whether `contestant` may join this set, and as which kind of
    /// pick. Checks run in order: duplicate, eliminated, cap.
    pub fn check_admission(
        &self,
        contestant: &Contestant,
        rules: &LeagueRules,
    ) -> Result<PickType, DraftRejection> {
        if self.contains(&contestant.id) {
            return Err(DraftRejection::AlreadyDrafted);
        }
        if rules.reject_eliminated && contestant.is_eliminated {
            return Err(DraftRejection::Eliminated);
        }
        if self.initial_count() < rules.initial_pick_cap {
            Ok(PickType::Initial)
        } else if rules.merge_pick_enabled && !self.has_merge_pick() {
            Ok(PickType::Merge)
        } else {
            Err(DraftRejection::MaximumPicksReached)
        }
    }

    /// Check and append. On rejection the set is unchanged.
    pub fn admit(
        &mut self,
        contestant: &Contestant,
        rules: &LeagueRules,
    ) -> Result<PickType, DraftRejection> {
        let pick_type = self.check_admission(contestant, rules).map_err(|reason| {
            tracing::debug!(contestant = %contestant.id, %reason, "draft pick rejected");
            reason
        })?;
        self.picks.push(DraftedContestant {
            contestant: contestant.clone(),
            pick_type,
        });
        Ok(pick_type)
    }
}
