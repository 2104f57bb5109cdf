//! Ballot groups and preference-level decoding.

use std::collections::HashMap;

use crate::config::{Candidate, MAX_BALLOT_GROUPS, MAX_VOTE_INFO_LENGTH};
use crate::errors::{CapacityExceededSnafu, TallyResult};

/// Preference level assigned to candidates a ballot never marks. Larger
/// levels are worse; every explicitly marked candidate ranks above this.
pub const UNRANKED_LEVEL: u32 = u32::MAX;

/// One ranking mark on a ballot. `tied_with_previous` carries the tie
/// marker: the candidate shares the level of the mark before it.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct PrefMark {
    pub candidate: Candidate,
    pub tied_with_previous: bool,
}

impl PrefMark {
    pub fn ranked(candidate: Candidate) -> PrefMark {
        PrefMark {
            candidate,
            tied_with_previous: false,
        }
    }

    pub fn tied(candidate: Candidate) -> PrefMark {
        PrefMark {
            candidate,
            tied_with_previous: true,
        }
    }
}

/// A bag of identical ballots counted as one unit.
///
/// `remaining` starts equal to `initial_count` and only ever decreases:
/// ballots lose their influence, in whole numbers, when they helped elect a
/// candidate. A ballot is never given fractional influence.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotGroup {
    pub initial_count: u64,
    pub remaining: u64,
    pub marks: Vec<PrefMark>,
}

impl BallotGroup {
    pub fn new(count: u64, marks: Vec<PrefMark>) -> BallotGroup {
        BallotGroup {
            initial_count: count,
            remaining: count,
            marks,
        }
    }

    /// Decodes the marks into a preference level for every candidate.
    ///
    /// The returned vector is indexed by candidate number (slot 0 unused).
    /// Level 1 is the most preferred. Candidates absent from the marks keep
    /// [`UNRANKED_LEVEL`].
    pub fn preference_levels(&self, candidate_count: u32) -> Vec<u32> {
        let mut levels = vec![UNRANKED_LEVEL; candidate_count as usize + 1];
        let mut current = 1u32;
        for mark in &self.marks {
            if mark.tied_with_previous {
                current -= 1;
            }
            levels[mark.candidate as usize] = current;
            current += 1;
        }
        levels
    }
}

/// Ranks every unmarked candidate below the marked ones, as one tied block.
///
/// Applied once when a ballot group is stored, so that later decoding never
/// has to special-case missing candidates.
pub fn append_unmarked(marks: &mut Vec<PrefMark>, candidate_count: u32) {
    let mut seen = vec![false; candidate_count as usize + 1];
    for mark in marks.iter() {
        seen[mark.candidate as usize] = true;
    }
    let mut first_unmarked = true;
    for candidate in 1..=candidate_count {
        if !seen[candidate as usize] {
            marks.push(PrefMark {
                candidate,
                tied_with_previous: !first_unmarked,
            });
            first_unmarked = false;
        }
    }
}

/// Ballot groups in arrival order.
///
/// Groups whose ballots decode to the same preference levels are merged, so
/// duplicating or reordering identical ballots cannot change a result. The
/// index of a group (its first appearance) is what makes surplus
/// redistribution deterministic, so distinct groups are never reordered.
#[derive(Debug, Default)]
pub struct BallotStore {
    groups: Vec<BallotGroup>,
    by_levels: HashMap<Vec<u32>, usize>,
    stored_values: usize,
}

impl BallotStore {
    pub fn new() -> BallotStore {
        BallotStore::default()
    }

    /// Stores one group of `count` identical ballots. Returns the group
    /// index the ballots were merged into.
    pub fn add_group(
        &mut self,
        candidate_count: u32,
        count: u64,
        mut marks: Vec<PrefMark>,
    ) -> TallyResult<usize> {
        append_unmarked(&mut marks, candidate_count);

        let levels = BallotGroup::new(0, marks.clone()).preference_levels(candidate_count);
        if let Some(&index) = self.by_levels.get(&levels) {
            self.groups[index].initial_count += count;
            self.groups[index].remaining += count;
            return Ok(index);
        }

        snafu::ensure!(
            self.groups.len() < MAX_BALLOT_GROUPS,
            CapacityExceededSnafu {
                what: "ballot group",
                count: self.groups.len() + 1,
                limit: MAX_BALLOT_GROUPS,
            }
        );
        // Two extra slots per group mirror the repeat-count prefix of the
        // wire encoding.
        self.stored_values += marks.len() + 2;
        snafu::ensure!(
            self.stored_values <= MAX_VOTE_INFO_LENGTH,
            CapacityExceededSnafu {
                what: "stored vote-info value",
                count: self.stored_values,
                limit: MAX_VOTE_INFO_LENGTH,
            }
        );

        let index = self.groups.len();
        self.groups.push(BallotGroup::new(count, marks));
        self.by_levels.insert(levels, index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<BallotGroup> {
        self.groups
    }
}
