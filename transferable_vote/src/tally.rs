//! Per-cycle vote aggregation: top-rank buckets and the pairwise tally
//! table.

use std::collections::HashMap;

use crate::ballots::UNRANKED_LEVEL;
use crate::config::Candidate;

/// The available candidates tied at a ballot group's highest remaining
/// preference level, in ascending candidate order.
pub type TopSet = Vec<Candidate>;

/// Finds the top-ranked set for one decoded ballot. `available` is indexed
/// by candidate number; elected and eliminated candidates are invisible.
pub fn top_ranked_available(levels: &[u32], available: &[bool]) -> TopSet {
    let mut best = UNRANKED_LEVEL;
    let mut set: TopSet = Vec::new();
    for candidate in 1..levels.len() {
        if !available[candidate] {
            continue;
        }
        let level = levels[candidate];
        if level < best {
            best = level;
            set.clear();
            set.push(candidate as Candidate);
        } else if level == best && level < UNRANKED_LEVEL {
            set.push(candidate as Candidate);
        }
    }
    set
}

/// Accumulates ballot influence into buckets keyed by the shared top-ranked
/// set, so that ballots from different groups that currently prefer the
/// same candidates are split together.
#[derive(Debug, Default)]
pub struct TransferTally {
    buckets: HashMap<TopSet, u64>,
}

impl TransferTally {
    pub fn new() -> TransferTally {
        TransferTally::default()
    }

    pub fn add_group(&mut self, top: &TopSet, influence: u64) {
        *self.buckets.entry(top.clone()).or_insert(0) += influence;
    }

    /// Splits every bucket evenly among its tied candidates.
    ///
    /// Returns the per-candidate transfer counts (indexed by candidate
    /// number) and the cycle's total vote count. A bucket remainder that
    /// does not divide evenly is dropped for the cycle; ballots only ever
    /// transfer in whole numbers.
    pub fn distribute(&self, candidate_count: u32) -> (Vec<u64>, u64) {
        let mut transfer = vec![0u64; candidate_count as usize + 1];
        let mut total = 0u64;
        for (set, &count) in &self.buckets {
            let share = count / set.len() as u64;
            for &candidate in set {
                transfer[candidate as usize] += share;
                total += share;
            }
        }
        (transfer, total)
    }
}

/// One head-to-head counter pair, with `first < second` by candidate
/// number.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PairTally {
    pub first: Candidate,
    pub second: Candidate,
    pub first_over_second: u64,
    pub second_over_first: u64,
    pub first_equal_second: u64,
}

/// Pairwise tally table restricted to a considered candidate subset.
///
/// Used both to look for a pairwise losing candidate among all remaining
/// candidates and to break ties among a few candidates.
#[derive(Debug)]
pub struct PairwiseTally {
    considered: Vec<Candidate>,
    pairs: Vec<PairTally>,
}

impl PairwiseTally {
    pub fn new(considered: &[Candidate]) -> PairwiseTally {
        let mut pairs = Vec::with_capacity(considered.len() * (considered.len() - 1) / 2);
        for (i, &first) in considered.iter().enumerate() {
            for &second in &considered[i + 1..] {
                pairs.push(PairTally {
                    first,
                    second,
                    first_over_second: 0,
                    second_over_first: 0,
                    first_equal_second: 0,
                });
            }
        }
        PairwiseTally {
            considered: considered.to_vec(),
            pairs,
        }
    }

    /// Adds one ballot group's influence to every pair counter.
    pub fn add_group(&mut self, levels: &[u32], influence: u64) {
        for pair in &mut self.pairs {
            let first_level = levels[pair.first as usize];
            let second_level = levels[pair.second as usize];
            if first_level < second_level {
                pair.first_over_second += influence;
            } else if second_level < first_level {
                pair.second_over_first += influence;
            } else {
                pair.first_equal_second += influence;
            }
        }
    }

    /// The candidate who strictly loses every head-to-head contest against
    /// every other considered candidate, if one exists.
    ///
    /// An exact tie is not a loss, so sparse ballots often have no pairwise
    /// losing candidate. There can never be more than one.
    pub fn pairwise_losing_candidate(&self) -> Option<Candidate> {
        let contests = self.considered.len().saturating_sub(1);
        if contests == 0 {
            return None;
        }
        let highest = *self.considered.last()? as usize;
        let mut losses = vec![0usize; highest + 1];
        for pair in &self.pairs {
            if pair.first_over_second > pair.second_over_first {
                losses[pair.second as usize] += 1;
            } else if pair.second_over_first > pair.first_over_second {
                losses[pair.first as usize] += 1;
            }
        }
        self.considered
            .iter()
            .copied()
            .find(|&candidate| losses[candidate as usize] == contests)
    }

    pub fn pairs(&self) -> &[PairTally] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballots::{BallotGroup, PrefMark};

    fn levels(marks: &[PrefMark], n: u32) -> Vec<u32> {
        BallotGroup::new(1, marks.to_vec()).preference_levels(n)
    }

    #[test]
    fn top_set_skips_unavailable_candidates() {
        let levels = levels(
            &[
                PrefMark::ranked(2),
                PrefMark::ranked(1),
                PrefMark::ranked(3),
            ],
            3,
        );
        let available = vec![false, true, false, true];
        assert_eq!(top_ranked_available(&levels, &available), vec![1]);
    }

    #[test]
    fn top_set_collects_every_tied_candidate() {
        let levels = levels(
            &[
                PrefMark::ranked(3),
                PrefMark::tied(1),
                PrefMark::ranked(2),
            ],
            3,
        );
        let available = vec![false, true, true, true];
        assert_eq!(top_ranked_available(&levels, &available), vec![1, 3]);
    }

    #[test]
    fn shared_buckets_split_evenly_and_drop_remainders() {
        let mut tally = TransferTally::new();
        tally.add_group(&vec![1, 2], 4);
        tally.add_group(&vec![1, 2], 3);
        tally.add_group(&vec![3], 2);
        let (transfer, total) = tally.distribute(3);
        // 7 ballots shared between two candidates: one remainder dropped.
        assert_eq!(transfer[1..], [3, 3, 2]);
        assert_eq!(total, 8);
    }

    #[test]
    fn pairwise_loser_needs_strict_losses() {
        let mut table = PairwiseTally::new(&[1, 2, 3]);
        // 3 loses to 1 but exactly ties 2, so 3 is not a pairwise loser.
        table.add_group(&levels(&[PrefMark::ranked(1), PrefMark::ranked(3)], 3), 2);
        table.add_group(&levels(&[PrefMark::ranked(2)], 3), 2);
        assert_eq!(table.pairwise_losing_candidate(), None);
    }

    #[test]
    fn pairwise_loser_found() {
        let mut table = PairwiseTally::new(&[1, 2, 3]);
        table.add_group(
            &levels(
                &[
                    PrefMark::ranked(1),
                    PrefMark::ranked(2),
                    PrefMark::ranked(3),
                ],
                3,
            ),
            3,
        );
        table.add_group(
            &levels(
                &[
                    PrefMark::ranked(2),
                    PrefMark::ranked(1),
                    PrefMark::ranked(3),
                ],
                3,
            ),
            2,
        );
        table.add_group(
            &levels(
                &[
                    PrefMark::ranked(3),
                    PrefMark::ranked(1),
                    PrefMark::ranked(2),
                ],
                3,
            ),
            4,
        );
        assert_eq!(table.pairwise_losing_candidate(), Some(3));
    }

    #[test]
    fn lone_candidate_is_not_a_loser() {
        let table = PairwiseTally::new(&[2]);
        assert_eq!(table.pairwise_losing_candidate(), None);
    }

    #[test]
    fn equal_preference_counts_as_neither_side() {
        let mut table = PairwiseTally::new(&[1, 2]);
        table.add_group(&levels(&[PrefMark::ranked(1), PrefMark::tied(2)], 2), 5);
        let pair = table.pairs()[0];
        assert_eq!(pair.first_over_second, 0);
        assert_eq!(pair.second_over_first, 0);
        assert_eq!(pair.first_equal_second, 5);
    }
}
