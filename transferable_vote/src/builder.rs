pub use crate::config::*;

use crate::ballots::{BallotStore, PrefMark};
use crate::errors::{InvariantViolationSnafu, TallyResult};

/// A builder for assembling one tabulation case in code.
///
/// ```
/// use transferable_vote::{tabulate, CaseBuilder};
///
/// let mut builder = CaseBuilder::new(3, 1)?;
/// builder.add_ballots(5, &[&[1], &[2], &[3]])?;
/// builder.add_ballots(3, &[&[2, 3], &[1]])?;
///
/// let outcome = tabulate(builder.build()?)?;
/// assert_eq!(outcome.winners, vec![1]);
/// # Ok::<(), transferable_vote::TallyError>(())
/// ```
pub struct CaseBuilder {
    case_number: u32,
    candidate_count: u32,
    seats_to_fill: u32,
    rules: CountingRules,
    store: BallotStore,
    pre_eliminated: Vec<Candidate>,
}

impl CaseBuilder {
    pub fn new(candidate_count: u32, seats_to_fill: u32) -> TallyResult<CaseBuilder> {
        snafu::ensure!(
            (2..=MAX_CANDIDATES).contains(&candidate_count),
            InvariantViolationSnafu {
                message: format!("candidate count {} outside 2..=100", candidate_count)
            }
        );
        snafu::ensure!(
            seats_to_fill >= 1 && seats_to_fill <= candidate_count,
            InvariantViolationSnafu {
                message: format!(
                    "seat count {} outside 1..={}",
                    seats_to_fill, candidate_count
                )
            }
        );
        Ok(CaseBuilder {
            case_number: 1,
            candidate_count,
            seats_to_fill,
            rules: CountingRules::DEFAULT_RULES,
            store: BallotStore::new(),
            pre_eliminated: Vec::new(),
        })
    }

    pub fn rules(mut self, rules: &CountingRules) -> CaseBuilder {
        self.rules = *rules;
        self
    }

    pub fn case_number(mut self, case_number: u32) -> CaseBuilder {
        self.case_number = case_number;
        self
    }

    /// Treats a candidate as already eliminated before counting starts.
    pub fn ignore_candidate(mut self, candidate: Candidate) -> TallyResult<CaseBuilder> {
        self.check_candidate(candidate)?;
        if !self.pre_eliminated.contains(&candidate) {
            self.pre_eliminated.push(candidate);
        }
        Ok(self)
    }

    /// Adds `count` identical ballots.
    ///
    /// `levels` lists the marked candidates from most to least preferred;
    /// every candidate inside one slice shares a preference level. Unmarked
    /// candidates are implicitly ranked below all marked ones.
    pub fn add_ballots(&mut self, count: u64, levels: &[&[Candidate]]) -> TallyResult<()> {
        snafu::ensure!(
            count >= 1,
            InvariantViolationSnafu {
                message: format!("ballot count {} is not positive", count)
            }
        );
        let mut marks: Vec<PrefMark> = Vec::new();
        let mut used = vec![false; self.candidate_count as usize + 1];
        for level in levels {
            for (position, &candidate) in level.iter().enumerate() {
                self.check_candidate(candidate)?;
                snafu::ensure!(
                    !used[candidate as usize],
                    InvariantViolationSnafu {
                        message: format!("candidate {} marked twice in one ballot", candidate)
                    }
                );
                used[candidate as usize] = true;
                marks.push(PrefMark {
                    candidate,
                    tied_with_previous: position > 0,
                });
            }
        }
        self.store.add_group(self.candidate_count, count, marks)?;
        Ok(())
    }

    pub fn build(self) -> TallyResult<CaseRequest> {
        snafu::ensure!(
            !self.store.is_empty(),
            InvariantViolationSnafu {
                message: "no ballots were added"
            }
        );
        let mut echoes = vec![OptionEcho::Seats(self.seats_to_fill)];
        if !self.rules.pairwise_loser_elimination {
            echoes.push(OptionEcho::IrvRequested);
        }
        if self.rules.quota == QuotaKind::Droop {
            echoes.push(OptionEcho::DroopRequested);
        }
        if self.rules.ignore_shared_rankings {
            echoes.push(OptionEcho::IgnoreSharedRequested);
        }
        for &candidate in &self.pre_eliminated {
            echoes.push(OptionEcho::PreEliminated(candidate));
        }
        Ok(CaseRequest {
            case_number: self.case_number,
            candidate_count: self.candidate_count,
            seats_to_fill: self.seats_to_fill,
            rules: self.rules,
            groups: self.store.into_groups(),
            echoes,
        })
    }

    fn check_candidate(&self, candidate: Candidate) -> TallyResult<()> {
        snafu::ensure!(
            candidate >= 1 && candidate <= self.candidate_count,
            InvariantViolationSnafu {
                message: format!(
                    "candidate {} outside 1..={}",
                    candidate, self.candidate_count
                )
            }
        );
        Ok(())
    }
}
