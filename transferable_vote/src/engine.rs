//! The per-case counting engine.
//!
//! One [`Engine`] value owns every piece of per-case state: the candidate
//! lifecycle flags, the ballot groups, the result buffer, and the per-cycle
//! statistics. A case runs on a fresh value, so cases are independent and
//! trivially testable. Every counting cycle ends with exactly one of: a
//! seat filled, one or more candidates eliminated, a reported tie, or
//! termination.

use log::{debug, info};

use crate::codes;
use crate::config::{
    CaseOutcome, CaseRequest, Candidate, CycleStats, OptionEcho, QuotaKind, MAX_CANDIDATES,
    MAX_RESULT_LENGTH,
};
use crate::errors::{CapacityExceededSnafu, InvariantViolationSnafu, TallyResult};
use crate::tally::{top_ranked_available, PairwiseTally, TopSet, TransferTally};

/// Candidate lifecycle. The states are mutually exclusive and the
/// transitions out of `Available` are permanent: a winner is never later
/// eliminated and an eliminated candidate never wins.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum CandidateStatus {
    Available,
    Winner,
    Eliminated,
}

/// Runs one validated case on a fresh engine value.
pub fn tabulate(request: CaseRequest) -> TallyResult<CaseOutcome> {
    Engine::new(request)?.run()
}

enum Flow {
    Continue,
    Halt,
}

struct Engine {
    case: CaseRequest,
    status: Vec<CandidateStatus>,
    result: Vec<i32>,
    winners: Vec<Candidate>,
    eliminated: Vec<Candidate>,
    tied_for_next_seat: Option<Vec<Candidate>>,
    cycles: Vec<CycleStats>,
    /// Top-ranked set per ballot group, rebuilt by each count phase and
    /// consumed by surplus redistribution in the same cycle.
    tops: Vec<Option<TopSet>>,
    /// Candidates removed by the most recent bottom-tie elimination. When
    /// an elimination empties the field with seats unfilled, these are the
    /// candidates reported as tied.
    last_bottom_tie: Vec<Candidate>,
}

impl Engine {
    fn new(case: CaseRequest) -> TallyResult<Engine> {
        validate_request(&case)?;
        let mut engine = Engine {
            status: vec![CandidateStatus::Available; case.candidate_count as usize + 1],
            result: Vec::new(),
            winners: Vec::new(),
            eliminated: Vec::new(),
            tied_for_next_seat: None,
            cycles: Vec::new(),
            tops: vec![None; case.groups.len()],
            last_bottom_tie: Vec::new(),
            case,
        };
        engine.replay_option_echoes()?;
        Ok(engine)
    }

    /// Replays the option requests into the result stream, in input order,
    /// and applies the pre-eliminations they carry.
    fn replay_option_echoes(&mut self) -> TallyResult<()> {
        for echo in self.case.echoes.clone() {
            match echo {
                OptionEcho::Seats(seats) => {
                    self.emit(codes::NUMBER_OF_EQUIVALENT_SEATS)?;
                    self.emit(seats as i32)?;
                }
                OptionEcho::IrvRequested => self.emit(codes::REQUEST_IRV_OR_STV)?,
                OptionEcho::DroopRequested => self.emit(codes::REQUEST_QUOTA_DROOP)?,
                OptionEcho::IgnoreSharedRequested => {
                    self.emit(codes::REQUEST_IGNORE_SHARED_RANKINGS)?
                }
                OptionEcho::PreEliminated(candidate) => {
                    self.status[candidate as usize] = CandidateStatus::Eliminated;
                    self.eliminated.push(candidate);
                    self.emit(codes::ELIMINATED_CANDIDATE)?;
                    self.emit(candidate as i32)?;
                    info!("candidate {} ignored by request", candidate);
                }
            }
        }
        Ok(())
    }

    fn run(mut self) -> TallyResult<CaseOutcome> {
        info!(
            "case {}: counting {} candidates for {} seats over {} ballot groups",
            self.case.case_number,
            self.case.candidate_count,
            self.case.seats_to_fill,
            self.case.groups.len()
        );
        // Each cycle fills a seat or eliminates at least one candidate, so
        // the cycle number can never exceed the candidate count plus a
        // final terminating cycle.
        let cycle_limit = self.case.candidate_count + 1;
        let mut reached_end = false;
        for cycle in 1..=cycle_limit {
            if matches!(self.run_cycle(cycle)?, Flow::Halt) {
                reached_end = true;
                break;
            }
        }
        snafu::ensure!(
            reached_end,
            InvariantViolationSnafu {
                message: "the counting cycles were exhausted without reaching a termination state"
            }
        );
        self.emit(codes::END_OF_ALL_CASES)?;
        Ok(CaseOutcome {
            case_number: self.case.case_number,
            seats_to_fill: self.case.seats_to_fill,
            winners: self.winners,
            eliminated: self.eliminated,
            tied_for_next_seat: self.tied_for_next_seat,
            cycles: self.cycles,
            result_codes: self.result,
        })
    }

    fn run_cycle(&mut self, cycle: u32) -> TallyResult<Flow> {
        let available = self.available_candidates();
        let seats_remaining = self.case.seats_to_fill - self.winners.len() as u32;

        if seats_remaining == 0 {
            info!(
                "cycle {}: all {} seats are filled",
                cycle, self.case.seats_to_fill
            );
            return Ok(Flow::Halt);
        }
        if available.is_empty() {
            // Every candidate was elected or eliminated with seats still
            // unfilled, so the last bottom-tie elimination was really an
            // unresolved tie for the next seat.
            let tied = std::mem::take(&mut self.last_bottom_tie);
            info!(
                "cycle {}: no candidates remain for {} unfilled seats, tie among {:?}",
                cycle, seats_remaining, tied
            );
            self.emit_tie_block(&tied)?;
            self.tied_for_next_seat = Some(tied);
            return Ok(Flow::Halt);
        }
        if available.len() as u32 == seats_remaining {
            self.fill_remaining_seats(cycle, &available)?;
            return Ok(Flow::Halt);
        }

        let (transfer, total) = self.count_transfers();
        let quota = self.quota_for(total);
        if self.case.rules.log_detail {
            debug!(
                "cycle {}: total vote count {}, quota {:?} {}",
                cycle, total, self.case.rules.quota, quota
            );
            for &candidate in &available {
                debug!(
                    "cycle {}: candidate {} transfer count {}",
                    cycle, candidate, transfer[candidate as usize]
                );
            }
        }
        let mut stats = CycleStats {
            cycle,
            total_votes: total,
            quota,
            tally: available
                .iter()
                .map(|&c| (c, transfer[c as usize]))
                .collect(),
            elected: Vec::new(),
            eliminated: Vec::new(),
        };

        let highest = available
            .iter()
            .map(|&c| transfer[c as usize])
            .max()
            .unwrap_or(0);
        let leaders: Vec<Candidate> = available
            .iter()
            .copied()
            .filter(|&c| transfer[c as usize] == highest)
            .collect();

        if highest >= quota {
            let winner = if leaders.len() == 1 {
                Some(leaders[0])
            } else {
                self.reduce_tie_pairwise(&leaders)
            };
            return match winner {
                Some(winner) => {
                    self.elect(winner, &mut stats)?;
                    info!(
                        "cycle {}: candidate {} wins the next seat with {} votes against a quota of {}",
                        cycle, winner, highest, quota
                    );
                    if seats_remaining > 1 {
                        self.redistribute_surplus(winner, highest, quota)?;
                    }
                    self.cycles.push(stats);
                    Ok(Flow::Continue)
                }
                None => {
                    info!(
                        "cycle {}: {} candidates tied at {} votes, the tie cannot be reduced",
                        cycle,
                        leaders.len(),
                        highest
                    );
                    self.emit_tie_block(&leaders)?;
                    self.tied_for_next_seat = Some(leaders);
                    self.cycles.push(stats);
                    Ok(Flow::Halt)
                }
            };
        }

        if self.case.rules.log_detail {
            debug!("cycle {}: no candidate reached the quota", cycle);
        }

        if self.case.rules.pairwise_loser_elimination {
            if let Some(loser) = self.find_pairwise_loser(&available) {
                self.eliminate(loser, &mut stats);
                self.emit(codes::PAIRWISE_LOSING_CANDIDATE)?;
                self.emit(loser as i32)?;
                info!(
                    "cycle {}: candidate {} loses every pairwise contest and is eliminated",
                    cycle, loser
                );
                self.cycles.push(stats);
                return Ok(Flow::Continue);
            }
        }

        let lowest = available
            .iter()
            .map(|&c| transfer[c as usize])
            .min()
            .unwrap_or(0);
        let bottom: Vec<Candidate> = available
            .iter()
            .copied()
            .filter(|&c| transfer[c as usize] == lowest)
            .collect();
        for &candidate in &bottom {
            self.eliminate(candidate, &mut stats);
            self.emit(codes::ELIMINATED_CANDIDATE)?;
            self.emit(candidate as i32)?;
            info!(
                "cycle {}: candidate {} eliminated with the lowest transfer count {}",
                cycle, candidate, lowest
            );
        }
        self.last_bottom_tie = bottom;
        self.cycles.push(stats);
        Ok(Flow::Continue)
    }

    /// The shortcut for `available == remaining seats`: everyone left wins.
    fn fill_remaining_seats(&mut self, cycle: u32, available: &[Candidate]) -> TallyResult<()> {
        let mut stats = CycleStats {
            cycle,
            total_votes: 0,
            quota: 0,
            tally: Vec::new(),
            elected: Vec::new(),
            eliminated: Vec::new(),
        };
        if let [candidate] = available {
            info!(
                "cycle {}: one remaining candidate, so candidate {} wins the last seat",
                cycle, candidate
            );
            self.elect(*candidate, &mut stats)?;
        } else {
            info!(
                "cycle {}: the {} remaining candidates fill the {} remaining seats",
                cycle,
                available.len(),
                available.len()
            );
            self.emit(codes::BEGIN_TIED_FOR_NEXT_SEAT)?;
            for &candidate in available {
                self.status[candidate as usize] = CandidateStatus::Winner;
                self.winners.push(candidate);
                stats.elected.push(candidate);
                self.emit(candidate as i32)?;
            }
            self.emit(codes::END_TIED_FOR_NEXT_SEAT)?;
        }
        self.cycles.push(stats);
        Ok(())
    }

    /// Assigns every group's remaining influence among its top-ranked
    /// available candidates and returns the per-candidate transfer counts
    /// with the cycle's total vote count.
    fn count_transfers(&mut self) -> (Vec<u64>, u64) {
        let available = self.available_flags();
        let candidate_count = self.case.candidate_count;
        let rules = self.case.rules;
        let mut tally = TransferTally::new();
        let mut tops: Vec<Option<TopSet>> = vec![None; self.case.groups.len()];
        for (index, group) in self.case.groups.iter_mut().enumerate() {
            if group.remaining == 0 {
                continue;
            }
            let levels = group.preference_levels(candidate_count);
            let top = top_ranked_available(&levels, &available);
            if top.is_empty() {
                continue;
            }
            if rules.ignore_shared_rankings && top.len() > 1 {
                if rules.log_detail {
                    debug!(
                        "group {}: influence zeroed, shared ranking level under primitive STV",
                        index
                    );
                }
                group.remaining = 0;
                continue;
            }
            tally.add_group(&top, group.remaining);
            tops[index] = Some(top);
        }
        self.tops = tops;
        tally.distribute(candidate_count)
    }

    fn quota_for(&self, total: u64) -> u64 {
        let seats = self.case.seats_to_fill as u64;
        if seats == 1 {
            total / 2 + 1
        } else {
            match self.case.rules.quota {
                QuotaKind::Droop => total / (seats + 1) + 1,
                QuotaKind::Hare => total / seats + 1,
            }
        }
    }

    /// Repeatedly removes the pairwise loser among the tied candidates.
    /// Returns the single survivor, or `None` when the tie cannot be
    /// reduced any further.
    fn reduce_tie_pairwise(&self, leaders: &[Candidate]) -> Option<Candidate> {
        let mut tied = leaders.to_vec();
        while tied.len() > 1 {
            let mut table = PairwiseTally::new(&tied);
            self.fill_pairwise(&mut table);
            match table.pairwise_losing_candidate() {
                Some(loser) => {
                    debug!(
                        "candidate {} is the pairwise loser among the tied candidates",
                        loser
                    );
                    tied.retain(|&c| c != loser);
                }
                None => return None,
            }
        }
        tied.into_iter().next()
    }

    fn find_pairwise_loser(&self, available: &[Candidate]) -> Option<Candidate> {
        let mut table = PairwiseTally::new(available);
        self.fill_pairwise(&mut table);
        table.pairwise_losing_candidate()
    }

    fn fill_pairwise(&self, table: &mut PairwiseTally) {
        let candidate_count = self.case.candidate_count;
        for group in &self.case.groups {
            if group.remaining == 0 {
                continue;
            }
            table.add_group(&group.preference_levels(candidate_count), group.remaining);
        }
    }

    /// Zeroes the influence of roughly `quota` ballots that supported the
    /// just-elected candidate, so the surplus share stays in play for the
    /// later seats.
    ///
    /// The zeroed ballots are chosen equally spaced across the contributing
    /// groups in ascending group order. The outcome depends on the order of
    /// distinct ballot groups but never on the order of ballots within a
    /// group, which is the engine's determinism contract. The residual
    /// accumulator is a floating-point fairness oracle only; no ballot ever
    /// keeps a fractional amount of influence.
    fn redistribute_surplus(
        &mut self,
        winner: Candidate,
        highest: u64,
        quota: u64,
    ) -> TallyResult<()> {
        let surplus = highest - quota;
        let skip_interval = ((quota + surplus - 1) as f64) / (quota as f64);
        if self.case.rules.log_detail {
            debug!(
                "adjusting vote counts: winner {}, quota {}, surplus {}, skip interval {:.4}",
                winner, quota, surplus, skip_interval
            );
        }
        let mut residual = 0.0f64;
        let mut total_zeroed: u64 = 0;
        for (index, group) in self.case.groups.iter_mut().enumerate() {
            if group.remaining == 0 {
                continue;
            }
            let top = match &self.tops[index] {
                Some(top) if top.contains(&winner) => top,
                _ => continue,
            };
            residual += group.remaining as f64 / top.len() as f64;
            let raw = if skip_interval > 0.0 {
                (residual / skip_interval).floor() + 1.0
            } else {
                group.remaining as f64
            };
            let zero_out = if raw <= 0.0 {
                0
            } else if raw >= group.remaining as f64 {
                group.remaining
            } else {
                raw as u64
            };
            group.remaining -= zero_out;
            residual -= zero_out as f64;
            total_zeroed += zero_out;
            if self.case.rules.log_detail {
                debug!(
                    "group {}: reduced by {}, {} ballots keep influence, residual {:.4}",
                    index, zero_out, group.remaining, residual
                );
            }
        }
        snafu::ensure!(
            total_zeroed + 1 >= quota,
            InvariantViolationSnafu {
                message: format!(
                    "only {} ballots lost influence after electing candidate {}, below the quota of {}",
                    total_zeroed, winner, quota
                )
            }
        );
        Ok(())
    }

    fn elect(&mut self, candidate: Candidate, stats: &mut CycleStats) -> TallyResult<()> {
        self.status[candidate as usize] = CandidateStatus::Winner;
        self.winners.push(candidate);
        stats.elected.push(candidate);
        self.emit(codes::WINNER_NEXT_SEAT)?;
        self.emit(candidate as i32)
    }

    fn eliminate(&mut self, candidate: Candidate, stats: &mut CycleStats) {
        self.status[candidate as usize] = CandidateStatus::Eliminated;
        self.eliminated.push(candidate);
        stats.eliminated.push(candidate);
    }

    fn available_candidates(&self) -> Vec<Candidate> {
        (1..=self.case.candidate_count)
            .filter(|&c| self.status[c as usize] == CandidateStatus::Available)
            .collect()
    }

    fn available_flags(&self) -> Vec<bool> {
        self.status
            .iter()
            .map(|&s| s == CandidateStatus::Available)
            .collect()
    }

    fn emit(&mut self, value: i32) -> TallyResult<()> {
        snafu::ensure!(
            self.result.len() < MAX_RESULT_LENGTH,
            CapacityExceededSnafu {
                what: "result value",
                count: self.result.len() + 1,
                limit: MAX_RESULT_LENGTH,
            }
        );
        self.result.push(value);
        Ok(())
    }

    fn emit_tie_block(&mut self, candidates: &[Candidate]) -> TallyResult<()> {
        self.emit(codes::BEGIN_TIED_FOR_NEXT_SEAT)?;
        for &candidate in candidates {
            self.emit(candidate as i32)?;
        }
        self.emit(codes::END_TIED_FOR_NEXT_SEAT)
    }
}

/// Guards against requests assembled by hand rather than through the stream
/// reader or the builder.
fn validate_request(case: &CaseRequest) -> TallyResult<()> {
    snafu::ensure!(
        case.candidate_count >= 2 && case.candidate_count <= MAX_CANDIDATES,
        InvariantViolationSnafu {
            message: format!("candidate count {} outside 2..=100", case.candidate_count)
        }
    );
    snafu::ensure!(
        case.seats_to_fill >= 1 && case.seats_to_fill <= case.candidate_count,
        InvariantViolationSnafu {
            message: format!(
                "seat count {} outside 1..={}",
                case.seats_to_fill, case.candidate_count
            )
        }
    );
    for group in &case.groups {
        for mark in &group.marks {
            snafu::ensure!(
                mark.candidate >= 1 && mark.candidate <= case.candidate_count,
                InvariantViolationSnafu {
                    message: format!("ballot marks unknown candidate {}", mark.candidate)
                }
            );
        }
    }
    for echo in &case.echoes {
        if let OptionEcho::PreEliminated(candidate) = echo {
            snafu::ensure!(
                *candidate >= 1 && *candidate <= case.candidate_count,
                InvariantViolationSnafu {
                    message: format!("pre-elimination of unknown candidate {}", candidate)
                }
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CaseBuilder;
    use crate::codes;
    use crate::config::CountingRules;

    fn rules(pairwise: bool, droop: bool, ignore_shared: bool) -> CountingRules {
        CountingRules {
            quota: if droop { QuotaKind::Droop } else { QuotaKind::Hare },
            pairwise_loser_elimination: pairwise,
            ignore_shared_rankings: ignore_shared,
            log_detail: true,
        }
    }

    /// The ballot profile from the Wikipedia comparison of the Hare and
    /// Droop quotas: 120 ballots, six candidates, five seats.
    fn hare_droop_profile(droop: bool) -> CaseBuilder {
        let mut builder = CaseBuilder::new(6, 5).unwrap().rules(&rules(false, droop, false));
        builder.add_ballots(31, &[&[1], &[2], &[3]]).unwrap();
        builder.add_ballots(30, &[&[3], &[1], &[2]]).unwrap();
        builder.add_ballots(2, &[&[2], &[1], &[3]]).unwrap();
        builder.add_ballots(20, &[&[4], &[5], &[6]]).unwrap();
        builder.add_ballots(20, &[&[5], &[4], &[6]]).unwrap();
        builder.add_ballots(17, &[&[6], &[4], &[5]]).unwrap();
        builder
    }

    #[test]
    fn five_seats_with_the_hare_quota() {
        let outcome = tabulate(hare_droop_profile(false).build().unwrap()).unwrap();
        assert_eq!(outcome.winners, vec![1, 3, 4, 5, 6]);
        assert!(outcome.tied_for_next_seat.is_none());
        let totals: Vec<u64> = outcome.cycles.iter().map(|c| c.total_votes).collect();
        assert_eq!(totals, vec![120, 94, 74, 58, 44]);
        let quotas: Vec<u64> = outcome.cycles.iter().map(|c| c.quota).collect();
        assert_eq!(quotas, vec![25, 19, 15, 12, 9]);
    }

    #[test]
    fn five_seats_with_the_droop_quota() {
        let outcome = tabulate(hare_droop_profile(true).build().unwrap()).unwrap();
        // The Droop quota lets candidate 2 collect both surpluses and win
        // the third seat, which the Hare quota never allows.
        assert_eq!(outcome.winners, vec![1, 3, 2, 4, 5]);
        assert_eq!(outcome.cycles[0].quota, 21);
        assert_eq!(outcome.cycles[1].total_votes, 98);
    }

    #[test]
    fn single_winner_majority() {
        let mut builder = CaseBuilder::new(3, 1).unwrap();
        builder.add_ballots(5, &[&[1], &[2], &[3]]).unwrap();
        builder.add_ballots(4, &[&[1], &[3], &[2]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.winners, vec![1]);
        assert_eq!(outcome.cycles[0].quota, 5);
        assert_eq!(outcome.cycles[0].total_votes, 9);
        assert_eq!(
            outcome.result_codes,
            vec![
                codes::NUMBER_OF_EQUIVALENT_SEATS,
                1,
                codes::WINNER_NEXT_SEAT,
                1,
                codes::END_OF_ALL_CASES
            ]
        );
    }

    /// Candidate 3 leads the first-preference count but loses every
    /// pairwise contest.
    fn center_squeeze(pairwise: bool) -> CaseBuilder {
        let mut builder = CaseBuilder::new(3, 1)
            .unwrap()
            .rules(&rules(pairwise, false, false));
        builder.add_ballots(4, &[&[3], &[1], &[2]]).unwrap();
        builder.add_ballots(3, &[&[1], &[2], &[3]]).unwrap();
        builder.add_ballots(3, &[&[2], &[1], &[3]]).unwrap();
        builder
    }

    #[test]
    fn pairwise_loser_elimination_overrides_plurality_lead() {
        let outcome = tabulate(center_squeeze(true).build().unwrap()).unwrap();
        assert_eq!(outcome.eliminated, vec![3]);
        assert_eq!(outcome.winners, vec![1]);
        assert_eq!(
            outcome.result_codes,
            vec![
                codes::NUMBER_OF_EQUIVALENT_SEATS,
                1,
                codes::PAIRWISE_LOSING_CANDIDATE,
                3,
                codes::WINNER_NEXT_SEAT,
                1,
                codes::END_OF_ALL_CASES
            ]
        );
    }

    #[test]
    fn plain_irv_elects_a_different_winner() {
        let outcome = tabulate(center_squeeze(false).build().unwrap()).unwrap();
        // 1 and 2 are tied at the bottom and go out together, which hands
        // the seat to the candidate RCIPE would have eliminated.
        assert_eq!(outcome.eliminated, vec![1, 2]);
        assert_eq!(outcome.winners, vec![3]);
    }

    #[test]
    fn shared_top_ranking_splits_influence_evenly() {
        let mut builder = CaseBuilder::new(3, 1).unwrap();
        builder.add_ballots(6, &[&[1, 2], &[3]]).unwrap();
        builder.add_ballots(1, &[&[3], &[1], &[2]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.cycles[0].tally, vec![(1, 3), (2, 3), (3, 1)]);
        assert_eq!(outcome.eliminated, vec![3]);
        assert_eq!(outcome.winners, vec![1]);
    }

    #[test]
    fn odd_shared_influence_drops_the_remainder() {
        let mut builder = CaseBuilder::new(3, 1).unwrap();
        builder.add_ballots(7, &[&[1, 2], &[3]]).unwrap();
        builder.add_ballots(2, &[&[3], &[1], &[2]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        // 7 shared ballots split two ways: one vote is dropped this cycle.
        assert_eq!(outcome.cycles[0].tally, vec![(1, 3), (2, 3), (3, 2)]);
        assert_eq!(outcome.cycles[0].total_votes, 8);
    }

    #[test]
    fn ignore_shared_rankings_zeroes_the_group() {
        let mut builder = CaseBuilder::new(3, 1)
            .unwrap()
            .rules(&rules(true, false, true));
        builder.add_ballots(6, &[&[1, 2], &[3]]).unwrap();
        builder.add_ballots(1, &[&[3], &[1], &[2]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.cycles[0].total_votes, 1);
        assert_eq!(outcome.winners, vec![3]);
        assert_eq!(
            outcome.result_codes,
            vec![
                codes::NUMBER_OF_EQUIVALENT_SEATS,
                1,
                codes::REQUEST_IGNORE_SHARED_RANKINGS,
                codes::WINNER_NEXT_SEAT,
                3,
                codes::END_OF_ALL_CASES
            ]
        );
    }

    #[test]
    fn even_split_reports_an_unresolved_tie() {
        let mut builder = CaseBuilder::new(2, 1).unwrap();
        builder.add_ballots(4, &[&[1], &[2]]).unwrap();
        builder.add_ballots(4, &[&[2], &[1]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert!(outcome.winners.is_empty());
        assert_eq!(outcome.tied_for_next_seat, Some(vec![1, 2]));
        assert_eq!(
            outcome.result_codes,
            vec![
                codes::NUMBER_OF_EQUIVALENT_SEATS,
                1,
                codes::ELIMINATED_CANDIDATE,
                1,
                codes::ELIMINATED_CANDIDATE,
                2,
                codes::BEGIN_TIED_FOR_NEXT_SEAT,
                1,
                2,
                codes::END_TIED_FOR_NEXT_SEAT,
                codes::END_OF_ALL_CASES
            ]
        );
    }

    #[test]
    fn pre_elimination_matches_unranked_candidate() {
        let mut ignored = CaseBuilder::new(3, 1).unwrap();
        ignored.add_ballots(4, &[&[1], &[2]]).unwrap();
        ignored.add_ballots(3, &[&[2], &[1]]).unwrap();
        let ignored = ignored.ignore_candidate(3).unwrap();
        let with_ignore = tabulate(ignored.build().unwrap()).unwrap();

        let mut plain = CaseBuilder::new(3, 1).unwrap();
        plain.add_ballots(4, &[&[1], &[2]]).unwrap();
        plain.add_ballots(3, &[&[2], &[1]]).unwrap();
        let without_ignore = tabulate(plain.build().unwrap()).unwrap();

        assert_eq!(with_ignore.winners, without_ignore.winners);
    }

    #[test]
    fn surplus_redistribution_keeps_the_surplus_share() {
        let mut builder = CaseBuilder::new(4, 2)
            .unwrap()
            .rules(&rules(true, true, false));
        builder.add_ballots(10, &[&[1], &[2], &[3], &[4]]).unwrap();
        builder.add_ballots(6, &[&[2], &[3], &[1], &[4]]).unwrap();
        builder.add_ballots(5, &[&[3], &[2], &[1], &[4]]).unwrap();
        builder.add_ballots(2, &[&[4], &[3], &[2], &[1]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.winners, vec![1, 2]);
        assert_eq!(outcome.cycles[0].quota, 8);
        // Electing 1 with 10 votes against a quota of 8 zeroes 9 ballots.
        assert_eq!(outcome.cycles[0].total_votes, 23);
        assert_eq!(outcome.cycles[1].total_votes, 14);
    }

    #[test]
    fn shared_top_groups_contribute_to_redistribution() {
        let mut builder = CaseBuilder::new(3, 2).unwrap();
        builder.add_ballots(6, &[&[1], &[2], &[3]]).unwrap();
        builder.add_ballots(4, &[&[1, 2], &[3]]).unwrap();
        builder.add_ballots(2, &[&[2], &[1], &[3]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.winners, vec![1, 2]);
        // Cycle 1: candidate 1 holds 6 + 2 = 8 votes against a quota of 7.
        assert_eq!(outcome.cycles[0].quota, 7);
        // Both the sole-support group and the shared group lose influence,
        // leaving 3 votes in play for the second seat.
        assert_eq!(outcome.cycles[1].total_votes, 3);
    }

    #[test]
    fn remaining_candidates_fill_remaining_seats() {
        let mut builder = CaseBuilder::new(3, 3).unwrap();
        builder.add_ballots(2, &[&[1], &[2], &[3]]).unwrap();
        builder.add_ballots(1, &[&[2], &[3], &[1]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        assert_eq!(outcome.winners, vec![1, 2, 3]);
        assert_eq!(
            outcome.result_codes,
            vec![
                codes::NUMBER_OF_EQUIVALENT_SEATS,
                3,
                codes::BEGIN_TIED_FOR_NEXT_SEAT,
                1,
                2,
                3,
                codes::END_TIED_FOR_NEXT_SEAT,
                codes::END_OF_ALL_CASES
            ]
        );
    }

    #[test]
    fn total_votes_never_increase_between_cycles() {
        let outcome = tabulate(hare_droop_profile(false).build().unwrap()).unwrap();
        for pair in outcome.cycles.windows(2) {
            assert!(pair[1].total_votes <= pair[0].total_votes);
        }
    }

    #[test]
    fn winner_codes_match_seats_unless_a_tie_is_reported() {
        let outcome = tabulate(hare_droop_profile(false).build().unwrap()).unwrap();
        let winner_codes = outcome
            .result_codes
            .iter()
            .filter(|&&v| v == codes::WINNER_NEXT_SEAT)
            .count();
        assert_eq!(winner_codes as u32, outcome.seats_to_fill);
    }

    #[test]
    fn hand_built_requests_are_checked() {
        let request = CaseRequest {
            case_number: 1,
            candidate_count: 1,
            seats_to_fill: 1,
            rules: CountingRules::DEFAULT_RULES,
            groups: Vec::new(),
            echoes: Vec::new(),
        };
        assert!(matches!(
            tabulate(request),
            Err(crate::errors::TallyError::InvariantViolation { .. })
        ));
    }
}
