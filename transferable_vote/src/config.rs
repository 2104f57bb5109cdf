// ********* Input data structures ***********

use crate::ballots::BallotGroup;

/// Candidates are 1-based integers assigned by the caller. The engine never
/// sees names, party labels or any other ballot text.
pub type Candidate = u32;

/// Largest candidate number the engine accepts.
pub const MAX_CANDIDATES: u32 = 100;
/// Largest number of distinct ballot groups held for one case.
pub const MAX_BALLOT_GROUPS: usize = 20_000;
/// Largest number of stored vote-info values for one case.
pub const MAX_VOTE_INFO_LENGTH: usize = 200_000;
/// Largest number of result values emitted for one case.
pub const MAX_RESULT_LENGTH: usize = 2_000;

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum QuotaKind {
    /// One plus the total vote count divided by the seat count. The default,
    /// and the more proportional of the two.
    Hare,
    /// One plus the total vote count divided by one more than the seat
    /// count. Requested with voteinfo code -68.
    Droop,
}

/// How a case is counted. With one seat and `pairwise_loser_elimination`
/// off this is textbook IRV; with it on, RCIPE. Multiple seats give STV and
/// RCIPE STV respectively.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CountingRules {
    pub quota: QuotaKind,
    /// Eliminate a candidate who loses every one-on-one contest against the
    /// other remaining candidates. Turned off by voteinfo code -50.
    pub pairwise_loser_elimination: bool,
    /// Primitive STV simulation: permanently reject a ballot group as soon
    /// as counting reaches a shared ranking level. Voteinfo code -78.
    pub ignore_shared_rankings: bool,
    /// Detailed per-group counting diagnostics. Turned off by -65.
    pub log_detail: bool,
}

impl CountingRules {
    pub const DEFAULT_RULES: CountingRules = CountingRules {
        quota: QuotaKind::Hare,
        pairwise_loser_elimination: true,
        ignore_shared_rankings: false,
        log_detail: true,
    };
}

impl Default for CountingRules {
    fn default() -> CountingRules {
        CountingRules::DEFAULT_RULES
    }
}

/// An option request replayed into the result stream, kept in the order the
/// input supplied it.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OptionEcho {
    Seats(u32),
    IrvRequested,
    DroopRequested,
    IgnoreSharedRequested,
    /// A -77 request. The candidate starts the count already eliminated.
    PreEliminated(Candidate),
}

/// A fully validated request for one tabulation case.
#[derive(Debug, Clone)]
pub struct CaseRequest {
    pub case_number: u32,
    pub candidate_count: u32,
    pub seats_to_fill: u32,
    pub rules: CountingRules,
    pub groups: Vec<BallotGroup>,
    pub echoes: Vec<OptionEcho>,
}

// ******** Output data structures *********

/// Counts recorded for one counting cycle, for logging and reporting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CycleStats {
    pub cycle: u32,
    pub total_votes: u64,
    pub quota: u64,
    /// Transfer counts for the candidates who were available this cycle.
    pub tally: Vec<(Candidate, u64)>,
    pub elected: Vec<Candidate>,
    pub eliminated: Vec<Candidate>,
}

/// The outcome of one case.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CaseOutcome {
    pub case_number: u32,
    pub seats_to_fill: u32,
    /// Winners in the order their seats were filled.
    pub winners: Vec<Candidate>,
    /// Eliminated candidates in elimination order, pre-eliminations first.
    pub eliminated: Vec<Candidate>,
    /// Candidates reported tied when the count could not fill every seat.
    pub tied_for_next_seat: Option<Vec<Candidate>>,
    pub cycles: Vec<CycleStats>,
    /// The encoded result stream, terminated by the end-of-all-cases code.
    pub result_codes: Vec<i32>,
}
