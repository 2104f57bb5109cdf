//! The voteinfo code registry.
//!
//! A voteinfo stream is a sequence of integers. Negative values are codes
//! with the meanings below; positive values are candidate numbers or other
//! payloads whose meaning depends on the most recent code. The numbering is
//! shared with the wider VoteFair tool family so streams can be passed
//! between programs unchanged. Codes that appear in that registry but carry
//! no meaning here are accepted and ignored.

pub const START_OF_ALL_CASES: i32 = -1;
pub const END_OF_ALL_CASES: i32 = -2;
pub const CASE_NUMBER: i32 = -3;
pub const QUESTION_NUMBER: i32 = -4;
pub const TOTAL_BALLOT_COUNT: i32 = -5;
pub const NUMBER_OF_CANDIDATES: i32 = -6;
pub const START_OF_VOTE_INFO: i32 = -7;
pub const END_OF_VOTE_INFO: i32 = -8;
pub const START_OF_BALLOT: i32 = -9;
pub const END_OF_BALLOT: i32 = -10;

/// The payload is the number of identical ballots in the group that follows.
pub const BALLOT_COUNT: i32 = -11;

/// The next candidate shares the preference level of the previous candidate.
pub const TIE: i32 = -14;

/// Number of representation levels; payload is accepted and ignored.
pub const REPRESENTATION_LEVELS: i32 = -48;

/// Request plain IRV or STV: pairwise losing candidates are not eliminated.
pub const REQUEST_IRV_OR_STV: i32 = -50;

/// Turn off the detailed counting diagnostics.
pub const REQUEST_LOGGING_OFF: i32 = -65;

pub const WINNER_PAIRWISE_SUPPORT_COUNT: i32 = -66;

/// The payload is the number of equivalent seats to fill. No default.
pub const NUMBER_OF_EQUIVALENT_SEATS: i32 = -67;

/// Request the Droop quota instead of the default Hare quota.
pub const REQUEST_QUOTA_DROOP: i32 = -68;

/// Result: the payload is the candidate who wins the next seat.
pub const WINNER_NEXT_SEAT: i32 = -69;

/// Result: the candidates between this code and [`END_TIED_FOR_NEXT_SEAT`]
/// are tied for the next seat.
pub const BEGIN_TIED_FOR_NEXT_SEAT: i32 = -70;
pub const END_TIED_FOR_NEXT_SEAT: i32 = -71;

pub const COUNTING_CYCLE_NUMBER: i32 = -72;

/// Result: the payload is a candidate eliminated for losing every pairwise
/// contest against the other remaining candidates.
pub const PAIRWISE_LOSING_CANDIDATE: i32 = -73;

/// Result: the payload is a candidate eliminated for the lowest transfer
/// count, or pre-eliminated by request.
pub const ELIMINATED_CANDIDATE: i32 = -74;

pub const QUOTA_COUNT_THIS_CYCLE: i32 = -75;
pub const CANDIDATE_AND_TRANSFER_COUNT: i32 = -76;

/// The payload is a candidate to treat as already eliminated.
pub const CANDIDATE_TO_IGNORE: i32 = -77;

/// Request the primitive version of STV that rejects a ballot as soon as
/// counting reaches a shared ranking level.
pub const REQUEST_IGNORE_SHARED_RANKINGS: i32 = -78;
