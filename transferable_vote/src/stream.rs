//! Reading voteinfo streams and writing result streams.
//!
//! The wire format is a stream of integers separated by spaces, tabs,
//! commas, periods or line breaks. Negative integers are codes from
//! [`crate::codes`]; positive integers are candidate numbers or code
//! payloads. Neither the interleaving of separators nor the split of
//! values across lines affects tabulation; only the semantic content
//! matters.

use std::io::{BufRead, Write};

use log::{debug, info};
use snafu::{OptionExt, ResultExt};

use crate::ballots::{BallotStore, PrefMark};
use crate::codes;
use crate::config::{CaseRequest, CountingRules, OptionEcho, QuotaKind, MAX_CANDIDATES};
use crate::errors::{
    CapacityExceededSnafu, InputReadSnafu, MalformedInputSnafu, ProtocolSnafu, TallyResult,
};

/// Reads and validates one case from a voteinfo stream.
///
/// The reader is consumed up to the end-of-all-cases code, or to the end
/// of the stream when the terminator is omitted.
pub fn read_request<R: BufRead>(reader: R) -> TallyResult<CaseRequest> {
    let mut parser = Parser::new();
    for line in reader.lines() {
        parser.line += 1;
        let line = line.context(InputReadSnafu { line: parser.line })?;
        debug!("input line {}: {}", parser.line, line);
        for word in line.split(&[' ', '\t', ',', '.'][..]) {
            if word.is_empty() {
                continue;
            }
            let value: i32 = word.parse().ok().context(MalformedInputSnafu {
                line: parser.line,
                what: format!("word {:?} is not an integer", word),
            })?;
            parser.handle_value(value)?;
            if parser.finished {
                return parser.finish();
            }
        }
    }
    parser.finish()
}

/// What the next positive integer in the stream stands for.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Pending {
    None,
    CaseNumber,
    QuestionNumber,
    CandidateCount,
    SeatCount,
    IgnoreCandidate,
    BallotCount,
    /// A payload for a code this engine accepts but does not use.
    SkippedPayload,
}

impl Pending {
    fn describes(self) -> &'static str {
        match self {
            Pending::None | Pending::SkippedPayload => "nothing",
            Pending::CaseNumber => "the case number",
            Pending::QuestionNumber => "the question number",
            Pending::CandidateCount => "the number of candidates",
            Pending::SeatCount => "the number of seats",
            Pending::IgnoreCandidate => "the candidate to ignore",
            Pending::BallotCount => "the ballot repeat count",
        }
    }
}

struct GroupInProgress {
    count: u64,
    marks: Vec<PrefMark>,
    tie_pending: bool,
    used: Vec<bool>,
}

struct Parser {
    line: u32,
    pending: Pending,
    case_number: Option<u32>,
    candidate_count: Option<u32>,
    seats_to_fill: Option<u32>,
    rules: CountingRules,
    echoes: Vec<OptionEcho>,
    store: BallotStore,
    group: Option<GroupInProgress>,
    finished: bool,
}

impl Parser {
    fn new() -> Parser {
        Parser {
            line: 0,
            pending: Pending::None,
            case_number: None,
            candidate_count: None,
            seats_to_fill: None,
            rules: CountingRules::DEFAULT_RULES,
            echoes: Vec::new(),
            store: BallotStore::new(),
            group: None,
            finished: false,
        }
    }

    fn handle_value(&mut self, value: i32) -> TallyResult<()> {
        snafu::ensure!(
            value != 0,
            ProtocolSnafu {
                line: self.line,
                message: "a vote-info value of zero is not valid",
            }
        );
        if value > 0 {
            self.handle_payload(value as u32)
        } else {
            self.handle_code(value)
        }
    }

    fn handle_code(&mut self, code: i32) -> TallyResult<()> {
        if self.pending == Pending::SkippedPayload {
            self.pending = Pending::None;
        }
        snafu::ensure!(
            self.pending == Pending::None,
            ProtocolSnafu {
                line: self.line,
                message: format!(
                    "expected {} but found code {}",
                    self.pending.describes(),
                    code
                ),
            }
        );
        match code {
            codes::START_OF_ALL_CASES
            | codes::START_OF_VOTE_INFO
            | codes::START_OF_BALLOT
            | codes::END_OF_BALLOT => {}
            codes::END_OF_ALL_CASES => {
                self.close_group()?;
                self.finished = true;
            }
            codes::END_OF_VOTE_INFO => self.close_group()?,
            codes::CASE_NUMBER => self.pending = Pending::CaseNumber,
            codes::QUESTION_NUMBER => self.pending = Pending::QuestionNumber,
            codes::NUMBER_OF_CANDIDATES => self.pending = Pending::CandidateCount,
            codes::NUMBER_OF_EQUIVALENT_SEATS => self.pending = Pending::SeatCount,
            codes::CANDIDATE_TO_IGNORE => self.pending = Pending::IgnoreCandidate,
            codes::TOTAL_BALLOT_COUNT | codes::REPRESENTATION_LEVELS => {
                self.pending = Pending::SkippedPayload
            }
            codes::BALLOT_COUNT => {
                self.close_group()?;
                self.pending = Pending::BallotCount;
            }
            codes::TIE => {
                let line = self.line;
                let group = self.group.as_mut().context(ProtocolSnafu {
                    line,
                    message: "tie marker outside a ballot group",
                })?;
                snafu::ensure!(
                    !group.marks.is_empty() && !group.tie_pending,
                    ProtocolSnafu {
                        line,
                        message: "tie marker must directly follow a candidate number",
                    }
                );
                group.tie_pending = true;
            }
            codes::REQUEST_IRV_OR_STV => {
                self.rules.pairwise_loser_elimination = false;
                self.echoes.push(OptionEcho::IrvRequested);
                info!("request: plain IRV or STV, no pairwise loser elimination");
            }
            codes::REQUEST_QUOTA_DROOP => {
                self.rules.quota = QuotaKind::Droop;
                self.echoes.push(OptionEcho::DroopRequested);
                info!("request: Droop quota instead of Hare quota");
            }
            codes::REQUEST_IGNORE_SHARED_RANKINGS => {
                self.rules.ignore_shared_rankings = true;
                self.echoes.push(OptionEcho::IgnoreSharedRequested);
                info!("request: reject ballots that reach a shared ranking level");
            }
            codes::REQUEST_LOGGING_OFF => self.rules.log_detail = false,
            // Codes from the wider registry pass through without meaning
            // here.
            _ => {}
        }
        Ok(())
    }

    fn handle_payload(&mut self, value: u32) -> TallyResult<()> {
        let line = self.line;
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::CaseNumber => {
                snafu::ensure!(
                    self.case_number.is_none(),
                    ProtocolSnafu {
                        line,
                        message: "a second case number is not valid",
                    }
                );
                self.case_number = Some(value);
                info!("case number {}", value);
            }
            Pending::QuestionNumber => {
                snafu::ensure!(
                    value == 1,
                    ProtocolSnafu {
                        line,
                        message: format!("question number {} is not supported, must be 1", value),
                    }
                );
            }
            Pending::CandidateCount => {
                snafu::ensure!(
                    self.candidate_count.is_none(),
                    ProtocolSnafu {
                        line,
                        message: "the number of candidates was already declared",
                    }
                );
                snafu::ensure!(
                    value >= 2,
                    ProtocolSnafu {
                        line,
                        message: "at least two candidates are needed",
                    }
                );
                snafu::ensure!(
                    value <= MAX_CANDIDATES,
                    CapacityExceededSnafu {
                        what: "candidate",
                        count: value as usize,
                        limit: MAX_CANDIDATES as usize,
                    }
                );
                self.candidate_count = Some(value);
                info!("{} candidates", value);
            }
            Pending::SeatCount => {
                snafu::ensure!(
                    self.seats_to_fill.is_none(),
                    ProtocolSnafu {
                        line,
                        message: "a second seat count is not valid",
                    }
                );
                self.seats_to_fill = Some(value);
                self.echoes.push(OptionEcho::Seats(value));
                info!("{} equivalent seats to fill", value);
            }
            Pending::IgnoreCandidate => {
                let candidate_count = self.candidate_count.context(ProtocolSnafu {
                    line,
                    message: "candidate to ignore appears before the number of candidates",
                })?;
                snafu::ensure!(
                    value <= candidate_count,
                    ProtocolSnafu {
                        line,
                        message: format!(
                            "candidate to ignore {} exceeds the declared count of {}",
                            value, candidate_count
                        ),
                    }
                );
                if !self.echoes.contains(&OptionEcho::PreEliminated(value)) {
                    self.echoes.push(OptionEcho::PreEliminated(value));
                }
            }
            Pending::BallotCount => {
                self.group = Some(GroupInProgress {
                    count: value as u64,
                    marks: Vec::new(),
                    tie_pending: false,
                    used: vec![false; MAX_CANDIDATES as usize + 1],
                });
            }
            Pending::SkippedPayload => {}
            Pending::None => self.handle_candidate_mark(value)?,
        }
        Ok(())
    }

    fn handle_candidate_mark(&mut self, candidate: u32) -> TallyResult<()> {
        let line = self.line;
        snafu::ensure!(
            self.case_number.is_some(),
            ProtocolSnafu {
                line,
                message: format!(
                    "positive number {} encountered before the case number",
                    candidate
                ),
            }
        );
        let candidate_count = self.candidate_count.context(ProtocolSnafu {
            line,
            message: format!(
                "candidate number {} appears before the number of candidates",
                candidate
            ),
        })?;
        snafu::ensure!(
            candidate <= candidate_count,
            ProtocolSnafu {
                line,
                message: format!(
                    "candidate number {} exceeds the declared count of {}",
                    candidate, candidate_count
                ),
            }
        );
        let group = self.group.as_mut().context(ProtocolSnafu {
            line,
            message: format!("candidate number {} outside a ballot group", candidate),
        })?;
        snafu::ensure!(
            !group.used[candidate as usize],
            ProtocolSnafu {
                line,
                message: format!("candidate number {} marked twice in one ballot", candidate),
            }
        );
        group.used[candidate as usize] = true;
        group.marks.push(PrefMark {
            candidate,
            tied_with_previous: group.tie_pending,
        });
        group.tie_pending = false;
        Ok(())
    }

    fn close_group(&mut self) -> TallyResult<()> {
        let line = self.line;
        if let Some(group) = self.group.take() {
            snafu::ensure!(
                !group.tie_pending,
                ProtocolSnafu {
                    line,
                    message: "tie marker not followed by a candidate number",
                }
            );
            let candidate_count = self.candidate_count.context(ProtocolSnafu {
                line,
                message: "ballot group appears before the number of candidates",
            })?;
            self.store
                .add_group(candidate_count, group.count, group.marks)?;
        }
        Ok(())
    }

    fn finish(mut self) -> TallyResult<CaseRequest> {
        self.close_group()?;
        let line = self.line;
        snafu::ensure!(
            self.pending == Pending::None || self.pending == Pending::SkippedPayload,
            MalformedInputSnafu {
                line,
                what: format!("stream ended while expecting {}", self.pending.describes()),
            }
        );
        let case_number = self.case_number.context(ProtocolSnafu {
            line,
            message: "no case number was specified",
        })?;
        let candidate_count = self.candidate_count.context(ProtocolSnafu {
            line,
            message: "the number of candidates was never specified",
        })?;
        let seats_to_fill = self.seats_to_fill.context(ProtocolSnafu {
            line,
            message: "the number of equivalent seats was never specified",
        })?;
        snafu::ensure!(
            seats_to_fill <= candidate_count,
            ProtocolSnafu {
                line,
                message: format!(
                    "seat count {} exceeds the candidate count {}",
                    seats_to_fill, candidate_count
                ),
            }
        );
        snafu::ensure!(
            !self.store.is_empty(),
            ProtocolSnafu {
                line,
                message: "no ballots found",
            }
        );
        info!("{} ballot groups read", self.store.len());
        Ok(CaseRequest {
            case_number,
            candidate_count,
            seats_to_fill,
            rules: self.rules,
            groups: self.store.into_groups(),
            echoes: self.echoes,
        })
    }
}

/// Writes a result-code sequence in the wire format: each code starts a new
/// line with its payload values following on the same line.
pub fn write_result_codes<W: Write>(values: &[i32], out: &mut W) -> std::io::Result<()> {
    let mut first = true;
    for &value in values {
        if value < 0 {
            if !first {
                writeln!(out)?;
            }
            write!(out, "{}", value)?;
        } else {
            write!(out, " {}", value)?;
        }
        first = false;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tabulate;
    use crate::errors::TallyError;

    /// The sample case from the comparison of the Hare and Droop quotas.
    const HARE_SAMPLE: &str = "\
-7
-3 1000001
-4 1
-6 6
-67 5
-50
-9 -4 1 -11 31 1 2 3 -10
-9 -4 1 -11 30 3 1 2 -10
-9 -4 1 -11 2 2 1 3 -10
-9 -4 1 -11 20 4 5 6 -10
-9 -4 1 -11 20 5 4 6 -10
-9 -4 1 -11 17 6 4 5 -10
-8
";

    fn parse(text: &str) -> TallyResult<CaseRequest> {
        read_request(text.as_bytes())
    }

    #[test]
    fn reads_the_sample_case() {
        let request = parse(HARE_SAMPLE).unwrap();
        assert_eq!(request.case_number, 1000001);
        assert_eq!(request.candidate_count, 6);
        assert_eq!(request.seats_to_fill, 5);
        assert!(!request.rules.pairwise_loser_elimination);
        assert_eq!(request.groups.len(), 6);
        assert_eq!(request.groups[0].initial_count, 31);
        // Unmarked candidates 4, 5 and 6 were swept into one tied block.
        assert_eq!(request.groups[0].marks.len(), 6);
    }

    #[test]
    fn tabulates_the_sample_case_end_to_end() {
        let outcome = tabulate(parse(HARE_SAMPLE).unwrap()).unwrap();
        assert_eq!(
            outcome.result_codes,
            vec![-67, 5, -50, -69, 1, -69, 3, -69, 4, -69, 5, -69, 6, -2]
        );
    }

    #[test]
    fn tabulates_the_droop_variant_end_to_end() {
        let text = HARE_SAMPLE.replace("-50\n", "-50\n-68\n");
        let outcome = tabulate(parse(&text).unwrap()).unwrap();
        assert_eq!(
            outcome.result_codes,
            vec![-67, 5, -50, -68, -69, 1, -69, 3, -69, 2, -69, 4, -69, 5, -2]
        );
    }

    #[test]
    fn separators_and_line_breaks_are_interchangeable() {
        let compact = "-3 9,-4 1.-6 2,-67 1,-11 3 1 2,-11, 2 2.1 -2";
        let request = parse(compact).unwrap();
        assert_eq!(request.case_number, 9);
        assert_eq!(request.groups.len(), 2);
        assert_eq!(request.groups[1].initial_count, 2);
    }

    #[test]
    fn tie_markers_share_the_level() {
        let request = parse("-3 1 -4 1 -6 3 -67 1 -11 4 1 -14 2 -11 1 3 -2").unwrap();
        let levels = request.groups[0].preference_levels(3);
        assert_eq!(levels[1..], [1, 1, 2]);
    }

    #[test]
    fn non_integer_words_are_malformed_input() {
        let result = parse("-3 1 -4 one -6 3");
        assert!(matches!(
            result,
            Err(TallyError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn truncated_payload_is_malformed_input() {
        let result = parse("-3 5 -6 3 -67");
        assert!(matches!(result, Err(TallyError::MalformedInput { .. })));
    }

    #[test]
    fn zero_is_a_protocol_error() {
        assert!(matches!(
            parse("-3 5 -6 0"),
            Err(TallyError::Protocol { .. })
        ));
    }

    #[test]
    fn candidate_before_count_is_rejected() {
        let result = parse("-3 5 -67 1 -11 2 1 2 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn positive_number_before_case_number_is_rejected() {
        assert!(matches!(parse("7 -3 5"), Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn candidate_above_declared_count_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 1 -11 2 4 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn repeated_candidate_in_one_ballot_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 1 -11 2 1 2 1 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn duplicate_case_number_is_rejected() {
        let result = parse("-3 5 -3 6 -6 3");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn question_other_than_one_is_rejected() {
        let result = parse("-3 5 -4 2 -6 3");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn dangling_tie_marker_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 1 -11 2 1 -14 -11 1 2 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn tie_marker_before_any_candidate_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 1 -11 2 -14 1 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn missing_seats_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -11 2 1 2 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn more_seats_than_candidates_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 4 -11 2 1 2 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn missing_ballots_is_rejected() {
        let result = parse("-3 5 -4 1 -6 3 -67 1 -2");
        assert!(matches!(result, Err(TallyError::Protocol { .. })));
    }

    #[test]
    fn too_many_candidates_is_a_capacity_error() {
        let result = parse("-3 5 -4 1 -6 101");
        assert!(matches!(result, Err(TallyError::CapacityExceeded { .. })));
    }

    #[test]
    fn unused_registry_codes_pass_through() {
        // -5 and -48 carry payloads that are skipped; -46 is standalone.
        let text = "-3 5 -4 1 -5 120 -46 -48 4 -6 2 -67 1 -11 3 1 -11 2 2 -2";
        let request = parse(text).unwrap();
        assert_eq!(request.groups.len(), 2);
    }

    #[test]
    fn logging_off_request_clears_the_detail_flag() {
        let text = "-3 5 -4 1 -65 -6 2 -67 1 -11 3 1 -11 2 2 -2";
        let request = parse(text).unwrap();
        assert!(!request.rules.log_detail);
    }

    #[test]
    fn ignored_candidates_are_pre_eliminated() {
        let text = "-3 8 -4 1 -6 3 -67 1 -77 3 -11 4 3 1 2 -11 3 1 2 3 -11 3 2 1 3 -2";
        let outcome = tabulate(parse(text).unwrap()).unwrap();
        assert_eq!(outcome.eliminated, vec![3]);
        assert_eq!(outcome.winners, vec![1]);
        assert_eq!(outcome.result_codes, vec![-67, 1, -74, 3, -69, 1, -2]);
    }

    #[test]
    fn identical_groups_merge_so_duplicates_cannot_change_results() {
        let split = "-3 5 -4 1 -6 2 -67 1 -11 2 1 2 -11 3 2 1 -11 2 1 2 -2";
        let merged = "-3 5 -4 1 -6 2 -67 1 -11 4 1 2 -11 3 2 1 -2";
        let split_outcome = tabulate(parse(split).unwrap()).unwrap();
        let merged_outcome = tabulate(parse(merged).unwrap()).unwrap();
        assert_eq!(split_outcome.result_codes, merged_outcome.result_codes);
    }

    #[test]
    fn writes_codes_one_per_line_with_payloads() {
        let mut out = Vec::new();
        write_result_codes(&[-67, 5, -50, -69, 1, -2], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-67 5\n-50\n-69 1\n-2\n");
    }
}
