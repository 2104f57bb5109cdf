use clap::Parser;

/// This is a ranked-ballot tabulation program for elections that fill one
/// or more equivalent seats.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path or empty) The ballot input. Standard input is read when no
    /// path is given.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default voteinfo) The type of the input: voteinfo or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) Where the result codes are written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference result stream to compare against. The run
    /// fails when the tabulated results differ from the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or empty) If specified, a JSON summary of the counting
    /// cycles is written to the given location.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (file path or empty) Redirects the diagnostic log to the given file
    /// instead of the standard error stream.
    #[clap(long, value_parser)]
    pub log_file: Option<String>,

    // Options for inputs that carry no voteinfo codes of their own.
    /// (csv input) The number of candidates.
    #[clap(long, value_parser)]
    pub candidates: Option<u32>,

    /// (csv input) The number of equivalent seats to fill.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// (csv input) Use the Droop quota instead of the Hare quota.
    #[clap(long, takes_value = false)]
    pub droop: bool,

    /// (csv input) Plain IRV/STV: pairwise losing candidates are not
    /// eliminated.
    #[clap(long, takes_value = false)]
    pub irv: bool,

    /// (csv input) Reject a ballot as soon as counting reaches a shared
    /// ranking level, like primitive STV.
    #[clap(long, takes_value = false)]
    pub ignore_shared: bool,

    /// (csv input) Treat the first column of each row as the number of
    /// identical ballots.
    #[clap(long, takes_value = false)]
    pub count_column: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
