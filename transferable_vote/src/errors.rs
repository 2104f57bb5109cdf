use snafu::Snafu;

/// Errors that terminate a tabulation case.
///
/// An unresolved tie is not an error. It is reported inside the result
/// stream and the case still completes with fewer winners than seats.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    /// The input was not a readable stream of integers: a non-integer word,
    /// or a stream that ended in the middle of a code payload.
    #[snafu(display("malformed input at line {}: {}", line, what))]
    MalformedInput { line: u32, what: String },

    /// The input stream could not be read at all.
    #[snafu(display("failed to read input near line {}", line))]
    InputRead { line: u32, source: std::io::Error },

    /// The integers were readable but violate the voteinfo protocol.
    #[snafu(display("invalid vote info at input line {}: {}", line, message))]
    Protocol { line: u32, message: String },

    /// A fixed storage bound was exceeded. This is a configuration limit,
    /// not a problem with the ballot data itself.
    #[snafu(display("{} count {} exceeds the fixed capacity of {}", what, count, limit))]
    CapacityExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    /// An internal consistency check failed, or a request was assembled by
    /// hand with values the validated paths would have rejected.
    #[snafu(display("internal invariant violated: {}", message))]
    InvariantViolation { message: String },
}

pub type TallyResult<T> = Result<T, TallyError>;
