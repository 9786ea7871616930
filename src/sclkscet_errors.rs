use camino::Utf8PathBuf;
use thiserror::Error;

/// Top-level error type for the `sclkscet` library.
///
/// Every fallible operation returns one of three failure classes, so a caller
/// can match on the class when deciding how to react:
///
/// * [`ConfigurationError`] is fatal to the operation that triggered it and is
///   never retried internally (bad or missing correlation file, degenerate
///   table data, unusable configuration constants).
/// * [`OutOfRangeError`] is recoverable by the caller (the input time precedes
///   the coverage of the correlation table, usually meaning "no data yet").
/// * [`FormatError`] is always caller-recoverable (an input string failed its
///   format-validation regex).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SclkScetError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Malformed or missing correlation file, degenerate table rows, or missing
/// required configuration constants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("sclkscet file {0} does not exist")]
    FileNotFound(Utf8PathBuf),

    #[error("unable to read sclkscet file {path}: {reason}")]
    UnreadableFile { path: Utf8PathBuf, reason: String },

    #[error("no correlation entries found in sclkscet file {0}")]
    EmptyTable(Utf8PathBuf),

    #[error("malformed value '{value}' in sclkscet file at line {line}")]
    MalformedRow { line: usize, value: String },

    #[error("correlation entries out of order at sclk {0}")]
    UnorderedTable(f64),

    #[error("zero-width correlation interval at sclk {0}")]
    DegenerateInterval(f64),

    #[error("correlation entry at sclk {0} has a zero clock rate")]
    ZeroClockRate(f64),

    #[error("missing or invalid configuration value: {0}")]
    InvalidConfiguration(String),
}

/// Input time or clock value precedes the epoch or table coverage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutOfRangeError {
    #[error("scet value {0} s precedes the sclk zero epoch")]
    ScetBeforeEpoch(f64),

    #[error("no correlation entry found for sclk {0}")]
    SclkNotCovered(f64),
}

/// Input string failed a format-validation regex.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("could not interpret the input time string '{0}' as a valid ISO or DOY time")]
    InvalidTimeString(String),

    #[error("could not interpret the input time string '{0}' as a valid coarse-fine time")]
    InvalidClockString(String),

    #[error("invalid lst format: {0}")]
    InvalidLstString(String),
}
