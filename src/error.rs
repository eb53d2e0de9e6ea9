/// Custom Result type for shardseq operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the shardseq library, encompassing all error cases
/// that can occur while processing a partitioned sequence collection.
///
/// Every fatal error aborts the whole job: there is no partial-success mode
/// and no retry at this layer.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while reconstructing records from raw partition blocks
    Parse(#[from] ParseError),
    /// Errors raised while building or applying the global byte-offset index
    Index(#[from] IndexError),
    /// Errors in job configuration, detected before partition work starts
    Config(#[from] ConfigError),
    /// Standard I/O errors from the Rust standard library
    Io(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8(#[from] std::str::Utf8Error),
}

/// Errors raised by the partition-local record parser.
///
/// Query misses (a region or ID that matches nothing) are deliberately NOT
/// part of this taxonomy: they are skipped silently, one query at a time.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// A non-empty block carried no header line after delimiter recovery
    #[error("missing header line in non-empty record block starting with {0:?}")]
    MissingHeader(String),

    /// FASTQ sequence and quality strings differ in length
    #[error("record '{name}': unmatched length of sequence ({seq_len}) and quality ({qual_len})")]
    LengthMismatch {
        name: String,
        seq_len: usize,
        qual_len: usize,
    },
}

/// Errors raised by the two-phase offset indexer
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// A record's wrapped sequence lines differ in width beyond a shorter
    /// final line
    #[error("different line length in sequence: {0}")]
    InconsistentLineWidth(String),

    /// The collected partition summaries do not form a contiguous run of
    /// partition indices starting at zero
    #[error("partition summaries are not contiguous: expected partition {expected}, found {found}")]
    NonContiguousSummaries { expected: usize, found: usize },

    /// A partition index outside of the offset table was requested
    #[error("requested partition ({0}) is out of partition range ({1})")]
    UnknownPartition(usize, usize),

    /// The ordered writer was aborted by a failure in another partition
    #[error("ordered write aborted by an earlier partition failure")]
    WriteAborted,
}

/// Errors in job configuration.
///
/// Where possible these are detected by `validate()` before any partition
/// work starts.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Unknown sequence type name
    #[error("invalid sequence type: {0}, available values: dna|rna|protein|unlimit|auto")]
    InvalidSeqType(String),

    /// The record-ID regular expression has no capture group to extract the ID
    #[error("regular expression must contain \"(\" and \")\" to capture the matched ID: {0}")]
    IdRegexpMissingCapture(String),

    /// A user-supplied pattern failed to compile
    #[error("invalid regular expression: {0}")]
    InvalidRegexp(#[from] regex::Error),

    /// Both by-seq and by-name comparison requested at once
    #[error("only one/none of by-seq and by-name comparison is allowed")]
    ConflictingCompareModes,

    /// Positive-strand restriction is only meaningful for by-seq comparison
    #[error("restricting to the positive strand requires by-seq comparison")]
    StrandRequiresBySeq,

    /// Set-algebra operations need a fixed number of input collections
    #[error("operation '{op}' requires {expected} input collections, got {got}")]
    WrongInputCount {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },
}
