//! Flat configuration structs, one per operation.
//!
//! Every driver in [`crate::ops`] takes one of these by reference. All
//! validation that does not need record data happens in `validate()`, so
//! misconfigured jobs fail before any partition work starts.

use crate::alphabet::Alphabet;
use crate::error::{ConfigError, Result};

/// Sequence type selection; `Auto` defers to the per-partition guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqType {
    #[default]
    Auto,
    Dna,
    Rna,
    Protein,
    Unlimit,
}

impl SeqType {
    /// Parses the textual form used by flat job configurations
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "dna" => Ok(Self::Dna),
            "rna" => Ok(Self::Rna),
            "protein" => Ok(Self::Protein),
            "unlimit" => Ok(Self::Unlimit),
            other => Err(ConfigError::InvalidSeqType(other.to_string()).into()),
        }
    }

    /// The forced alphabet, or `None` for `Auto`
    #[must_use]
    pub fn alphabet(self) -> Option<Alphabet> {
        match self {
            Self::Auto => None,
            Self::Dna => Some(Alphabet::Dna),
            Self::Rna => Some(Alphabet::Rna),
            Self::Protein => Some(Alphabet::Protein),
            Self::Unlimit => Some(Alphabet::Unlimit),
        }
    }
}

/// Options shared by every operation
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// Forced sequence type; `Auto` guesses per partition from the first record
    pub seq_type: SeqType,
    /// Output line width for FASTA sequence wrapping; 0 disables wrapping
    pub line_width: usize,
    /// Optional regular expression with exactly one capture group that
    /// extracts the record ID from the header; the default rule splits at
    /// the first whitespace
    pub id_regexp: Option<String>,
    /// Number of leading sequence bytes probed by the alphabet guess
    pub alphabet_guess_len: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            seq_type: SeqType::Auto,
            line_width: 60,
            id_regexp: None,
            alphabet_guess_len: 10000,
        }
    }
}

/// Options for the two-phase offset indexer and region extraction
#[derive(Debug, Clone, Default)]
pub struct FaidxOptions {
    pub config: BaseConfig,
    /// Index and annotate by the full header line instead of the ID token
    pub full_head: bool,
    /// Interpret `regions` as regular expressions over record IDs
    pub use_regexp: bool,
    /// Case-insensitive ID matching for literal regions
    pub ignore_case: bool,
    /// Region queries (`id`, `id:a-b`, `id:a`, `id:a-`, `id:-b`); empty
    /// means index-only
    pub regions: Vec<String>,
}

/// Key-comparison options shared by the set-algebra operations
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Compare by full header line
    pub by_name: bool,
    /// Compare by sequence content
    pub by_seq: bool,
    /// Fold case before comparison
    pub ignore_case: bool,
    /// Do not fold a sequence with its reverse complement (by-seq only)
    pub only_positive_strand: bool,
}

impl CompareOptions {
    /// Rejects contradictory flag combinations
    pub fn validate(&self) -> Result<()> {
        if self.by_name && self.by_seq {
            return Err(ConfigError::ConflictingCompareModes.into());
        }
        if self.only_positive_strand && !self.by_seq {
            return Err(ConfigError::StrandRequiresBySeq.into());
        }
        Ok(())
    }
}

/// Options for the N-source intersection operation
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub config: BaseConfig,
    pub compare: CompareOptions,
}

/// Options for the two-source Cartesian concatenation operation
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    pub config: BaseConfig,
    /// Pass single-sided keys through unchanged instead of dropping them
    pub full: bool,
    /// Separator joining the two descriptions
    pub separator: String,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            config: BaseConfig::default(),
            full: false,
            separator: "|".to_string(),
        }
    }
}

/// Options for positional read pairing
#[derive(Debug, Clone, Default)]
pub struct PairOptions {
    pub config: BaseConfig,
    /// Also emit records whose mate is missing
    pub save_unpaired: bool,
}

/// Options for first-wins deduplication
#[derive(Debug, Clone, Default)]
pub struct RmdupOptions {
    pub config: BaseConfig,
    pub compare: CompareOptions,
    /// Collect removed records and a per-subject count report
    pub track_duplicates: bool,
}

/// Options for record replication
#[derive(Debug, Clone)]
pub struct DuplicateOptions {
    /// Number of copies of every record in the output
    pub times: u64,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self { times: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_type_parse() {
        assert_eq!(SeqType::parse("DNA").unwrap(), SeqType::Dna);
        assert_eq!(SeqType::parse("auto").unwrap(), SeqType::Auto);
        assert!(SeqType::parse("carbon").is_err());
    }

    #[test]
    fn conflicting_compare_modes() {
        let opts = CompareOptions {
            by_name: true,
            by_seq: true,
            ..CompareOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn strand_requires_by_seq() {
        let opts = CompareOptions {
            only_positive_strand: true,
            ..CompareOptions::default()
        };
        assert!(opts.validate().is_err());
        let opts = CompareOptions {
            by_seq: true,
            only_positive_strand: true,
            ..CompareOptions::default()
        };
        assert!(opts.validate().is_ok());
    }
}
