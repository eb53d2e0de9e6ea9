use memchr::memchr;
use regex::bytes::Regex;

use crate::alphabet::Alphabet;
use crate::config::BaseConfig;
use crate::error::{ConfigError, ParseError, Result};
use crate::record::{Format, SequenceRecord};

/// The default ID rule: the token up to the first whitespace
const DEFAULT_ID_REGEXP: &str = r"^(\S+)\s?";

/// How the record ID is extracted from the header line
#[derive(Debug, Clone)]
pub enum HeaderRule {
    /// Split at the first space or tab; the description is the remainder
    /// after the following whitespace run
    Whitespace,
    /// A compiled regular expression whose first capture group is the ID
    Regexp(Regex),
}

impl HeaderRule {
    /// Builds the rule from the configured pattern.
    ///
    /// Patterns equal to the default rule take the fast path; any other
    /// pattern must contain a capture group.
    pub fn from_config(id_regexp: Option<&str>) -> Result<Self> {
        match id_regexp {
            None => Ok(Self::Whitespace),
            Some(DEFAULT_ID_REGEXP) => Ok(Self::Whitespace),
            Some(pattern) => {
                if !pattern.contains('(') || !pattern.contains(')') {
                    return Err(ConfigError::IdRegexpMissingCapture(pattern.to_string()).into());
                }
                let re = Regex::new(pattern).map_err(ConfigError::from)?;
                Ok(Self::Regexp(re))
            }
        }
    }

    /// Splits a header line into `(id, description)`
    #[must_use]
    pub fn split<'h>(&self, head: &'h [u8]) -> (&'h [u8], &'h [u8]) {
        match self {
            Self::Whitespace => {
                let cut = head
                    .iter()
                    .position(|&b| b == b' ')
                    .or_else(|| head.iter().position(|&b| b == b'\t'));
                match cut {
                    Some(i) if i > 0 => {
                        let mut j = i + 1;
                        while j < head.len() && (head[j] == b' ' || head[j] == b'\t') {
                            j += 1;
                        }
                        (&head[..i], &head[j..])
                    }
                    _ => (head, &[]),
                }
            }
            Self::Regexp(re) => match re.captures(head).and_then(|c| c.get(1)) {
                Some(m) => (&head[m.range()], &[]),
                None => (head, &[]),
            },
        }
    }
}

/// Reconstructs structured records from fixed partition blocks.
///
/// One block maps to exactly one record. The format and the alphabet are
/// fixed for the whole partition by the first block: mixed-format
/// partitions are the caller's error and are not detected here. Internal
/// sequence and quality buffers are reused across calls for throughput;
/// no other state survives between records.
pub struct RecordParser {
    rule: HeaderRule,
    forced: Option<Alphabet>,
    guess_len: usize,
    format: Option<Format>,
    alphabet: Option<Alphabet>,
    seq_buf: Vec<u8>,
    qual_buf: Vec<u8>,
}

impl RecordParser {
    pub fn new(config: &BaseConfig) -> Result<Self> {
        Ok(Self {
            rule: HeaderRule::from_config(config.id_regexp.as_deref())?,
            forced: config.seq_type.alphabet(),
            guess_len: config.alphabet_guess_len,
            format: None,
            alphabet: None,
            seq_buf: Vec::with_capacity(1024),
            qual_buf: Vec::with_capacity(1024),
        })
    }

    /// The format fixed by the first parsed block, if any block was seen
    #[must_use]
    pub fn detected_format(&self) -> Option<Format> {
        self.format
    }

    /// The alphabet in effect, `Unlimit` before the first record
    #[must_use]
    pub fn alphabet(&self) -> Alphabet {
        self.forced.or(self.alphabet).unwrap_or_default()
    }

    /// Parses one fixed block into one record
    pub fn parse_block(&mut self, block: &str) -> Result<SequenceRecord> {
        let bytes = block.as_bytes();
        if bytes.is_empty() {
            return Err(ParseError::MissingHeader(String::new()).into());
        }
        let format = *self
            .format
            .get_or_insert_with(|| Format::from_delimiter(bytes[0]));

        let (head, body) = match memchr(b'\n', bytes) {
            Some(j) => (drop_cr(&bytes[1..j]), &bytes[j + 1..]),
            None => (drop_cr(&bytes[1..]), &[][..]),
        };
        if head.is_empty() {
            let prefix = block.chars().take(24).collect::<String>();
            return Err(ParseError::MissingHeader(prefix).into());
        }

        self.seq_buf.clear();
        self.qual_buf.clear();
        match format {
            Format::Fasta => {
                for line in split_lines(body) {
                    self.seq_buf.extend_from_slice(drop_cr(line));
                }
            }
            Format::Fastq => {
                let mut in_qual = false;
                for line in split_lines(body) {
                    if !in_qual && line.first() == Some(&b'+') {
                        in_qual = true;
                    } else if in_qual {
                        self.qual_buf.extend_from_slice(drop_cr(line));
                    } else {
                        self.seq_buf.extend_from_slice(drop_cr(line));
                    }
                }
            }
        }

        let alphabet = match self.forced {
            Some(forced) => forced,
            None => *self.alphabet.get_or_insert_with(|| {
                let probe = &self.seq_buf[..self.seq_buf.len().min(self.guess_len)];
                Alphabet::guess(probe)
            }),
        };

        let (id, desc) = self.rule.split(head);
        let qual = match format {
            Format::Fasta => None,
            Format::Fastq => Some(self.qual_buf.clone()),
        };
        SequenceRecord::new(
            head.to_vec(),
            id.to_vec(),
            desc.to_vec(),
            self.seq_buf.clone(),
            qual,
            alphabet,
        )
    }

    /// Adapts a fixed block stream into a record stream
    pub fn parse_blocks<'a, I>(
        &'a mut self,
        blocks: I,
    ) -> impl Iterator<Item = Result<SequenceRecord>> + 'a
    where
        I: Iterator<Item = String> + 'a,
    {
        blocks.map(move |block| self.parse_block(&block))
    }
}

fn drop_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits on `\n` without yielding a trailing empty line
fn split_lines(body: &[u8]) -> impl Iterator<Item = &[u8]> {
    body.split(|&b| b == b'\n')
        .enumerate()
        .filter(|(i, line)| *i == 0 || !line.is_empty())
        .map(|(_, line)| line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> RecordParser {
        RecordParser::new(&BaseConfig::default()).unwrap()
    }

    #[test]
    fn parses_multiline_fasta() {
        let mut p = parser();
        let record = p.parse_block(">r1 sample one\nACGT\nACG").unwrap();
        assert_eq!(record.id, b"r1");
        assert_eq!(record.desc, b"sample one");
        assert_eq!(record.name, b"r1 sample one");
        assert_eq!(record.seq, b"ACGTACG");
        assert!(record.qual.is_none());
    }

    #[test]
    fn parses_fastq_with_plus_line() {
        let mut p = parser();
        let record = p.parse_block("@q1\nACGT\n+q1\nIIII").unwrap();
        assert_eq!(record.id, b"q1");
        assert_eq!(record.seq, b"ACGT");
        assert_eq!(record.qual.as_deref(), Some(&b"IIII"[..]));
    }

    #[test]
    fn fastq_length_mismatch() {
        let mut p = parser();
        let err = p.parse_block("@q1\nACGT\n+\nII").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Parse(ParseError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn format_is_fixed_by_first_block() {
        let mut p = parser();
        p.parse_block(">r1\nACGT").unwrap();
        assert_eq!(p.detected_format(), Some(Format::Fasta));
        // later blocks parse under the partition format
        let record = p.parse_block(">r2\nTT").unwrap();
        assert!(record.qual.is_none());
    }

    #[test]
    fn alphabet_guessed_from_first_record() {
        let mut p = parser();
        p.parse_block(">r1\nACGU").unwrap();
        assert_eq!(p.alphabet(), Alphabet::Rna);
    }

    #[test]
    fn custom_id_regexp() {
        let config = BaseConfig {
            id_regexp: Some(r"\|([^\|]+)\| ".to_string()),
            ..BaseConfig::default()
        };
        let mut p = RecordParser::new(&config).unwrap();
        let record = p.parse_block(">gi|123| some protein\nMKV").unwrap();
        assert_eq!(record.id, b"123");
    }

    #[test]
    fn regexp_without_capture_is_rejected() {
        let config = BaseConfig {
            id_regexp: Some(r"^\S+".to_string()),
            ..BaseConfig::default()
        };
        assert!(RecordParser::new(&config).is_err());
    }

    #[test]
    fn missing_header_is_fatal() {
        let mut p = parser();
        assert!(p.parse_block(">\nACGT").is_err());
    }
}
