use crate::alphabet::Alphabet;
use crate::error::{ParseError, Result};

/// Record format, detected once per partition from the leading byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Fasta,
    Fastq,
}

impl Format {
    /// The header delimiter byte for this format
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Fasta => b'>',
            Self::Fastq => b'@',
        }
    }

    /// Detects the format from a delimiter byte, defaulting to FASTA
    #[must_use]
    pub fn from_delimiter(byte: u8) -> Self {
        if byte == b'@' {
            Self::Fastq
        } else {
            Self::Fasta
        }
    }
}

/// One parsed sequence record.
///
/// `name` is the full header line (without the delimiter byte); `id` and
/// `desc` are derived from it and kept separately because the set-algebra
/// keys and the index need them constantly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// ID token of the header
    pub id: Vec<u8>,
    /// Remainder of the header after the ID, leading whitespace dropped
    pub desc: Vec<u8>,
    /// Full header line; formatting reproduces this byte-for-byte
    pub name: Vec<u8>,
    /// Sequence bytes, line wrapping removed
    pub seq: Vec<u8>,
    /// Quality bytes; present iff the record is FASTQ
    pub qual: Option<Vec<u8>>,
    /// Alphabet in effect for this record's partition
    pub alphabet: Alphabet,
}

impl SequenceRecord {
    /// Builds a record, enforcing the FASTQ length invariant
    pub fn new(
        name: Vec<u8>,
        id: Vec<u8>,
        desc: Vec<u8>,
        seq: Vec<u8>,
        qual: Option<Vec<u8>>,
        alphabet: Alphabet,
    ) -> Result<Self> {
        if let Some(q) = &qual {
            if q.len() != seq.len() {
                return Err(ParseError::LengthMismatch {
                    name: String::from_utf8_lossy(&name).into_owned(),
                    seq_len: seq.len(),
                    qual_len: q.len(),
                }
                .into());
            }
        }
        Ok(Self {
            id,
            desc,
            name,
            seq,
            qual,
            alphabet,
        })
    }

    #[must_use]
    pub fn format(&self) -> Format {
        if self.qual.is_some() {
            Format::Fastq
        } else {
            Format::Fasta
        }
    }

    #[must_use]
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }

    /// Renders the record to its textual form.
    ///
    /// FASTA wraps the sequence at `line_width` bases per line (0 disables
    /// wrapping); FASTQ always renders the fixed 4-line form, ignoring the
    /// width. The output carries a trailing newline.
    #[must_use]
    pub fn to_text(&self, line_width: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.name.len() + self.seq.len() * 2 + 8);
        self.render(line_width, &mut out);
        out
    }

    /// Renders into a reusable buffer without clearing it first
    pub fn render(&self, line_width: usize, out: &mut Vec<u8>) {
        match &self.qual {
            Some(qual) => {
                out.push(b'@');
                out.extend_from_slice(&self.name);
                out.push(b'\n');
                out.extend_from_slice(&self.seq);
                out.extend_from_slice(b"\n+\n");
                out.extend_from_slice(qual);
                out.push(b'\n');
            }
            None => {
                out.push(b'>');
                out.extend_from_slice(&self.name);
                out.push(b'\n');
                wrap_into(&self.seq, line_width, out);
                out.push(b'\n');
            }
        }
    }

    /// Renders to a `String`; the record text is known to be UTF-8 because
    /// it was parsed from UTF-8 partition blocks
    #[must_use]
    pub fn to_text_string(&self, line_width: usize) -> String {
        String::from_utf8_lossy(&self.to_text(line_width)).into_owned()
    }

    /// Reverse complement of the sequence under this record's alphabet
    #[must_use]
    pub fn reverse_complement(&self) -> Vec<u8> {
        self.alphabet.reverse_complement(&self.seq)
    }
}

/// Appends `seq` to `out`, inserting a newline every `width` bases.
///
/// No trailing newline is written: a sequence of exactly `width` bases
/// stays a single line.
pub fn wrap_into(seq: &[u8], width: usize, out: &mut Vec<u8>) {
    if width == 0 || seq.is_empty() {
        out.extend_from_slice(seq);
        return;
    }
    let mut chunks = seq.chunks(width);
    if let Some(first) = chunks.next() {
        out.extend_from_slice(first);
    }
    for chunk in chunks {
        out.push(b'\n');
        out.extend_from_slice(chunk);
    }
}
