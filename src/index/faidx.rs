use crate::config::FaidxOptions;
use crate::error::{IndexError, ParseError, Result};
use crate::record::HeaderRule;

/// One line of the random-access index.
///
/// `bases_per_line`/`bytes_per_line` describe the record's uniform line
/// wrapping; random access to base `n` is
/// `start_offset + n / bases_per_line * bytes_per_line + n % bases_per_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub seq_len: u64,
    /// Global byte offset of the first sequence byte
    pub start_offset: u64,
    pub bases_per_line: u64,
    pub bytes_per_line: u64,
    /// Global byte offset of the first quality byte, FASTQ only
    pub qual_offset: Option<u64>,
}

impl IndexEntry {
    /// Renders the tab-separated index line: 5 columns for FASTA, 6 for
    /// FASTQ
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut buf = itoa::Buffer::new();
        let mut line = String::with_capacity(self.name.len() + 32);
        line.push_str(&self.name);
        for value in [
            self.seq_len,
            self.start_offset,
            self.bases_per_line,
            self.bytes_per_line,
        ] {
            line.push('\t');
            line.push_str(buf.format(value));
        }
        if let Some(qual) = self.qual_offset {
            line.push('\t');
            line.push_str(buf.format(qual));
        }
        line
    }
}

/// Phase 2 of the offset indexer: walks one partition's fixed blocks with
/// a byte cursor seeded from the broadcast [`GlobalOffsetTable`] entry and
/// emits one [`IndexEntry`] per record.
///
/// The cursor runs continuously across blocks: every line accounts for
/// `len + 1` bytes, and each block's stripped trailing newline is
/// reinstated, so per-partition totals agree exactly with phase 1.
///
/// [`GlobalOffsetTable`]: crate::index::GlobalOffsetTable
pub struct OffsetIndexer {
    cursor: u64,
    rule: HeaderRule,
    full_head: bool,
}

impl OffsetIndexer {
    pub fn new(start_offset: u64, opts: &FaidxOptions) -> Result<Self> {
        Ok(Self {
            cursor: start_offset,
            rule: HeaderRule::from_config(opts.config.id_regexp.as_deref())?,
            full_head: opts.full_head,
        })
    }

    /// Current global byte position of the cursor
    #[must_use]
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Accounts for one record block and emits its index entry
    pub fn index_block(&mut self, block: &str) -> Result<IndexEntry> {
        let bytes = block.as_bytes();
        if bytes.is_empty() {
            return Err(ParseError::MissingHeader(String::new()).into());
        }
        let is_fastq = bytes[0] == b'@';

        let mut lines = bytes.split(|&b| b == b'\n');
        let header = lines.next().unwrap_or_default();
        let head = drop_cr(&header[1.min(header.len())..]);
        let name = if self.full_head {
            String::from_utf8_lossy(head).into_owned()
        } else {
            let (id, _) = self.rule.split(head);
            String::from_utf8_lossy(id).into_owned()
        };
        self.cursor += header.len() as u64 + 1;
        let start_offset = self.cursor;

        let mut seq_len = 0u64;
        let mut widths: Vec<(u64, u64)> = Vec::new();
        let mut qual_offset = None;
        let mut in_qual = false;
        for line in lines {
            if is_fastq && !in_qual && line.first() == Some(&b'+') {
                in_qual = true;
                qual_offset = Some(self.cursor + line.len() as u64 + 1);
            } else if !in_qual {
                let bases = drop_cr(line).len() as u64;
                widths.push((line.len() as u64 + 1, bases));
                seq_len += bases;
            }
            self.cursor += line.len() as u64 + 1;
        }

        let (bases_per_line, bytes_per_line) = validate_widths(&widths, &name)?;
        Ok(IndexEntry {
            name,
            seq_len,
            start_offset,
            bases_per_line,
            bytes_per_line,
            qual_offset,
        })
    }

    /// Indexes a whole partition's fixed block stream
    pub fn index_partition<I>(mut self, blocks: I) -> Result<Vec<IndexEntry>>
    where
        I: Iterator<Item = String>,
    {
        let mut entries = Vec::new();
        for block in blocks {
            entries.push(self.index_block(&block)?);
        }
        Ok(entries)
    }
}

/// Checks the uniform-wrapping invariant and returns
/// `(bases_per_line, bytes_per_line)`.
///
/// Every populated line must match the first line's byte width; only the
/// last populated line may be shorter, never longer. Trailing empty lines
/// are ignored.
fn validate_widths(widths: &[(u64, u64)], name: &str) -> Result<(u64, u64)> {
    let Some(last_populated) = widths.iter().rposition(|&(_, bases)| bases > 0) else {
        return Ok((0, 0));
    };
    let (first_bytes, first_bases) = widths[0];
    for &(bytes, _) in &widths[..last_populated] {
        if bytes != first_bytes {
            return Err(IndexError::InconsistentLineWidth(name.to_string()).into());
        }
    }
    if widths[last_populated].0 > first_bytes {
        return Err(IndexError::InconsistentLineWidth(name.to_string()).into());
    }
    Ok((first_bases, first_bytes))
}

fn drop_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexer(start: u64) -> OffsetIndexer {
        OffsetIndexer::new(start, &FaidxOptions::default()).unwrap()
    }

    #[test]
    fn single_partition_scenario() {
        // ">r1\nACGT\nACG\n>r2\nTTTT\n" split into two fixed blocks
        let mut idx = indexer(0);
        let e1 = idx.index_block(">r1\nACGT\nACG").unwrap();
        let e2 = idx.index_block(">r2\nTTTT").unwrap();

        assert_eq!(e1.name, "r1");
        assert_eq!(e1.seq_len, 7);
        assert_eq!(e1.start_offset, 4); // after ">r1\n"
        assert_eq!(e1.bases_per_line, 4);
        assert_eq!(e1.bytes_per_line, 5);

        assert_eq!(e2.name, "r2");
        assert_eq!(e2.seq_len, 4);
        // ">r1\nACGT\nACG\n" is 13 bytes, then ">r2\n" is 4 more
        assert_eq!(e2.start_offset, 17);

        // internal consistency: cursor ends at the total byte count
        assert_eq!(idx.position(), 13 + 9);
    }

    #[test]
    fn cursor_matches_phase_one_accounting() {
        let blocks = [">a\nAC\nGT", ">b\nACGTAC"];
        let mut idx = indexer(100);
        for block in blocks {
            idx.index_block(block).unwrap();
        }
        let local: u64 = blocks.iter().map(|b| b.len() as u64 + 1).sum();
        assert_eq!(idx.position(), 100 + local);
    }

    #[test]
    fn fastq_quality_offset() {
        let mut idx = indexer(0);
        let e = idx.index_block("@q1\nACGT\n+\nIIII").unwrap();
        assert_eq!(e.seq_len, 4);
        assert_eq!(e.start_offset, 4);
        // "@q1\nACGT\n+\n" is 11 bytes
        assert_eq!(e.qual_offset, Some(11));
        assert_eq!(e.to_tsv(), "q1\t4\t4\t4\t5\t11");
    }

    #[test]
    fn shorter_final_line_is_tolerated() {
        let mut idx = indexer(0);
        assert!(idx.index_block(">r\nACGT\nACGT\nAC").is_ok());
    }

    #[test]
    fn longer_final_line_is_fatal() {
        let mut idx = indexer(0);
        let err = idx.index_block(">r\nAC\nACGT").unwrap_err();
        assert!(err.to_string().contains('r'));
    }

    #[test]
    fn inconsistent_interior_line_is_fatal() {
        let mut idx = indexer(0);
        assert!(idx.index_block(">r\nACGT\nAC\nACGT").is_err());
    }

    #[test]
    fn fasta_tsv_has_five_columns() {
        let mut idx = indexer(0);
        let e = idx.index_block(">r1 desc\nACGT").unwrap();
        assert_eq!(e.to_tsv(), "r1\t4\t9\t4\t5");
    }
}
