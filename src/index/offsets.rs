use crate::error::{IndexError, Result};

/// Phase-1 output: the raw byte length of one partition.
///
/// Computed once per indexing job, collected centrally, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionOffsetSummary {
    pub partition: usize,
    pub local_bytes: u64,
}

/// Sums the raw byte length of a partition's fixed blocks.
///
/// Each block lost its trailing newline to the upstream split, so every
/// block accounts for `len + 1` bytes of the original file.
pub fn partition_byte_length<I>(blocks: I) -> u64
where
    I: Iterator<Item = String>,
{
    blocks.map(|block| block.len() as u64 + 1).sum()
}

/// The broadcast result of the driver-side barrier: one cumulative global
/// byte offset per partition, in original-file partition order.
///
/// Invariant: `start_of(i + 1) - start_of(i)` equals partition `i`'s local
/// byte length, and the last offset plus the last local length equals the
/// total file size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOffsetTable {
    offsets: Vec<u64>,
    total: u64,
}

impl GlobalOffsetTable {
    /// Builds the table from collected summaries.
    ///
    /// Summaries may arrive in any order; they are reordered by partition
    /// index, which must form a contiguous run starting at zero.
    pub fn from_summaries(mut summaries: Vec<PartitionOffsetSummary>) -> Result<Self> {
        summaries.sort_by_key(|s| s.partition);
        for (expected, summary) in summaries.iter().enumerate() {
            if summary.partition != expected {
                return Err(IndexError::NonContiguousSummaries {
                    expected,
                    found: summary.partition,
                }
                .into());
            }
        }
        let mut offsets = Vec::with_capacity(summaries.len());
        let mut running = 0u64;
        for summary in &summaries {
            offsets.push(running);
            running += summary.local_bytes;
        }
        Ok(Self {
            offsets,
            total: running,
        })
    }

    /// Global byte offset at which `partition` starts
    pub fn start_of(&self, partition: usize) -> Result<u64> {
        self.offsets
            .get(partition)
            .copied()
            .ok_or_else(|| IndexError::UnknownPartition(partition, self.offsets.len()).into())
    }

    /// Local byte length of `partition`, recovered from adjacent offsets
    pub fn local_bytes(&self, partition: usize) -> Result<u64> {
        let start = self.start_of(partition)?;
        let end = match self.offsets.get(partition + 1) {
            Some(&next) => next,
            None => self.total,
        };
        Ok(end - start)
    }

    #[must_use]
    pub fn partitions(&self) -> usize {
        self.offsets.len()
    }

    /// Total byte size of the reconstructed file
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_length_reinstates_newlines() {
        let blocks = vec![">r1\nACGT".to_string(), ">r2\nTT".to_string()];
        // 8 + 1 + 6 + 1
        assert_eq!(partition_byte_length(blocks.into_iter()), 16);
    }

    #[test]
    fn prefix_sum_from_unordered_summaries() {
        let summaries = vec![
            PartitionOffsetSummary {
                partition: 2,
                local_bytes: 7,
            },
            PartitionOffsetSummary {
                partition: 0,
                local_bytes: 10,
            },
            PartitionOffsetSummary {
                partition: 1,
                local_bytes: 3,
            },
        ];
        let table = GlobalOffsetTable::from_summaries(summaries).unwrap();
        assert_eq!(table.start_of(0).unwrap(), 0);
        assert_eq!(table.start_of(1).unwrap(), 10);
        assert_eq!(table.start_of(2).unwrap(), 13);
        assert_eq!(table.total_bytes(), 20);
        assert_eq!(table.local_bytes(2).unwrap(), 7);
        assert!(table.start_of(3).is_err());
    }

    #[test]
    fn gap_in_partition_indices_is_fatal() {
        let summaries = vec![
            PartitionOffsetSummary {
                partition: 0,
                local_bytes: 4,
            },
            PartitionOffsetSummary {
                partition: 2,
                local_bytes: 4,
            },
        ];
        assert!(GlobalOffsetTable::from_summaries(summaries).is_err());
    }
}
