//! Per-bucket reducers for the set-algebra operations.
//!
//! Each reducer consumes exactly one key bucket produced by the external
//! group-by-key shuffle and owns it for the duration of the call. Bucket
//! contents arrive in no guaranteed order; wherever a choice must be made,
//! the explicit [`RecordRank`] decides, never arrival order.

use rustc_hash::FxHashSet;

use crate::algebra::KeyedRecord;
use crate::error::Result;
use crate::record::SequenceRecord;

/// Intersection across `sources` input files.
///
/// Emits only when every source is represented in the bucket; the emitted
/// record is the lowest-ranked record of the lowest source tag, so repeated
/// runs produce identical output even when a source holds several records
/// under one key.
#[must_use]
pub fn common_reduce(bucket: Vec<KeyedRecord>, sources: u32) -> Option<KeyedRecord> {
    let seen: FxHashSet<u32> = bucket.iter().map(|r| r.source).collect();
    if seen.len() < sources as usize {
        return None;
    }
    bucket.into_iter().min_by_key(|r| (r.source, r.rank))
}

/// Cartesian concatenation of a two-source bucket.
///
/// Every record of source 1 is concatenated with every record of source 2:
/// sequences joined end to end, qualities likewise when both sides are
/// FASTQ, descriptions joined with `separator`. With `full` set, a bucket
/// populated by only one side passes that side through unchanged instead
/// of dropping the key.
pub fn concat_reduce(
    bucket: Vec<KeyedRecord>,
    separator: &[u8],
    full: bool,
) -> Result<Vec<SequenceRecord>> {
    let (side1, side2): (Vec<KeyedRecord>, Vec<KeyedRecord>) =
        bucket.into_iter().partition(|r| r.source == 1);

    if side1.is_empty() || side2.is_empty() {
        if full {
            let present = if side1.is_empty() { side2 } else { side1 };
            return Ok(present.into_iter().map(|r| r.record).collect());
        }
        return Ok(Vec::new());
    }

    let mut merged = Vec::with_capacity(side1.len() * side2.len());
    for a in &side1 {
        for b in &side2 {
            let desc = join_descs(&a.record.desc, separator, &b.record.desc);
            let mut name = a.record.id.clone();
            if !desc.is_empty() {
                name.push(b' ');
                name.extend_from_slice(&desc);
            }
            let mut seq = a.record.seq.clone();
            seq.extend_from_slice(&b.record.seq);
            let qual = match (&a.record.qual, &b.record.qual) {
                (Some(qa), Some(qb)) => {
                    let mut q = qa.clone();
                    q.extend_from_slice(qb);
                    Some(q)
                }
                _ => None,
            };
            merged.push(SequenceRecord::new(
                name,
                a.record.id.clone(),
                desc,
                seq,
                qual,
                a.record.alphabet,
            )?);
        }
    }
    Ok(merged)
}

fn join_descs(a: &[u8], separator: &[u8], b: &[u8]) -> Vec<u8> {
    if a.is_empty() && b.is_empty() {
        return Vec::new();
    }
    let mut desc = Vec::with_capacity(a.len() + separator.len() + b.len());
    desc.extend_from_slice(a);
    desc.extend_from_slice(separator);
    desc.extend_from_slice(b);
    desc
}

/// Output of [`pair_reduce`]: positional pairs plus the surplus of the
/// longer side
#[derive(Debug, Default)]
pub struct PairedBucket {
    pub pairs: Vec<(KeyedRecord, KeyedRecord)>,
    pub unpaired: Vec<KeyedRecord>,
}

/// Positional pairing of a shared-ID bucket.
///
/// Entries are split by source in bucket order and zipped index by index;
/// pairing is positional, not content-based, deliberately tolerating
/// duplicate IDs. Surplus entries of the longer side land in `unpaired`.
#[must_use]
pub fn pair_reduce(bucket: Vec<KeyedRecord>) -> PairedBucket {
    let (side1, side2): (Vec<KeyedRecord>, Vec<KeyedRecord>) =
        bucket.into_iter().partition(|r| r.source == 1);

    let paired = side1.len().min(side2.len());
    let mut out = PairedBucket::default();
    let mut it1 = side1.into_iter();
    let mut it2 = side2.into_iter();
    for _ in 0..paired {
        let (Some(a), Some(b)) = (it1.next(), it2.next()) else {
            break;
        };
        out.pairs.push((a, b));
    }
    out.unpaired.extend(it1);
    out.unpaired.extend(it2);
    out
}

/// Output of [`rmdup_reduce`]: the kept record and the removed ones
#[derive(Debug)]
pub struct RmdupVerdict {
    pub keeper: KeyedRecord,
    pub duplicates: Vec<KeyedRecord>,
}

/// First-wins deduplication of one bucket.
///
/// "First" is the minimum explicit rank, which makes repeated runs of the
/// job produce identical keepers regardless of shuffle arrival order.
#[must_use]
pub fn rmdup_reduce(bucket: Vec<KeyedRecord>) -> Option<RmdupVerdict> {
    let keeper_at = bucket
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| r.rank)
        .map(|(i, _)| i)?;
    let mut bucket = bucket;
    let keeper = bucket.swap_remove(keeper_at);
    bucket.sort_by_key(|r| r.rank);
    Some(RmdupVerdict {
        keeper,
        duplicates: bucket,
    })
}

/// The deduplication side channel: removed records and a per-subject count
/// report, accumulated per worker behind a lock and flushed exactly once
/// at job end.
#[derive(Debug, Default)]
pub struct DuplicateLog {
    removed: u64,
    records: Vec<String>,
    counts: Vec<String>,
}

impl DuplicateLog {
    /// Folds one bucket's verdict into the log; buckets with no duplicates
    /// leave no trace. The removed count is always tracked; record texts
    /// and the count report only when `keep_records` is set.
    pub fn record_bucket(&mut self, verdict: &RmdupVerdict, line_width: usize, keep_records: bool) {
        if verdict.duplicates.is_empty() {
            return;
        }
        self.removed += verdict.duplicates.len() as u64;
        if !keep_records {
            return;
        }
        for dup in &verdict.duplicates {
            self.records.push(dup.record.to_text_string(line_width));
        }
        let mut ids = vec![verdict.keeper.record.id_str()];
        ids.extend(verdict.duplicates.iter().map(|d| d.record.id_str()));
        self.counts
            .push(format!("{}\t{}", ids.len(), ids.join(", ")));
    }

    #[must_use]
    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// Drains the log: `(removed count, duplicate records, count report)`
    #[must_use]
    pub fn into_parts(self) -> (u64, Vec<String>, Vec<String>) {
        (self.removed, self.records, self.counts)
    }
}
