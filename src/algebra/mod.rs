//! Key-based multi-file record-set algebra.
//!
//! No node can hold two files' worth of keyed state, so every operation is
//! phrased as: tag each record with a subject key and its source
//! ([`KeyedRecordTagger`]), let the external substrate union and group by
//! key, then reduce each key bucket in isolation. Reducers are pure
//! functions of one bucket; only the deduplication side channel
//! accumulates across buckets, and it is flushed exactly once per job.

mod key;
mod reduce;
mod tagger;

pub use key::{KeySpec, KeyedRecord, RecordRank, SubjectKey};
pub use reduce::{
    common_reduce, concat_reduce, pair_reduce, rmdup_reduce, DuplicateLog, PairedBucket,
    RmdupVerdict,
};
pub use tagger::KeyedRecordTagger;
