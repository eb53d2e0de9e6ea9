use parking_lot::Mutex;

use crate::algebra::{rmdup_reduce, DuplicateLog, KeySpec, KeyedRecordTagger};
use crate::config::RmdupOptions;
use crate::error::Result;
use crate::record::RecordParser;
use crate::substrate::Substrate;

/// Result of the deduplication driver
pub struct RmdupOutput<S: Substrate> {
    /// The surviving records
    pub records: S::Coll<String>,
    /// Number of records removed
    pub removed: u64,
    /// The removed records themselves, when tracking is on
    pub duplicates: Option<Vec<String>>,
    /// Per-subject count report (`count \t id, id, ...`), when tracking is on
    pub report: Option<Vec<String>>,
}

/// First-wins deduplication by subject key.
///
/// The keeper of each bucket is the record with the minimum explicit rank,
/// so repeated runs keep the same record regardless of shuffle arrival
/// order. The duplicate side channel accumulates behind a lock across
/// buckets, the one piece of cross-bucket state in the engine, and is
/// drained exactly once, after the reduce completes.
pub fn rmdup<S: Substrate>(
    sub: &S,
    input: S::Coll<String>,
    opts: &RmdupOptions,
) -> Result<RmdupOutput<S>> {
    let spec = KeySpec::from_options(&opts.compare)?;
    let tagger = KeyedRecordTagger::new(spec, 1);

    let tagged = sub.map_partitions_with_index(input, move |pid, blocks| {
        let mut parser = RecordParser::new(&opts.config)?;
        tagger.tag_partition(pid, parser.parse_blocks(blocks))
    })?;
    let grouped = sub.group_by_key(tagged)?;

    let line_width = opts.config.line_width;
    let track = opts.track_duplicates;
    let dlog = Mutex::new(DuplicateLog::default());
    let dlog_ref = &dlog;
    let records = sub.flat_map(grouped, move |(_key, bucket)| {
        let Some(verdict) = rmdup_reduce(bucket) else {
            return Ok(Vec::new());
        };
        dlog_ref.lock().record_bucket(&verdict, line_width, track);
        Ok(vec![verdict.keeper.record.to_text_string(line_width)])
    })?;

    let (removed, duplicates, report) = dlog.into_inner().into_parts();
    if removed > 0 {
        log::info!("{removed} duplicated records removed");
    }
    Ok(RmdupOutput {
        records,
        removed,
        duplicates: track.then_some(duplicates),
        report: track.then_some(report),
    })
}
