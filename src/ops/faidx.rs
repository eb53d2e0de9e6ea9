use crate::config::FaidxOptions;
use crate::error::Result;
use crate::index::{
    partition_byte_length, GlobalOffsetTable, IndexEntry, OffsetIndexer, PartitionOffsetSummary,
    RegionExtractor,
};
use crate::record::{HeaderRule, RecordParser};
use crate::substrate::Substrate;

/// Result of the indexing driver
pub struct FaidxOutput<S: Substrate> {
    /// Tab-separated index lines, one per record, in partition order
    pub index: S::Coll<String>,
    /// Extracted subsequences for the configured region queries, if any
    pub matches: Option<S::Coll<String>>,
    /// The broadcast offset table, exposed for invariant checks
    pub table: GlobalOffsetTable,
}

/// Builds the random-access index over a file no worker holds in full.
///
/// Phase 1 measures each partition's raw byte length; the collect that
/// follows is the engine's single barrier, after which the exclusive
/// prefix sum is broadcast and phase 2 walks every partition again with a
/// correctly seeded byte cursor. Region extraction, when requested, runs
/// as an independent pass over the same blocks.
pub fn faidx<S: Substrate>(
    sub: &S,
    input: S::Coll<String>,
    opts: &FaidxOptions,
) -> Result<FaidxOutput<S>> {
    // surface configuration errors before any partition work
    HeaderRule::from_config(opts.config.id_regexp.as_deref())?;

    sub.cache(&input)?;
    let summaries = sub.map_partitions_with_index(input.clone(), |pid, blocks| {
        Ok(vec![PartitionOffsetSummary {
            partition: pid,
            local_bytes: partition_byte_length(blocks),
        }])
    })?;
    let table = GlobalOffsetTable::from_summaries(sub.collect(summaries)?)?;
    log::info!(
        "offset table built: {} partitions, {} bytes",
        table.partitions(),
        table.total_bytes()
    );

    let table_ref = &table;
    let index = sub.map_partitions_with_index(input.clone(), move |pid, blocks| {
        let indexer = OffsetIndexer::new(table_ref.start_of(pid)?, opts)?;
        let entries = indexer.index_partition(blocks)?;
        Ok(entries.iter().map(IndexEntry::to_tsv).collect())
    })?;

    let matches = if opts.regions.is_empty() {
        None
    } else {
        let extractor = RegionExtractor::new(opts)?;
        let extractor_ref = &extractor;
        Some(sub.map_partitions(input, move |blocks| {
            let mut parser = RecordParser::new(&opts.config)?;
            let mut out = Vec::new();
            for record in parser.parse_blocks(blocks) {
                if let Some(text) = extractor_ref.extract(&record?) {
                    out.push(text);
                }
            }
            Ok(out)
        })?)
    };

    Ok(FaidxOutput {
        index,
        matches,
        table,
    })
}
