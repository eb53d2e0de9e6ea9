use crate::algebra::{concat_reduce, KeySpec, KeyedRecordTagger};
use crate::config::{CompareOptions, ConcatOptions};
use crate::error::Result;
use crate::record::RecordParser;
use crate::substrate::Substrate;

/// Cartesian concatenation of two collections, keyed by record ID.
///
/// Records sharing an ID are merged pairwise: sequences joined end to end,
/// qualities likewise when both sides are FASTQ, descriptions joined with
/// the configured separator. With `full` set, IDs present in only one
/// input pass through unchanged.
pub fn concat<S: Substrate>(
    sub: &S,
    input1: S::Coll<String>,
    input2: S::Coll<String>,
    opts: &ConcatOptions,
) -> Result<S::Coll<String>> {
    // concat always correlates by ID
    let spec = KeySpec::from_options(&CompareOptions::default())?;

    let mut tagged = Vec::with_capacity(2);
    for (i, input) in [input1, input2].into_iter().enumerate() {
        let tagger = KeyedRecordTagger::new(spec, i as u32 + 1);
        tagged.push(sub.map_partitions_with_index(input, move |pid, blocks| {
            let mut parser = RecordParser::new(&opts.config)?;
            tagger.tag_partition(pid, parser.parse_blocks(blocks))
        })?);
    }

    let grouped = sub.group_by_key(sub.union(tagged)?)?;
    let line_width = opts.config.line_width;
    sub.flat_map(grouped, move |(_key, bucket)| {
        let merged = concat_reduce(bucket, opts.separator.as_bytes(), opts.full)?;
        Ok(merged
            .iter()
            .map(|record| record.to_text_string(line_width))
            .collect())
    })
}
