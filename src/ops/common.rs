use crate::algebra::{common_reduce, KeySpec, KeyedRecordTagger};
use crate::config::CommonOptions;
use crate::error::{ConfigError, Result};
use crate::record::RecordParser;
use crate::substrate::Substrate;

/// Intersection of N ≥ 2 sequence collections by subject key.
///
/// Every input is tagged with its source and subject key, the tagged
/// streams are unioned and grouped by key, and a bucket survives only when
/// all sources appear in it. Exactly one record is emitted per surviving
/// key.
pub fn common<S: Substrate>(
    sub: &S,
    inputs: Vec<S::Coll<String>>,
    opts: &CommonOptions,
) -> Result<S::Coll<String>> {
    if inputs.len() < 2 {
        return Err(ConfigError::WrongInputCount {
            op: "common",
            expected: "at least 2",
            got: inputs.len(),
        }
        .into());
    }
    let spec = KeySpec::from_options(&opts.compare)?;
    let sources = inputs.len() as u32;
    log::debug!("common: intersecting {sources} sources");

    let mut tagged = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.into_iter().enumerate() {
        let tagger = KeyedRecordTagger::new(spec, i as u32 + 1);
        tagged.push(sub.map_partitions_with_index(input, move |pid, blocks| {
            let mut parser = RecordParser::new(&opts.config)?;
            tagger.tag_partition(pid, parser.parse_blocks(blocks))
        })?);
    }

    let grouped = sub.group_by_key(sub.union(tagged)?)?;
    let line_width = opts.config.line_width;
    sub.flat_map(grouped, move |(_key, bucket)| {
        Ok(common_reduce(bucket, sources)
            .map(|kept| kept.record.to_text_string(line_width))
            .into_iter()
            .collect())
    })
}
