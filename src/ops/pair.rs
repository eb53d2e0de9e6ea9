use crate::algebra::{pair_reduce, KeySpec, KeyedRecordTagger};
use crate::config::{CompareOptions, PairOptions};
use crate::error::Result;
use crate::record::RecordParser;
use crate::substrate::Substrate;

/// Result of the pairing driver
pub struct PairOutput<S: Substrate> {
    /// Mate pairs, first input's record first
    pub pairs: S::Coll<(String, String)>,
    /// Records whose mate is missing, present when requested
    pub unpaired: Option<S::Coll<String>>,
}

/// Positional pairing of two read collections by record ID.
///
/// Within each shared-ID bucket the two sides are zipped index by index,
/// tolerating duplicate IDs; the surplus of the longer side is emitted
/// separately when `save_unpaired` is set.
pub fn pair<S: Substrate>(
    sub: &S,
    input1: S::Coll<String>,
    input2: S::Coll<String>,
    opts: &PairOptions,
) -> Result<PairOutput<S>> {
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
    sub.cache(&grouped)?;
    let line_width = opts.config.line_width;

    let pairs = sub.flat_map(grouped.clone(), move |(_key, bucket)| {
        Ok(pair_reduce(bucket)
            .pairs
            .into_iter()
            .map(|(a, b)| {
                (
                    a.record.to_text_string(line_width),
                    b.record.to_text_string(line_width),
                )
            })
            .collect())
    })?;

    let unpaired = if opts.save_unpaired {
        Some(sub.flat_map(grouped, move |(_key, bucket)| {
            Ok(pair_reduce(bucket)
                .unpaired
                .into_iter()
                .map(|r| r.record.to_text_string(line_width))
                .collect())
        })?)
    } else {
        None
    };

    Ok(PairOutput { pairs, unpaired })
}
