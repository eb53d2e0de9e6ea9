use crate::config::DuplicateOptions;
use crate::error::Result;
use crate::substrate::Substrate;

/// Replicates every record `times` times.
///
/// Operates on formatted record text, so it composes with any driver's
/// output as well as with fixed blocks.
pub fn duplicate<S: Substrate>(
    sub: &S,
    input: S::Coll<String>,
    opts: &DuplicateOptions,
) -> Result<S::Coll<String>> {
    let times = opts.times as usize;
    sub.flat_map(input, move |text| Ok(vec![text; times]))
}
