//! Driver functions wiring the per-partition components over the
//! substrate contract.
//!
//! Each driver is a pure function of `(substrate, input collections, flat
//! options)` returning collections of formatted record text or small
//! aggregates. Records are serialized to text only at these boundaries;
//! between the tagger and the reducers they travel as typed values.

mod common;
mod concat;
mod duplicate;
mod faidx;
mod pair;
mod rmdup;
mod store;

pub use common::common;
pub use concat::concat;
pub use duplicate::duplicate;
pub use faidx::{faidx, FaidxOutput};
pub use pair::{pair, PairOutput};
pub use rmdup::{rmdup, RmdupOutput};
pub use store::store_ordered;

use crate::error::Result;
use crate::record::BlockDelimiterFixer;
use crate::substrate::Substrate;

/// Repairs a freshly partitioned collection: reinstates the delimiter the
/// upstream split consumed and drops split artifacts.
///
/// Every other driver expects its input to have passed through here once.
pub fn fix_blocks<S: Substrate>(
    sub: &S,
    input: S::Coll<String>,
    delimiter: u8,
) -> Result<S::Coll<String>> {
    let fixer = BlockDelimiterFixer::new(delimiter);
    sub.map_partitions(input, move |blocks| Ok(fixer.fix(blocks).collect()))
}
