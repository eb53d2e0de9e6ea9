use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::substrate::Substrate;
use crate::writer::OrderedPartitionWriter;

/// Writes a collection to one shared output file in partition order.
///
/// Partitions are produced concurrently; the ordered writer's hand-off
/// token serializes only the write phase, so the bytes on disk are
/// identical to a sequential single-threaded write.
pub fn store_ordered<S: Substrate>(sub: &S, input: S::Coll<String>, path: &Path) -> Result<()> {
    let partitions = sub.partitions(&input);
    let file = File::create(path).map(BufWriter::new)?;
    let writer = OrderedPartitionWriter::new(file, partitions);
    let writer_ref = &writer;

    sub.map_partitions_with_index(input, move |pid, lines| {
        writer_ref.write_partition(pid, lines)?;
        Ok(Vec::<String>::new())
    })?;

    writer.finish()?;
    Ok(())
}
