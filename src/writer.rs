//! Serializes concurrently produced partition outputs into one file in
//! strict partition order.
//!
//! Workers may finish in any order, but output bytes must be identical to
//! a sequential single-threaded write. The protocol is a condition-variable
//! guarded hand-off token: a shared `next` counter names the only partition
//! allowed to write; the writing worker advances it and wakes the rest.
//! Computation before the write stays fully parallel; only the write
//! phase serializes.

use std::io::Write;

use parking_lot::{Condvar, Mutex};

use crate::error::{IndexError, Result};

struct WriterState<W> {
    inner: W,
    next: usize,
    failed: bool,
}

/// Partition-ordered writer shared across worker threads
pub struct OrderedPartitionWriter<W: Write> {
    state: Mutex<WriterState<W>>,
    ready: Condvar,
    partitions: usize,
}

impl<W: Write> OrderedPartitionWriter<W> {
    #[must_use]
    pub fn new(inner: W, partitions: usize) -> Self {
        Self {
            state: Mutex::new(WriterState {
                inner,
                next: 0,
                failed: false,
            }),
            ready: Condvar::new(),
            partitions,
        }
    }

    /// Writes one partition's lines, blocking until every lower-indexed
    /// partition has been written.
    ///
    /// Each line is terminated with a newline. A write failure marks the
    /// writer failed and releases all waiting partitions with
    /// [`IndexError::WriteAborted`], so a job never deadlocks on a dead
    /// token holder.
    pub fn write_partition<I, L>(&self, partition: usize, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        if partition >= self.partitions {
            return Err(IndexError::UnknownPartition(partition, self.partitions).into());
        }
        let mut state = self.state.lock();
        while state.next != partition && !state.failed {
            self.ready.wait(&mut state);
        }
        if state.failed {
            return Err(IndexError::WriteAborted.into());
        }

        let result = Self::write_lines(&mut state.inner, lines);
        if result.is_err() {
            state.failed = true;
        } else {
            state.next += 1;
        }
        drop(state);
        self.ready.notify_all();
        result
    }

    fn write_lines<I, L>(inner: &mut W, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        for line in lines {
            inner.write_all(line.as_ref())?;
            inner.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flushes and returns the inner writer once every partition has been
    /// handed off
    pub fn finish(self) -> Result<W> {
        let mut state = self.state.into_inner();
        if state.failed {
            return Err(IndexError::WriteAborted.into());
        }
        if state.next != self.partitions {
            return Err(IndexError::UnknownPartition(state.next, self.partitions).into());
        }
        state.inner.flush()?;
        Ok(state.inner)
    }
}
