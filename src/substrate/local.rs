//! An in-process, thread-parallel stand-in for the external substrate.
//!
//! Each mapping call runs partitions to completion on a small pool of
//! scoped worker threads (one partition per task, no suspension inside a
//! partition), which is exactly the scheduling model the engine assumes.
//! Errors fail fast: the first partition error stops the dispatch loop and
//! aborts the job.

use std::fs::File;
use std::hash::Hash;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use memchr::memchr_iter;
use memmap2::Mmap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{Item, PartitionIter, Substrate};
use crate::error::{Error, Result};

/// An owned partitioned collection
#[derive(Debug, Clone)]
pub struct LocalColl<T> {
    parts: Vec<Vec<T>>,
}

impl<T> LocalColl<T> {
    #[must_use]
    pub fn from_partitions(parts: Vec<Vec<T>>) -> Self {
        Self { parts }
    }

    #[must_use]
    pub fn into_partitions(self) -> Vec<Vec<T>> {
        self.parts
    }

    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.parts.len()
    }
}

/// The in-process substrate
#[derive(Debug, Clone, Copy)]
pub struct LocalSubstrate {
    threads: usize,
}

impl Default for LocalSubstrate {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSubstrate {
    /// One worker per available CPU
    #[must_use]
    pub fn new() -> Self {
        Self {
            threads: num_cpus::get(),
        }
    }

    #[must_use]
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// Reads a whole FASTA/FASTQ file and splits it the way the upstream
    /// partitioner does: at every `delimiter` byte that starts a line,
    /// consuming the delimiter. The artifact block before the file's
    /// first delimiter is kept (empty for well-formed files) so the
    /// delimiter fixer sees exactly what a cluster run would deliver.
    ///
    /// The split is purely textual: a quality line that happens to start
    /// with the delimiter byte will mis-split, the same caveat the
    /// upstream partitioner carries. The file is assumed to end with a
    /// newline.
    pub fn read_fastx<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
        partitions: usize,
    ) -> Result<LocalColl<String>> {
        let file = File::open(path)?;
        // Safety: the mapping is read-only and dropped before return
        let mmap = unsafe { Mmap::map(&file)? };
        let data: &[u8] = &mmap;

        let mut blocks = Vec::new();
        let mut start = 0usize;
        for pos in memchr_iter(delimiter, data) {
            if pos == 0 || data[pos - 1] == b'\n' {
                blocks.push(std::str::from_utf8(&data[start..pos])?.to_string());
                start = pos + 1;
            }
        }
        blocks.push(std::str::from_utf8(&data[start..])?.to_string());

        let partitions = partitions.max(1);
        let per_part = blocks.len().div_ceil(partitions);
        let mut parts: Vec<Vec<String>> = Vec::with_capacity(partitions);
        let mut blocks = blocks.into_iter();
        for _ in 0..partitions {
            parts.push(blocks.by_ref().take(per_part).collect());
        }
        Ok(LocalColl::from_partitions(parts))
    }
}

impl Substrate for LocalSubstrate {
    type Coll<T: Item> = LocalColl<T>;

    fn partitions<T: Item>(&self, coll: &Self::Coll<T>) -> usize {
        coll.parts.len()
    }

    fn map_partitions_with_index<T: Item, U: Item, F>(
        &self,
        coll: Self::Coll<T>,
        op: F,
    ) -> Result<Self::Coll<U>>
    where
        F: Fn(usize, PartitionIter<T>) -> Result<Vec<U>> + Send + Sync,
    {
        let n = coll.parts.len();
        let inputs: Vec<Mutex<Option<Vec<T>>>> = coll
            .parts
            .into_iter()
            .map(|part| Mutex::new(Some(part)))
            .collect();
        let outputs: Vec<Mutex<Option<Vec<U>>>> = (0..n).map(|_| Mutex::new(None)).collect();
        let next = AtomicUsize::new(0);
        let failure: Mutex<Option<Error>> = Mutex::new(None);

        let workers = self.threads.min(n).max(1);
        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let pid = next.fetch_add(1, Ordering::Relaxed);
                    if pid >= n || failure.lock().is_some() {
                        break;
                    }
                    let Some(part) = inputs[pid].lock().take() else {
                        continue;
                    };
                    let items: PartitionIter<T> = Box::new(part.into_iter());
                    match op(pid, items) {
                        Ok(result) => *outputs[pid].lock() = Some(result),
                        Err(e) => {
                            let mut slot = failure.lock();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            break;
                        }
                    }
                });
            }
        });

        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        let parts = outputs
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_default())
            .collect();
        Ok(LocalColl { parts })
    }

    fn union<T: Item>(&self, colls: Vec<Self::Coll<T>>) -> Result<Self::Coll<T>> {
        let mut parts = Vec::new();
        for coll in colls {
            parts.extend(coll.parts);
        }
        Ok(LocalColl { parts })
    }

    fn group_by_key<K, V>(&self, coll: Self::Coll<(K, V)>) -> Result<Self::Coll<(K, Vec<V>)>>
    where
        K: Item + Eq + Hash,
        V: Item,
    {
        let mut buckets: FxHashMap<K, Vec<V>> = FxHashMap::default();
        for part in coll.parts {
            for (key, value) in part {
                buckets.entry(key).or_default().push(value);
            }
        }
        let nparts = self.threads.max(1);
        let mut parts: Vec<Vec<(K, Vec<V>)>> = (0..nparts).map(|_| Vec::new()).collect();
        for (i, bucket) in buckets.into_iter().enumerate() {
            parts[i % nparts].push(bucket);
        }
        Ok(LocalColl { parts })
    }

    fn collect<T: Item>(&self, coll: Self::Coll<T>) -> Result<Vec<T>> {
        Ok(coll.parts.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    fn coll(parts: Vec<Vec<i32>>) -> LocalColl<i32> {
        LocalColl::from_partitions(parts)
    }

    #[test]
    fn map_partitions_preserves_partition_order() {
        let sub = LocalSubstrate::with_threads(4);
        let input = coll(vec![vec![1, 2], vec![3], vec![4, 5]]);
        let out = sub
            .map_partitions_with_index(input, |pid, items| {
                Ok(items.map(|v| v * 10 + pid as i32).collect())
            })
            .unwrap();
        assert_eq!(out.into_partitions(), vec![vec![10, 20], vec![31], vec![42, 52]]);
    }

    #[test]
    fn errors_abort_the_job() {
        let sub = LocalSubstrate::with_threads(2);
        let input = coll(vec![vec![1], vec![2], vec![3]]);
        let result = sub.map_partitions(input, |items| {
            for v in items {
                if v == 2 {
                    return Err(ParseError::MissingHeader(String::new()).into());
                }
            }
            Ok(vec![0i32])
        });
        assert!(result.is_err());
    }

    #[test]
    fn group_by_key_buckets_every_value() {
        let sub = LocalSubstrate::with_threads(2);
        let input = LocalColl::from_partitions(vec![
            vec![("a".to_string(), 1), ("b".to_string(), 2)],
            vec![("a".to_string(), 3)],
        ]);
        let grouped = sub.group_by_key(input).unwrap();
        let mut buckets = sub.collect(grouped).unwrap();
        buckets.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(
            buckets,
            vec![
                ("a".to_string(), vec![1, 3]),
                ("b".to_string(), vec![2]),
            ]
        );
    }

    #[test]
    fn union_concatenates_in_order() {
        let sub = LocalSubstrate::with_threads(2);
        let a = coll(vec![vec![1], vec![2]]);
        let b = coll(vec![vec![3]]);
        let u = sub.union(vec![a, b]).unwrap();
        assert_eq!(sub.collect(u).unwrap(), vec![1, 2, 3]);
    }
}
