//! The collaborator contract consumed from the external distributed
//! substrate.
//!
//! Partitioning, scheduling, data movement, and the grouping primitives
//! themselves belong to the substrate; the engine only calls them through
//! [`Substrate`]. Unlike a string-only shuffle, the contract here is typed:
//! keys and values cross it as real Rust values, which is what lets
//! [`crate::algebra::KeyedRecord`] be a proper tagged struct instead of a
//! manually packed string.
//!
//! [`local::LocalSubstrate`] is the in-process stand-in used by tests and
//! single-machine runs.

pub mod local;

use std::hash::Hash;

use crate::error::Result;

/// A lazy, one-pass view of one partition's items
pub type PartitionIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// Marker for values that may cross the substrate
pub trait Item: Send + Clone + 'static {}
impl<T: Send + Clone + 'static> Item for T {}

/// The fixed set of primitives the engine needs from a distributed
/// collection substrate.
///
/// Closures passed to the mapping primitives must be pure up to their own
/// captured state: they may run on any worker, in any partition order.
/// `collect` is the only barrier: it blocks until every partition has
/// been materialized on the driver.
pub trait Substrate {
    /// Handle to a distributed collection of `T`
    type Coll<T: Item>: Send + Clone;

    /// Number of partitions backing a collection
    fn partitions<T: Item>(&self, coll: &Self::Coll<T>) -> usize;

    /// Transforms every partition independently, with its partition index
    fn map_partitions_with_index<T: Item, U: Item, F>(
        &self,
        coll: Self::Coll<T>,
        op: F,
    ) -> Result<Self::Coll<U>>
    where
        F: Fn(usize, PartitionIter<T>) -> Result<Vec<U>> + Send + Sync;

    /// Transforms every partition independently
    fn map_partitions<T: Item, U: Item, F>(
        &self,
        coll: Self::Coll<T>,
        op: F,
    ) -> Result<Self::Coll<U>>
    where
        F: Fn(PartitionIter<T>) -> Result<Vec<U>> + Send + Sync,
    {
        self.map_partitions_with_index(coll, move |_, items| op(items))
    }

    /// Maps every item to zero or more output items
    fn flat_map<T: Item, U: Item, F>(&self, coll: Self::Coll<T>, op: F) -> Result<Self::Coll<U>>
    where
        F: Fn(T) -> Result<Vec<U>> + Send + Sync,
    {
        self.map_partitions_with_index(coll, move |_, items| {
            let mut out = Vec::new();
            for item in items {
                out.extend(op(item)?);
            }
            Ok(out)
        })
    }

    /// Concatenates collections; partition order follows argument order
    fn union<T: Item>(&self, colls: Vec<Self::Coll<T>>) -> Result<Self::Coll<T>>;

    /// The all-to-all shuffle: every key's values end up in exactly one
    /// bucket, owned by one downstream partition
    fn group_by_key<K, V>(&self, coll: Self::Coll<(K, V)>) -> Result<Self::Coll<(K, Vec<V>)>>
    where
        K: Item + Eq + Hash,
        V: Item;

    /// Materializes the collection on the driver, in partition order.
    /// This is the engine's barrier primitive.
    fn collect<T: Item>(&self, coll: Self::Coll<T>) -> Result<Vec<T>>;

    /// Hints that a collection will be consumed more than once
    fn cache<T: Item>(&self, _coll: &Self::Coll<T>) -> Result<()> {
        Ok(())
    }
}
