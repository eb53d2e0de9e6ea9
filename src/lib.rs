//! # shardseq
//!
//! A partition-parallel engine for FASTA/FASTQ collections that have been
//! split into arbitrary, independently processed partitions: per-record
//! and per-file algorithms (indexing, region extraction, set algebra
//! across files, deduplication) that produce results identical to a
//! single-machine, whole-file run while only ever seeing one partition,
//! or one key bucket, at a time.
//!
//! The distributed execution substrate itself (partitioning, scheduling,
//! shuffles) is an external collaborator consumed through the
//! [`substrate::Substrate`] trait; [`substrate::local::LocalSubstrate`]
//! is an in-process stand-in that runs partitions on worker threads.
//!
//! ## Layout
//!
//! - [`record`]: delimiter recovery and the streaming block parser
//! - [`index`]: the two-phase prefix-sum byte-offset indexer and region
//!   extraction
//! - [`algebra`]: subject keys, source tagging, and the per-bucket
//!   set-algebra reducers
//! - [`ops`]: driver functions wiring components over the substrate
//! - [`OrderedPartitionWriter`]: strict partition-order output

pub mod algebra;
mod alphabet;
mod config;
mod error;
pub mod index;
pub mod ops;
pub mod record;
pub mod substrate;
mod writer;

pub use alphabet::Alphabet;
pub use config::{
    BaseConfig, CommonOptions, CompareOptions, ConcatOptions, DuplicateOptions, FaidxOptions,
    PairOptions, RmdupOptions, SeqType,
};
pub use error::{ConfigError, Error, IndexError, ParseError, Result};
pub use writer::OrderedPartitionWriter;
