//! A comparison-counting AVL index for Rust.
//!
//! This crate provides [`AvlMap`], an ordered map backed by an AVL tree that
//! counts every key comparison made by insertions and lookups, so the cost of
//! individual operations can be measured:
//!
//! - [`insert`](AvlMap::insert) - Add an entry; an existing key keeps its first value
//! - [`lookup`](AvlMap::lookup) - Find the value for a key
//! - [`comparisons`](AvlMap::comparisons) / [`reset_counters`](AvlMap::reset_counters) -
//!   Read and zero the insert and search counters
//!
//! Around the index sit the collaborators of the `avl-index` binary: a
//! [`RecordSource`] that streams tab-separated knowledge-base records, a
//! [`TermDatabase`] that indexes them by term and answers single and batch
//! queries, and an [`experiment`] driver that measures comparison counts over
//! random subsets and writes them as CSV.
//!
//! # Example
//!
//! ```
//! use avl_index::AvlMap;
//!
//! let mut index = AvlMap::new();
//! for key in [5, 3, 8, 1, 4, 7] {
//!     index.insert(key, key * 10);
//! }
//!
//! // Measure a single insertion: 9 is compared with 5 and then 8.
//! index.reset_counters();
//! index.insert(9, 90);
//! assert_eq!(index.insert_comparisons(), 2);
//!
//! // Duplicates are ignored; the first value wins.
//! index.insert(5, 0);
//! assert_eq!(index.lookup(&5), Some(&50));
//!
//! // Measure a single lookup: the root holds 5, so one comparison finds it.
//! index.reset_counters();
//! assert_eq!(index.lookup(&5), Some(&50));
//! assert_eq!(index.search_comparisons(), 1);
//! ```
//!
//! # Implementation
//!
//! Nodes live in an append-only arena and link to their children through
//! non-zero `u32` handles, so each parent exclusively owns its children and the
//! whole tree is released in one deallocation. Insertion descends iteratively,
//! remembers its path, and then rebalances that path bottom-up with single or
//! double rotations.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod avl_map;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod experiment;
pub mod query;
pub mod record;

pub use avl_map::{AvlMap, Comparisons, NodeRef};
pub use database::{Definition, TermDatabase};
pub use error::{Error, Result};
pub use query::{BatchReport, QueryOutcome};
pub use record::{ParseLineError, Record, RecordSource};
