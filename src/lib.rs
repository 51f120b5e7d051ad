//! An unbalanced binary search tree map with live views.
//!
//! This crate provides [`BstMap`], an ordered map whose entries live in the
//! nodes of a plain binary search tree, together with three *live views* of
//! it: [`KeySet`], [`ValueCollection`], and [`EntrySet`]. A view borrows its
//! map, answers every query from the map's current contents, and removes
//! entries through the map.
//!
//! # Example
//!
//! ```
//! use bst_map::{BstMap, MapError, View};
//!
//! let mut scores = BstMap::new();
//! scores.insert("Bob", 85);
//! scores.insert("Alice", 100);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.get("Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Views read through to the map...
//! let mut names = scores.key_set();
//! assert!(names.contains(&"Carol"));
//! // ...can shrink it...
//! assert!(names.remove(&"Bob"));
//! // ...but never grow it.
//! assert_eq!(names.add("Dave"), Err(MapError::Unsupported { operation: "add" }));
//!
//! assert_eq!(scores.keys().copied().collect::<Vec<_>>(), ["Alice", "Carol"]);
//! ```
//!
//! # Implementation
//!
//! Nodes are stored in an arena and addressed by stable handles; each node
//! keeps handles to its parent and both children. The tree is never
//! rebalanced: its height depends on the order of insertions and removals and
//! can grow to the number of entries.
//!
//! View cursors iterate over a snapshot taken when they are created and
//! remove entries by looking their key up again in the live map, so a cursor
//! never observes a half-spliced tree.

#![no_std]
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

mod error;
mod hashing;
mod raw;

pub mod bst_map;

pub use bst_map::{BstMap, Cursor, EntrySet, KeySet, ValueCollection, View};
pub use error::MapError;
