//! Tabula Partition - Incremental section resolution for Tabula.
//!
//! This crate splits a record collection into named, ordered sections and
//! keeps them current as batches of changed records arrive, reporting where
//! each changed record was before the batch and where it is after.
//!
//! # Core Concepts
//!
//! - `Section`: A filtered, sorted partition with a stage/unstage/commit protocol
//! - `SectionDef`: Reusable configuration a Section is built from
//! - `PartitionTree`: An ordered list of sections resolved together per batch
//! - `Transition`: A changed record's previous/new location pair
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use tabula_core::{Entity, Location, Order, SortDescriptor, SortDescriptors, Value};
//! use tabula_partition::{PartitionTree, SectionDef};
//!
//! let is_open = |e: &Entity| e.get(1).and_then(|v| v.as_bool()) == Some(true);
//! let is_closed = |e: &Entity| e.get(1).and_then(|v| v.as_bool()) == Some(false);
//! let defs = vec![SectionDef::new("Open", is_open), SectionDef::new("Closed", is_closed)];
//! let by_name = SortDescriptors::new().with(SortDescriptor::field(0, Order::Asc));
//!
//! let mut tree = PartitionTree::from_defs(&defs, Rc::new(by_name));
//!
//! let outcome = tree.process_changed_records(vec![
//!     Entity::new(1, vec![Value::from("b"), Value::Boolean(true)]),
//!     Entity::new(2, vec![Value::from("a"), Value::Boolean(true)]),
//! ]);
//!
//! assert!(outcome.transitions.iter().all(|t| t.is_insert()));
//! assert_eq!(tree.location_of(2), Some(Location::new(0, 0)));
//! assert_eq!(tree.visible_count(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod section;
pub mod transition;
pub mod tree;

pub use section::{Section, SectionDef};
pub use transition::{BatchOutcome, Transition};
pub use tree::PartitionTree;
