//! Tabula Core - Core types shared by the Tabula sectioned-view engine.
//!
//! This crate provides the foundational types for partitioning a record
//! collection into ordered sections:
//!
//! - `Record`: The identity contract every managed record satisfies
//! - `Entity`: A ready-made record holding a list of `Value` fields
//! - `Value`: Totally ordered sort-key values
//! - `Location`: A `(section, row)` pair within the visible partition
//! - `Comparator` / `SortDescriptors`: Record ordering
//! - `Predicate`: Record filtering
//! - `Error`: Error taxonomy for fetch, read and partition failures
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{Comparator, Entity, Order, SortDescriptor, SortDescriptors, Value};
//!
//! let by_name: SortDescriptors<Entity> = SortDescriptors::new()
//!     .with(SortDescriptor::field(0, Order::Asc))
//!     .with(SortDescriptor::field(1, Order::Desc));
//!
//! let alice = Entity::new(1, vec![Value::from("Alice"), Value::Int64(10)]);
//! let bob = Entity::new(2, vec![Value::from("Bob"), Value::Int64(5)]);
//!
//! assert!(by_name.is_less(&alice, &bob));
//! assert_eq!(alice.get(0), Some(&Value::String("Alice".into())));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod location;
mod predicate;
mod record;
mod sort;
mod value;

pub use error::{Error, FetchError, Result};
pub use location::{Location, SectionLocation};
pub use predicate::Predicate;
pub use record::{Entity, Record, RecordId};
pub use sort::{Comparator, KeyFn, Order, SortDescriptor, SortDescriptors};
pub use value::Value;
