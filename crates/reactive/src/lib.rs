//! Tabula Reactive - keeps a sectioned view in sync with a record store.
//!
//! An `EntityController` fetches the records a `FetchRequest` covers,
//! splits them into sections, and from then on turns each
//! `ChangeNotification` into the minimal section and record edits, which
//! it reports to a `ControllerDelegate` and to batch observers.
//!
//! # Core Concepts
//!
//! - `EntityController`: owns the partition tree and runs batches
//! - `ControllerDelegate`: receives edits in delivery order
//! - `ChangeFeed`: routes store notifications to attached controllers
//! - `RecordSource`: executes fetch requests; `VecSource` keeps records in memory
//! - `BatchChanges`: the events of one batch, handed to observers
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use tabula_core::{Entity, Order, SortDescriptor, SortDescriptors, Value};
//! use tabula_partition::SectionDef;
//! use tabula_reactive::{ChangeFeed, ChangeNotification, EntityController, FetchRequest, VecSource};
//!
//! let defs = vec![
//!     SectionDef::new("Waiting", |e: &Entity| e.get(0).and_then(|v| v.as_str()) == Some("waiting")),
//!     SectionDef::new("Seated", |e: &Entity| e.get(0).and_then(|v| v.as_str()) == Some("seated")),
//! ];
//! let by_arrival = SortDescriptors::new().with(SortDescriptor::field(1, Order::Asc));
//!
//! let source = Rc::new(VecSource::new());
//! let mut controller =
//!     EntityController::new(Rc::clone(&source), FetchRequest::all(by_arrival), &defs).unwrap();
//! controller.perform_fetch().unwrap();
//!
//! let feed = ChangeFeed::new();
//! let controller = controller.attach(&feed);
//!
//! let guest = Entity::new(1, vec![Value::from("waiting"), Value::Int64(1)]);
//! source.upsert(guest.clone());
//! feed.publish(&ChangeNotification::new().insert(guest));
//!
//! assert_eq!(controller.borrow().title(0), Ok("Waiting"));
//! ```

#![no_std]

extern crate alloc;

pub mod change_set;
pub mod controller;
pub mod delegate;
pub mod feed;
pub mod source;
pub mod subscription;

pub use change_set::{BatchChanges, RecordChange, RecordEvent, SectionChange, SectionEvent, SectionInfo};
pub use controller::EntityController;
pub use delegate::ControllerDelegate;
pub use feed::{ChangeFeed, ChangeListener, ChangeNotification, FeedSubscription, ListenerId};
pub use source::{FetchRequest, RecordSource, VecSource};
pub use subscription::{ChangeCallback, Subscription, SubscriptionId, SubscriptionManager};

// Re-export commonly used types from dependencies
pub use tabula_core::{Error, Location, Record, RecordId, Result};
pub use tabula_partition::SectionDef;
