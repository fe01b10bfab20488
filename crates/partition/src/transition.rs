//! Per-record transitions computed by a batch.
//!
//! A Transition pairs a changed record with where it sat before the batch
//! and where it sits after. Either side may be missing: a record that only
//! has a new location was inserted, one that only has a previous location
//! departed.

use alloc::vec::Vec;
use tabula_core::{Location, Record, RecordId, SectionLocation};

/// A record's previous/new location pair within one batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<R> {
    /// The latest value of the changed record
    pub record: R,
    /// Location before the batch, if the record was visible
    pub previous: Option<SectionLocation>,
    /// Location after the batch, if the record is visible
    pub new: Option<SectionLocation>,
}

impl<R: Record> Transition<R> {
    /// Creates a transition with both locations unset.
    #[inline]
    pub fn new(record: R) -> Self {
        Self {
            record,
            previous: None,
            new: None,
        }
    }

    /// Returns the id of the changed record.
    #[inline]
    pub fn id(&self) -> RecordId {
        self.record.id()
    }

    /// Returns true if the record appeared (no previous location).
    #[inline]
    pub fn is_insert(&self) -> bool {
        self.previous.is_none() && self.new.is_some()
    }

    /// Returns true if the record departed (no new location).
    #[inline]
    pub fn is_delete(&self) -> bool {
        self.previous.is_some() && self.new.is_none()
    }

    /// Returns true if the record stayed in the same section at the same location.
    #[inline]
    pub fn is_in_place(&self) -> bool {
        matches!((self.previous, self.new), (Some(p), Some(n)) if p == n)
    }

    /// Returns true if the record is visible on both sides but somewhere else.
    #[inline]
    pub fn is_move(&self) -> bool {
        matches!((self.previous, self.new), (Some(p), Some(n)) if p != n)
    }

    /// Returns true if the record was never visible in this batch.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.previous.is_none() && self.new.is_none()
    }

    /// Returns the previous visible location.
    #[inline]
    pub fn previous_location(&self) -> Option<Location> {
        self.previous.map(|p| p.location)
    }

    /// Returns the new visible location.
    #[inline]
    pub fn new_location(&self) -> Option<Location> {
        self.new.map(|n| n.location)
    }
}

/// The result of one `PartitionTree::process_changed_records` call.
#[derive(Clone, Debug)]
pub struct BatchOutcome<R> {
    /// One transition per distinct input record, in input order
    pub transitions: Vec<Transition<R>>,
    /// Non-removed records no section accepted
    pub unmatched: Vec<RecordId>,
}

impl<R> Default for BatchOutcome<R> {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            unmatched: Vec::new(),
        }
    }
}

impl<R> BatchOutcome<R> {
    /// Returns the number of transitions.
    #[inline]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns true if no record was processed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
