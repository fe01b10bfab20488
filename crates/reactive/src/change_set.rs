//! Batch changes delivered to a view.
//!
//! A `BatchChanges` is the complete, ordered list of section and record
//! events one batch produced: section deletions, then section insertions,
//! then one event per changed record in input order.

use alloc::string::String;
use alloc::vec::Vec;
use tabula_core::Location;
use tabula_partition::Transition;

/// Identifies the section a section event refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    /// Section title
    pub name: String,
    /// Position among all configured sections
    pub rank: usize,
}

/// A change to a whole section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionChange {
    /// The section became populated; `index` is its post-batch visible index.
    Insert { index: usize },
    /// The section emptied; `index` is its pre-batch visible index.
    Delete { index: usize },
}

/// A change to an individual record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordChange {
    Insert { at: Location },
    Delete { at: Location },
    Update { at: Location },
    Move { from: Location, to: Location },
}

impl RecordChange {
    /// Classifies a transition.
    ///
    /// Returns None for a record that was visible neither before nor after
    /// the batch.
    pub fn from_transition<R>(transition: &Transition<R>) -> Option<Self> {
        match (transition.previous, transition.new) {
            (Some(previous), None) => Some(RecordChange::Delete {
                at: previous.location,
            }),
            (None, Some(new)) => Some(RecordChange::Insert { at: new.location }),
            (Some(previous), Some(new)) if previous == new => {
                Some(RecordChange::Update { at: new.location })
            }
            (Some(previous), Some(new)) => Some(RecordChange::Move {
                from: previous.location,
                to: new.location,
            }),
            (None, None) => None,
        }
    }
}

/// A section event within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionEvent {
    pub section: SectionInfo,
    pub change: SectionChange,
}

/// A record event within a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordEvent<R> {
    pub record: R,
    pub change: RecordChange,
}

/// The events one batch produced, in delivery order.
#[derive(Clone, Debug)]
pub struct BatchChanges<R> {
    /// Section deletions followed by section insertions
    pub sections: Vec<SectionEvent>,
    /// Record events in input order
    pub records: Vec<RecordEvent<R>>,
}

impl<R> Default for BatchChanges<R> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<R> BatchChanges<R> {
    /// Creates an empty change list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the batch produced no events.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.records.is_empty()
    }

    /// Returns the total number of events.
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len() + self.records.len()
    }

    /// Records a section event.
    #[inline]
    pub fn push_section(&mut self, section: SectionInfo, change: SectionChange) {
        self.sections.push(SectionEvent { section, change });
    }

    /// Records a record event.
    #[inline]
    pub fn push_record(&mut self, record: R, change: RecordChange) {
        self.records.push(RecordEvent { record, change });
    }

    /// Returns the number of record insertions.
    pub fn inserted(&self) -> usize {
        self.count(|c| matches!(c, RecordChange::Insert { .. }))
    }

    /// Returns the number of record deletions.
    pub fn deleted(&self) -> usize {
        self.count(|c| matches!(c, RecordChange::Delete { .. }))
    }

    /// Returns the number of in-place record updates.
    pub fn updated(&self) -> usize {
        self.count(|c| matches!(c, RecordChange::Update { .. }))
    }

    /// Returns the number of record moves.
    pub fn moved(&self) -> usize {
        self.count(|c| matches!(c, RecordChange::Move { .. }))
    }

    fn count(&self, f: impl Fn(&RecordChange) -> bool) -> usize {
        self.records.iter().filter(|e| f(&e.change)).count()
    }
}
