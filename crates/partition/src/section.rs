//! Sections: filtered, sorted partitions of the record collection.
//!
//! A Section maintains both its committed, ordered member list and the
//! membership changes staged for the current batch. Staged changes have no
//! effect until `commit`, which resolves them all at once and re-sorts.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::{HashMap, HashSet};
use tabula_core::{Comparator, Predicate, Record, RecordId};

/// Reusable configuration a Section is built from.
///
/// Definitions are cheap to clone, so a controller can rebuild its
/// sections whenever the sort order or the section list changes.
pub struct SectionDef<R> {
    name: String,
    predicate: Rc<dyn Predicate<R>>,
    always_visible: bool,
}

impl<R> Clone for SectionDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: Rc::clone(&self.predicate),
            always_visible: self.always_visible,
        }
    }
}

impl<R: Record + 'static> SectionDef<R> {
    /// Creates a definition with the given title and membership predicate.
    pub fn new<P>(name: impl Into<String>, predicate: P) -> Self
    where
        P: Predicate<R> + 'static,
    {
        Self {
            name: name.into(),
            predicate: Rc::new(predicate),
            always_visible: false,
        }
    }

    /// Keeps the section visible even when it has no members.
    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    /// Returns the section title.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the section is shown while empty.
    #[inline]
    pub fn is_always_visible(&self) -> bool {
        self.always_visible
    }

    /// Builds an empty section at the given rank.
    pub fn build(&self, rank: usize, comparator: Rc<dyn Comparator<R>>) -> Section<R> {
        Section {
            name: self.name.clone(),
            rank,
            always_visible: self.always_visible,
            predicate: Rc::clone(&self.predicate),
            comparator,
            committed: Vec::new(),
            staged_in: HashMap::new(),
            staged_out: HashSet::new(),
        }
    }
}

impl<R> fmt::Debug for SectionDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionDef")
            .field("name", &self.name)
            .field("always_visible", &self.always_visible)
            .finish_non_exhaustive()
    }
}

/// A named, ordered, filtered partition of records.
///
/// Outside of a batch both staged sets are empty. Within a batch they are
/// disjoint: staging a record withdraws any pending removal and vice versa.
pub struct Section<R> {
    name: String,
    /// Position in the owning tree, used as the section's identity
    rank: usize,
    always_visible: bool,
    predicate: Rc<dyn Predicate<R>>,
    comparator: Rc<dyn Comparator<R>>,
    /// Authoritative ordered member list
    committed: Vec<R>,
    /// Candidates to add, keyed by id so the latest value wins
    staged_in: HashMap<RecordId, R>,
    /// Candidates to remove
    staged_out: HashSet<RecordId>,
}

impl<R: Record> Section<R> {
    /// Returns the section title.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the section's rank among its siblings.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    /// Returns whether the section is shown while empty.
    #[inline]
    pub fn always_visible(&self) -> bool {
        self.always_visible
    }

    /// Returns true if the section should be displayed.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.always_visible || !self.committed.is_empty()
    }

    /// Returns true if the section's predicate accepts the record.
    #[inline]
    pub fn accepts(&self, record: &R) -> bool {
        self.predicate.evaluate(record)
    }

    /// Returns the committed, ordered members.
    #[inline]
    pub fn records(&self) -> &[R] {
        &self.committed
    }

    /// Returns the number of committed members.
    #[inline]
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Returns true if there are no committed members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Returns true if there are staged changes awaiting `commit`.
    #[inline]
    pub fn has_staged(&self) -> bool {
        !self.staged_in.is_empty() || !self.staged_out.is_empty()
    }

    /// Returns the number of staged additions and removals.
    #[inline]
    pub fn staged_len(&self) -> (usize, usize) {
        (self.staged_in.len(), self.staged_out.len())
    }

    /// Marks a record as a candidate member.
    pub fn stage(&mut self, record: R) {
        let id = record.id();
        self.staged_out.remove(&id);
        self.staged_in.insert(id, record);
    }

    /// Marks a record as a candidate removal.
    pub fn unstage(&mut self, record: &R) {
        let id = record.id();
        self.staged_in.remove(&id);
        self.staged_out.insert(id);
    }

    /// Resolves staged changes into the committed list and re-sorts it.
    ///
    /// The list is always re-sorted, even with nothing staged, so callers
    /// never need to detect no-op batches. Comparator ties are broken by
    /// record id.
    pub fn commit(&mut self) {
        let staged_out = core::mem::take(&mut self.staged_out);
        let staged_in = core::mem::take(&mut self.staged_in);

        if !staged_out.is_empty() || !staged_in.is_empty() {
            self.committed.retain(|record| {
                let id = record.id();
                !staged_out.contains(&id) && !staged_in.contains_key(&id)
            });
            self.committed.extend(staged_in.into_values());
        }

        let comparator = &self.comparator;
        self.committed
            .sort_by(|a, b| comparator.compare(a, b).then_with(|| a.id().cmp(&b.id())));
    }

    /// Clears committed members and both staged sets.
    pub fn reset(&mut self) {
        self.committed.clear();
        self.staged_in.clear();
        self.staged_out.clear();
    }

    /// Returns the committed index of the record with the given id.
    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.committed.iter().position(|record| record.id() == id)
    }

    /// Replaces the comparator. Takes effect at the next `commit`.
    pub fn set_comparator(&mut self, comparator: Rc<dyn Comparator<R>>) {
        self.comparator = comparator;
    }
}

impl<R> fmt::Debug for Section<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("rank", &self.rank)
            .field("always_visible", &self.always_visible)
            .field("len", &self.committed.len())
            .field("staged_in", &self.staged_in.len())
            .field("staged_out", &self.staged_out.len())
            .finish()
    }
}
