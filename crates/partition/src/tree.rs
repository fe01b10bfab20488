//! Partition tree: orchestrates batches across an ordered list of sections.
//!
//! The tree owns no state beyond its sections. A batch runs in five strict
//! phases so that previous locations are captured before any section is
//! mutated and new locations only after every section has committed:
//!
//! 1. one `Transition` per changed record
//! 2. locate changed records in the visible sections and unstage them
//! 3. stage every live changed record into the first accepting section
//! 4. commit every section, in rank order
//! 5. locate changed records again
//!
//! Both locate passes only look at changed records, so their cost follows
//! the batch size rather than the collection size.

use crate::section::{Section, SectionDef};
use crate::transition::{BatchOutcome, Transition};
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use tabula_core::{Comparator, Error, Location, Record, RecordId, Result, SectionLocation};

/// An ordered list of sections resolved together, one batch at a time.
pub struct PartitionTree<R> {
    sections: Vec<Section<R>>,
}

impl<R: Record + 'static> Default for PartitionTree<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R: Record + 'static> PartitionTree<R> {
    /// Creates a tree from sections. Ranks are reassigned to match list order.
    pub fn new(mut sections: Vec<Section<R>>) -> Self {
        for (rank, section) in sections.iter_mut().enumerate() {
            section.set_rank(rank);
        }
        Self { sections }
    }

    /// Builds empty sections from definitions sharing one comparator.
    pub fn from_defs(defs: &[SectionDef<R>], comparator: Rc<dyn Comparator<R>>) -> Self {
        let sections = defs
            .iter()
            .enumerate()
            .map(|(rank, def)| def.build(rank, Rc::clone(&comparator)))
            .collect();
        Self { sections }
    }

    /// Returns every section in rank order.
    #[inline]
    pub fn sections(&self) -> &[Section<R>] {
        &self.sections
    }

    /// Finds a section by title.
    pub fn section_by_name(&self, name: &str) -> Option<&Section<R>> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Returns the visible sections in rank order.
    pub fn visible_sections(&self) -> Vec<&Section<R>> {
        self.sections.iter().filter(|s| s.is_visible()).collect()
    }

    /// Returns the number of visible sections.
    pub fn visible_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_visible()).count()
    }

    /// Returns the visible section at the given index.
    pub fn visible_section(&self, index: usize) -> Option<&Section<R>> {
        self.sections.iter().filter(|s| s.is_visible()).nth(index)
    }

    /// Returns the total number of committed records.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.len()).sum()
    }

    /// Returns true if no section holds a record.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.is_empty())
    }

    /// Iterates all visible records in section order.
    pub fn records(&self) -> impl Iterator<Item = &R> + '_ {
        self.sections
            .iter()
            .filter(|s| s.is_visible())
            .flat_map(|s| s.records().iter())
    }

    /// Resolves a batch of changed records and reports their transitions.
    ///
    /// Records are deduplicated by id: a record seen twice keeps its first
    /// position and its last value. Removed records are staged nowhere.
    /// Live records no section accepts are staged nowhere either and are
    /// listed in `BatchOutcome::unmatched`.
    pub fn process_changed_records<I>(&mut self, records: I) -> BatchOutcome<R>
    where
        I: IntoIterator<Item = R>,
    {
        self.process_changed_records_where(records, |_| true)
    }

    /// Like `process_changed_records`, but records failing `keep` depart
    /// the same way removed records do.
    ///
    /// Used by callers that know about removals or scope changes the record
    /// values themselves do not carry.
    pub fn process_changed_records_where<I, F>(&mut self, records: I, keep: F) -> BatchOutcome<R>
    where
        I: IntoIterator<Item = R>,
        F: Fn(&R) -> bool,
    {
        // Phase 1
        let mut transitions: Vec<Transition<R>> = Vec::new();
        let mut pending: HashMap<RecordId, usize> = HashMap::new();
        for record in records {
            match pending.get(&record.id()) {
                Some(&slot) => transitions[slot].record = record,
                None => {
                    pending.insert(record.id(), transitions.len());
                    transitions.push(Transition::new(record));
                }
            }
        }

        // Phase 2
        for (slot, at) in self.locate(&pending) {
            let transition = &mut transitions[slot];
            transition.previous = Some(at);
            self.sections[at.rank].unstage(&transition.record);
        }

        // Phase 3
        let mut unmatched = Vec::new();
        for transition in &transitions {
            let record = &transition.record;
            if record.is_removed() || !keep(record) {
                continue;
            }
            match self.section_for(record) {
                Some(rank) => self.sections[rank].stage(record.clone()),
                None => unmatched.push(record.id()),
            }
        }

        // Phase 4
        for section in &mut self.sections {
            section.commit();
        }

        // Phase 5
        for (slot, at) in self.locate(&pending) {
            transitions[slot].new = Some(at);
        }

        tracing::trace!(
            target: "tabula_partition::tree",
            changed = transitions.len(),
            unmatched = unmatched.len(),
            "resolved batch"
        );

        BatchOutcome {
            transitions,
            unmatched,
        }
    }

    /// Replaces all contents with the given records, without transitions.
    ///
    /// Returns the ids of live records no section accepted.
    pub fn load<I>(&mut self, records: I) -> Vec<RecordId>
    where
        I: IntoIterator<Item = R>,
    {
        self.reset();

        let mut unmatched = Vec::new();
        for record in records {
            if record.is_removed() {
                continue;
            }
            match self.section_for(&record) {
                Some(rank) => self.sections[rank].stage(record),
                None => unmatched.push(record.id()),
            }
        }
        for section in &mut self.sections {
            section.commit();
        }
        unmatched
    }

    /// Clears every section.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Replaces the comparator of every section.
    ///
    /// Committed order is left alone until the next batch or `load`.
    pub fn set_comparator(&mut self, comparator: Rc<dyn Comparator<R>>) {
        for section in &mut self.sections {
            section.set_comparator(Rc::clone(&comparator));
        }
    }

    /// Returns the record at a visible location.
    pub fn object_at(&self, location: Location) -> Result<&R> {
        self.visible_section(location.section)
            .and_then(|section| section.records().get(location.row))
            .ok_or_else(|| Error::location_out_of_range(location, self.visible_count()))
    }

    /// Returns the visible location of the record with the given id.
    pub fn location_of(&self, id: RecordId) -> Option<Location> {
        self.sections
            .iter()
            .filter(|s| s.is_visible())
            .enumerate()
            .find_map(|(index, section)| {
                section.index_of(id).map(|row| Location::new(index, row))
            })
    }

    /// Finds the first section, by rank, that accepts the record.
    fn section_for(&self, record: &R) -> Option<usize> {
        self.sections.iter().position(|s| s.accepts(record))
    }

    /// Locates every pending record in the visible sections.
    ///
    /// Returns `(transition slot, location)` pairs.
    fn locate(&self, pending: &HashMap<RecordId, usize>) -> Vec<(usize, SectionLocation)> {
        let mut found = Vec::new();
        let visible = self.sections.iter().filter(|s| s.is_visible());
        for (index, section) in visible.enumerate() {
            for (row, record) in section.records().iter().enumerate() {
                if let Some(&slot) = pending.get(&record.id()) {
                    let at = SectionLocation::new(section.rank(), Location::new(index, row));
                    found.push((slot, at));
                }
            }
        }
        found
    }
}
