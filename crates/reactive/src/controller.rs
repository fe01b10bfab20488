//! Entity controller.
//!
//! `EntityController` keeps a `PartitionTree` in sync with a record store
//! and turns every batch of changed records into the section and record
//! edits a view needs. A batch runs as:
//!
//! 1. keep the changed records the request covers, plus those currently
//!    shown (so they can leave); stop silently if none remain
//! 2. snapshot the visible sections with their record counts
//! 3. `will_change_content`
//! 4. resolve the batch in the tree
//! 5. section deletions for sections that held records and now hold none,
//!    by pre-batch index
//! 6. section insertions for newly visible sections holding records, by
//!    post-batch index
//! 7. one record change per transition, in input order
//! 8. `did_change_content`, then batch observers
//!
//! Full reloads (`perform_fetch`, sort or section changes) bypass the diff
//! and report `did_reload_content` instead.

use crate::change_set::{BatchChanges, RecordChange, SectionChange, SectionInfo};
use crate::delegate::ControllerDelegate;
use crate::feed::{ChangeFeed, ChangeListener, ChangeNotification, FeedSubscription};
use crate::source::{FetchRequest, RecordSource};
use crate::subscription::{SubscriptionId, SubscriptionManager};
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashSet;
use tabula_core::{Error, Location, Record, RecordId, Result, SortDescriptors};
use tabula_partition::{BatchOutcome, PartitionTree, Section, SectionDef};

/// Drives a sectioned view of the records a `FetchRequest` covers.
pub struct EntityController<R, S> {
    source: S,
    request: FetchRequest<R>,
    tree: PartitionTree<R>,
    delegate: Option<Weak<dyn ControllerDelegate<R>>>,
    subscriptions: SubscriptionManager<R>,
    feed_subscription: Option<FeedSubscription<R>>,
}

impl<R: Record + 'static, S: RecordSource<R>> EntityController<R, S> {
    /// Creates a controller with empty sections.
    ///
    /// Nothing is fetched until `perform_fetch` is called. Fails if `defs`
    /// is empty or repeats a section name.
    pub fn new(source: S, request: FetchRequest<R>, defs: &[SectionDef<R>]) -> Result<Self> {
        validate_sections(defs)?;
        let tree = PartitionTree::from_defs(defs, request.comparator());
        Ok(Self {
            source,
            request,
            tree,
            delegate: None,
            subscriptions: SubscriptionManager::new(),
            feed_subscription: None,
        })
    }

    /// Sets the delegate. The controller holds it weakly.
    pub fn set_delegate<D>(&mut self, delegate: &Rc<D>)
    where
        D: ControllerDelegate<R> + 'static,
    {
        let delegate: Rc<dyn ControllerDelegate<R>> = delegate.clone();
        self.delegate = Some(Rc::downgrade(&delegate));
    }

    /// Removes the delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    fn delegate(&self) -> Option<Rc<dyn ControllerDelegate<R>>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    /// Registers a batch observer.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&BatchChanges<R>) + 'static,
    {
        self.subscriptions.subscribe(callback)
    }

    /// Removes a batch observer.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Returns the number of batch observers.
    #[inline]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns the fetch request.
    #[inline]
    pub fn request(&self) -> &FetchRequest<R> {
        &self.request
    }

    /// Returns the record source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the partition tree backing the view.
    #[inline]
    pub fn tree(&self) -> &PartitionTree<R> {
        &self.tree
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Returns the number of visible sections.
    #[inline]
    pub fn section_count(&self) -> usize {
        self.tree.visible_count()
    }

    /// Returns the number of rows in a visible section.
    pub fn row_count(&self, section: usize) -> Result<usize> {
        self.tree
            .visible_section(section)
            .map(|s| s.len())
            .ok_or_else(|| Error::section_out_of_range(section, self.section_count()))
    }

    /// Returns the title of a visible section.
    pub fn title(&self, section: usize) -> Result<&str> {
        self.tree
            .visible_section(section)
            .map(|s| s.name())
            .ok_or_else(|| Error::section_out_of_range(section, self.section_count()))
    }

    /// Returns the record at a visible location.
    #[inline]
    pub fn record_at(&self, location: Location) -> Result<&R> {
        self.tree.object_at(location)
    }

    /// Returns the visible location of a record.
    #[inline]
    pub fn location_of(&self, id: RecordId) -> Option<Location> {
        self.tree.location_of(id)
    }

    /// Iterates all visible records in section order.
    pub fn records(&self) -> impl Iterator<Item = &R> + '_ {
        self.tree.records()
    }

    /// Describes the visible sections in display order.
    pub fn visible_sections(&self) -> Vec<SectionInfo> {
        self.tree
            .visible_sections()
            .into_iter()
            .map(section_info)
            .collect()
    }

    fn committed_len(&self, rank: usize) -> usize {
        self.tree.sections().get(rank).map_or(0, |s| s.len())
    }

    // ---------------------------------------------------------------------
    // Reloads
    // ---------------------------------------------------------------------

    /// Refetches everything and rebuilds the view.
    ///
    /// On a fetch failure the view is left empty; the error is reported to
    /// the delegate and returned. A record no section accepts is reported
    /// the same way once the reload is done.
    pub fn perform_fetch(&mut self) -> Result<()> {
        let records = match self.source.fetch(&self.request) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    target: "tabula_reactive::controller",
                    error = %err,
                    "fetch failed, showing an empty result"
                );
                self.tree.reset();
                let err = Error::from(err);
                if let Some(delegate) = self.delegate() {
                    delegate.did_reload_content();
                    delegate.did_report_error(&err);
                }
                return Err(err);
            }
        };

        let request = &self.request;
        let unmatched = self
            .tree
            .load(records.into_iter().filter(|r| request.accepts(r)));

        tracing::debug!(
            target: "tabula_reactive::controller",
            records = self.tree.len(),
            sections = self.tree.visible_count(),
            "reloaded content"
        );

        if let Some(delegate) = self.delegate() {
            delegate.did_reload_content();
        }
        self.report_unmatched(&unmatched)
    }

    /// Changes how every section sorts, then reloads.
    pub fn set_sort_descriptors(&mut self, sort: SortDescriptors<R>) -> Result<()> {
        self.request.set_sort(sort);
        self.tree.set_comparator(self.request.comparator());
        tracing::debug!(
            target: "tabula_reactive::controller",
            keys = self.request.sort().len(),
            "sort descriptors changed"
        );
        self.perform_fetch()
    }

    /// Replaces the section definitions, then reloads.
    ///
    /// Invalid definitions leave the current sections untouched.
    pub fn set_sections(&mut self, defs: &[SectionDef<R>]) -> Result<()> {
        validate_sections(defs)?;
        self.tree = PartitionTree::from_defs(defs, self.request.comparator());
        tracing::debug!(
            target: "tabula_reactive::controller",
            sections = defs.len(),
            "sections changed"
        );
        self.perform_fetch()
    }

    // ---------------------------------------------------------------------
    // Batches
    // ---------------------------------------------------------------------

    /// Applies one store notification and reports the resulting edits.
    ///
    /// The batch is always applied and fully delivered. If a live record
    /// matched no section, it is removed from the view, reported to the
    /// delegate, and the first such violation is returned as the error.
    pub fn on_change(&mut self, notification: &ChangeNotification<R>) -> Result<BatchChanges<R>> {
        // Step 1
        let accepted: Vec<bool> = notification.iter().map(|r| self.request.accepts(r)).collect();
        let rejected: HashSet<RecordId> = notification
            .iter()
            .zip(&accepted)
            .filter(|(_, ok)| !**ok)
            .map(|(r, _)| r.id())
            .collect();
        let shown: HashSet<RecordId> = if rejected.is_empty() {
            HashSet::new()
        } else {
            self.tree
                .records()
                .map(|r| r.id())
                .filter(|id| rejected.contains(id))
                .collect()
        };
        let changed: Vec<R> = notification
            .iter()
            .zip(&accepted)
            .filter(|(r, ok)| **ok || shown.contains(&r.id()))
            .map(|(r, _)| r.clone())
            .collect();
        if changed.is_empty() {
            return Ok(BatchChanges::new());
        }

        tracing::debug!(
            target: "tabula_reactive::controller",
            changed = changed.len(),
            "applying batch"
        );

        // Step 2
        let before: Vec<(SectionInfo, usize)> = self
            .tree
            .visible_sections()
            .into_iter()
            .map(|s| (section_info(s), s.len()))
            .collect();

        // Step 3
        let delegate = self.delegate();
        if let Some(delegate) = &delegate {
            delegate.will_change_content();
        }

        // Step 4
        let deleted = notification.deleted_ids();
        let request = &self.request;
        let BatchOutcome {
            transitions,
            unmatched,
        } = self.tree.process_changed_records_where(changed, |r| {
            !deleted.contains(&r.id()) && request.accepts(r)
        });
        let after = self.visible_sections();

        let mut changes = BatchChanges::new();

        // Step 5
        for (index, (section, count)) in before.iter().enumerate() {
            if *count > 0 && self.committed_len(section.rank) == 0 {
                changes.push_section(section.clone(), SectionChange::Delete { index });
            }
        }

        // Step 6
        for (index, section) in after.iter().enumerate() {
            let known = before.iter().any(|(s, _)| s.rank == section.rank);
            if !known && self.committed_len(section.rank) > 0 {
                changes.push_section(section.clone(), SectionChange::Insert { index });
            }
        }

        // Step 7
        for transition in transitions {
            if let Some(change) = RecordChange::from_transition(&transition) {
                tracing::trace!(
                    target: "tabula_reactive::controller",
                    id = transition.id(),
                    change = ?change,
                    "record changed"
                );
                changes.push_record(transition.record, change);
            }
        }

        if let Some(delegate) = &delegate {
            for event in &changes.sections {
                delegate.did_change_section(&event.section, event.change);
            }
            for event in &changes.records {
                delegate.did_change_record(&event.record, event.change);
            }
        }

        // Step 8
        if let Some(delegate) = &delegate {
            delegate.did_change_content();
        }
        self.subscriptions.notify_all(&changes);

        tracing::debug!(
            target: "tabula_reactive::controller",
            sections = changes.sections.len(),
            inserted = changes.inserted(),
            deleted = changes.deleted(),
            updated = changes.updated(),
            moved = changes.moved(),
            "batch applied"
        );

        self.report_unmatched(&unmatched)?;
        Ok(changes)
    }

    /// Logs and reports every unmatched record; returns the first as an error.
    fn report_unmatched(&self, unmatched: &[RecordId]) -> Result<()> {
        let mut first = None;
        for &id in unmatched {
            tracing::warn!(
                target: "tabula_reactive::controller",
                id,
                "record matched no section"
            );
            let err = Error::invariant_violation(id, "no section accepts the record");
            if let Some(delegate) = self.delegate() {
                delegate.did_report_error(&err);
            }
            first.get_or_insert(err);
        }
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------------
    // Feed
    // ---------------------------------------------------------------------

    /// Moves the controller behind a shared handle listening to `feed`.
    ///
    /// The registration lives as long as the controller, or until `detach`.
    pub fn attach(self, feed: &ChangeFeed<R>) -> Rc<RefCell<Self>>
    where
        S: 'static,
    {
        let controller = Rc::new(RefCell::new(self));
        let listener: Rc<RefCell<dyn ChangeListener<R>>> = controller.clone();
        let subscription = feed.subscribe(Rc::downgrade(&listener));
        controller.borrow_mut().feed_subscription = Some(subscription);
        controller
    }

    /// Stops listening to the attached feed.
    ///
    /// Returns true if the controller was attached.
    pub fn detach(&mut self) -> bool {
        self.feed_subscription.take().is_some()
    }

    /// Returns true while the controller listens to a feed.
    pub fn is_attached(&self) -> bool {
        self.feed_subscription
            .as_ref()
            .map(|s| s.is_active())
            .unwrap_or(false)
    }
}

impl<R: Record + 'static, S: RecordSource<R>> ChangeListener<R> for EntityController<R, S> {
    fn on_change(&mut self, notification: &ChangeNotification<R>) {
        // Violations already reached the delegate.
        let _ = EntityController::on_change(self, notification);
    }
}

fn section_info<R: Record>(section: &Section<R>) -> SectionInfo {
    SectionInfo {
        name: section.name().into(),
        rank: section.rank(),
    }
}

fn validate_sections<R: Record + 'static>(defs: &[SectionDef<R>]) -> Result<()> {
    if defs.is_empty() {
        return Err(Error::configuration("at least one section is required"));
    }
    let mut names = HashSet::new();
    for def in defs {
        if !names.insert(def.name()) {
            return Err(Error::configuration(alloc::format!(
                "duplicate section name: {}",
                def.name()
            )));
        }
    }
    Ok(())
}
