//! Batch-complete observers.
//!
//! Observers receive the full `BatchChanges` of every batch after the
//! delegate has seen `did_change_content`. They are notified in
//! registration order.

use crate::change_set::BatchChanges;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for batch notifications.
pub type ChangeCallback<R> = Box<dyn Fn(&BatchChanges<R>)>;

/// A registered observer.
pub struct Subscription<R> {
    id: SubscriptionId,
    callback: ChangeCallback<R>,
}

impl<R> Subscription<R> {
    /// Creates a new subscription.
    pub fn new<F>(id: SubscriptionId, callback: F) -> Self
    where
        F: Fn(&BatchChanges<R>) + 'static,
    {
        Self {
            id,
            callback: Box::new(callback),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Notifies this subscription of a batch.
    #[inline]
    pub fn notify(&self, changes: &BatchChanges<R>) {
        (self.callback)(changes);
    }
}

/// Manages the observers of one controller.
pub struct SubscriptionManager<R> {
    subscriptions: Vec<Subscription<R>>,
    next_id: SubscriptionId,
}

impl<R> Default for SubscriptionManager<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SubscriptionManager<R> {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&BatchChanges<R>) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.push(Subscription::new(id, callback));
        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id() != id);
        self.subscriptions.len() != before
    }

    /// Notifies every subscription, in registration order.
    pub fn notify_all(&self, changes: &BatchChanges<R>) {
        for sub in &self.subscriptions {
            sub.notify(changes);
        }
    }

    /// Returns the number of subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_set::RecordChange;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use tabula_core::{Entity, Location, Value};

    fn make_changes(id: u64) -> BatchChanges<Entity> {
        let mut changes = BatchChanges::new();
        changes.push_record(
            Entity::new(id, vec![Value::Int64(id as i64)]),
            RecordChange::Insert { at: Location::new(0, 0) },
        );
        changes
    }

    #[test]
    fn test_subscription_notify() {
        let called = Rc::new(RefCell::new(0usize));
        let called_clone = called.clone();

        let sub = Subscription::new(1, move |changes: &BatchChanges<Entity>| {
            *called_clone.borrow_mut() += changes.len();
        });
        assert_eq!(sub.id(), 1);

        sub.notify(&make_changes(7));
        assert_eq!(*called.borrow(), 1);
    }

    #[test]
    fn test_subscription_manager_subscribe() {
        let mut manager: SubscriptionManager<Entity> = SubscriptionManager::new();

        let id1 = manager.subscribe(|_| {});
        let id2 = manager.subscribe(|_| {});

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_subscription_manager_unsubscribe() {
        let mut manager: SubscriptionManager<Entity> = SubscriptionManager::new();

        let id = manager.subscribe(|_| {});
        assert!(manager.unsubscribe(id));
        assert!(manager.is_empty());

        assert!(!manager.unsubscribe(id)); // Already removed
    }

    #[test]
    fn test_subscription_manager_notifies_in_order() {
        let mut manager = SubscriptionManager::new();
        let log = Rc::new(RefCell::new(vec![]));

        for tag in ["first", "second", "third"] {
            let log = log.clone();
            manager.subscribe(move |_: &BatchChanges<Entity>| log.borrow_mut().push(tag));
        }

        manager.notify_all(&make_changes(1));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }
}
