//! Store-side change feed.
//!
//! A `ChangeFeed` routes `ChangeNotification`s from whatever owns the
//! records to the controllers displaying them. Listeners are held weakly:
//! a listener that has been dropped is skipped and pruned by `cleanup`.
//! Each registration is owned by a `FeedSubscription`, which unregisters
//! when dropped.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashSet;
use tabula_core::{Record, RecordId};

/// Unique identifier for a feed registration.
pub type ListenerId = u64;

/// The records that changed in one store transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeNotification<R> {
    pub inserted: Vec<R>,
    pub updated: Vec<R>,
    pub deleted: Vec<R>,
}

impl<R> Default for ChangeNotification<R> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<R: Record> ChangeNotification<R> {
    /// Creates an empty notification.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inserted record.
    pub fn insert(mut self, record: R) -> Self {
        self.inserted.push(record);
        self
    }

    /// Adds an updated record.
    pub fn update(mut self, record: R) -> Self {
        self.updated.push(record);
        self
    }

    /// Adds a deleted record.
    pub fn delete(mut self, record: R) -> Self {
        self.deleted.push(record);
        self
    }

    /// Iterates inserted, then updated, then deleted records.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.inserted
            .iter()
            .chain(self.updated.iter())
            .chain(self.deleted.iter())
    }

    /// Returns the ids of every record in the notification.
    pub fn ids(&self) -> HashSet<RecordId> {
        self.iter().map(|r| r.id()).collect()
    }

    /// Returns the ids of the deleted records.
    pub fn deleted_ids(&self) -> HashSet<RecordId> {
        self.deleted.iter().map(|r| r.id()).collect()
    }

    /// Returns the total number of records, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.deleted.len()
    }

    /// Returns true if nothing changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receives notifications from a `ChangeFeed`.
pub trait ChangeListener<R> {
    fn on_change(&mut self, notification: &ChangeNotification<R>);
}

type ListenerRef<R> = Weak<RefCell<dyn ChangeListener<R>>>;

struct FeedInner<R> {
    listeners: Vec<(ListenerId, ListenerRef<R>)>,
    next_id: ListenerId,
}

impl<R> FeedInner<R> {
    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }
}

/// A publisher of change notifications.
///
/// Cloning a feed yields another handle to the same listener list.
pub struct ChangeFeed<R> {
    inner: Rc<RefCell<FeedInner<R>>>,
}

impl<R> Clone for ChangeFeed<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> Default for ChangeFeed<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ChangeFeed<R> {
    /// Creates a feed with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FeedInner {
                listeners: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Registers a listener.
    ///
    /// The listener stays registered until the returned subscription is
    /// dropped or the listener itself is dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe(&self, listener: ListenerRef<R>) -> FeedSubscription<R> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, listener));

        FeedSubscription {
            id,
            feed: Rc::downgrade(&self.inner),
        }
    }

    /// Delivers a notification to every live listener in registration order.
    ///
    /// The listener list is copied first, so listeners may unregister while
    /// the notification is in flight; an unregistered listener is skipped.
    /// Returns the number of listeners reached.
    pub fn publish(&self, notification: &ChangeNotification<R>) -> usize {
        let listeners: Vec<(ListenerId, ListenerRef<R>)> = self.inner.borrow().listeners.clone();

        let mut delivered = 0;
        for (id, listener) in listeners {
            if !self.inner.borrow().contains(id) {
                continue;
            }
            if let Some(listener) = listener.upgrade() {
                listener.borrow_mut().on_change(notification);
                delivered += 1;
            }
        }

        tracing::trace!(
            target: "tabula_reactive::feed",
            delivered,
            "published notification"
        );
        delivered
    }

    /// Returns the number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .count()
    }

    /// Drops registrations whose listener no longer exists.
    pub fn cleanup(&self) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(_, w)| w.strong_count() > 0);
    }
}

/// Owns one registration on a `ChangeFeed`.
pub struct FeedSubscription<R> {
    id: ListenerId,
    feed: Weak<RefCell<FeedInner<R>>>,
}

impl<R> FeedSubscription<R> {
    /// Returns the registration ID.
    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns true while the feed still holds this registration.
    pub fn is_active(&self) -> bool {
        self.feed
            .upgrade()
            .map(|feed| feed.borrow().contains(self.id))
            .unwrap_or(false)
    }
}

impl<R> Drop for FeedSubscription<R> {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            if let Ok(mut inner) = feed.try_borrow_mut() {
                inner.remove(self.id);
            };
        }
    }
}

impl<R> core::fmt::Debug for FeedSubscription<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tabula_core::{Entity, Value};

    fn make_entity(id: u64) -> Entity {
        Entity::new(id, vec![Value::Int64(id as i64)])
    }

    struct Counter {
        seen: usize,
    }

    impl ChangeListener<Entity> for Counter {
        fn on_change(&mut self, notification: &ChangeNotification<Entity>) {
            self.seen += notification.len();
        }
    }

    fn make_counter() -> (Rc<RefCell<Counter>>, ListenerRef<Entity>) {
        let counter = Rc::new(RefCell::new(Counter { seen: 0 }));
        let listener: Rc<RefCell<dyn ChangeListener<Entity>>> = counter.clone();
        (counter, Rc::downgrade(&listener))
    }

    #[test]
    fn test_notification_ids() {
        let n = ChangeNotification::new()
            .insert(make_entity(1))
            .update(make_entity(2))
            .delete(make_entity(3))
            .update(make_entity(1));

        assert_eq!(n.len(), 4);
        assert_eq!(n.ids().len(), 3);
        assert!(n.deleted_ids().contains(&3));
        let order: Vec<u64> = n.iter().map(|r| r.id()).collect();
        assert_eq!(order, vec![1, 2, 1, 3]);
    }

    #[test]
    fn test_publish_reaches_listeners() {
        let feed = ChangeFeed::new();
        let (counter, listener) = make_counter();
        let _sub = feed.subscribe(listener);

        let delivered = feed.publish(&ChangeNotification::new().insert(make_entity(1)));
        assert_eq!(delivered, 1);
        assert_eq!(counter.borrow().seen, 1);
    }

    #[test]
    fn test_drop_subscription_unregisters() {
        let feed = ChangeFeed::new();
        let (counter, listener) = make_counter();
        let sub = feed.subscribe(listener);
        assert!(sub.is_active());
        assert_eq!(feed.listener_count(), 1);

        drop(sub);
        assert_eq!(feed.listener_count(), 0);
        assert_eq!(feed.publish(&ChangeNotification::new().insert(make_entity(1))), 0);
        assert_eq!(counter.borrow().seen, 0);
    }

    #[test]
    fn test_dropped_listener_is_skipped_and_cleaned() {
        let feed = ChangeFeed::new();
        let (counter, listener) = make_counter();
        let _sub = feed.subscribe(listener);

        drop(counter);
        assert_eq!(feed.listener_count(), 0);
        assert_eq!(feed.publish(&ChangeNotification::new().insert(make_entity(1))), 0);

        feed.cleanup();
        assert!(feed.inner.borrow().listeners.is_empty());
    }

    #[test]
    fn test_subscription_outlives_feed() {
        let feed: ChangeFeed<Entity> = ChangeFeed::new();
        let (_counter, listener) = make_counter();
        let sub = feed.subscribe(listener);

        drop(feed);
        assert!(!sub.is_active());
        drop(sub);
    }

    struct SelfRemoving {
        subscription: Option<FeedSubscription<Entity>>,
        seen: usize,
    }

    impl ChangeListener<Entity> for SelfRemoving {
        fn on_change(&mut self, _notification: &ChangeNotification<Entity>) {
            self.seen += 1;
            self.subscription = None;
        }
    }

    #[test]
    fn test_listener_can_unregister_during_publish() {
        let feed = ChangeFeed::new();
        let first = Rc::new(RefCell::new(SelfRemoving {
            subscription: None,
            seen: 0,
        }));
        let listener: Rc<RefCell<dyn ChangeListener<Entity>>> = first.clone();
        let sub = feed.subscribe(Rc::downgrade(&listener));
        first.borrow_mut().subscription = Some(sub);

        let (counter, listener) = make_counter();
        let _sub = feed.subscribe(listener);

        let n = ChangeNotification::new().insert(make_entity(1));
        assert_eq!(feed.publish(&n), 2);
        assert_eq!(feed.publish(&n), 1);
        assert_eq!(first.borrow().seen, 1);
        assert_eq!(counter.borrow().seen, 2);
    }
}
