//! Record sources and fetch requests.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use tabula_core::{Comparator, FetchError, Predicate, Record, RecordId, SortDescriptors};

/// Which records a controller displays and how sections sort them.
pub struct FetchRequest<R> {
    predicate: Rc<dyn Predicate<R>>,
    sort: Rc<SortDescriptors<R>>,
}

impl<R> Clone for FetchRequest<R> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
            sort: Rc::clone(&self.sort),
        }
    }
}

impl<R: 'static> FetchRequest<R> {
    /// Creates a request for records matching `predicate`.
    pub fn new<P>(predicate: P, sort: SortDescriptors<R>) -> Self
    where
        P: Predicate<R> + 'static,
    {
        Self {
            predicate: Rc::new(predicate),
            sort: Rc::new(sort),
        }
    }

    /// Creates a request for every record.
    pub fn all(sort: SortDescriptors<R>) -> Self {
        Self::new(|_: &R| true, sort)
    }

    /// Returns true if the request covers the record.
    #[inline]
    pub fn accepts(&self, record: &R) -> bool {
        self.predicate.evaluate(record)
    }

    /// Returns the sort descriptors.
    #[inline]
    pub fn sort(&self) -> &SortDescriptors<R> {
        &self.sort
    }

    /// Returns the sort descriptors as a shareable comparator.
    pub fn comparator(&self) -> Rc<dyn Comparator<R>> {
        Rc::clone(&self.sort) as Rc<dyn Comparator<R>>
    }

    /// Replaces the sort descriptors.
    pub fn set_sort(&mut self, sort: SortDescriptors<R>) {
        self.sort = Rc::new(sort);
    }
}

impl<R> core::fmt::Debug for FetchRequest<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("sort_keys", &self.sort.len())
            .finish_non_exhaustive()
    }
}

/// Executes fetch requests against a record store.
pub trait RecordSource<R> {
    /// Returns every live record the request covers, sorted by its
    /// descriptors.
    fn fetch(&self, request: &FetchRequest<R>) -> Result<Vec<R>, FetchError>;
}

impl<R, S: RecordSource<R> + ?Sized> RecordSource<R> for Rc<S> {
    #[inline]
    fn fetch(&self, request: &FetchRequest<R>) -> Result<Vec<R>, FetchError> {
        (**self).fetch(request)
    }
}

/// An in-memory record source.
///
/// Records are kept in insertion order; `fetch` filters and sorts a copy.
/// A failure can be injected with `set_failure`; it applies to every
/// fetch until cleared.
pub struct VecSource<R> {
    records: RefCell<Vec<R>>,
    failure: RefCell<Option<FetchError>>,
}

impl<R> Default for VecSource<R> {
    fn default() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
        }
    }
}

impl<R: Record> VecSource<R> {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source holding the given records.
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RefCell::new(records),
            failure: RefCell::new(None),
        }
    }

    /// Inserts the record, or replaces the stored record with the same id.
    pub fn upsert(&self, record: R) {
        let mut records = self.records.borrow_mut();
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => records.push(record),
        }
    }

    /// Removes and returns the record with the given id.
    pub fn remove(&self, id: RecordId) -> Option<R> {
        let mut records = self.records.borrow_mut();
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns true if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Makes every fetch fail with `failure`, or succeed again with None.
    pub fn set_failure(&self, failure: Option<FetchError>) {
        *self.failure.borrow_mut() = failure;
    }
}

impl<R: Record + 'static> RecordSource<R> for VecSource<R> {
    fn fetch(&self, request: &FetchRequest<R>) -> Result<Vec<R>, FetchError> {
        if let Some(failure) = self.failure.borrow().as_ref() {
            return Err(failure.clone());
        }

        let mut fetched: Vec<R> = self
            .records
            .borrow()
            .iter()
            .filter(|r| !r.is_removed() && request.accepts(r))
            .cloned()
            .collect();
        let sort = request.sort();
        fetched.sort_by(|a, b| sort.compare(a, b).then_with(|| a.id().cmp(&b.id())));
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tabula_core::{Entity, Order, SortDescriptor, Value};

    fn make_entity(id: u64, score: i64) -> Entity {
        Entity::new(id, vec![Value::Int64(score)])
    }

    fn by_score() -> SortDescriptors<Entity> {
        SortDescriptors::new().with(SortDescriptor::field(0, Order::Asc))
    }

    fn ids(records: &[Entity]) -> Vec<u64> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_fetch_filters_and_sorts() {
        let source = VecSource::with_records(vec![
            make_entity(1, 30),
            make_entity(2, 10),
            make_entity(3, -5),
            make_entity(4, 20).into_removed(),
        ]);
        let request = FetchRequest::new(
            |e: &Entity| e.get(0).and_then(|v| v.as_i64()).unwrap_or(0) >= 0,
            by_score(),
        );

        let fetched = source.fetch(&request).unwrap();
        assert_eq!(ids(&fetched), vec![2, 1]);
    }

    #[test]
    fn test_fetch_ties_by_id() {
        let source = VecSource::with_records(vec![make_entity(9, 1), make_entity(3, 1)]);
        let fetched = source.fetch(&FetchRequest::all(by_score())).unwrap();
        assert_eq!(ids(&fetched), vec![3, 9]);
    }

    #[test]
    fn test_upsert_and_remove() {
        let source = VecSource::new();
        source.upsert(make_entity(1, 10));
        source.upsert(make_entity(2, 20));
        source.upsert(make_entity(1, 30));
        assert_eq!(source.len(), 2);

        assert_eq!(source.remove(1).map(|e| e.id()), Some(1));
        assert_eq!(source.remove(1), None);
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_injected_failure() {
        let source = VecSource::with_records(vec![make_entity(1, 10)]);
        source.set_failure(Some(FetchError::new("store offline")));

        let request = FetchRequest::all(by_score());
        assert_eq!(source.fetch(&request), Err(FetchError::new("store offline")));

        source.set_failure(None);
        assert_eq!(source.fetch(&request).map(|r| r.len()), Ok(1));
    }

    #[test]
    fn test_shared_source() {
        let source = Rc::new(VecSource::with_records(vec![make_entity(1, 10)]));
        let shared: Rc<VecSource<Entity>> = Rc::clone(&source);
        source.upsert(make_entity(2, 5));

        let fetched = shared.fetch(&FetchRequest::all(by_score())).unwrap();
        assert_eq!(ids(&fetched), vec![2, 1]);
    }
}
