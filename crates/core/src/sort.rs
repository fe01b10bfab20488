//! Record ordering.
//!
//! Sections are sorted by a `Comparator`. The common case is a list of
//! `SortDescriptor`s: each extracts a `Value` key from a record and compares
//! it in ascending or descending order. Descriptors are consulted in list
//! order, so the last descriptor is the final tie-break.

use crate::record::Entity;
use crate::value::Value;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// Sort order for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Ascending order (smallest first)
    Asc,
    /// Descending order (largest first)
    Desc,
}

impl Order {
    /// Applies this order to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }
}

/// Trait for ordering records within a section.
pub trait Comparator<R> {
    /// Compares two records according to the comparator's ordering.
    fn compare(&self, a: &R, b: &R) -> Ordering;

    /// Returns true if a < b according to this comparator.
    fn is_less(&self, a: &R, b: &R) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns true if a <= b according to this comparator.
    fn is_less_or_equal(&self, a: &R, b: &R) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    /// Returns true if a == b according to this comparator.
    fn is_equal(&self, a: &R, b: &R) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<R, F> Comparator<R> for F
where
    F: Fn(&R, &R) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &R, b: &R) -> Ordering {
        self(a, b)
    }
}

/// Key extractor used by a `SortDescriptor`.
pub type KeyFn<R> = Box<dyn Fn(&R) -> Value>;

/// A single sort key: an extractor plus a direction.
pub struct SortDescriptor<R> {
    key: KeyFn<R>,
    order: Order,
}

impl<R> SortDescriptor<R> {
    /// Creates a descriptor from a key extractor and an order.
    pub fn new<F>(key: F, order: Order) -> Self
    where
        F: Fn(&R) -> Value + 'static,
    {
        Self {
            key: Box::new(key),
            order,
        }
    }

    /// Creates an ascending descriptor.
    pub fn asc<F>(key: F) -> Self
    where
        F: Fn(&R) -> Value + 'static,
    {
        Self::new(key, Order::Asc)
    }

    /// Creates a descending descriptor.
    pub fn desc<F>(key: F) -> Self
    where
        F: Fn(&R) -> Value + 'static,
    {
        Self::new(key, Order::Desc)
    }

    /// Returns the order of this descriptor.
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Extracts this descriptor's key from a record.
    #[inline]
    pub fn key(&self, record: &R) -> Value {
        (self.key)(record)
    }

    /// Compares two records on this key only.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        self.order.apply(self.key(a).cmp(&self.key(b)))
    }
}

impl SortDescriptor<Entity> {
    /// Creates a descriptor keyed on an `Entity` field. Missing fields are Null.
    pub fn field(index: usize, order: Order) -> Self {
        Self::new(
            move |entity: &Entity| entity.get(index).cloned().unwrap_or(Value::Null),
            order,
        )
    }
}

impl<R> fmt::Debug for SortDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// An ordered list of sort descriptors acting as one comparator.
///
/// An empty list considers every pair of records equal.
#[derive(Debug)]
pub struct SortDescriptors<R> {
    descriptors: Vec<SortDescriptor<R>>,
}

impl<R> Default for SortDescriptors<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SortDescriptors<R> {
    /// Creates an empty descriptor list.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Appends a descriptor, returning the list for chaining.
    pub fn with(mut self, descriptor: SortDescriptor<R>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Appends a descriptor.
    pub fn push(&mut self, descriptor: SortDescriptor<R>) {
        self.descriptors.push(descriptor);
    }

    /// Returns the number of descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if there are no descriptors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns the descriptors in comparison order.
    #[inline]
    pub fn descriptors(&self) -> &[SortDescriptor<R>] {
        &self.descriptors
    }
}

impl<R> FromIterator<SortDescriptor<R>> for SortDescriptors<R> {
    fn from_iter<I: IntoIterator<Item = SortDescriptor<R>>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl<R> Comparator<R> for SortDescriptors<R> {
    fn compare(&self, a: &R, b: &R) -> Ordering {
        for descriptor in &self.descriptors {
            let ord = descriptor.compare(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
