//! Record identity and the built-in `Entity` record.
//!
//! Records are owned by an external store. The engine only keeps clones of
//! the latest value it was handed for each id, so every record type must
//! expose a stable identity that is independent of its field values.

use crate::value::Value;
use alloc::vec::Vec;

/// Stable, store-assigned identifier for a record.
pub type RecordId = u64;

/// The contract every record managed by a sectioned view satisfies.
pub trait Record: Clone {
    /// Returns the stable identity of this record.
    fn id(&self) -> RecordId;

    /// Returns true if the record was deleted from the store.
    ///
    /// A removed record belongs to no section.
    fn is_removed(&self) -> bool {
        false
    }
}

/// A record holding a list of `Value` fields.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Unique identifier for this record.
    id: RecordId,
    /// Field values, indexed by position.
    values: Vec<Value>,
    /// Set once the store deletes the record.
    removed: bool,
}

impl Entity {
    /// Creates a new live entity with the given ID and values.
    pub fn new(id: RecordId, values: Vec<Value>) -> Self {
        Self {
            id,
            values,
            removed: false,
        }
    }

    /// Returns a copy of this entity marked as removed.
    pub fn into_removed(mut self) -> Self {
        self.removed = true;
        self
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Gets a value at the given field index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets a value at the given field index.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if index < self.values.len() {
            self.values[index] = value;
            true
        } else {
            false
        }
    }

    /// Returns a copy of this entity with one field replaced.
    pub fn with(mut self, index: usize, value: Value) -> Self {
        self.set(index, value);
        self
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this entity has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Record for Entity {
    #[inline]
    fn id(&self) -> RecordId {
        self.id
    }

    #[inline]
    fn is_removed(&self) -> bool {
        self.removed
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values && self.removed == other.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_entity_new() {
        let entity = Entity::new(1, vec![Value::Int64(42), Value::String("Alice".into())]);
        assert_eq!(entity.id(), 1);
        assert_eq!(entity.len(), 2);
        assert!(!entity.is_removed());
    }

    #[test]
    fn test_entity_get_value() {
        let entity = Entity::new(1, vec![Value::Int64(1), Value::String("Alice".into())]);
        assert_eq!(entity.get(0), Some(&Value::Int64(1)));
        assert_eq!(entity.get(1), Some(&Value::String("Alice".into())));
        assert_eq!(entity.get(2), None);
    }

    #[test]
    fn test_entity_set_value() {
        let mut entity = Entity::new(1, vec![Value::Int64(1)]);
        assert!(entity.set(0, Value::Int64(100)));
        assert_eq!(entity.get(0), Some(&Value::Int64(100)));
        assert!(!entity.set(10, Value::Int64(999)));

        let replaced = entity.with(0, Value::Int64(7));
        assert_eq!(replaced.get(0), Some(&Value::Int64(7)));
    }

    #[test]
    fn test_entity_removed() {
        let entity = Entity::new(3, vec![Value::Int64(1)]);
        let removed = entity.clone().into_removed();
        assert!(removed.is_removed());
        assert_eq!(removed.id(), entity.id());
        assert_ne!(removed, entity);
    }

    #[test]
    fn test_entity_equality() {
        let a = Entity::new(1, vec![Value::Int64(42)]);
        let b = Entity::new(1, vec![Value::Int64(42)]);
        let c = Entity::new(2, vec![Value::Int64(42)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
