//! Record filtering.

/// Trait for deciding whether a record belongs to a section or a request.
pub trait Predicate<R> {
    /// Returns true if the record is accepted.
    fn evaluate(&self, record: &R) -> bool;
}

impl<R, F> Predicate<R> for F
where
    F: Fn(&R) -> bool,
{
    #[inline]
    fn evaluate(&self, record: &R) -> bool {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Entity, Record};
    use crate::value::Value;
    use alloc::rc::Rc;
    use alloc::vec;

    #[test]
    fn test_closure_predicate() {
        let even = |e: &Entity| e.id() % 2 == 0;
        assert!(even.evaluate(&Entity::new(2, vec![])));
        assert!(!even.evaluate(&Entity::new(3, vec![])));
    }

    #[test]
    fn test_shared_predicate() {
        let named: Rc<dyn Predicate<Entity>> =
            Rc::new(|e: &Entity| e.get(0).and_then(|v| v.as_str()) == Some("Seated"));
        assert!(named.evaluate(&Entity::new(1, vec![Value::from("Seated")])));
        assert!(!named.evaluate(&Entity::new(1, vec![Value::from("Waitlist")])));
    }
}
