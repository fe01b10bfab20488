//! Positions of records within the visible partition.

use core::fmt;

/// A `(section, row)` pair pinpointing a record within the visible sections.
///
/// `section` indexes the *visible* sections at a point in time, so the same
/// section can have different indices before and after a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub section: usize,
    pub row: usize,
}

impl Location {
    /// Creates a new location.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// A location tagged with the rank of the section that holds the record.
///
/// The rank is the section's position in the full section list and never
/// changes during a batch, which makes it the identity used to decide
/// whether two snapshots refer to the same section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionLocation {
    pub rank: usize,
    pub location: Location,
}

impl SectionLocation {
    #[inline]
    pub const fn new(rank: usize, location: Location) -> Self {
        Self { rank, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(0, 2).to_string(), "[0, 2]");
    }

    #[test]
    fn test_location_ordering() {
        assert!(Location::new(0, 5) < Location::new(1, 0));
        assert!(Location::new(1, 0) < Location::new(1, 1));
    }

    #[test]
    fn test_section_location_identity() {
        let a = SectionLocation::new(2, Location::new(0, 0));
        let b = SectionLocation::new(3, Location::new(0, 0));
        assert_ne!(a, b);
        assert_eq!(a.location, b.location);
    }
}
