//! Controller delegate.

use crate::change_set::{RecordChange, SectionChange, SectionInfo};
use tabula_core::Error;

/// Receives the edits a controller computes, in delivery order.
///
/// Within a batch the order is `will_change_content`, section deletions,
/// section insertions, record changes, `did_change_content`. A full reload
/// reports only `did_reload_content`. Every method defaults to a no-op.
pub trait ControllerDelegate<R> {
    fn will_change_content(&self) {}

    fn did_change_section(&self, _section: &SectionInfo, _change: SectionChange) {}

    fn did_change_record(&self, _record: &R, _change: RecordChange) {}

    fn did_change_content(&self) {}

    /// The whole view was rebuilt and should be redrawn from scratch.
    fn did_reload_content(&self) {}

    /// A fetch failed or a record matched no section.
    fn did_report_error(&self, _error: &Error) {}
}
