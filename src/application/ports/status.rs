//! Status sink port interface

use std::sync::Arc;

use crate::domain::recording::StatusReport;

/// Port receiving a status report after every processed event
pub trait StatusSink: Send + Sync {
    fn publish(&self, report: &StatusReport);
}

impl<S: StatusSink + ?Sized> StatusSink for Arc<S> {
    fn publish(&self, report: &StatusReport) {
        self.as_ref().publish(report)
    }
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn publish(&self, report: &StatusReport) {
        self.as_ref().publish(report)
    }
}
