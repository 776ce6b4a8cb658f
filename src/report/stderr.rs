//! # Simple stderr reporter for debugging and demos.
//!
//! [`StderrReporter`] prints dispatch failures to stderr in a human-readable
//! format. It is the default sink for [`Registry::new`](crate::Registry::new).
//!
//! ## Output format
//! ```text
//! [dispatch-failed] mode=sync event=order.created id=sub-0-3 err=handler failed: connection refused
//! [dispatch-failed] mode=async event=order.created id=sub-0-4 err=handler panicked: boom
//! ```

use crate::report::report::{DispatchFailure, Report};

/// Stderr-backed failure reporter.
///
/// Useful for development and small tools. Implement a custom [`Report`] for
/// structured logging or metrics collection and install it via
/// [`Registry::builder`](crate::Registry::builder).
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl Report for StderrReporter {
    fn dispatch_failed(&self, failure: &DispatchFailure) {
        eprintln!(
            "[dispatch-failed] mode={} event={} id={} err={}",
            failure.mode.as_label(),
            failure.event,
            failure.id,
            failure.error
        );
    }
}
