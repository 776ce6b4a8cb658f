//! # Core failure-reporting trait
//!
//! `Report` is the extension point for routing dispatch failures to whatever
//! diagnostic sink the embedding application provides (logger, metrics,
//! test capture). The registry calls it inline from the dispatch loop, once
//! per failed handler, and then continues with the remaining subscriptions.
//!
//! ## Contract
//! - Implementations must not panic; a sink that panics during synchronous
//!   dispatch unwinds into the emitting caller.
//! - Implementations should be cheap. Dispatch waits for the sink to return
//!   before invoking the next handler.

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::registry::SubscriptionId;

/// Which dispatch path produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Failure during [`Registry::emit`](crate::Registry::emit).
    Sync,
    /// Failure during [`Registry::emit_async`](crate::Registry::emit_async).
    Async,
}

impl DispatchMode {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchMode::Sync => "sync",
            DispatchMode::Async => "async",
        }
    }
}

/// A single isolated handler failure observed during dispatch.
///
/// Carries everything a sink needs to attribute the failure: the event type,
/// the dispatch mode (so synchronous and asynchronous failures read
/// differently), the failing subscription's id, and the underlying error.
#[derive(Debug)]
pub struct DispatchFailure {
    /// Event type that was being dispatched.
    pub event: Arc<str>,
    /// Dispatch path that produced the failure.
    pub mode: DispatchMode,
    /// Identity of the failing subscription.
    pub id: SubscriptionId,
    /// The underlying handler failure.
    pub error: HandlerError,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            DispatchMode::Sync => write!(
                f,
                "handler failed during synchronous dispatch: event={} id={} err={}",
                self.event, self.id, self.error
            ),
            DispatchMode::Async => write!(
                f,
                "handler failed during asynchronous dispatch: event={} id={} err={}",
                self.event, self.id, self.error
            ),
        }
    }
}

/// Contract for dispatch-failure sinks.
///
/// Called inline from the dispatch loop; see the module docs for the contract.
pub trait Report: Send + Sync + 'static {
    /// Observes one isolated handler failure.
    fn dispatch_failed(&self, failure: &DispatchFailure);
}
