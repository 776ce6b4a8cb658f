//! # Dispatch-failure reporting.
//!
//! Handler failures are isolated per subscription and never propagate out of
//! [`emit`](crate::Registry::emit) / [`emit_async`](crate::Registry::emit_async).
//! Instead the registry hands each one to a [`Report`] sink:
//!
//! ```text
//! emit(event, payload)
//!     │
//!     ├──► handler 1 ── Ok ─────────────────► fire count +1
//!     ├──► handler 2 ── Err/panic ──► Report::dispatch_failed(DispatchFailure)
//!     └──► handler 3 ── Ok ─────────────────► fire count +1   (still runs)
//! ```
//!
//! ## Contents
//! - [`DispatchMode`], [`DispatchFailure`] failure classification and metadata
//! - [`Report`] sink trait
//! - [`StderrReporter`] built-in human-readable sink (the default)

mod report;
mod stderr;

pub use report::{DispatchFailure, DispatchMode, Report};
pub use stderr::StderrReporter;
