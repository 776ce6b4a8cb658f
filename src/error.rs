//! Error types used by the event registry and its handlers.
//!
//! This module defines two main error enums:
//!
//! - [`RegistryError`] — registration errors surfaced synchronously to the caller.
//! - [`HandlerError`] — failures raised by individual handlers during dispatch.
//!
//! Registration errors are fatal to the call that produced them. Handler errors
//! are never fatal to dispatch: the registry isolates them per handler, hands
//! them to the configured [`Report`](crate::Report) sink, and moves on to the
//! next subscription.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by registration calls.
///
/// These surface synchronously from [`subscribe`](crate::Registry::subscribe) /
/// [`subscribe_once`](crate::Registry::subscribe_once) and are fatal to that call.
/// Removal of an absent subscription is a silent no-op, not an error.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The event type key was empty.
    #[error("event type must be a non-empty string")]
    InvalidEventType,

    /// The exact same handler identity is already subscribed to this event type.
    #[error("handler already subscribed to event {event:?}")]
    DuplicateHandler {
        /// The event type the handler was already subscribed to.
        event: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RegistryError;
    ///
    /// let err = RegistryError::InvalidEventType;
    /// assert_eq!(err.as_label(), "invalid_event_type");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::InvalidEventType => "invalid_event_type",
            RegistryError::DuplicateHandler { .. } => "duplicate_handler",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegistryError::InvalidEventType => "empty event type".to_string(),
            RegistryError::DuplicateHandler { event } => {
                format!("duplicate handler for event {event:?}")
            }
        }
    }
}

/// # Failures raised by a handler during dispatch.
///
/// These never propagate out of [`emit`](crate::Registry::emit) /
/// [`emit_async`](crate::Registry::emit_async); the registry reports them
/// through its [`Report`](crate::Report) sink and continues with the
/// remaining subscriptions.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked; the panic payload is captured as a message.
    #[error("handler panicked: {panic}")]
    Panicked {
        /// The panic payload, downcast to a message where possible.
        panic: String,
    },

    /// An asynchronous-only handler was invoked via synchronous dispatch.
    ///
    /// Produced by [`AsyncHandlerFn`](crate::AsyncHandlerFn) when driven by
    /// [`emit`](crate::Registry::emit); such handlers need
    /// [`emit_async`](crate::Registry::emit_async).
    #[error("asynchronous handler invoked via synchronous dispatch")]
    RequiresAsync,
}

impl HandlerError {
    /// Creates a [`HandlerError::Fail`] from any message.
    ///
    /// # Example
    /// ```
    /// use eventvisor::HandlerError;
    ///
    /// let err = HandlerError::fail("connection refused");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail { error: error.into() }
    }

    /// Converts a caught panic payload into a [`HandlerError::Panicked`].
    ///
    /// Panic payloads are usually `&'static str` or `String`; anything else
    /// is reported as an unknown panic.
    pub fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let panic = if let Some(msg) = panic.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = panic.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { panic }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
            HandlerError::RequiresAsync => "handler_requires_async",
        }
    }

    /// Returns a human-readable message with details about the failure.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { panic } => format!("panic: {panic}"),
            HandlerError::RequiresAsync => "requires async dispatch".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_panic_downcasts_str_and_string() {
        let err = HandlerError::from_panic(Box::new("boom"));
        assert!(matches!(err, HandlerError::Panicked { ref panic } if panic == "boom"));

        let err = HandlerError::from_panic(Box::new("boom".to_string()));
        assert!(matches!(err, HandlerError::Panicked { ref panic } if panic == "boom"));

        let err = HandlerError::from_panic(Box::new(42_u8));
        assert!(matches!(err, HandlerError::Panicked { ref panic } if panic == "unknown panic"));
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(RegistryError::InvalidEventType.as_label(), "invalid_event_type");
        let dup = RegistryError::DuplicateHandler { event: "t".to_string() };
        assert_eq!(dup.as_label(), "duplicate_handler");
        assert_eq!(HandlerError::fail("x").as_label(), "handler_failed");
        assert_eq!(HandlerError::RequiresAsync.as_label(), "handler_requires_async");
    }
}
