//! # Handler abstraction for event payloads.
//!
//! This module defines the [`Handler`] trait and the common handle type
//! [`HandlerRef`], an `Arc<dyn Handler<P>>` suitable for sharing between the
//! registry and callers.
//!
//! Handler identity is the `Arc` allocation: the registry rejects a second
//! subscription of the same `Arc` to the same event type, and
//! [`unsubscribe`](crate::Registry::unsubscribe) matches by the same identity.
//! Clone the `HandlerRef` you subscribed with if you intend to remove it later.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

/// Shared handle to a handler (`Arc<dyn Handler<P>>`).
pub type HandlerRef<P> = Arc<dyn Handler<P>>;

/// # Event payload handler.
///
/// A handler has a synchronous entry point driven by
/// [`Registry::emit`](crate::Registry::emit) and an asynchronous entry point
/// driven by [`Registry::emit_async`](crate::Registry::emit_async). The async
/// entry defaults to delegating to the synchronous one, so purely synchronous
/// handlers work under both dispatch modes without extra code.
///
/// Returning an error (or panicking) never aborts dispatch: the registry
/// reports the failure and continues with the remaining subscriptions.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventvisor::{Handler, HandlerError};
///
/// struct Counter;
///
/// #[async_trait]
/// impl Handler<u64> for Counter {
///     fn handle(&self, payload: &u64) -> Result<(), HandlerError> {
///         if *payload == 0 {
///             return Err(HandlerError::fail("zero payload"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<P>: Send + Sync
where
    P: Send + Sync + 'static,
{
    /// Handles a payload synchronously.
    ///
    /// Invoked by [`Registry::emit`](crate::Registry::emit). Implementations
    /// must not block on asynchronous work here; handlers that suspend belong
    /// in [`handle_async`](Handler::handle_async).
    fn handle(&self, payload: &P) -> Result<(), HandlerError>;

    /// Handles a payload asynchronously.
    ///
    /// Invoked by [`Registry::emit_async`](crate::Registry::emit_async) and
    /// awaited to completion before the next subscription runs. Defaults to
    /// the synchronous [`handle`](Handler::handle).
    async fn handle_async(&self, payload: &P) -> Result<(), HandlerError> {
        self.handle(payload)
    }
}
