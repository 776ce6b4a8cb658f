//! # Function-backed handlers (`HandlerFn`, `AsyncHandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(&P) -> Result<(), HandlerError>` and
//! serves both dispatch modes. [`AsyncHandlerFn`] wraps a closure
//! `F: Fn(P) -> Fut`, producing a fresh future per invocation; it requires
//! `P: Clone` so each invocation owns its payload, and it only fires under
//! [`emit_async`](crate::Registry::emit_async).
//!
//! ## Example
//! ```
//! use eventvisor::{Handler, HandlerError, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef<String> = HandlerFn::arc(|payload: &String| {
//!     if payload.is_empty() {
//!         return Err(HandlerError::fail("empty payload"));
//!     }
//!     Ok(())
//! });
//!
//! assert!(h.handle(&"ok".to_string()).is_ok());
//! assert!(h.handle(&String::new()).is_err());
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::handlers::handler::Handler;

/// Function-backed synchronous handler.
///
/// The wrapped closure runs for both [`emit`](crate::Registry::emit) and
/// [`emit_async`](crate::Registry::emit_async) dispatch.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a
    /// [`HandlerRef`](crate::HandlerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<P, F> Handler<P> for HandlerFn<F>
where
    P: Send + Sync + 'static,
    F: Fn(&P) -> Result<(), HandlerError> + Send + Sync + 'static, // Fn, not FnMut
{
    fn handle(&self, payload: &P) -> Result<(), HandlerError> {
        (self.f)(payload)
    }
}

/// Function-backed asynchronous handler.
///
/// Wraps a closure that *creates* a new future per invocation, so no state is
/// shared between invocations unless the closure captures it explicitly
/// (`Arc<...>` inside the closure).
///
/// Under synchronous dispatch this handler does not run: it reports
/// [`HandlerError::RequiresAsync`] through the registry's failure sink and the
/// dispatch moves on. Subscribe it to events emitted via
/// [`emit_async`](crate::Registry::emit_async).
///
/// ## Example
/// ```
/// use eventvisor::{AsyncHandlerFn, HandlerError, HandlerRef};
///
/// let h: HandlerRef<u32> = AsyncHandlerFn::arc(|payload: u32| async move {
///     if payload == 0 {
///         return Err(HandlerError::fail("zero payload"));
///     }
///     Ok::<_, HandlerError>(())
/// });
/// ```
#[derive(Debug)]
pub struct AsyncHandlerFn<F> {
    f: F,
}

impl<F> AsyncHandlerFn<F> {
    /// Creates a new function-backed asynchronous handler.
    ///
    /// Prefer [`AsyncHandlerFn::arc`] when you immediately need a
    /// [`HandlerRef`](crate::HandlerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<P, F, Fut> Handler<P> for AsyncHandlerFn<F>
where
    P: Clone + Send + Sync + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn handle(&self, _payload: &P) -> Result<(), HandlerError> {
        Err(HandlerError::RequiresAsync)
    }

    async fn handle_async(&self, payload: &P) -> Result<(), HandlerError> {
        (self.f)(payload.clone()).await
    }
}
