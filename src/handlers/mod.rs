//! # Event handlers: trait and function-backed implementations.
//!
//! This module provides the core handler-related types:
//! - [`Handler`] - trait with a synchronous entry point and an optional async one
//! - [`HandlerFn`] - closure-backed synchronous handler
//! - [`AsyncHandlerFn`] - closure-backed asynchronous handler
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<P>>`)
//!
//! Handler identity is the `Arc` allocation, so the `HandlerRef` used to
//! subscribe is also the key for duplicate detection and removal.

mod handler;
mod handler_fn;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::{AsyncHandlerFn, HandlerFn};
