//! # eventvisor
//!
//! **Eventvisor** is a lightweight typed event registry for Rust.
//!
//! It lets producers and consumers decouple through named event channels:
//! consumers subscribe handlers (optionally one-shot, optionally prioritized),
//! producers emit payloads, and the registry dispatches in priority order with
//! per-handler failure isolation. The crate is designed as a building block
//! for larger runtimes and tools that need an in-process notification fabric.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//!  │  producer A  │      │  producer B  │      │  consumer    │
//!  └──────┬───────┘      └──────┬───────┘      └──────┬───────┘
//!         │ emit / emit_async   │                     │ subscribe /
//!         ▼                     ▼                     ▼ unsubscribe
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry<P>                                                      │
//! │  - event key ─► [Subscription  Subscription  Subscription]        │
//! │  - snapshot + stable sort by priority (descending)                │
//! │  - per-handler isolation (errors and panics are contained)        │
//! │  - one-shot retirement after the dispatch pass                    │
//! └──────┬──────────────────────┬─────────────────────┬──────────────┘
//!        ▼                      ▼                     ▼
//!   handler (prio 9)       handler (prio 3)      handler (prio 0)
//!        │                      │                     │
//!        │ Err / panic          │ Ok                  │ Ok
//!        ▼                      ▼                     ▼
//! ┌───────────────────┐   fire count +1          fire count +1
//! │ Report sink       │
//! │ (StderrReporter,  │
//! │  custom sinks)    │
//! └───────────────────┘
//! ```
//!
//! ### Dispatch
//! ```text
//! emit(event, payload):
//!   ├─► no subscriptions? ─► return (no-op)
//!   ├─► snapshot the subscription list, sort by priority (stable, desc)
//!   ├─► for each subscription, in order:
//!   │     ├─ invoke handler, capturing errors and panics
//!   │     ├─ Ok   ─► fire count +1; one-shot? mark for retirement
//!   │     └─ Err  ─► Report::dispatch_failed(...), continue
//!   └─► retire fired one-shots; drop the event key if the list drained
//!
//! emit_async(event, payload):
//!   same pass, but each handler's async entry is awaited to completion
//!   before the next one runs — strictly sequential, never parallel.
//! ```
//!
//! ## Features
//! | Area               | Description                                                     | Key types / traits                    |
//! |--------------------|-----------------------------------------------------------------|---------------------------------------|
//! | **Registry**       | Subscribe, remove, dispatch, introspect named event channels.   | [`Registry`], [`RegistryBuilder`]     |
//! | **Handlers**       | Sync and async handlers, as closures or trait impls.            | [`Handler`], [`HandlerFn`], [`AsyncHandlerFn`] |
//! | **Identity**       | Per-subscription ids for targeted removal.                      | [`SubscriptionId`], [`ListenerInfo`]  |
//! | **Failure policy** | Per-handler isolation with a pluggable diagnostic sink.         | [`Report`], [`StderrReporter`]        |
//! | **Errors**         | Typed errors for registration and handler failures.             | [`RegistryError`], [`HandlerError`]   |
//!
//! ## Example
//! ```rust
//! use eventvisor::{HandlerFn, HandlerRef, Registry, RegistryError};
//!
//! #[derive(Clone)]
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//!
//! fn main() -> Result<(), RegistryError> {
//!     let registry: Registry<OrderPlaced> = Registry::new();
//!
//!     // Runs first: higher priority wins.
//!     let audit: HandlerRef<OrderPlaced> = HandlerFn::arc(|order: &OrderPlaced| {
//!         println!("audit: order {}", order.order_id);
//!         Ok(())
//!     });
//!     registry.subscribe("order.placed", audit, 10)?;
//!
//!     // Runs once, then retires itself.
//!     let welcome: HandlerRef<OrderPlaced> = HandlerFn::arc(|_: &OrderPlaced| {
//!         println!("first order!");
//!         Ok(())
//!     });
//!     registry.subscribe_once("order.placed", welcome, 0)?;
//!
//!     registry.emit("order.placed", &OrderPlaced { order_id: 7 });
//!     assert_eq!(registry.listener_count("order.placed"), 1);
//!
//!     registry.emit("order.placed", &OrderPlaced { order_id: 8 });
//!     Ok(())
//! }
//! ```
//!
//! Async handlers suspend freely; [`Registry::emit_async`] awaits each one to
//! completion before moving on, so priority order holds across await points:
//!
//! ```rust
//! use eventvisor::{AsyncHandlerFn, HandlerError, HandlerRef, Registry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry: Registry<String> = Registry::new();
//!
//! let notify: HandlerRef<String> = AsyncHandlerFn::arc(|who: String| async move {
//!     // await I/O here...
//!     if who.is_empty() {
//!         return Err(HandlerError::fail("nobody to notify"));
//!     }
//!     Ok(())
//! });
//! registry.subscribe("user.joined", notify, 0).unwrap();
//!
//! registry.emit_async("user.joined", &"ada".to_string()).await;
//! # }
//! ```

mod error;
mod handlers;
mod registry;
mod report;

// ---- Public re-exports ----

pub use error::{HandlerError, RegistryError};
pub use handlers::{AsyncHandlerFn, Handler, HandlerFn, HandlerRef};
pub use registry::{ListenerInfo, Registry, RegistryBuilder, SubscriptionId};
pub use report::{DispatchFailure, DispatchMode, Report, StderrReporter};
