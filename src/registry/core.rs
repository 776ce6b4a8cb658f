//! # Event registry - typed subscription and dispatch core.
//!
//! [`Registry`] owns a mapping from event-type key to the subscriptions
//! registered for it, and drives both dispatch modes over that mapping.
//!
//! ## Architecture
//! ```text
//! subscribe / subscribe_once ──► ┌─────────────────────────────────┐
//! unsubscribe / remove_all   ──► │ Registry                        │
//!                                │   "order.created" ─► [S1 S2 S3] │
//!                                │   "order.closed"  ─► [S4]       │
//!                                └───────────────┬─────────────────┘
//!                                                │ emit / emit_async
//!                                                ▼
//!                                 snapshot, sort by priority (desc)
//!                                                │
//!                      ┌─────────────────────────┼──────────────┐
//!                      ▼                         ▼              ▼
//!                 S2.handle()  ── Err ──►   S1.handle()    S3.handle()
//!                      │       Report sink       │              │
//!                      └────────── post-pass: retire fired one-shots
//! ```
//!
//! ## Rules
//! - **Snapshot dispatch**: the subscription list is copied and sorted before
//!   any handler runs; registrations and removals performed by a handler
//!   during dispatch never affect the in-progress emit.
//! - **Priority order**: higher priority fires earlier; equal priorities keep
//!   registration order (stable sort).
//! - **Failure isolation**: a handler error or panic is reported through the
//!   [`Report`] sink and dispatch continues; nothing propagates to the emitter.
//! - **No dangling keys**: an event-type key is removed the instant its last
//!   subscription goes away.
//! - **Single lock**: all mutations are serialized behind one mutex, which is
//!   never held while a handler runs, so handlers may re-enter the registry.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;

use crate::error::{HandlerError, RegistryError};
use crate::handlers::{Handler, HandlerRef};
use crate::registry::subscription::{ListenerInfo, Subscription, SubscriptionId};
use crate::report::{DispatchFailure, DispatchMode, Report, StderrReporter};

/// Global instance counter; keeps subscription ids unique across registries.
static REGISTRY_SEQ: AtomicU64 = AtomicU64::new(0);

type Table<P> = HashMap<String, Vec<Arc<Subscription<P>>>>;

/// Builder for [`Registry`], used to install a custom failure sink.
///
/// ## Example
/// ```
/// use std::sync::Arc;
/// use eventvisor::{Registry, StderrReporter};
///
/// let registry: Registry<u32> = Registry::builder()
///     .with_reporter(Arc::new(StderrReporter))
///     .build();
/// assert_eq!(registry.event_names().len(), 0);
/// ```
pub struct RegistryBuilder<P> {
    reporter: Arc<dyn Report>,
    _payload: PhantomData<P>,
}

impl<P> RegistryBuilder<P>
where
    P: Send + Sync + 'static,
{
    /// Creates a builder with the default stderr sink.
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(StderrReporter),
            _payload: PhantomData,
        }
    }

    /// Replaces the dispatch-failure sink.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Report>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Builds the registry.
    pub fn build(self) -> Registry<P> {
        Registry {
            table: Mutex::new(HashMap::new()),
            reporter: self.reporter,
            instance: REGISTRY_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl<P> Default for RegistryBuilder<P>
where
    P: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// # Typed event registry.
///
/// Producers and consumers decouple through named event channels: consumers
/// register [`Handler`](crate::Handler)s under an event-type key, producers
/// [`emit`](Registry::emit) (or [`emit_async`](Registry::emit_async)) a payload
/// for that key, and the registry invokes every subscription in descending
/// priority order.
///
/// The registry assumes one logical thread of control; it is `Send + Sync`
/// and internally serialized, but no ordering is guaranteed across emits
/// racing from different threads.
///
/// # Example
/// ```
/// use eventvisor::{HandlerFn, HandlerRef, Registry, RegistryError};
///
/// let registry: Registry<String> = Registry::new();
///
/// let greet: HandlerRef<String> = HandlerFn::arc(|name: &String| {
///     println!("hello, {name}");
///     Ok(())
/// });
///
/// let id = registry.subscribe("greeting", greet, 0)?;
/// registry.emit("greeting", &"world".to_string());
/// assert_eq!(registry.listener_count("greeting"), 1);
///
/// registry.unsubscribe_by_id("greeting", id);
/// assert_eq!(registry.listener_count("greeting"), 0);
/// # Ok::<(), RegistryError>(())
/// ```
pub struct Registry<P>
where
    P: Send + Sync + 'static,
{
    table: Mutex<Table<P>>,
    reporter: Arc<dyn Report>,
    /// Instance number; the first component of every id this registry issues.
    instance: u64,
    /// Next subscription sequence; ids are never reused.
    next_seq: AtomicU64,
}

impl<P> Registry<P>
where
    P: Send + Sync + 'static,
{
    /// Creates a registry with the default stderr failure sink.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Returns a builder for installing a custom failure sink.
    pub fn builder() -> RegistryBuilder<P> {
        RegistryBuilder::new()
    }

    // Handlers never run while the lock is held; a poisoned table is still
    // consistent, so recover the guard instead of unwinding.
    fn lock(&self) -> MutexGuard<'_, Table<P>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(
            self.instance,
            self.next_seq.fetch_add(1, AtomicOrdering::Relaxed),
        )
    }

    fn register(
        &self,
        event: &str,
        handler: HandlerRef<P>,
        once: bool,
        priority: i32,
    ) -> Result<SubscriptionId, RegistryError> {
        if event.is_empty() {
            return Err(RegistryError::InvalidEventType);
        }

        let id = self.next_id();
        let mut table = self.lock();
        let subs = table.entry(event.to_string()).or_default();
        if subs.iter().any(|s| s.wraps(&handler)) {
            return Err(RegistryError::DuplicateHandler {
                event: event.to_string(),
            });
        }
        subs.push(Arc::new(Subscription::new(handler, once, priority, id)));
        Ok(id)
    }

    /// Subscribes a handler to an event type.
    ///
    /// Higher `priority` fires earlier; equal priorities fire in registration
    /// order. Returns the subscription's id, usable with
    /// [`unsubscribe_by_id`](Registry::unsubscribe_by_id).
    ///
    /// # Errors
    /// - [`RegistryError::InvalidEventType`] if `event` is empty.
    /// - [`RegistryError::DuplicateHandler`] if this exact handler identity is
    ///   already subscribed to `event`.
    pub fn subscribe(
        &self,
        event: &str,
        handler: HandlerRef<P>,
        priority: i32,
    ) -> Result<SubscriptionId, RegistryError> {
        self.register(event, handler, false, priority)
    }

    /// Subscribes a handler that retires after its first successful invocation.
    ///
    /// A failed or panicked invocation does not consume the one-shot; the
    /// subscription stays until an invocation succeeds or it is removed.
    ///
    /// # Errors
    /// Same as [`subscribe`](Registry::subscribe).
    pub fn subscribe_once(
        &self,
        event: &str,
        handler: HandlerRef<P>,
        priority: i32,
    ) -> Result<SubscriptionId, RegistryError> {
        self.register(event, handler, true, priority)
    }

    /// Removes the subscription wrapping this exact handler identity.
    ///
    /// Silent no-op if the event type or the handler is not subscribed.
    pub fn unsubscribe(&self, event: &str, handler: &HandlerRef<P>) {
        let mut table = self.lock();
        if let Some(subs) = table.get_mut(event) {
            subs.retain(|s| !s.wraps(handler));
            if subs.is_empty() {
                table.remove(event);
            }
        }
    }

    /// Removes the subscription with the given id.
    ///
    /// Silent no-op if the event type or the id is not present.
    pub fn unsubscribe_by_id(&self, event: &str, id: SubscriptionId) {
        let mut table = self.lock();
        if let Some(subs) = table.get_mut(event) {
            if let Some(pos) = subs.iter().position(|s| s.id() == id) {
                subs.remove(pos);
                if subs.is_empty() {
                    table.remove(event);
                }
            }
        }
    }

    /// Removes every subscription for one event type, or for all of them.
    ///
    /// - `remove_all(Some("order.created"))` drops that event's entry.
    /// - `remove_all(None)` clears the whole registry.
    ///
    /// Silent no-op for an unknown event type.
    pub fn remove_all(&self, event: Option<&str>) {
        let mut table = self.lock();
        match event {
            Some(event) => {
                table.remove(event);
            }
            None => table.clear(),
        }
    }

    /// Emits a payload to every subscription of an event type, synchronously.
    ///
    /// Subscriptions run in descending priority order (registration order
    /// within equal priorities). A handler error or panic is reported through
    /// the failure sink and dispatch continues with the next subscription;
    /// nothing propagates to the caller. One-shot subscriptions that fired
    /// successfully are retired after the pass.
    ///
    /// Emitting an event type with no subscriptions is a no-op.
    pub fn emit(&self, event: &str, payload: &P) {
        let snapshot = match self.snapshot(event) {
            Some(snapshot) => snapshot,
            None => return,
        };

        let mut spent = Vec::new();
        for sub in &snapshot {
            match catch_unwind(AssertUnwindSafe(|| sub.handler().handle(payload))) {
                Ok(Ok(())) => {
                    sub.mark_fired();
                    if sub.is_once() {
                        spent.push(sub.id());
                    }
                }
                Ok(Err(err)) => self.report(event, DispatchMode::Sync, sub.id(), err),
                Err(panic) => self.report(
                    event,
                    DispatchMode::Sync,
                    sub.id(),
                    HandlerError::from_panic(panic),
                ),
            }
        }
        self.retire(event, &spent);
    }

    /// Emits a payload to every subscription of an event type, awaiting each.
    ///
    /// Same algorithm as [`emit`](Registry::emit), except every handler's
    /// asynchronous entry point is awaited to completion before the next
    /// subscription is attempted: dispatch is strictly sequential, never
    /// parallel, and priority order holds across suspension points. Failure
    /// isolation and one-shot cleanup match the synchronous path.
    pub async fn emit_async(&self, event: &str, payload: &P) {
        let snapshot = match self.snapshot(event) {
            Some(snapshot) => snapshot,
            None => return,
        };

        let mut spent = Vec::new();
        for sub in &snapshot {
            let attempt = AssertUnwindSafe(sub.handler().handle_async(payload));
            match attempt.catch_unwind().await {
                Ok(Ok(())) => {
                    sub.mark_fired();
                    if sub.is_once() {
                        spent.push(sub.id());
                    }
                }
                Ok(Err(err)) => self.report(event, DispatchMode::Async, sub.id(), err),
                Err(panic) => self.report(
                    event,
                    DispatchMode::Async,
                    sub.id(),
                    HandlerError::from_panic(panic),
                ),
            }
        }
        self.retire(event, &spent);
    }

    /// Returns the number of subscriptions for an event type (0 if absent).
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, |subs| subs.len())
    }

    /// Returns the sorted list of event types with live subscriptions.
    pub fn event_names(&self) -> Vec<String> {
        let table = self.lock();
        let mut names: Vec<String> = table.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns read-only views of an event type's subscriptions, in dispatch
    /// order (descending priority, registration order within ties).
    ///
    /// Empty if the event type has no subscriptions.
    pub fn listeners(&self, event: &str) -> Vec<ListenerInfo<P>> {
        match self.snapshot(event) {
            Some(snapshot) => snapshot.iter().map(|s| ListenerInfo::of(s)).collect(),
            None => Vec::new(),
        }
    }

    /// Copies an event's subscription list and sorts it into dispatch order.
    ///
    /// Stable sort: equal priorities keep registration order. The lock is
    /// released before the snapshot is returned, so nothing a handler does
    /// can deadlock against dispatch.
    fn snapshot(&self, event: &str) -> Option<Vec<Arc<Subscription<P>>>> {
        let mut snapshot = {
            let table = self.lock();
            table.get(event)?.clone()
        };
        snapshot.sort_by_key(|s| Reverse(s.priority()));
        Some(snapshot)
    }

    /// Retires fired one-shot subscriptions after a dispatch pass.
    ///
    /// Removal is by id, so a subscription the handler already removed (or
    /// replaced) during dispatch is not confused with a newer one.
    fn retire(&self, event: &str, spent: &[SubscriptionId]) {
        if spent.is_empty() {
            return;
        }
        let mut table = self.lock();
        if let Some(subs) = table.get_mut(event) {
            subs.retain(|s| !spent.contains(&s.id()));
            if subs.is_empty() {
                table.remove(event);
            }
        }
    }

    fn report(&self, event: &str, mode: DispatchMode, id: SubscriptionId, error: HandlerError) {
        let failure = DispatchFailure {
            event: Arc::from(event),
            mode,
            id,
            error,
        };
        self.reporter.dispatch_failed(&failure);
    }
}

impl<P> Default for Registry<P>
where
    P: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::handlers::{AsyncHandlerFn, HandlerFn};

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &CallLog, label: &'static str) -> HandlerRef<u32> {
        let log = Arc::clone(log);
        HandlerFn::arc(move |_: &u32| {
            log.lock().unwrap().push(label);
            Ok(())
        })
    }

    fn failing(label: &'static str) -> HandlerRef<u32> {
        HandlerFn::arc(move |_: &u32| Err(HandlerError::fail(label)))
    }

    #[derive(Default)]
    struct CaptureReporter {
        failures: Mutex<Vec<(DispatchMode, String, &'static str)>>,
    }

    impl CaptureReporter {
        fn seen(&self) -> Vec<(DispatchMode, String, &'static str)> {
            self.failures.lock().unwrap().clone()
        }
    }

    impl Report for CaptureReporter {
        fn dispatch_failed(&self, failure: &DispatchFailure) {
            self.failures.lock().unwrap().push((
                failure.mode,
                failure.event.to_string(),
                failure.error.as_label(),
            ));
        }
    }

    fn captured() -> (Registry<u32>, Arc<CaptureReporter>) {
        let reporter = Arc::new(CaptureReporter::default());
        let registry = Registry::builder().with_reporter(reporter.clone()).build();
        (registry, reporter)
    }

    #[test]
    fn test_subscribe_rejects_empty_event_type() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let err = registry.subscribe("", recorder(&log, "a"), 0).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEventType));

        let err = registry
            .subscribe_once("", recorder(&log, "b"), 5)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEventType));

        assert!(registry.event_names().is_empty());
    }

    #[test]
    fn test_duplicate_handler_rejected_per_event_type() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();
        let handler = recorder(&log, "a");

        registry.subscribe("t", handler.clone(), 0).unwrap();
        let err = registry.subscribe("t", handler.clone(), 3).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateHandler { ref event } if event == "t"));

        // Same identity on a different event type is an independent subscription.
        registry.subscribe("u", handler.clone(), 0).unwrap();
        assert_eq!(registry.listener_count("t"), 1);
        assert_eq!(registry.listener_count("u"), 1);

        // After removal the identity can be registered again.
        registry.unsubscribe("t", &handler);
        registry.subscribe("t", handler, 0).unwrap();
        assert_eq!(registry.listener_count("t"), 1);
    }

    #[test]
    fn test_emit_runs_handlers_in_priority_order() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let a = registry.subscribe("t", recorder(&log, "a"), 3).unwrap();
        let b = registry.subscribe("t", recorder(&log, "b"), 1).unwrap();
        let c = registry.subscribe("t", recorder(&log, "c"), 3).unwrap();

        registry.emit("t", &0);
        // Ties keep registration order: a before c.
        assert_eq!(*log.lock().unwrap(), vec!["a", "c", "b"]);

        let order: Vec<_> = registry.listeners("t").iter().map(|l| l.id).collect();
        assert_eq!(order, vec![a, c, b]);
    }

    #[test]
    fn test_emit_passes_payload_to_every_handler() {
        let registry: Registry<u32> = Registry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for priority in [2, 1] {
            let seen = Arc::clone(&seen);
            let handler: HandlerRef<u32> = HandlerFn::arc(move |payload: &u32| {
                seen.lock().unwrap().push(*payload);
                Ok(())
            });
            registry.subscribe("t", handler, priority).unwrap();
        }

        registry.emit("t", &42);
        assert_eq!(*seen.lock().unwrap(), vec![42, 42]);
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let registry: Registry<u32> = Registry::new();
        registry.emit("missing", &1);

        let log = CallLog::default();
        registry.subscribe("t", recorder(&log, "a"), 0).unwrap();
        registry.emit("other", &1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_once_handler_fires_exactly_once() {
        let registry: Registry<u32> = Registry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handler: HandlerRef<u32> = {
            let seen = Arc::clone(&seen);
            HandlerFn::arc(move |payload: &u32| {
                seen.lock().unwrap().push(*payload);
                Ok(())
            })
        };
        registry.subscribe_once("t", handler, 0).unwrap();

        registry.emit("t", &1);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(registry.listener_count("t"), 0);
        // Last subscription gone: the key disappears entirely.
        assert!(registry.event_names().is_empty());

        registry.emit("t", &2);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_once_handler_leaves_siblings_subscribed() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        registry.subscribe("t", recorder(&log, "keep"), 0).unwrap();
        registry
            .subscribe_once("t", recorder(&log, "once"), 1)
            .unwrap();
        assert_eq!(registry.listener_count("t"), 2);

        registry.emit("t", &0);
        assert_eq!(registry.listener_count("t"), 1);
        assert_eq!(registry.event_names(), vec!["t".to_string()]);

        registry.emit("t", &0);
        assert_eq!(*log.lock().unwrap(), vec!["once", "keep", "keep"]);
    }

    #[test]
    fn test_failing_handler_does_not_block_siblings() {
        let (registry, reporter) = captured();
        let seen = Arc::new(Mutex::new(Vec::new()));

        registry.subscribe("t", failing("boom"), 5).unwrap();
        let sibling: HandlerRef<u32> = {
            let seen = Arc::clone(&seen);
            HandlerFn::arc(move |payload: &u32| {
                seen.lock().unwrap().push(*payload);
                Ok(())
            })
        };
        registry.subscribe("t", sibling, 0).unwrap();

        registry.emit("t", &7);

        // The lower-priority sibling still observed the same payload.
        assert_eq!(*seen.lock().unwrap(), vec![7]);
        assert_eq!(
            reporter.seen(),
            vec![(DispatchMode::Sync, "t".to_string(), "handler_failed")]
        );

        // The failing subscription is still registered and fires again.
        registry.emit("t", &8);
        assert_eq!(reporter.seen().len(), 2);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let (registry, reporter) = captured();
        let log = CallLog::default();

        let panicking: HandlerRef<u32> = HandlerFn::arc(|payload: &u32| {
            assert_ne!(*payload, 0, "kaboom");
            Ok(())
        });
        registry.subscribe("t", panicking, 9).unwrap();
        registry.subscribe("t", recorder(&log, "after"), 0).unwrap();

        registry.emit("t", &0);

        assert_eq!(*log.lock().unwrap(), vec!["after"]);
        assert_eq!(
            reporter.seen(),
            vec![(DispatchMode::Sync, "t".to_string(), "handler_panicked")]
        );
    }

    #[test]
    fn test_fire_count_tracks_successful_invocations() {
        let (registry, _reporter) = captured();
        let attempts = Arc::new(AtomicU32::new(0));

        let flaky: HandlerRef<u32> = {
            let attempts = Arc::clone(&attempts);
            HandlerFn::arc(move |_: &u32| {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(HandlerError::fail("first call fails"));
                }
                Ok(())
            })
        };
        registry.subscribe("t", flaky, 0).unwrap();

        registry.emit("t", &0);
        assert_eq!(registry.listeners("t")[0].fire_count, 0);

        registry.emit("t", &0);
        assert_eq!(registry.listeners("t")[0].fire_count, 1);
    }

    #[test]
    fn test_failed_once_handler_stays_subscribed() {
        let (registry, reporter) = captured();
        let attempts = Arc::new(AtomicU32::new(0));

        let flaky: HandlerRef<u32> = {
            let attempts = Arc::clone(&attempts);
            HandlerFn::arc(move |_: &u32| {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(HandlerError::fail("first call fails"));
                }
                Ok(())
            })
        };
        registry.subscribe_once("t", flaky, 0).unwrap();

        // A failed invocation does not consume the one-shot.
        registry.emit("t", &0);
        assert_eq!(registry.listener_count("t"), 1);
        assert_eq!(reporter.seen().len(), 1);

        registry.emit("t", &0);
        assert_eq!(registry.listener_count("t"), 0);
    }

    #[test]
    fn test_unsubscribe_by_identity() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let gone = recorder(&log, "gone");
        let kept = recorder(&log, "kept");
        registry.subscribe("t", gone.clone(), 0).unwrap();
        registry.subscribe("t", kept, 0).unwrap();

        registry.unsubscribe("t", &gone);
        registry.emit("t", &0);
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);

        // Unknown handler and unknown event are silent no-ops.
        registry.unsubscribe("t", &gone);
        registry.unsubscribe("missing", &gone);
    }

    #[test]
    fn test_unsubscribe_by_id_removes_only_matching() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let a = registry.subscribe("t", recorder(&log, "a"), 2).unwrap();
        let b = registry.subscribe("t", recorder(&log, "b"), 1).unwrap();
        registry.subscribe("t", recorder(&log, "c"), 0).unwrap();

        registry.unsubscribe_by_id("t", b);
        registry.emit("t", &0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);

        // Unknown id and unknown event are silent no-ops.
        registry.unsubscribe_by_id("t", b);
        registry.unsubscribe_by_id("missing", a);
        assert_eq!(registry.listener_count("t"), 2);
    }

    #[test]
    fn test_unsubscribe_last_removes_event_key() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let handler = recorder(&log, "a");
        let id = registry.subscribe("t", handler.clone(), 0).unwrap();
        registry.unsubscribe_by_id("t", id);
        assert!(registry.event_names().is_empty());

        registry.subscribe("t", handler.clone(), 0).unwrap();
        registry.unsubscribe("t", &handler);
        assert!(registry.event_names().is_empty());
    }

    #[test]
    fn test_remove_all_clears_selected_or_every_event() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        registry.subscribe("a", recorder(&log, "a"), 0).unwrap();
        registry.subscribe("b", recorder(&log, "b1"), 0).unwrap();
        registry.subscribe("b", recorder(&log, "b2"), 0).unwrap();

        registry.remove_all(Some("b"));
        assert_eq!(registry.event_names(), vec!["a".to_string()]);
        assert_eq!(registry.listener_count("b"), 0);

        registry.remove_all(Some("missing"));
        assert_eq!(registry.listener_count("a"), 1);

        registry.remove_all(None);
        assert!(registry.event_names().is_empty());
        assert_eq!(registry.listener_count("a"), 0);

        registry.emit("a", &0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_event_names_sorted() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        registry.subscribe("b", recorder(&log, "b"), 0).unwrap();
        registry.subscribe("a", recorder(&log, "a"), 0).unwrap();
        registry.subscribe("c", recorder(&log, "c"), 0).unwrap();

        assert_eq!(
            registry.event_names(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_listeners_exposes_metadata_in_dispatch_order() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let low = registry.subscribe("t", recorder(&log, "low"), -1).unwrap();
        let high = registry
            .subscribe_once("t", recorder(&log, "high"), 10)
            .unwrap();

        let listeners = registry.listeners("t");
        assert_eq!(listeners.len(), 2);
        assert_eq!(listeners[0].id, high);
        assert_eq!(listeners[0].priority, 10);
        assert!(listeners[0].once);
        assert_eq!(listeners[0].fire_count, 0);
        assert_eq!(listeners[1].id, low);
        assert_eq!(listeners[1].priority, -1);
        assert!(!listeners[1].once);

        assert!(registry.listeners("missing").is_empty());
    }

    #[test]
    fn test_mutations_during_dispatch_do_not_affect_snapshot() {
        let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
        let log = CallLog::default();

        let b = registry.subscribe("t", recorder(&log, "b"), 0).unwrap();
        let d = recorder(&log, "d");

        let mutator: HandlerRef<u32> = {
            let registry = Arc::clone(&registry);
            let log = Arc::clone(&log);
            let d = d.clone();
            HandlerFn::arc(move |_: &u32| {
                // Duplicate registration on the second pass is ignored on purpose.
                let _ = registry.subscribe("t", d.clone(), 0);
                registry.unsubscribe_by_id("t", b);
                log.lock().unwrap().push("a");
                Ok(())
            })
        };
        registry.subscribe("t", mutator, 1).unwrap();

        // "b" was removed mid-dispatch but the snapshot still runs it;
        // "d" was added mid-dispatch and must wait for the next emit.
        registry.emit("t", &0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);

        registry.emit("t", &0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a", "d"]);
    }

    #[test]
    fn test_nested_emit_from_handler() {
        let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
        let log = CallLog::default();

        registry.subscribe("inner", recorder(&log, "inner"), 0).unwrap();

        let outer: HandlerRef<u32> = {
            let registry = Arc::clone(&registry);
            let log = Arc::clone(&log);
            HandlerFn::arc(move |payload: &u32| {
                log.lock().unwrap().push("outer");
                registry.emit("inner", payload);
                Ok(())
            })
        };
        registry.subscribe("outer", outer, 0).unwrap();

        registry.emit("outer", &0);
        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_ids_unique_across_registries() {
        let first: Registry<u32> = Registry::new();
        let second: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let a = first.subscribe("t", recorder(&log, "a"), 0).unwrap();
        let b = second.subscribe("t", recorder(&log, "b"), 0).unwrap();

        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_emit_async_awaits_handlers_sequentially() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        let slow: HandlerRef<u32> = {
            let log = Arc::clone(&log);
            AsyncHandlerFn::arc(move |_: u32| {
                let log = Arc::clone(&log);
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    log.lock().unwrap().push("slow");
                    Ok::<_, HandlerError>(())
                }
            })
        };
        let fast: HandlerRef<u32> = {
            let log = Arc::clone(&log);
            AsyncHandlerFn::arc(move |_: u32| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("fast");
                    Ok::<_, HandlerError>(())
                }
            })
        };

        // Same priority: registration order must hold even across suspension.
        registry.subscribe("t", slow, 0).unwrap();
        registry.subscribe("t", fast, 0).unwrap();

        registry.emit_async("t", &0).await;
        assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_emit_async_runs_sync_handlers_and_retires_one_shots() {
        let registry: Registry<u32> = Registry::new();
        let log = CallLog::default();

        registry
            .subscribe_once("t", recorder(&log, "once"), 0)
            .unwrap();
        registry.subscribe("t", recorder(&log, "keep"), -1).unwrap();

        registry.emit_async("t", &0).await;
        registry.emit_async("t", &0).await;

        assert_eq!(*log.lock().unwrap(), vec!["once", "keep", "keep"]);
        assert_eq!(registry.listener_count("t"), 1);
    }

    #[tokio::test]
    async fn test_emit_async_isolates_errors_and_panics() {
        let (registry, reporter) = captured();
        let log = CallLog::default();

        let erroring: HandlerRef<u32> = AsyncHandlerFn::arc(|_: u32| async move {
            Err::<(), _>(HandlerError::fail("async boom"))
        });
        let panicking: HandlerRef<u32> = AsyncHandlerFn::arc(|payload: u32| async move {
            assert_ne!(payload, 0, "async kaboom");
            Ok::<_, HandlerError>(())
        });

        registry.subscribe("t", erroring, 2).unwrap();
        registry.subscribe("t", panicking, 1).unwrap();
        registry.subscribe("t", recorder(&log, "after"), 0).unwrap();

        registry.emit_async("t", &0).await;

        assert_eq!(*log.lock().unwrap(), vec!["after"]);
        assert_eq!(
            reporter.seen(),
            vec![
                (DispatchMode::Async, "t".to_string(), "handler_failed"),
                (DispatchMode::Async, "t".to_string(), "handler_panicked"),
            ]
        );
    }

    #[test]
    fn test_sync_emit_reports_async_only_handler() {
        let (registry, reporter) = captured();

        let async_only: HandlerRef<u32> =
            AsyncHandlerFn::arc(|_: u32| async move { Ok::<_, HandlerError>(()) });
        registry.subscribe_once("t", async_only, 0).unwrap();

        registry.emit("t", &0);

        assert_eq!(
            reporter.seen(),
            vec![(DispatchMode::Sync, "t".to_string(), "handler_requires_async")]
        );
        // Not a successful invocation: the one-shot is still subscribed.
        assert_eq!(registry.listener_count("t"), 1);
    }
}
