//! # Subscription records and identities.
//!
//! A [`Subscription`] is one registered interest in an event type: the handler
//! reference, the one-shot flag, the dispatch priority, a process-unique
//! [`SubscriptionId`], and a successful-invocation counter.
//!
//! The registry owns all subscription records; callers only ever see the id
//! (returned from registration) and read-only [`ListenerInfo`] snapshots.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::handlers::HandlerRef;

/// Process-unique identity of one subscription.
///
/// Composed of the owning registry's instance number and a per-registry
/// monotonically increasing sequence, so ids are never reused and never
/// collide across registry instances. Stable for the subscription's lifetime.
///
/// # Example
/// ```
/// use eventvisor::{HandlerFn, HandlerRef, Registry};
///
/// let registry: Registry<u32> = Registry::new();
/// let handler: HandlerRef<u32> = HandlerFn::arc(|_: &u32| Ok(()));
/// let id = registry.subscribe("tick", handler, 0).unwrap();
///
/// // The rendered form is stable and unique within the process.
/// assert!(id.to_string().starts_with("sub-"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    registry: u64,
    seq: u64,
}

impl SubscriptionId {
    pub(crate) fn new(registry: u64, seq: u64) -> Self {
        Self { registry, seq }
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}-{}", self.registry, self.seq)
    }
}

/// One registered interest in an event type.
///
/// Created by registration, retired by explicit removal or automatically
/// after its first successful invocation when the one-shot flag is set.
pub(crate) struct Subscription<P>
where
    P: Send + Sync + 'static,
{
    handler: HandlerRef<P>,
    once: bool,
    priority: i32,
    id: SubscriptionId,
    /// Successful invocations only; failures and panics do not count.
    fired: AtomicU64,
}

impl<P> Subscription<P>
where
    P: Send + Sync + 'static,
{
    pub(crate) fn new(handler: HandlerRef<P>, once: bool, priority: i32, id: SubscriptionId) -> Self {
        Self {
            handler,
            once,
            priority,
            id,
            fired: AtomicU64::new(0),
        }
    }

    pub(crate) fn handler(&self) -> &HandlerRef<P> {
        &self.handler
    }

    pub(crate) fn is_once(&self) -> bool {
        self.once
    }

    pub(crate) fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    pub(crate) fn fire_count(&self) -> u64 {
        self.fired.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn mark_fired(&self) {
        self.fired.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Identity comparison: same `Arc` allocation, not structural equality.
    pub(crate) fn wraps(&self, handler: &HandlerRef<P>) -> bool {
        Arc::ptr_eq(&self.handler, handler)
    }
}

/// Read-only view of one subscription, as returned by
/// [`Registry::listeners`](crate::Registry::listeners).
pub struct ListenerInfo<P>
where
    P: Send + Sync + 'static,
{
    /// The subscribed handler.
    pub handler: HandlerRef<P>,
    /// Dispatch priority (higher fires earlier).
    pub priority: i32,
    /// The subscription's identity.
    pub id: SubscriptionId,
    /// Whether the subscription retires after its first successful invocation.
    pub once: bool,
    /// Successful invocations so far.
    pub fire_count: u64,
}

impl<P> Clone for ListenerInfo<P>
where
    P: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            priority: self.priority,
            id: self.id,
            once: self.once,
            fire_count: self.fire_count,
        }
    }
}

impl<P> ListenerInfo<P>
where
    P: Send + Sync + 'static,
{
    pub(crate) fn of(sub: &Subscription<P>) -> Self {
        Self {
            handler: Arc::clone(sub.handler()),
            priority: sub.priority(),
            id: sub.id(),
            once: sub.is_once(),
            fire_count: sub.fire_count(),
        }
    }
}
