//! Cache Warming Module
//!
//! Concurrent bulk population of the engine. `warm` runs every loader
//! and overwrites unconditionally; `prefetch` is the polite variant that
//! skips loaders whose condition is false or whose namespace already
//! holds a fresh value.
//!
//! Loaders are fault-isolated: a failure or timeout in one slot is
//! logged and never aborts the batch or reaches the caller. Every loader
//! runs under the engine's configured deadline.

use std::future::Future;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::engine::CacheEngine;
use crate::cache::key::make_key;
use crate::cache::Priority;

type LoadFn = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<Value>> + Send>;
type ConditionFn = Box<dyn Fn() -> bool + Send + Sync>;

// == Cache Loader ==
/// One slot in a warm/prefetch batch: a namespace, a lazily-invoked
/// async loader, and optional TTL/priority/condition.
///
/// The loader closure is only invoked when the slot actually runs, so a
/// skipped prefetch does no work at all.
pub struct CacheLoader {
    namespace: String,
    ttl: Option<Duration>,
    priority: Priority,
    condition: Option<ConditionFn>,
    load: LoadFn,
}

impl CacheLoader {
    // == Constructor ==
    /// Creates a loader for a namespace.
    ///
    /// The closure produces the future; its success value is serialized
    /// into the cache, its error is logged and isolated.
    pub fn new<F, Fut, T>(namespace: impl Into<String>, load: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + Send,
    {
        Self {
            namespace: namespace.into(),
            ttl: None,
            priority: Priority::default(),
            condition: None,
            load: Box::new(move || {
                Box::pin(async move {
                    let value = load().await?;
                    Ok(serde_json::to_value(value)?)
                })
            }),
        }
    }

    /// Overrides the engine default TTL for this slot.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the eviction-bias tier for the stored entry.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Gate evaluated synchronously before a prefetch slot runs.
    /// Ignored by `warm`.
    pub fn condition(mut self, condition: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Warm,
    Prefetch,
}

impl CacheEngine {
    // == Warm ==
    /// Runs every loader concurrently and stores each successful result,
    /// overwriting any existing entry for that namespace. Settles the
    /// whole batch; individual failures are logged and ignored.
    pub async fn warm(&self, loaders: Vec<CacheLoader>) {
        join_all(
            loaders
                .into_iter()
                .map(|loader| self.run_loader(loader, BatchKind::Warm)),
        )
        .await;
    }

    // == Prefetch ==
    /// Conditional, non-destructive variant of [`warm`](Self::warm): a
    /// slot is skipped without invoking its loader when its condition
    /// returns false or the namespace already holds a fresh value.
    /// Idempotent by construction.
    pub async fn prefetch(&self, loaders: Vec<CacheLoader>) {
        join_all(
            loaders
                .into_iter()
                .map(|loader| self.run_loader(loader, BatchKind::Prefetch)),
        )
        .await;
    }

    // == Run Loader ==
    /// Executes one batch slot under the configured deadline.
    async fn run_loader(&self, loader: CacheLoader, kind: BatchKind) {
        let namespace = loader.namespace;

        if kind == BatchKind::Prefetch {
            if let Some(condition) = &loader.condition {
                if !condition() {
                    debug!(%namespace, "prefetch skipped: condition false");
                    return;
                }
            }
            if self.contains_fresh(&make_key(&namespace, None)) {
                debug!(%namespace, "prefetch skipped: already cached");
                return;
            }
        }

        let future = (loader.load)();
        match tokio::time::timeout(self.loader_timeout(), future).await {
            Err(_) => {
                warn!(%namespace, "cache loader timed out");
            }
            Ok(Err(err)) => {
                warn!(%namespace, %err, "cache loader failed");
            }
            Ok(Ok(value)) => {
                if let Err(err) =
                    self.set_value(&namespace, value, loader.ttl, loader.priority, None)
                {
                    warn!(%namespace, %err, "failed to store loaded value");
                }
            }
        }
    }
}
