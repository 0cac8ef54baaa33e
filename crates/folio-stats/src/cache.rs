//! Process-lifetime snapshot cache with a shared in-flight fetch.

use std::{
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{Result, StatSource, StatsError};

/// Value published by a finished fetch; `None` while it is running.
type Outcome<T> = Option<Result<Arc<T>>>;

enum Slot<T> {
    Unpopulated,
    Fetching(watch::Receiver<Outcome<T>>),
    Populated(Arc<T>),
}

struct Inner<S: StatSource> {
    source: S,
    slot: Mutex<Slot<S::Snapshot>>,
}

/// Read-through cache holding at most one snapshot of `S`.
///
/// Cloning yields another handle to the same cache. A successful fetch is
/// kept forever; a failed one leaves the cache unpopulated so a later
/// [`ensure`](Self::ensure) tries again.
pub struct StatCache<S: StatSource> {
    inner: Arc<Inner<S>>,
}

impl<S: StatSource> Clone for StatCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StatSource> fmt::Debug for StatCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.lock() {
            Slot::Unpopulated => "unpopulated",
            Slot::Fetching(_) => "fetching",
            Slot::Populated(_) => "populated",
        };
        f.debug_struct("StatCache")
            .field("source", &S::NAME)
            .field("state", &state)
            .finish()
    }
}

enum Step<T> {
    Ready(Arc<T>),
    Wait(watch::Receiver<Outcome<T>>),
}

impl<S: StatSource> StatCache<S> {
    /// Create an empty cache in front of `source`.
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                slot: Mutex::new(Slot::Unpopulated),
            }),
        }
    }

    /// The cached snapshot, if a fetch has succeeded.
    pub fn read(&self) -> Option<Arc<S::Snapshot>> {
        match &*self.lock() {
            Slot::Populated(snapshot) => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    /// Whether a fetch is currently running.
    pub fn is_fetching(&self) -> bool {
        matches!(&*self.lock(), Slot::Fetching(_))
    }

    /// Return the snapshot, fetching it first if the cache is cold.
    ///
    /// Callers arriving while a fetch is running wait for that fetch
    /// instead of starting their own.
    pub async fn ensure(&self) -> Result<Arc<S::Snapshot>> {
        let rx = match self.begin() {
            Step::Ready(snapshot) => return Ok(snapshot),
            Step::Wait(rx) => rx,
        };
        wait(rx).await
    }

    /// Like [`ensure`](Self::ensure), but gives up waiting once `cancel`
    /// completes and returns `None`.
    ///
    /// The fetch itself keeps running and still populates the cache.
    pub async fn ensure_until<F>(&self, cancel: F) -> Option<Result<Arc<S::Snapshot>>>
    where
        F: Future<Output = ()>,
    {
        let rx = match self.begin() {
            Step::Ready(snapshot) => return Some(Ok(snapshot)),
            Step::Wait(rx) => rx,
        };

        tokio::select! {
            biased;
            result = wait(rx) => Some(result),
            () = cancel => {
                debug!(source = S::NAME, "stopped waiting for stats fetch");
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<S::Snapshot>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Step<S::Snapshot> {
        let mut slot = self.lock();
        match &*slot {
            Slot::Populated(snapshot) => Step::Ready(Arc::clone(snapshot)),
            Slot::Fetching(rx) => Step::Wait(rx.clone()),
            Slot::Unpopulated => {
                let (tx, rx) = watch::channel(None);
                *slot = Slot::Fetching(rx.clone());
                drop(slot);

                info!(source = S::NAME, "cache cold, fetching stats");
                tokio::spawn(populate(Arc::clone(&self.inner), tx));
                Step::Wait(rx)
            }
        }
    }
}

/// Run one fetch and record its outcome in the slot and the channel.
async fn populate<S: StatSource>(inner: Arc<Inner<S>>, tx: watch::Sender<Outcome<S::Snapshot>>) {
    let source = Arc::clone(&inner);
    let outcome = match tokio::spawn(async move { source.source.fetch().await }).await {
        Ok(result) => result.map(Arc::new),
        Err(e) => Err(StatsError::Task(e.to_string())),
    };

    {
        let mut slot = inner.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = match &outcome {
            Ok(snapshot) => Slot::Populated(Arc::clone(snapshot)),
            Err(_) => Slot::Unpopulated,
        };
    }

    match &outcome {
        Ok(_) => info!(source = S::NAME, "stats cached"),
        Err(e) => warn!(source = S::NAME, error = %e, "stats fetch failed"),
    }

    tx.send_replace(Some(outcome));
}

async fn wait<T>(mut rx: watch::Receiver<Outcome<T>>) -> Result<Arc<T>> {
    let outcome = match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    };
    outcome.unwrap_or_else(|| Err(StatsError::Task("fetch ended without a result".to_string())))
}
