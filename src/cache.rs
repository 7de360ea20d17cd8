//! Time-bound snapshot cache with single-flight rebuilds.
//!
//! The cache holds at most one snapshot. A caller that finds it missing,
//! expired or explicitly bypassed either starts a rebuild or, when one is
//! already running, waits on that rebuild's shared future. The rebuild runs
//! on its own task, so it completes and updates the cache even if every
//! waiting caller goes away.

use crate::analysis::Aggregator;
use crate::error::{DashboardError, Result};
use crate::models::{CacheHealth, DashboardSnapshot};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type SharedRebuild = Shared<BoxFuture<'static, Result<Arc<DashboardSnapshot>>>>;

struct InFlight {
    generation: u64,
    rebuild: SharedRebuild,
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<Arc<DashboardSnapshot>>,
    built_at: Option<Instant>,
    in_flight: Option<InFlight>,
    generation: u64,
}

impl CacheState {
    fn fresh(&self, ttl: Duration) -> Option<Arc<DashboardSnapshot>> {
        match (&self.snapshot, self.built_at) {
            (Some(snapshot), Some(built_at)) if built_at.elapsed() <= ttl => {
                Some(Arc::clone(snapshot))
            }
            _ => None,
        }
    }

    /// Clear the in-flight marker, but only if it still belongs to `generation`.
    fn finish(&mut self, generation: u64) {
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            self.in_flight = None;
        }
    }
}

struct Inner {
    aggregator: Aggregator,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to the snapshot cache. Cloning is cheap.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<Inner>,
}

impl SnapshotCache {
    pub fn new(aggregator: Aggregator, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                aggregator,
                ttl,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Return the cached snapshot, rebuilding when needed.
    ///
    /// With `force_refresh == false` a fresh snapshot is returned without
    /// any network access. Otherwise the caller joins the running rebuild
    /// or starts one. A failed rebuild leaves the cached snapshot untouched.
    pub async fn get(&self, force_refresh: bool) -> Result<Arc<DashboardSnapshot>> {
        let rebuild = {
            let mut state = self.inner.lock_state();

            if !force_refresh {
                if let Some(snapshot) = state.fresh(self.inner.ttl) {
                    return Ok(snapshot);
                }
            }

            match &state.in_flight {
                Some(in_flight) => {
                    debug!("Joining in-flight rebuild #{}", in_flight.generation);
                    in_flight.rebuild.clone()
                }
                None => {
                    state.generation += 1;
                    let generation = state.generation;
                    let rebuild = self.start_rebuild(generation);
                    state.in_flight = Some(InFlight {
                        generation,
                        rebuild: rebuild.clone(),
                    });
                    rebuild
                }
            }
        };

        rebuild.await
    }

    /// Spawn the rebuild task and wrap its handle in a shareable future.
    fn start_rebuild(&self, generation: u64) -> SharedRebuild {
        info!(
            "Starting snapshot rebuild #{} for {}",
            generation,
            self.inner.aggregator.initiative_key()
        );

        let task_inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let result = task_inner.aggregator.build_snapshot().await.map(Arc::new);

            let mut state = task_inner.lock_state();
            match &result {
                Ok(snapshot) => {
                    state.snapshot = Some(Arc::clone(snapshot));
                    state.built_at = Some(Instant::now());
                    info!("Rebuild #{} installed a new snapshot", generation);
                }
                Err(e) => {
                    warn!("Rebuild #{} failed, keeping previous snapshot: {}", generation, e);
                }
            }
            state.finish(generation);
            drop(state);
            result
        });

        let join_inner = Arc::clone(&self.inner);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    // The task died before clearing its marker.
                    join_inner.lock_state().finish(generation);
                    Err(DashboardError::Rebuild(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Read-only view of the cache; never triggers a rebuild.
    pub fn health(&self) -> CacheHealth {
        let state = self.inner.lock_state();

        CacheHealth {
            has_snapshot: state.snapshot.is_some(),
            age_seconds: state
                .built_at
                .map(|t| t.elapsed().as_secs_f64().round() as u64),
            ttl_seconds: self.inner.ttl.as_secs(),
            rebuilding: state.in_flight.is_some(),
        }
    }
}
