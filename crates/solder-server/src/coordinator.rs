//! Update coordination.
//!
//! The coordinator owns the published [`Bundle`] and decides when to rebuild
//! it. A rebuild is needed when the source's staleness marker (the manifest
//! modification time) differs from the one recorded by the last successful
//! rebuild, or when nothing has been built yet.
//!
//! # State machine
//!
//! ```text
//!            stale, nothing pending
//!   Idle ─────────────────────────────▶ Updating ──┐
//!    ▲                                            │ success: publish bundle + marker
//!    └────────────────────────────────────────────┘ failure: keep previous bundle
//! ```
//!
//! While `Updating`, the state holds one shared pending handle. Every caller
//! that finds the bundle stale awaits that same handle, so at most one
//! rebuild runs at a time and all joined callers see the same result or
//! error. The rebuild runs on its own task; a caller going away does not
//! cancel it.
//!
//! The marker recorded on success is the one observed when the rebuild
//! started, so a manifest edit that lands mid-rebuild triggers another one on
//! the next check.

use crate::bundle::Bundle;
use crate::error::UpdateError;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;

/// Result of a freshness check, shared between joined callers.
pub type UpdateResult = Result<Arc<Bundle>, Arc<UpdateError>>;

type PendingUpdate = Shared<BoxFuture<'static, UpdateResult>>;

/// Where bundles come from.
#[async_trait]
pub trait BundleSource: Send + Sync + 'static {
    /// Value that changes whenever a rebuild is required.
    async fn staleness_marker(&self) -> Result<SystemTime, UpdateError>;

    /// Build a new bundle, reusing what it can from `previous`.
    async fn build(&self, previous: Option<Arc<Bundle>>) -> Result<Bundle, UpdateError>;
}

#[derive(Default)]
struct State {
    bundle: Option<Arc<Bundle>>,
    marker: Option<SystemTime>,
    pending: Option<PendingUpdate>,
}

struct Inner {
    source: Arc<dyn BundleSource>,
    state: Mutex<State>,
}

/// Keeps the published bundle fresh; cheap to clone.
#[derive(Clone)]
pub struct UpdateCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for UpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("UpdateCoordinator")
            .field(
                "version",
                &state.bundle.as_ref().map(|b| b.version_id().to_string()),
            )
            .field("marker", &state.marker)
            .field("updating", &state.pending.is_some())
            .finish()
    }
}

impl UpdateCoordinator {
    pub fn new(source: Arc<dyn BundleSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Currently published bundle, without a freshness check.
    pub fn current(&self) -> Option<Arc<Bundle>> {
        self.inner.state.lock().bundle.clone()
    }

    /// True while a rebuild is in flight.
    pub fn is_updating(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Forget the recorded marker so the next check rebuilds.
    pub fn invalidate(&self) {
        self.inner.state.lock().marker = None;
    }

    /// Return a bundle that reflects the current source, rebuilding first if
    /// it is stale. Joins an in-flight rebuild instead of starting another.
    pub async fn ensure_fresh(&self) -> UpdateResult {
        let observed = self
            .inner
            .source
            .staleness_marker()
            .await
            .map_err(Arc::new)?;

        let pending = {
            let mut state = self.inner.state.lock();
            if let (Some(marker), Some(bundle)) = (state.marker, &state.bundle) {
                if marker == observed {
                    return Ok(Arc::clone(bundle));
                }
            }

            if let Some(pending) = &state.pending {
                tracing::debug!("Joining in-flight bundle update");
                pending.clone()
            } else {
                let pending = self.start_update();
                state.pending = Some(pending.clone());
                pending
            }
        };

        pending.await
    }

    fn start_update(&self) -> PendingUpdate {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn({
            let inner = Arc::clone(&inner);
            async move { inner.run_update().await }
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Bundle update task failed: {e}");
                    inner.state.lock().pending = None;
                    Err(Arc::new(UpdateError::Task(e.to_string())))
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    async fn run_update(&self) -> UpdateResult {
        tracing::info!("Updating modpack...");
        let previous = self.state.lock().bundle.clone();

        let result = async {
            let marker = self.source.staleness_marker().await?;
            let bundle = self.source.build(previous).await?;
            Ok::<_, UpdateError>((marker, bundle))
        }
        .await;

        let mut state = self.state.lock();
        state.pending = None;
        match result {
            Ok((marker, bundle)) => {
                let bundle = Arc::new(bundle);
                tracing::info!(
                    "Updated to version {} ({} entries, {} bytes)",
                    bundle.version_id(),
                    bundle.entries().len(),
                    bundle.blobs().total_size()
                );
                state.bundle = Some(Arc::clone(&bundle));
                state.marker = Some(marker);
                Ok(bundle)
            }
            Err(e) => {
                tracing::error!("Modpack update failed: {e}");
                Err(Arc::new(e))
            }
        }
    }
}
