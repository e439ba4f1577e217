//! Timeline dispatcher: one fresh transaction handle per mutation.

use remilk_types::{RtmApi, Timeline, traits::Result};
use std::sync::Arc;

/// Obtains a fresh timeline from the backend before every mutating call.
///
/// Handles are never cached or reused across calls; each mutation gets its
/// own undo scope. Failure to obtain one fails that call; there is no local
/// retry and no batching.
#[derive(Clone)]
pub struct TimelineDispatcher {
    backend: Arc<dyn RtmApi>,
}

impl TimelineDispatcher {
    #[must_use]
    pub fn new(backend: Arc<dyn RtmApi>) -> Self {
        Self { backend }
    }

    /// Obtain the handle for exactly one mutating call.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged when the handle cannot be
    /// obtained.
    pub async fn begin(&self) -> Result<Timeline> {
        let timeline = self.backend.create_timeline().await?;
        tracing::debug!(%timeline, "opened timeline");
        Ok(timeline)
    }
}
