//! Turns pasted text into a metadata fetch and lands the result in the session.

use crate::client::ExtractorClient;
use crate::error::{Error, Result};
use crate::model::SessionState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Split input into candidate URLs: one per line, trimmed, blank lines dropped.
pub fn parse_urls(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The session now holds `count` videos
    Applied { count: usize },
    /// A newer load was started meanwhile; this result was dropped
    Stale,
}

/// Counts outstanding loads; the indicator is visible while any is running
#[derive(Debug, Default, Clone)]
pub struct LoadingIndicator(Arc<AtomicUsize>);

impl LoadingIndicator {
    pub fn is_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }

    fn show(&self) -> IndicatorGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        IndicatorGuard(self.0.clone())
    }
}

struct IndicatorGuard(Arc<AtomicUsize>);

impl Drop for IndicatorGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct MetadataLoader {
    client: ExtractorClient,
    indicator: LoadingIndicator,
}

impl MetadataLoader {
    pub fn new(client: ExtractorClient) -> Self {
        Self {
            client,
            indicator: LoadingIndicator::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.indicator.is_visible()
    }

    /// Fetch metadata for every URL in `input` and replace the session's list.
    ///
    /// The session is left untouched on any error. The lock is never held across
    /// the network call.
    pub async fn load(&self, session: &Mutex<SessionState>, input: &str) -> Result<LoadOutcome> {
        let urls = parse_urls(input);
        if urls.is_empty() {
            return Err(Error::Validation(
                "Please enter at least one URL.".to_string(),
            ));
        }

        let token = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_load();
        let _loading = self.indicator.show();
        debug!(?token, count = urls.len(), "loading metadata");

        let videos = self.client.fetch_metadata(&urls).await.inspect_err(|e| {
            warn!(?token, error = %e, "metadata load failed");
        })?;

        let count = videos.len();
        let applied = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(token, videos);

        if applied {
            info!(count, "session updated");
            Ok(LoadOutcome::Applied { count })
        } else {
            debug!(?token, "discarding stale metadata");
            Ok(LoadOutcome::Stale)
        }
    }
}
