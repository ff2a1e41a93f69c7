//! Blocking wrapper for AsyncEventClient
//!
//! Provides a synchronous `track` for code that doesn't run an async runtime.

use tokio::runtime::{Handle, Runtime};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

use super::client::AsyncEventClient;
use super::events::TrackEvent;

/// Synchronous event client
///
/// Owns a current-thread tokio runtime and drives each request to completion
/// on the calling thread. Can be shared across threads (`Arc<EventClient>`);
/// concurrent calls each block only their own thread.
///
/// Calling `track` from inside an async runtime returns [`Error::Runtime`]
/// instead of blocking the executor; use [`AsyncEventClient`] there.
#[derive(Debug)]
pub struct EventClient {
    inner: AsyncEventClient,
    // Only taken in `Drop`
    runtime: Option<Runtime>,
}

impl EventClient {
    /// Create a new blocking client from configuration
    ///
    /// Returns [`Error::Config`] for missing or invalid settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = AsyncEventClient::new(config)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            inner,
            runtime: Some(runtime),
        })
    }

    /// Send one event, blocking until the server responds or the transport fails
    pub fn track(&self, event: &TrackEvent) -> Result<()> {
        if Handle::try_current().is_ok() {
            return Err(Error::Runtime(
                "blocking EventClient called from inside an async runtime; use AsyncEventClient"
                    .to_string(),
            ));
        }

        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| Error::Runtime("runtime already shut down".to_string()))?;
        runtime.block_on(self.inner.track(event))
    }

    /// Normalized base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Subject used when an event names none
    pub fn default_subject_id(&self) -> Option<&str> {
        self.inner.default_subject_id()
    }

    /// The async client this wrapper drives
    pub fn as_async(&self) -> &AsyncEventClient {
        &self.inner
    }
}

impl Drop for EventClient {
    fn drop(&mut self) {
        // A plain Runtime drop panics inside another runtime; this one never blocks
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
