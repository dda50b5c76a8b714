/*!
 * Host summarization capability.
 *
 * This module defines the seam between the controller and whatever host provides
 * summarization:
 * - `mock`: Scriptable in-process host for tests and demos
 * - `ollama`: Local Ollama server acting as the host
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::CapabilityError;
use crate::options::SummarizerOptions;

/// Readiness tier reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Summarization cannot be used on this host
    No,
    /// A model is present and sessions can be created right away
    Readily,
    /// Sessions can be created once the model has been downloaded
    AfterDownload,
}

impl Availability {
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::No)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::No => "no",
            Self::Readily => "readily",
            Self::AfterDownload => "after-download",
        };
        write!(f, "{}", name)
    }
}

/// One download-progress event emitted while a model is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes received so far
    pub loaded: u64,
    /// Total bytes expected, 0 when the host does not know yet
    pub total: u64,
}

impl DownloadProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.loaded as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Listener registered at session creation to receive download progress
pub type DownloadMonitor = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

/// A configured handle to the capability, valid until destroyed
#[async_trait]
pub trait SummarizerSession: Send + Sync + Debug {
    /// Summarize `text` with the options this session was created with
    async fn summarize(&self, text: &str) -> Result<String, CapabilityError>;

    /// Release the host resources held by this session
    async fn destroy(&self);
}

/// Common trait for all summarization hosts
///
/// The controller receives one of these at construction so that the host can be
/// swapped for a fake in tests.
#[async_trait]
pub trait SummarizerCapability: Send + Sync + Debug {
    /// Query the readiness tier of the host
    async fn availability(&self) -> Result<Availability, CapabilityError>;

    /// Create a session for `options`
    ///
    /// Resolves only once the session is usable, which may include waiting for a
    /// model download. Progress of that download is reported to `monitor`.
    async fn create(
        &self,
        options: SummarizerOptions,
        monitor: Option<DownloadMonitor>,
    ) -> Result<Box<dyn SummarizerSession>, CapabilityError>;
}

/// Create a session after re-checking that the host is still usable
pub async fn create_summarization_session(
    capability: &dyn SummarizerCapability,
    options: SummarizerOptions,
    monitor: Option<DownloadMonitor>,
) -> Result<Box<dyn SummarizerSession>, CapabilityError> {
    let availability = capability.availability().await?;
    if !availability.is_usable() {
        return Err(CapabilityError::NotSupported);
    }

    debug!("Creating summarization session ({}), availability: {}", options, availability);
    capability.create(options, monitor).await
}

pub mod mock;
pub mod ollama;
