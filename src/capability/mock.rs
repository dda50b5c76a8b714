/*!
 * Mock capability implementation for testing.
 *
 * This module provides a scriptable host that simulates different behaviors:
 * - `MockCapability::readily()` - Model present, always summarizes
 * - `MockCapability::after_download(steps)` - Emits download progress on first use
 * - `MockCapability::unsupported()` - Reports the `no` tier
 *
 * Every call made against the host is recorded so tests can assert on ordering.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::capability::{
    Availability, DownloadMonitor, DownloadProgress, SummarizerCapability, SummarizerSession,
};
use crate::errors::CapabilityError;
use crate::options::SummarizerOptions;

/// Simulated model size reported by download progress events
const MOCK_MODEL_BYTES: u64 = 1_000_000;

/// A call observed by the mock host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    Availability,
    Create(SummarizerOptions),
    Summarize(String),
    Destroy,
}

/// Behavior mode for the mock host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Session creation always fails
    FailingCreate,
    /// Sessions are created but summarize fails
    FailingSummarize,
    /// Summarize succeeds after a delay
    Slow { delay_ms: u64 },
}

#[derive(Debug)]
struct MockState {
    availability: Mutex<Availability>,
    download_steps: u64,
    calls: Mutex<Vec<CapabilityCall>>,
    live_sessions: AtomicUsize,
    max_live_sessions: AtomicUsize,
}

/// Mock host for testing controller behavior
#[derive(Debug, Clone)]
pub struct MockCapability {
    behavior: MockBehavior,
    state: Arc<MockState>,
    custom_response: Option<fn(&SummarizerOptions, &str) -> String>,
}

impl MockCapability {
    /// Create a new mock host with the given tier and behavior
    pub fn new(availability: Availability, behavior: MockBehavior) -> Self {
        Self {
            behavior,
            state: Arc::new(MockState {
                availability: Mutex::new(availability),
                download_steps: 4,
                calls: Mutex::new(Vec::new()),
                live_sessions: AtomicUsize::new(0),
                max_live_sessions: AtomicUsize::new(0),
            }),
            custom_response: None,
        }
    }

    /// Model present, summaries always succeed
    pub fn readily() -> Self {
        Self::new(Availability::Readily, MockBehavior::Working)
    }

    /// Model missing; the first session creation emits `steps` progress events
    pub fn after_download(steps: u64) -> Self {
        let mut mock = Self::new(Availability::AfterDownload, MockBehavior::Working);
        if let Some(state) = Arc::get_mut(&mut mock.state) {
            state.download_steps = steps.max(1);
        }
        mock
    }

    /// Host that reports the `no` tier
    pub fn unsupported() -> Self {
        Self::new(Availability::No, MockBehavior::Working)
    }

    /// Summaries take `delay_ms` to resolve
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(Availability::Readily, MockBehavior::Slow { delay_ms })
    }

    pub fn failing_create() -> Self {
        Self::new(Availability::Readily, MockBehavior::FailingCreate)
    }

    pub fn failing_summarize() -> Self {
        Self::new(Availability::Readily, MockBehavior::FailingSummarize)
    }

    /// Set a custom summary generator
    pub fn with_custom_response(mut self, generator: fn(&SummarizerOptions, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Change the tier reported from now on
    pub fn set_availability(&self, availability: Availability) {
        *self.state.availability.lock() = availability;
    }

    /// All calls recorded so far, in order
    pub fn calls(&self) -> Vec<CapabilityCall> {
        self.state.calls.lock().clone()
    }

    /// Recorded calls excluding availability probes
    pub fn session_calls(&self) -> Vec<CapabilityCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != CapabilityCall::Availability)
            .collect()
    }

    /// Number of sessions created and not yet destroyed
    pub fn live_sessions(&self) -> usize {
        self.state.live_sessions.load(Ordering::SeqCst)
    }

    /// Highest number of sessions that were alive at the same time
    pub fn max_live_sessions(&self) -> usize {
        self.state.max_live_sessions.load(Ordering::SeqCst)
    }

    fn record(&self, call: CapabilityCall) {
        self.state.calls.lock().push(call);
    }

    async fn simulate_download(&self, monitor: Option<&DownloadMonitor>) {
        let steps = self.state.download_steps;
        for step in 1..=steps {
            tokio::task::yield_now().await;
            if let Some(monitor) = monitor {
                monitor(DownloadProgress {
                    loaded: MOCK_MODEL_BYTES * step / steps,
                    total: MOCK_MODEL_BYTES,
                });
            }
        }
        // Once downloaded the model stays cached
        *self.state.availability.lock() = Availability::Readily;
    }
}

#[async_trait]
impl SummarizerCapability for MockCapability {
    async fn availability(&self) -> Result<Availability, CapabilityError> {
        self.record(CapabilityCall::Availability);
        Ok(*self.state.availability.lock())
    }

    async fn create(
        &self,
        options: SummarizerOptions,
        monitor: Option<DownloadMonitor>,
    ) -> Result<Box<dyn SummarizerSession>, CapabilityError> {
        self.record(CapabilityCall::Create(options));

        if self.behavior == MockBehavior::FailingCreate {
            return Err(CapabilityError::ApiError {
                status_code: 500,
                message: "Simulated session creation failure".to_string(),
            });
        }

        let availability = *self.state.availability.lock();
        match availability {
            Availability::No => return Err(CapabilityError::NotSupported),
            Availability::AfterDownload => self.simulate_download(monitor.as_ref()).await,
            Availability::Readily => {}
        }

        let live = self.state.live_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_live_sessions.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            options,
            host: self.clone(),
            destroyed: AtomicBool::new(false),
        }))
    }
}

/// Session handed out by `MockCapability`
#[derive(Debug)]
pub struct MockSession {
    options: SummarizerOptions,
    host: MockCapability,
    destroyed: AtomicBool,
}

#[async_trait]
impl SummarizerSession for MockSession {
    async fn summarize(&self, text: &str) -> Result<String, CapabilityError> {
        self.host.record(CapabilityCall::Summarize(text.to_string()));

        if self.destroyed.load(Ordering::SeqCst) {
            return Err(CapabilityError::SessionClosed);
        }

        match self.host.behavior {
            MockBehavior::FailingSummarize => {
                return Err(CapabilityError::ApiError {
                    status_code: 500,
                    message: "Simulated summarization failure".to_string(),
                });
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            }
            MockBehavior::Working | MockBehavior::FailingCreate => {}
        }

        let summary = match self.host.custom_response {
            Some(generator) => generator(&self.options, text),
            None => format!("[{}] {}", self.options, text),
        };
        Ok(summary)
    }

    async fn destroy(&self) {
        self.host.record(CapabilityCall::Destroy);
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.host.state.live_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
