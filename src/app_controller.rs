use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::app_config::ControllerConfig;
use crate::capability::{
    Availability, DownloadMonitor, DownloadProgress, SummarizerCapability,
    create_summarization_session,
};
use crate::input::{CharacterCount, InputBuffer};
use crate::options::{SummarizerOptions, SummaryFormat, SummaryLength, SummaryType};
use crate::view::{Dialog, SummaryView};

// @module: Summarization controller

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    ProbingCapability,
    /// No capability was provided; terminal
    Unavailable,
    /// The capability reported the `no` tier; terminal
    Unsupported,
    Ready(ReadyPhase),
}

/// Sub-state while the controller accepts input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyPhase {
    Idle,
    /// A timer is pending and no summary is being produced
    Debouncing,
    /// At least one summarization run is queued or in flight
    Summarizing,
}

/// Events coming from the input region and the three selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The input region now holds this text
    Input(String),
    TypeChanged(SummaryType),
    FormatChanged(SummaryFormat),
    LengthChanged(SummaryLength),
}

/// Timing and feedback settings
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Quiet period after the last event
    pub debounce: Duration,
    /// Character count above which input is flagged
    pub character_limit: usize,
}

impl From<&ControllerConfig> for ControllerSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            debounce: config.debounce(),
            character_limit: config.character_limit,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&ControllerConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Uninitialized,
    Probing,
    Unavailable,
    Unsupported,
    Ready,
}

struct Shared {
    status: Status,
    input: InputBuffer,
    options: SummarizerOptions,
    // @field: Single pending debounce timer
    pending: Option<JoinHandle<()>>,
    // @field: Bumped on every reschedule so a superseded timer never fires
    generation: u64,
    // @field: Runs fired and not yet finished
    running: usize,
}

struct Inner {
    capability: Option<Arc<dyn SummarizerCapability>>,
    view: Arc<dyn SummaryView>,
    debounce: Duration,
    shared: Mutex<Shared>,
    // @field: Serializes runs so that at most one session is alive
    in_flight: tokio::sync::Mutex<()>,
    // @field: Signalled whenever a run finishes or the timer is canceled
    settled: Notify,
}

/// Main controller wiring input events to the summarization capability
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    /// Create a controller; `capability` is `None` when the host offers no summarization
    pub fn new(
        capability: Option<Arc<dyn SummarizerCapability>>,
        view: Arc<dyn SummaryView>,
        options: SummarizerOptions,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                capability,
                view,
                debounce: settings.debounce,
                shared: Mutex::new(Shared {
                    status: Status::Uninitialized,
                    input: InputBuffer::new(settings.character_limit),
                    options,
                    pending: None,
                    generation: 0,
                    running: 0,
                }),
                in_flight: tokio::sync::Mutex::new(()),
                settled: Notify::new(),
            }),
        }
    }

    pub fn state(&self) -> ControllerState {
        let shared = self.inner.shared.lock();
        match shared.status {
            Status::Uninitialized => ControllerState::Uninitialized,
            Status::Probing => ControllerState::ProbingCapability,
            Status::Unavailable => ControllerState::Unavailable,
            Status::Unsupported => ControllerState::Unsupported,
            Status::Ready if shared.running > 0 => ControllerState::Ready(ReadyPhase::Summarizing),
            Status::Ready if shared.pending.is_some() => ControllerState::Ready(ReadyPhase::Debouncing),
            Status::Ready => ControllerState::Ready(ReadyPhase::Idle),
        }
    }

    pub fn options(&self) -> SummarizerOptions {
        self.inner.shared.lock().options
    }

    pub fn text(&self) -> String {
        self.inner.shared.lock().input.text().to_string()
    }

    pub fn character_count(&self) -> CharacterCount {
        self.inner.shared.lock().input.character_count()
    }

    /// Probe the capability once and settle into Ready, Unavailable or Unsupported
    pub async fn initialize(&self) -> ControllerState {
        {
            let mut shared = self.inner.shared.lock();
            if shared.status != Status::Uninitialized {
                drop(shared);
                return self.state();
            }
            shared.status = Status::Probing;
        }

        let Some(capability) = self.inner.capability.clone() else {
            warn!("No summarization capability available");
            self.inner.shared.lock().status = Status::Unavailable;
            self.inner.view.show_dialog(Dialog::Unavailable);
            return self.state();
        };

        let availability = match capability.availability().await {
            Ok(availability) => availability,
            Err(e) => {
                error!("Failed to query summarization availability: {}", e);
                Availability::No
            }
        };

        if !availability.is_usable() {
            warn!("Summarization capability reported availability '{}'", availability);
            self.inner.shared.lock().status = Status::Unsupported;
            self.inner.view.show_dialog(Dialog::Unsupported);
            return self.state();
        }

        info!("Summarization available ({})", availability);
        self.inner.shared.lock().status = Status::Ready;
        self.state()
    }

    /// Apply a UI event and (re)start the debounce timer
    ///
    /// Events are ignored unless the controller is Ready. Must be called from within
    /// a tokio runtime.
    pub fn handle_event(&self, event: UiEvent) {
        let mut shared = self.inner.shared.lock();
        if shared.status != Status::Ready {
            debug!("Ignoring {:?} while {:?}", event, shared.status);
            return;
        }

        let mut count = None;
        match event {
            UiEvent::Input(text) => count = Some(shared.input.set_text(text)),
            UiEvent::TypeChanged(summary_type) => shared.options.summary_type = summary_type,
            UiEvent::FormatChanged(format) => shared.options.format = format,
            UiEvent::LengthChanged(length) => shared.options.length = length,
        }

        self.schedule(&mut shared);
        drop(shared);

        if let Some(count) = count {
            self.inner.view.show_character_count(count);
        }
    }

    /// Cancel the pending timer, if any; in-flight runs are left to finish
    pub fn cancel_pending(&self) {
        let mut shared = self.inner.shared.lock();
        if let Some(pending) = shared.pending.take() {
            pending.abort();
            shared.generation += 1;
        }
        drop(shared);
        self.inner.settled.notify_waiters();
    }

    /// Wait until no timer is pending and no run is in flight
    pub async fn wait_until_idle(&self) {
        loop {
            let settled = self.inner.settled.notified();
            tokio::pin!(settled);
            // Registered before the check so a wakeup in between is not lost
            settled.as_mut().enable();

            if !matches!(
                self.state(),
                ControllerState::Ready(ReadyPhase::Debouncing | ReadyPhase::Summarizing)
            ) {
                return;
            }
            settled.await;
        }
    }

    fn schedule(&self, shared: &mut Shared) {
        if let Some(previous) = shared.pending.take() {
            previous.abort();
        }
        shared.generation += 1;
        let generation = shared.generation;
        let inner = Arc::clone(&self.inner);

        shared.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            Inner::fire(inner, generation).await;
        }));
    }
}

impl Inner {
    async fn fire(inner: Arc<Inner>, generation: u64) {
        let (text, options) = {
            let mut shared = inner.shared.lock();
            if shared.generation != generation {
                return;
            }
            // Leaving the slot empty detaches this task from later cancellation
            shared.pending = None;
            shared.running += 1;
            (shared.input.text().to_string(), shared.options)
        };

        inner.run(&text, options).await;

        inner.shared.lock().running -= 1;
        inner.settled.notify_waiters();
    }

    async fn run(&self, text: &str, options: SummarizerOptions) {
        let _in_flight = self.in_flight.lock().await;
        let Some(capability) = self.capability.as_ref() else {
            return;
        };

        self.view.show_generating();

        let view = Arc::clone(&self.view);
        let monitor: DownloadMonitor =
            Arc::new(move |progress: DownloadProgress| view.show_download_progress(progress));

        let session = match create_summarization_session(capability.as_ref(), options, Some(monitor)).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to create summarization session: {}", e);
                self.view.show_error(&e.to_string());
                return;
            }
        };

        debug!("Summarizing {} characters with {}", text.chars().count(), options);
        let result = session.summarize(text).await;
        session.destroy().await;

        match result {
            Ok(summary) => self.view.show_summary(&summary),
            Err(e) => {
                error!("Summarization failed: {}", e);
                self.view.show_error(&e.to_string());
            }
        }
    }
}
