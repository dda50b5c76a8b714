/*!
 * Common test utilities for the briefly test suite
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use briefly::capability::mock::MockCapability;
use briefly::capability::{DownloadProgress, SummarizerCapability};
use briefly::input::CharacterCount;
use briefly::view::{Dialog, SummaryView};
use briefly::{Controller, ControllerSettings, SummarizerOptions};

/// Everything a view was asked to display
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Dialog(Dialog),
    CharacterCount(CharacterCount),
    Generating,
    DownloadProgress(DownloadProgress),
    Summary(String),
    Error(String),
}

/// View that records every call for later assertions
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Summary(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn dialogs(&self) -> Vec<Dialog> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Dialog(dialog) => Some(dialog),
                _ => None,
            })
            .collect()
    }

    pub fn character_counts(&self) -> Vec<CharacterCount> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::CharacterCount(count) => Some(count),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }
}

impl SummaryView for RecordingView {
    fn show_dialog(&self, dialog: Dialog) {
        self.push(ViewEvent::Dialog(dialog));
    }

    fn show_character_count(&self, count: CharacterCount) {
        self.push(ViewEvent::CharacterCount(count));
    }

    fn show_generating(&self) {
        self.push(ViewEvent::Generating);
    }

    fn show_download_progress(&self, progress: DownloadProgress) {
        self.push(ViewEvent::DownloadProgress(progress));
    }

    fn show_summary(&self, summary: &str) {
        self.push(ViewEvent::Summary(summary.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }
}

/// One second quiet period, four thousand character limit
pub fn default_settings() -> ControllerSettings {
    ControllerSettings {
        debounce: Duration::from_millis(1000),
        character_limit: 4000,
    }
}

/// Route library logs to the test harness output; `RUST_LOG` selects the level
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a controller around a mock host and a recording view
pub fn controller_with(host: &MockCapability, view: &Arc<RecordingView>) -> Controller {
    init_logging();
    let capability: Arc<dyn SummarizerCapability> = Arc::new(host.clone());
    Controller::new(
        Some(capability),
        Arc::clone(view) as Arc<dyn SummaryView>,
        SummarizerOptions::default(),
        default_settings(),
    )
}

/// Advance the paused clock by `ms`, letting spawned tasks run in between
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
