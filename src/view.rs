/*!
 * UI boundary of the summarization controller.
 *
 * The controller only talks to a `SummaryView`; `TerminalView` renders it on a
 * terminal with indicatif for the transient states.
 */

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::io::Write;
use std::time::Duration;

use crate::capability::DownloadProgress;
use crate::input::CharacterCount;

/// Placeholder shown while a summary is being produced
pub const GENERATING_PLACEHOLDER: &str = "Generating summary…";

/// Blocking dialogs shown when summarization cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    /// The host offers no summarization capability at all
    Unavailable,
    /// The capability exists but reports it cannot be used
    Unsupported,
}

impl Dialog {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unavailable => {
                "Summarization is unavailable: no on-device summarization capability was found on this host."
            }
            Self::Unsupported => {
                "Summarization is not supported: the on-device model cannot be used on this host."
            }
        }
    }
}

/// Everything the controller can display
pub trait SummaryView: Send + Sync {
    fn show_dialog(&self, dialog: Dialog);

    fn show_character_count(&self, count: CharacterCount);

    fn show_generating(&self);

    fn show_download_progress(&self, progress: DownloadProgress);

    fn show_summary(&self, summary: &str);

    fn show_error(&self, message: &str);
}

/// Terminal rendition of the view
pub struct TerminalView {
    character_limit: usize,
    spinner: Mutex<Option<ProgressBar>>,
    download: Mutex<Option<ProgressBar>>,
}

impl TerminalView {
    pub fn new(character_limit: usize) -> Self {
        Self {
            character_limit,
            spinner: Mutex::new(None),
            download: Mutex::new(None),
        }
    }

    fn clear_transient(&self) {
        if let Some(spinner) = self.spinner.lock().take() {
            spinner.finish_and_clear();
        }
        if let Some(download) = self.download.lock().take() {
            download.finish_and_clear();
        }
    }
}

impl SummaryView for TerminalView {
    fn show_dialog(&self, dialog: Dialog) {
        self.clear_transient();
        eprintln!("\x1B[1;31m{}\x1B[0m", dialog.message());
    }

    fn show_character_count(&self, count: CharacterCount) {
        if count.over_limit {
            eprintln!(
                "\x1B[1;33m{} characters (over {}, the text may exceed model limits)\x1B[0m",
                count.count, self.character_limit
            );
        } else {
            eprintln!("{} characters", count.count);
        }
    }

    fn show_generating(&self) {
        let mut spinner = self.spinner.lock();
        if spinner.is_some() {
            return;
        }
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(GENERATING_PLACEHOLDER);
        bar.enable_steady_tick(Duration::from_millis(100));
        *spinner = Some(bar);
    }

    fn show_download_progress(&self, progress: DownloadProgress) {
        let mut download = self.download.lock();
        let bar = download.get_or_insert_with(|| {
            let bar = ProgressBar::new(progress.total.max(1));
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}")
                .or_else(|_| ProgressStyle::default_bar().template("[{bar:40}] {bytes}/{total_bytes}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style.progress_chars("█▓▒░"));
            bar.set_message("Downloading model");
            bar
        });
        if progress.total > 0 {
            bar.set_length(progress.total);
        }
        bar.set_position(progress.loaded);
    }

    fn show_summary(&self, summary: &str) {
        self.clear_transient();
        let mut stdout = std::io::stdout();
        let _ = writeln!(stdout, "\n{}\n", summary);
        let _ = stdout.flush();
    }

    fn show_error(&self, message: &str) {
        self.clear_transient();
        eprintln!("\x1B[1;31mSummarization failed: {}\x1B[0m", message);
    }
}
