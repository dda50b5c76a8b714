/*!
 * # briefly - debounced on-device summarization
 *
 * A Rust library that turns text typed by a user into a summary produced by a
 * host-provided language model capability.
 *
 * ## Features
 *
 * - Probe the host capability and refuse to start when it is missing or unsupported
 * - Debounce text and option changes before summarizing
 * - Create a fresh session per summary and destroy it right after use
 * - Report model download progress while a session is being created
 * - Flag input that may exceed model limits
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: The summarization controller and its state machine
 * - `capability`: Host capability seam:
 *   - `capability::mock`: Scriptable in-process host
 *   - `capability::ollama`: Local Ollama server as the host
 * - `input`: Input buffer and character-count feedback
 * - `options`: Summary type, format and length selectors
 * - `repl`: Line-oriented editor loop used by the binary
 * - `view`: UI boundary and its terminal rendition
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod capability;
pub mod errors;
pub mod input;
pub mod options;
pub mod repl;
pub mod view;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ControllerSettings, ControllerState, ReadyPhase, UiEvent};
pub use capability::{Availability, DownloadProgress, SummarizerCapability, SummarizerSession};
pub use errors::{AppError, CapabilityError};
pub use options::{SummarizerOptions, SummaryFormat, SummaryLength, SummaryType};
