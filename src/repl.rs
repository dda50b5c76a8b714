/*!
 * Line-oriented editor loop driving a `Controller`.
 *
 * Each plain line is appended to the text; lines starting with `:` change a
 * selector, clear the text or quit.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use std::future::Future;
use std::io::BufRead;
use tokio::sync::mpsc;

use crate::app_controller::{Controller, UiEvent};
use crate::options::{SummaryFormat, SummaryLength, SummaryType};

/// A line typed in interactive mode
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Append(String),
    SetType(SummaryType),
    SetFormat(SummaryFormat),
    SetLength(SummaryLength),
    Clear,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Ok(Self::Append(line.trim_end_matches(['\r', '\n']).to_string()));
        };

        let (name, value) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        match name {
            "type" => Ok(Self::SetType(value.parse()?)),
            "format" => Ok(Self::SetFormat(value.parse()?)),
            "length" => Ok(Self::SetLength(value.parse()?)),
            "clear" => Ok(Self::Clear),
            "quit" | "q" => Ok(Self::Quit),
            _ => Err(anyhow!("Unknown command: :{}", name)),
        }
    }
}

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Input was closed; a pending summary still fires
    EndOfInput,
    /// `:quit` was typed; a pending summary is dropped
    Quit,
    /// The interrupt fired; a pending summary is dropped
    Interrupted,
}

/// Read lines from `reader` on a dedicated thread
///
/// The channel closes once the reader hits EOF or the receiver is dropped. A
/// blocked read on this thread never holds up runtime shutdown.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<std::io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in reader.lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Feed `lines` to `controller` until input ends, `:quit` or `interrupt`
///
/// Returns once in-flight summaries have been rendered.
pub async fn run_session<F>(
    controller: &Controller,
    mut lines: mpsc::Receiver<std::io::Result<String>>,
    interrupt: F,
) -> Result<SessionEnd>
where
    F: Future,
{
    tokio::pin!(interrupt);
    let mut text = String::new();

    let end = loop {
        let next = tokio::select! {
            line = lines.recv() => Some(line),
            _ = &mut interrupt => None,
        };
        let Some(line) = next else {
            break SessionEnd::Interrupted;
        };
        let Some(line) = line else {
            break SessionEnd::EndOfInput;
        };
        let line = line.context("Failed to read input line")?;

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let event = match command {
            ReplCommand::Append(line) => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&line);
                UiEvent::Input(text.clone())
            }
            ReplCommand::Clear => {
                text.clear();
                UiEvent::Input(String::new())
            }
            ReplCommand::SetType(summary_type) => UiEvent::TypeChanged(summary_type),
            ReplCommand::SetFormat(format) => UiEvent::FormatChanged(format),
            ReplCommand::SetLength(length) => UiEvent::LengthChanged(length),
            ReplCommand::Quit => break SessionEnd::Quit,
        };

        debug!("Event: {:?}", event);
        controller.handle_event(event);
    };

    debug!("Interactive session ended: {:?}", end);
    if end != SessionEnd::EndOfInput {
        controller.cancel_pending();
    }
    controller.wait_until_idle().await;
    Ok(end)
}
