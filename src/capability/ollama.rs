use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::CapabilityConfig;
use crate::capability::{
    Availability, DownloadMonitor, DownloadProgress, SummarizerCapability, SummarizerSession,
};
use crate::errors::CapabilityError;
use crate::options::{SummarizerOptions, SummaryFormat, SummaryLength, SummaryType};

/// Ollama server acting as the summarization host
#[derive(Debug)]
pub struct OllamaCapability {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for every session
    model: String,
    /// Whether a missing model may be pulled
    allow_download: bool,
    /// HTTP client for short requests and generation
    client: Client,
    /// HTTP client for model pulls, which can run for a long time
    pull_client: Client,
}

/// Version response, used only to check that a server answers
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Locally available models
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Pull request for the Ollama API
#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

/// One line of the streamed pull response
#[derive(Debug, Deserialize)]
struct PullStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    response: String,
}

impl OllamaCapability {
    /// Create a new host from configuration
    pub fn new(config: &CapabilityConfig) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let pull_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            allow_download: config.allow_download,
            client,
            pull_client,
        })
    }

    /// Return the host only if a server answers at the configured endpoint
    pub async fn detect(config: &CapabilityConfig) -> Option<Arc<dyn SummarizerCapability>> {
        let capability = match Self::new(config) {
            Ok(capability) => capability,
            Err(e) => {
                error!("Failed to create Ollama client: {}", e);
                return None;
            }
        };

        match capability.server_version().await {
            Ok(version) => {
                info!("Ollama {} found at {}", version, capability.base_url);
                Some(Arc::new(capability) as Arc<dyn SummarizerCapability>)
            }
            Err(e) => {
                warn!("No Ollama server at {}: {}", capability.base_url, e);
                None
            }
        }
    }

    async fn server_version(&self) -> Result<String, CapabilityError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: VersionResponse = response.json().await?;
        Ok(body.version)
    }

    async fn model_present(&self) -> Result<bool, CapabilityError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = check_status(self.client.get(&url).send().await?).await?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.iter().any(|tag| model_matches(&tag.name, &self.model)))
    }

    /// Pull the model, forwarding byte counts to `monitor`
    async fn pull_model(&self, monitor: Option<&DownloadMonitor>) -> Result<(), CapabilityError> {
        info!("Downloading model {}", self.model);
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .pull_client
            .post(&url)
            .json(&PullRequest { model: &self.model, stream: true })
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut stream = response.bytes_stream();
        let mut lines = NdjsonLines::default();
        let mut succeeded = false;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CapabilityError::DownloadFailed(e.to_string()))?;
            for line in lines.push(&chunk) {
                if let Some(status) = parse_pull_line(&line)? {
                    succeeded |= handle_pull_status(&status, monitor)?;
                }
            }
        }

        if let Some(status) = parse_pull_line(&lines.finish())? {
            succeeded |= handle_pull_status(&status, monitor)?;
        }

        if succeeded {
            info!("Model {} downloaded", self.model);
            Ok(())
        } else {
            Err(CapabilityError::DownloadFailed(format!(
                "pull of {} ended without success",
                self.model
            )))
        }
    }
}

#[async_trait]
impl SummarizerCapability for OllamaCapability {
    async fn availability(&self) -> Result<Availability, CapabilityError> {
        if self.model_present().await? {
            Ok(Availability::Readily)
        } else if self.allow_download {
            Ok(Availability::AfterDownload)
        } else {
            debug!("Model {} missing and downloads are disabled", self.model);
            Ok(Availability::No)
        }
    }

    async fn create(
        &self,
        options: SummarizerOptions,
        monitor: Option<DownloadMonitor>,
    ) -> Result<Box<dyn SummarizerSession>, CapabilityError> {
        if !self.model_present().await? {
            if !self.allow_download {
                return Err(CapabilityError::NotSupported);
            }
            self.pull_model(monitor.as_ref()).await?;
        }

        let session = OllamaSession {
            id: Uuid::new_v4(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            system_prompt: system_prompt(&options),
            client: self.client.clone(),
            destroyed: AtomicBool::new(false),
        };
        debug!("Session {} created with {}", session.id, options);
        Ok(Box::new(session))
    }
}

/// Session bound to one set of options on an Ollama server
#[derive(Debug)]
pub struct OllamaSession {
    id: Uuid,
    base_url: String,
    model: String,
    system_prompt: String,
    client: Client,
    destroyed: AtomicBool,
}

#[async_trait]
impl SummarizerSession for OllamaSession {
    async fn summarize(&self, text: &str) -> Result<String, CapabilityError> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(CapabilityError::SessionClosed);
        }

        let url = format!("{}/api/generate", self.base_url);
        let request = GenerationRequest {
            model: &self.model,
            prompt: text,
            system: &self.system_prompt,
            stream: false,
        };

        let response = check_status(self.client.post(&url).json(&request).send().await?).await?;
        let body = response.text().await?;
        let generated: GenerationResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            );
            CapabilityError::ParseError(e.to_string())
        })?;

        Ok(generated.response.trim().to_string())
    }

    async fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            debug!("Session {} destroyed", self.id);
        }
    }
}

/// Build the system prompt that steers the model towards the selected options
pub fn system_prompt(options: &SummarizerOptions) -> String {
    let task = match options.summary_type {
        SummaryType::KeyPoints => "Extract the most important points from the text as a bulleted list.",
        SummaryType::Tldr => "Write a short, to-the-point overview of the text for a busy reader.",
        SummaryType::Teaser => {
            "Write an intriguing teaser that highlights the most interesting parts of the text and invites the reader to read it in full."
        }
        SummaryType::Headline => "Write a single headline that captures the main point of the text, in the style of an article title.",
    };

    let size = match (options.summary_type, options.length) {
        (SummaryType::KeyPoints, SummaryLength::Short) => "Use at most 3 bullet points.",
        (SummaryType::KeyPoints, SummaryLength::Medium) => "Use at most 5 bullet points.",
        (SummaryType::KeyPoints, SummaryLength::Long) => "Use at most 7 bullet points.",
        (SummaryType::Headline, SummaryLength::Short) => "Use at most 12 words.",
        (SummaryType::Headline, SummaryLength::Medium) => "Use at most 17 words.",
        (SummaryType::Headline, SummaryLength::Long) => "Use at most 22 words.",
        (_, SummaryLength::Short) => "Use 1 sentence.",
        (_, SummaryLength::Medium) => "Use at most 3 sentences.",
        (_, SummaryLength::Long) => "Use at most 5 sentences.",
    };

    let format = match options.format {
        SummaryFormat::Markdown => "Format the output as Markdown.",
        SummaryFormat::PlainText => "Output plain text only, without any Markdown formatting.",
    };

    format!("{} {} {} Reply with the summary only.", task, size, format)
}

/// Ollama lists untagged models as `name:latest`
fn model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || (!wanted.contains(':') && listed == format!("{}:latest", wanted))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CapabilityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    Err(CapabilityError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}

/// Splits a streamed body into lines, decoding a line only once it is complete
#[derive(Debug, Default)]
struct NdjsonLines {
    pending: Vec<u8>,
}

impl NdjsonLines {
    /// Append a chunk and return every line it completed
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever followed the last newline
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

fn parse_pull_line(line: &str) -> Result<Option<PullStatus>, CapabilityError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| CapabilityError::ParseError(format!("pull status: {}", e)))
}

/// Returns whether the status line reports the end of a successful pull
fn handle_pull_status(
    status: &PullStatus,
    monitor: Option<&DownloadMonitor>,
) -> Result<bool, CapabilityError> {
    if let Some(message) = &status.error {
        return Err(CapabilityError::DownloadFailed(message.clone()));
    }

    if let (Some(total), Some(monitor)) = (status.total, monitor) {
        monitor(DownloadProgress {
            loaded: status.completed.unwrap_or(0),
            total,
        });
    }

    Ok(status.status == "success")
}
