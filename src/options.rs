use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Summarization options module
/// The three enumerated selectors a user picks from before a summary is produced.
/// Kind of summary to produce
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryType {
    // @type: Bulleted list of the most important points
    #[default]
    KeyPoints,
    // @type: Short overview for a busy reader
    Tldr,
    // @type: Intriguing lead that invites reading the full text
    Teaser,
    // @type: Single-line article headline
    Headline,
}

/// Output format of the summary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryFormat {
    #[default]
    Markdown,
    PlainText,
}

/// Relative length of the summary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryType {
    // @returns: Wire name used by the capability
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyPoints => "key-points",
            Self::Tldr => "tldr",
            Self::Teaser => "teaser",
            Self::Headline => "headline",
        }
    }
}

impl SummaryFormat {
    // @returns: Wire name used by the capability
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plain-text",
        }
    }
}

impl SummaryLength {
    // @returns: Wire name used by the capability
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl std::fmt::Display for SummaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SummaryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "key-points" => Ok(Self::KeyPoints),
            "tldr" => Ok(Self::Tldr),
            "teaser" => Ok(Self::Teaser),
            "headline" => Ok(Self::Headline),
            _ => Err(anyhow!("Invalid summary type: {}", s)),
        }
    }
}

impl std::str::FromStr for SummaryFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "plain-text" => Ok(Self::PlainText),
            _ => Err(anyhow!("Invalid summary format: {}", s)),
        }
    }
}

impl std::str::FromStr for SummaryLength {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(anyhow!("Invalid summary length: {}", s)),
        }
    }
}

/// The full set of selector values a session is created with
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummarizerOptions {
    /// Kind of summary
    #[serde(rename = "type", default)]
    pub summary_type: SummaryType,

    /// Output format
    #[serde(default)]
    pub format: SummaryFormat,

    /// Relative length
    #[serde(default)]
    pub length: SummaryLength,
}

impl SummarizerOptions {
    pub fn new(summary_type: SummaryType, format: SummaryFormat, length: SummaryLength) -> Self {
        Self {
            summary_type,
            format,
            length,
        }
    }
}

impl std::fmt::Display for SummarizerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.summary_type, self.format, self.length)
    }
}
