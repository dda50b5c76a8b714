// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use briefly::app_config::{self, CapabilityConfig, CapabilityProvider, Config};
use briefly::capability::SummarizerCapability;
use briefly::capability::mock::MockCapability;
use briefly::capability::ollama::OllamaCapability;
use briefly::errors::{AppError, CapabilityError};
use briefly::repl;
use briefly::view::TerminalView;
use briefly::{
    Controller, ControllerSettings, ControllerState, SummaryFormat, SummaryLength, SummaryType,
    UiEvent,
};

/// CLI Wrapper for CapabilityProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Mock,
}

impl From<CliProvider> for CapabilityProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => CapabilityProvider::Ollama,
            CliProvider::Mock => CapabilityProvider::Mock,
        }
    }
}

/// CLI Wrapper for SummaryType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryType {
    KeyPoints,
    Tldr,
    Teaser,
    Headline,
}

impl From<CliSummaryType> for SummaryType {
    fn from(cli_type: CliSummaryType) -> Self {
        match cli_type {
            CliSummaryType::KeyPoints => SummaryType::KeyPoints,
            CliSummaryType::Tldr => SummaryType::Tldr,
            CliSummaryType::Teaser => SummaryType::Teaser,
            CliSummaryType::Headline => SummaryType::Headline,
        }
    }
}

/// CLI Wrapper for SummaryFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryFormat {
    Markdown,
    PlainText,
}

impl From<CliSummaryFormat> for SummaryFormat {
    fn from(cli_format: CliSummaryFormat) -> Self {
        match cli_format {
            CliSummaryFormat::Markdown => SummaryFormat::Markdown,
            CliSummaryFormat::PlainText => SummaryFormat::PlainText,
        }
    }
}

/// CLI Wrapper for SummaryLength to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryLength {
    Short,
    Medium,
    Long,
}

impl From<CliSummaryLength> for SummaryLength {
    fn from(cli_length: CliSummaryLength) -> Self {
        match cli_length {
            CliSummaryLength::Short => SummaryLength::Short,
            CliSummaryLength::Medium => SummaryLength::Medium,
            CliSummaryLength::Long => SummaryLength::Long,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for briefly
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// briefly - summarize text with an on-device model as you type
#[derive(Parser, Debug)]
#[command(name = "briefly")]
#[command(version)]
#[command(about = "Debounced on-device text summarization")]
#[command(long_about = "briefly summarizes the text you type once you pause, using a local model host.

INTERACTIVE MODE:
    Every line you type is appended to the text. A summary is generated one
    second after the last change. Commands:
        :type key-points|tldr|teaser|headline
        :format markdown|plain-text
        :length short|medium|long
        :clear                      empty the text
        :quit                       exit

EXAMPLES:
    briefly                                  # Interactive mode with conf.json
    briefly -p mock                          # Try it without a model server
    briefly --text \"...\" --type tldr         # Summarize once and exit
    briefly -i article.txt -l short          # Summarize a file once
    briefly completions bash > briefly.bash  # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Summarization host to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Host endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Summary type
    #[arg(short = 't', long = "type", value_enum)]
    summary_type: Option<CliSummaryType>,

    /// Summary format
    #[arg(short, long, value_enum)]
    format: Option<CliSummaryFormat>,

    /// Summary length
    #[arg(short, long, value_enum)]
    length: Option<CliSummaryLength>,

    /// Quiet period in milliseconds before a summary is generated
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Summarize this text once and exit
    #[arg(long, conflicts_with = "input_file")]
    text: Option<String>,

    /// Summarize the contents of this file once and exit
    #[arg(short, long, value_name = "PATH")]
    input_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation, filtered by `log::max_level`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "briefly", &mut std::io::stdout());
        return Ok(());
    }

    run(cli).await
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let settings = ControllerSettings::from(&config.controller);
    let view = Arc::new(TerminalView::new(settings.character_limit));
    let capability = build_capability(&config.capability).await;
    let controller = Controller::new(capability, view, config.summarizer, settings);

    let state = controller.initialize().await;
    if !matches!(state, ControllerState::Ready(_)) {
        return Err(AppError::Capability(CapabilityError::NotSupported).into());
    }

    let one_shot = match (&options.text, &options.input_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path).map_err(|e| {
                AppError::File(format!("Failed to read input file {}: {}", path.display(), e))
            })?,
        ),
        (None, None) => None,
    };

    match one_shot {
        Some(text) => {
            controller.handle_event(UiEvent::Input(text));
            controller.wait_until_idle().await;
        }
        None => interactive(&controller).await?,
    }

    Ok(())
}

fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(Path::new(&options.config_path))?;

    if let Some(provider) = &options.provider {
        config.capability.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.capability.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.capability.endpoint = endpoint.clone();
    }
    if let Some(summary_type) = &options.summary_type {
        config.summarizer.summary_type = summary_type.clone().into();
    }
    if let Some(format) = &options.format {
        config.summarizer.format = format.clone().into();
    }
    if let Some(length) = &options.length {
        config.summarizer.length = length.clone().into();
    }
    if let Some(debounce_ms) = options.debounce_ms {
        config.controller.debounce_ms = debounce_ms;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn build_capability(config: &CapabilityConfig) -> Option<Arc<dyn SummarizerCapability>> {
    info!("Summarization host: {} ({})", config.provider.display_name(), config.model);
    match config.provider {
        CapabilityProvider::Ollama => OllamaCapability::detect(config).await,
        CapabilityProvider::Mock => Some(Arc::new(MockCapability::readily()) as Arc<dyn SummarizerCapability>),
    }
}

async fn interactive(controller: &Controller) -> Result<()> {
    info!(
        "Type text to summarize ({}). Use :type, :format, :length, :clear or :quit.",
        controller.options()
    );

    let lines = repl::spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let end = repl::run_session(controller, lines, tokio::signal::ctrl_c()).await?;
    debug!("Exiting after {:?}", end);
    Ok(())
}
