//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    executor::EngineFactory,
    history::{HistoryStore, JsonFileHistoryStore},
    log_debug, log_info,
    logging::LoggerFactory,
    output::OutputFormatterFactory,
    types::OutputFormat,
    PKG_NAME, VERSION,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the application and print its output
    pub async fn run(self) -> Result<()> {
        let output = self.execute().await?;
        if !output.is_empty() {
            println!("{}", output);
        }
        Ok(())
    }

    /// Run the application and return what it would print
    pub async fn execute(&self) -> Result<String> {
        if self.cli.show_env_example {
            return Ok(EnvManager::create_example_env_content());
        }

        self.cli.validate().map_err(AppError::config)?;
        let config = load_config(self.cli.clone())?;

        let loggers = LoggerFactory::new(config.clone());
        let logger = loggers.create_logger("APP").await;
        log_info!(logger, "{} v{} starting", PKG_NAME, VERSION);
        log_debug!(logger, "Configuration:\n{}", display_config_summary(&config));

        for warning in EnvManager::validate_current_env() {
            logger.warn(&warning).log().await;
        }

        let formatter = OutputFormatterFactory::from_config(&config);

        if self.cli.is_history_mode() {
            let store = JsonFileHistoryStore::new(config.history_path());
            let entries = store.load_history()?;
            return formatter.format_history(&entries);
        }

        let session = EngineFactory::create_session(&config, &loggers).await?;
        let summary = session.run_test().await;

        let mut output = String::new();
        if config.output_format == OutputFormat::Text {
            output.push_str(&formatter.format_header("Network Speed Test")?);
            output.push('\n');
        }
        output.push_str(&formatter.format_run(&summary)?);

        Ok(output)
    }
}
