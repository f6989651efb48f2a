//! CLI application entry point and configuration.
//!
//! This module loads the configuration, installs the tracing subscriber and
//! dispatches the parsed command.

use crate::commands::{Cli, Commands, ModelArgs, PredictArgs, ServeArgs, StoreArgs};
use crate::error::{CliError, Result};
use clap::Parser;
use revtag_analysis::TextNormalizer;
use revtag_api::{load_model, AnalyticsAggregator, PredictionPipeline};
use revtag_core::config::{LogFormat, LogLevel};
use revtag_core::{FeedbackStore, RevtagConfig};
use std::sync::Arc;
use tracing::{debug, Level};

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Effective configuration after file, environment and flags.
    pub config: RevtagConfig,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Create an application instance from already parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = RevtagConfig::load_or_default(cli.config.as_deref())?;
        apply_overrides(&mut config, &cli.command);
        Ok(Self { config, cli })
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        self.setup_logging();
        if let Some(path) = &self.cli.config {
            debug!("Using configuration {}", path.display());
        }

        match &self.cli.command {
            Commands::Serve(_) => self.handle_serve(),
            Commands::Predict(args) => self.handle_predict(args),
            Commands::Analytics(_) => self.handle_analytics(),
            Commands::Normalize { text } => {
                println!("{}", TextNormalizer::new().normalize(text));
                Ok(())
            }
            Commands::CheckModel(_) => self.handle_check_model(),
        }
    }

    /// Install the fmt subscriber; logs go to stderr so stdout stays machine-readable.
    fn setup_logging(&self) {
        let builder = tracing_subscriber::fmt()
            .with_max_level(effective_level(self.cli.verbose, self.config.logging.level))
            .with_target(false)
            .with_writer(std::io::stderr);

        // Ignore errors if a subscriber is already installed.
        let _ = match self.config.logging.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Text => builder.try_init(),
        };
    }

    fn handle_serve(&self) -> Result<()> {
        // The server logs its address once the listener is bound.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Internal(e.to_string()))?;

        runtime.block_on(revtag_api::start_server(&self.config))?;
        Ok(())
    }

    fn handle_predict(&self, args: &PredictArgs) -> Result<()> {
        let (artifacts, scorer) = load_model(&self.config)?;
        let path = &self.config.storage.feedback_path;

        let prediction = if args.dry_run {
            let store = FeedbackStore::new(path);
            PredictionPipeline::new(artifacts, Arc::new(scorer), Arc::new(store))
                .predict_without_store(&args.text)?
        } else {
            let store = FeedbackStore::open(path)?;
            PredictionPipeline::new(artifacts, Arc::new(scorer), Arc::new(store))
                .predict(&args.text)?
        };

        println!("{}", serde_json::to_string_pretty(&prediction)?);
        Ok(())
    }

    fn handle_analytics(&self) -> Result<()> {
        let store = FeedbackStore::new(&self.config.storage.feedback_path);
        let report = AnalyticsAggregator::new(Arc::new(store)).aggregate()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    fn handle_check_model(&self) -> Result<()> {
        let (artifacts, scorer) = load_model(&self.config)?;

        println!("model dir: {}", self.config.model.artifact_dir.display());
        println!("labels ({}): {}", artifacts.labels.len(), artifacts.labels.classes().join(", "));
        println!("vocabulary size: {}", artifacts.vectorizer.vocabulary_size());
        println!("classifier features: {}", artifacts.classifier.num_features());
        println!("lexicon entries: {}", scorer.len());
        if let Some(path) = &self.config.model.lexicon_path {
            println!("lexicon overrides: {}", path.display());
        }
        println!("model ok");
        Ok(())
    }
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(config: &mut RevtagConfig, command: &Commands) {
    match command {
        Commands::Serve(ServeArgs {
            host,
            port,
            no_cors,
            store,
            model,
        }) => {
            if let Some(host) = host {
                config.http.host = host.trim().to_string();
            }
            if let Some(port) = port {
                config.http.port = *port;
            }
            if *no_cors {
                config.http.enable_cors = false;
            }
            apply_store_args(config, store);
            apply_model_args(config, model);
        }
        Commands::Predict(args) => {
            apply_store_args(config, &args.store);
            apply_model_args(config, &args.model);
        }
        Commands::Analytics(store) => apply_store_args(config, store),
        Commands::CheckModel(model) => apply_model_args(config, model),
        Commands::Normalize { .. } => {}
    }
}

fn apply_store_args(config: &mut RevtagConfig, args: &StoreArgs) {
    if let Some(data) = &args.data {
        config.storage.feedback_path = data.clone();
    }
}

fn apply_model_args(config: &mut RevtagConfig, args: &ModelArgs) {
    if let Some(models) = &args.models {
        config.model.artifact_dir = models.clone();
    }
    if let Some(lexicon) = &args.lexicon {
        config.model.lexicon_path = Some(lexicon.clone());
    }
}

/// `-v` raises the configured level to debug, `-vv` to trace.
fn effective_level(verbose: u8, configured: LogLevel) -> Level {
    match verbose {
        0 => match configured {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Parse arguments and run the CLI.
pub fn run() -> Result<()> {
    let app = App::new()?;
    app.run()
}
