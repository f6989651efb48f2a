//! CLI command definitions for revtag.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(name = "revtag", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity (-v debug, -vv trace)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "REVTAG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Tag one review and print the prediction as JSON
    Predict(PredictArgs),

    /// Print tag and sentiment counts over the feedback log
    Analytics(StoreArgs),

    /// Print the normalized form of a review
    Normalize {
        /// Review text
        text: String,
    },

    /// Load and validate the model artifacts
    CheckModel(ModelArgs),
}

/// Model artifact location overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct ModelArgs {
    /// Directory holding vectorizer.json, classifier.json and labels.json
    #[arg(long, env = "REVTAG_MODELS")]
    pub models: Option<PathBuf>,

    /// JSON lexicon merged over the built-in sentiment lexicon
    #[arg(long)]
    pub lexicon: Option<PathBuf>,
}

/// Feedback log location override.
#[derive(Args, Debug, Default, Clone)]
pub struct StoreArgs {
    /// CSV feedback log
    #[arg(long, env = "REVTAG_DATA")]
    pub data: Option<PathBuf>,
}

/// `serve` arguments.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Disable CORS
    #[arg(long)]
    pub no_cors: bool,

    /// Feedback log override
    #[command(flatten)]
    pub store: StoreArgs,

    /// Model overrides
    #[command(flatten)]
    pub model: ModelArgs,
}

/// `predict` arguments.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Review text
    pub text: String,

    /// Do not append the prediction to the feedback log
    #[arg(long)]
    pub dry_run: bool,

    /// Feedback log override
    #[command(flatten)]
    pub store: StoreArgs,

    /// Model overrides
    #[command(flatten)]
    pub model: ModelArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "revtag", "-v", "serve", "--host", "0.0.0.0", "--port", "8080", "--data", "x.csv",
            "--models", "m",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.store.data, Some(PathBuf::from("x.csv")));
                assert_eq!(args.model.models, Some(PathBuf::from("m")));
                assert!(!args.no_cors);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_predict_dry_run() {
        let cli = Cli::try_parse_from(["revtag", "predict", "Great value", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Predict(args) => {
                assert_eq!(args.text, "Great value");
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["revtag", "analytics", "-vv", "--config", "revtag.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("revtag.toml")));
        assert!(matches!(cli.command, Commands::Analytics(_)));
    }

    #[test]
    fn predict_requires_text() {
        assert!(Cli::try_parse_from(["revtag", "predict"]).is_err());
        assert!(Cli::try_parse_from(["revtag", "check-model"]).is_ok());
    }
}
