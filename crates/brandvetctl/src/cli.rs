//! CLI - command-line argument parsing.
//!
//! Keeps argument parsing separate from execution logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Brandvet CLI
#[derive(Parser)]
#[command(name = "brandvetctl")]
#[command(about = "Brandvet - multi-tier brand label validation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the engine config file (defaults to /etc/brandvet/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate one label against a response text.
    ///
    /// Exit codes: 0 validated/clear match, 2 needs manual review,
    /// 3 label contradicted by the evidence.
    Validate(ValidateArgs),

    /// Print the effective engine configuration as TOML
    Config,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Candidate label to validate
    #[arg(long)]
    pub label: String,

    /// The free-text response the label was assigned to
    #[arg(long)]
    pub text: String,

    /// Category the response was collected under
    #[arg(long, default_value = "uncategorized")]
    pub category: String,

    /// Labels allowed in this category (repeatable)
    #[arg(long = "allowed")]
    pub allowed_labels: Vec<String>,

    /// English translation of the response, if the original needed one
    #[arg(long)]
    pub translated: Option<String>,

    /// Image URL already known for this response (repeatable)
    #[arg(long = "image")]
    pub image_urls: Vec<String>,

    /// Output the full verdict as JSON instead of pretty text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_parse() {
        let cli = Cli::parse_from([
            "brandvetctl",
            "validate",
            "--label",
            "Nike",
            "--text",
            "I bought Nike shoes",
            "--allowed",
            "Nike",
            "--allowed",
            "Adidas",
            "--image",
            "https://img.example/a.png",
            "--json",
        ]);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.label, "Nike");
                assert_eq!(args.allowed_labels.len(), 2);
                assert_eq!(args.image_urls.len(), 1);
                assert!(args.json);
            }
            _ => panic!("expected validate subcommand"),
        }
    }

    #[test]
    fn test_config_subcommand_parses() {
        let cli = Cli::parse_from(["brandvetctl", "--config", "/tmp/b.toml", "config"]);
        assert!(matches!(cli.command, Commands::Config));
        assert!(cli.config.is_some());
    }
}
