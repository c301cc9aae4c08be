// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap. Defines the CLI structure
//! and handles argument parsing; security validation happens in
//! `validator` after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Audiobook pipeline coordination service.
#[derive(Parser, Debug, Clone)]
#[command(name = "audiobook-pipeline")]
#[command(about = concat!("Audiobook Pipeline v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the metadata/queue database URL (`sqlite://...`)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Override the blob storage root directory
    #[arg(long)]
    pub blob_root: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP gateway, and by default the in-process stage workers
    /// alongside it.
    Serve {
        /// Address to bind the HTTP gateway to, e.g. 0.0.0.0:8080
        #[arg(long)]
        bind: Option<String>,

        /// Run only the HTTP gateway; stage workers must be started
        /// separately via `worker --stage <name>`.
        #[arg(long)]
        no_workers: bool,
    },

    /// Run a single stage worker standalone.
    Worker {
        /// Which stage to run: extract, segment, synthesize, or package
        #[arg(long, value_parser = parse_stage_name)]
        stage: String,

        /// Stop the process after this many consecutive empty reserves
        /// (0 = run forever). Mainly useful for tests and batch runs.
        #[arg(long, default_value = "0")]
        max_idle_polls: usize,
    },
}

/// Validates the `--stage` value against the four known stage names.
fn parse_stage_name(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "extract" | "segment" | "synthesize" | "package" => Ok(s.to_lowercase()),
        _ => Err(format!(
            "invalid stage '{}'. Valid options: extract, segment, synthesize, package",
            s
        )),
    }
}

/// Parse CLI arguments. Clap exits the process directly on `--help`,
/// `--version`, or a parse error.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stage_name_accepts_known_stages() {
        assert_eq!(parse_stage_name("Extract").unwrap(), "extract");
        assert_eq!(parse_stage_name("PACKAGE").unwrap(), "package");
    }

    #[test]
    fn parse_stage_name_rejects_unknown_stages() {
        assert!(parse_stage_name("transcribe").is_err());
    }

    #[test]
    fn serve_subcommand_parses_with_defaults() {
        let cli = Cli::parse_from(["audiobook-pipeline", "serve"]);
        match cli.command {
            Commands::Serve { bind, no_workers } => {
                assert!(bind.is_none());
                assert!(!no_workers);
            }
            _ => panic!("expected Serve"),
        }
    }

    #[test]
    fn worker_subcommand_requires_a_valid_stage() {
        let cli = Cli::parse_from(["audiobook-pipeline", "worker", "--stage", "segment"]);
        match cli.command {
            Commands::Worker { stage, .. } => assert_eq!(stage, "segment"),
            _ => panic!("expected Worker"),
        }
    }
}
