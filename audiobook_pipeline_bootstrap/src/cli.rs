// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! 1. parser::parse_cli()     Parse CLI with clap
//! 2. validator::validate     Security validation
//! 3. ValidatedCli             Safe, validated config
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: all arguments security-checked, all paths
/// canonicalized.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub database_url: Option<String>,
    pub blob_root: Option<PathBuf>,
}

/// Validated command variants, mirroring `serve`/`worker` (spec §9).
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Serve { bind: Option<String>, no_workers: bool },
    Worker { stage: String, max_idle_polls: usize },
}

/// Parses CLI arguments with clap, then applies security validation.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    if let Some(ref url) = cli.database_url {
        SecureArgParser::validate_argument(url)?;
    }

    if let Some(ref path) = cli.blob_root {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
    }

    let command = match cli.command {
        Commands::Serve { bind, no_workers } => {
            if let Some(ref addr) = bind {
                SecureArgParser::validate_argument(addr)?;
            }
            ValidatedCommand::Serve { bind, no_workers }
        }
        Commands::Worker { stage, max_idle_polls } => ValidatedCommand::Worker { stage, max_idle_polls },
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        database_url: cli.database_url,
        blob_root: cli.blob_root,
    })
}
