//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Carebase using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Carebase - multi-tenant patient record backend
#[derive(Parser, Debug)]
#[command(name = "carebase")]
#[command(version, about, long_about = None)]
#[command(author = "Carebase Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "carebase.toml", env = "CAREBASE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CAREBASE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),

    /// Seed demo providers, custom fields, and patients
    Seed(commands::seed::SeedArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
