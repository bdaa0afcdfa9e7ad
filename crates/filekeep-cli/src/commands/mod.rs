//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod project;
pub mod tag;
pub mod workspace;

use clap::{Parser, Subcommand};

use filekeep_core::error::AppError;

use crate::context::CliContext;
use crate::output::OutputFormat;

/// FileKeep: workspace, folder, and tag organizer for stored files
#[derive(Debug, Parser)]
#[command(name = "filekeep", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`); falls back to `FILEKEEP_ENV`
    #[arg(long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Skip confirmation prompts for destructive operations
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Workspace management
    Workspace(workspace::WorkspaceArgs),
    /// Project management
    Project(project::ProjectArgs),
    /// Folder hierarchy of a project
    Folder(folder::FolderArgs),
    /// File records
    File(file::FileArgs),
    /// Workspace tag vocabulary
    Tag(tag::TagArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, ctx: &CliContext) -> Result<(), AppError> {
        let opts = RunOptions {
            format: self.format,
            assume_yes: self.yes,
        };
        match &self.command {
            Commands::Workspace(args) => workspace::execute(args, ctx, opts).await,
            Commands::Project(args) => project::execute(args, ctx, opts).await,
            Commands::Folder(args) => folder::execute(args, ctx, opts).await,
            Commands::File(args) => file::execute(args, ctx, opts).await,
            Commands::Tag(args) => tag::execute(args, ctx, opts).await,
        }
    }
}

/// Global flags every command sees.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Output format
    pub format: OutputFormat,
    /// Answer yes to every confirmation
    pub assume_yes: bool,
}

impl RunOptions {
    /// Ask before a destructive operation. Returns `false` if declined.
    pub fn confirm(&self, prompt: &str) -> Result<bool, AppError> {
        if self.assume_yes {
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;
        if !confirmed {
            println!("Cancelled.");
        }
        Ok(confirmed)
    }
}
