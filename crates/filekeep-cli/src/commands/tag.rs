//! Tag vocabulary CLI commands.

use clap::{Args, Subcommand};

use filekeep_core::error::AppError;
use filekeep_core::types::WorkspaceId;

use super::RunOptions;
use crate::context::CliContext;
use crate::output::{self, FileRow, OutputFormat, TagRow};

/// Arguments for tag commands
#[derive(Debug, Args)]
pub struct TagArgs {
    /// Tag subcommand
    #[command(subcommand)]
    pub command: TagCommand,
}

/// Tag subcommands
#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// Show every tag with its file count
    Stats {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
    },
    /// List the files carrying a tag
    Files {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
        /// Tag (any spelling)
        tag: String,
    },
    /// Respell a tag on every file
    Rename {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
        /// Current tag
        old: String,
        /// New spelling
        new: String,
    },
    /// Fold one tag into another
    Merge {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
        /// Tag to fold away
        source: String,
        /// Tag to keep
        target: String,
    },
    /// Remove a tag from every file
    Delete {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
        /// Tag to remove
        tag: String,
    },
}

/// Execute tag commands
pub async fn execute(args: &TagArgs, ctx: &CliContext, opts: RunOptions) -> Result<(), AppError> {
    match &args.command {
        TagCommand::Stats { workspace } => {
            let stats = ctx.taxonomy(*workspace).stats().await?;
            match opts.format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    let rows: Vec<TagRow> = stats.iter().map(TagRow::from).collect();
                    output::print_list(&rows, opts.format);
                }
            }
        }
        TagCommand::Files { workspace, tag } => {
            let files = ctx.taxonomy(*workspace).files_with_tag(tag).await?;
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, opts.format);
        }
        TagCommand::Rename {
            workspace,
            old,
            new,
        } => {
            let report = ctx.taxonomy(*workspace).rename(old, new).await?;
            output::print_tag_report(&report, opts.format);
        }
        TagCommand::Merge {
            workspace,
            source,
            target,
        } => {
            if !opts.confirm(&format!("Merge '{source}' into '{target}' on every file?"))? {
                return Ok(());
            }
            let report = ctx.taxonomy(*workspace).merge(source, target).await?;
            output::print_tag_report(&report, opts.format);
        }
        TagCommand::Delete { workspace, tag } => {
            if !opts.confirm(&format!("Remove '{tag}' from every file?"))? {
                return Ok(());
            }
            let report = ctx.taxonomy(*workspace).delete(tag).await?;
            output::print_tag_report(&report, opts.format);
        }
    }

    Ok(())
}
