//! Folder hierarchy CLI commands.

use clap::{Args, Subcommand};

use filekeep_core::error::AppError;
use filekeep_core::types::{FolderId, ProjectId};
use filekeep_service::MoveOutcome;

use super::RunOptions;
use crate::context::CliContext;
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Project the folders belong to
    #[arg(short, long)]
    pub project: ProjectId,

    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Show the folder tree with file counts
    Tree,
    /// Create a folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for project root)
        #[arg(long)]
        parent: Option<FolderId>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: FolderId,
        /// New name
        name: String,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: FolderId,
        /// New parent folder ID (omit for project root)
        #[arg(long)]
        to: Option<FolderId>,
    },
    /// Delete a folder, moving its contents up one level
    Delete {
        /// Folder ID
        id: FolderId,
    },
    /// Print the breadcrumb path of a folder
    Path {
        /// Folder ID
        id: FolderId,
    },
}

/// Execute folder commands
pub async fn execute(args: &FolderArgs, ctx: &CliContext, opts: RunOptions) -> Result<(), AppError> {
    let mut tree = ctx.tree(args.project).await?;

    match &args.command {
        FolderCommand::Tree => {
            output::print_tree(&tree.build(), opts.format);
        }
        FolderCommand::Create { name, parent } => {
            let folder = tree.create(name, *parent).await?;
            match opts.format {
                OutputFormat::Json => output::print_json(&folder),
                OutputFormat::Table => output::print_success(&format!(
                    "Folder '{}' created (id: {})",
                    folder.path, folder.id
                )),
            }
        }
        FolderCommand::Rename { id, name } => {
            let folder = tree.rename(*id, name).await?;
            output::print_success(&format!("Folder renamed to '{}'", folder.path));
        }
        FolderCommand::Move { id, to } => match tree.move_folder(*id, *to).await? {
            MoveOutcome::Moved(folder) => {
                output::print_success(&format!("Folder moved to '{}'", folder.path))
            }
            MoveOutcome::Unchanged => output::print_warning("Folder is already there"),
        },
        FolderCommand::Delete { id } => {
            let name = tree
                .get(*id)
                .map(|f| f.path.clone())
                .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
            if !opts.confirm(&format!(
                "Delete folder '{name}'? Its files and subfolders move up one level."
            ))? {
                return Ok(());
            }
            let deletion = tree.delete(*id).await?;
            match opts.format {
                OutputFormat::Json => output::print_json(&deletion),
                OutputFormat::Table => {
                    output::print_success(&format!("Folder '{name}' deleted"));
                    output::print_kv("files moved", &deletion.files_reparented.to_string());
                    output::print_kv("folders moved", &deletion.folders_reparented.to_string());
                }
            }
        }
        FolderCommand::Path { id } => {
            let names = tree.path_of(Some(*id))?;
            match opts.format {
                OutputFormat::Json => output::print_json(&names),
                OutputFormat::Table => println!("/{}", names.join("/")),
            }
        }
    }

    Ok(())
}
