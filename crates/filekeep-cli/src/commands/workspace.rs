//! Workspace management CLI commands.

use clap::{Args, Subcommand};

use filekeep_core::error::AppError;
use filekeep_core::types::WorkspaceId;

use super::RunOptions;
use crate::context::CliContext;
use crate::output::{self, OutputFormat, WorkspaceRow};

/// Arguments for workspace commands
#[derive(Debug, Args)]
pub struct WorkspaceArgs {
    /// Workspace subcommand
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

/// Workspace subcommands
#[derive(Debug, Subcommand)]
pub enum WorkspaceCommand {
    /// List all workspaces
    List,
    /// Create a workspace
    Create {
        /// Workspace name
        name: String,
        /// Display color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Rename a workspace
    Rename {
        /// Workspace ID
        id: WorkspaceId,
        /// New name
        name: String,
    },
    /// Change a workspace's color
    Recolor {
        /// Workspace ID
        id: WorkspaceId,
        /// New color (#rrggbb)
        color: String,
    },
    /// Delete an empty workspace
    Delete {
        /// Workspace ID
        id: WorkspaceId,
    },
}

/// Execute workspace commands
pub async fn execute(
    args: &WorkspaceArgs,
    ctx: &CliContext,
    opts: RunOptions,
) -> Result<(), AppError> {
    let service = ctx.workspaces();

    match &args.command {
        WorkspaceCommand::List => {
            let workspaces = service.list_workspaces().await?;
            let rows: Vec<WorkspaceRow> = workspaces.iter().map(WorkspaceRow::from).collect();
            output::print_list(&rows, opts.format);
        }
        WorkspaceCommand::Create { name, color } => {
            let ws = service.create_workspace(name, color.as_deref()).await?;
            match opts.format {
                OutputFormat::Json => output::print_json(&ws),
                OutputFormat::Table => {
                    output::print_success(&format!("Workspace '{}' created (id: {})", ws.name, ws.id))
                }
            }
        }
        WorkspaceCommand::Rename { id, name } => {
            let ws = service.rename_workspace(*id, name).await?;
            output::print_success(&format!("Workspace renamed to '{}'", ws.name));
        }
        WorkspaceCommand::Recolor { id, color } => {
            let ws = service.recolor_workspace(*id, color).await?;
            output::print_success(&format!("Workspace '{}' is now {}", ws.name, ws.color));
        }
        WorkspaceCommand::Delete { id } => {
            let ws = service.get_workspace(*id).await?;
            if !opts.confirm(&format!("Delete workspace '{}'?", ws.name))? {
                return Ok(());
            }
            service.delete_workspace(*id).await?;
            output::print_success(&format!("Workspace '{}' deleted", ws.name));
        }
    }

    Ok(())
}
