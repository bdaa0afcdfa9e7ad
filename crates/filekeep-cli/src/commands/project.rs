//! Project management CLI commands.

use clap::{Args, Subcommand};

use filekeep_core::error::AppError;
use filekeep_core::types::{ProjectId, WorkspaceId};
use filekeep_service::ProjectUpdate;

use super::RunOptions;
use crate::context::CliContext;
use crate::output::{self, OutputFormat, ProjectRow};

/// Arguments for project commands
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project subcommand
    #[command(subcommand)]
    pub command: ProjectCommand,
}

/// Project subcommands
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// List the projects of a workspace
    List {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
    },
    /// Create a project
    Create {
        /// Workspace ID
        #[arg(short, long)]
        workspace: WorkspaceId,
        /// Project name
        name: String,
        /// Display color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change a project's name, color, or description
    Update {
        /// Project ID
        id: ProjectId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,
        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },
    /// Delete an empty project
    Delete {
        /// Project ID
        id: ProjectId,
    },
}

/// Execute project commands
pub async fn execute(args: &ProjectArgs, ctx: &CliContext, opts: RunOptions) -> Result<(), AppError> {
    let service = ctx.workspaces();

    match &args.command {
        ProjectCommand::List { workspace } => {
            let projects = service.list_projects(*workspace).await?;
            let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
            output::print_list(&rows, opts.format);
        }
        ProjectCommand::Create {
            workspace,
            name,
            color,
            description,
        } => {
            let project = service
                .create_project(*workspace, name, color.as_deref(), description.as_deref())
                .await?;
            match opts.format {
                OutputFormat::Json => output::print_json(&project),
                OutputFormat::Table => output::print_success(&format!(
                    "Project '{}' created (id: {})",
                    project.name, project.id
                )),
            }
        }
        ProjectCommand::Update {
            id,
            name,
            color,
            description,
            clear_description,
        } => {
            let update = ProjectUpdate {
                name: name.clone(),
                color: color.clone(),
                description: if *clear_description {
                    Some(None)
                } else {
                    description.clone().map(Some)
                },
            };
            let project = service.update_project(*id, update).await?;
            output::print_success(&format!("Project '{}' updated", project.name));
        }
        ProjectCommand::Delete { id } => {
            let project = service.get_project(*id).await?;
            if !opts.confirm(&format!("Delete project '{}'?", project.name))? {
                return Ok(());
            }
            service.delete_project(*id).await?;
            output::print_success(&format!("Project '{}' deleted", project.name));
        }
    }

    Ok(())
}
