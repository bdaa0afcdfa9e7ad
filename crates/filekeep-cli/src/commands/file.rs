//! File record CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tracing::warn;
use uuid::Uuid;

use filekeep_core::error::AppError;
use filekeep_core::traits::{ObjectStorage, RecordStore};
use filekeep_core::types::{FileId, FolderId, ProjectId, WorkspaceId};
use filekeep_entity::Record;
use filekeep_entity::file::{FileLocation, FilePatch, FileRecord, NewFileRecord};
use filekeep_service::tag::{clean, dedup_tags};
use filekeep_service::{ContentFilter, DragPayload, DropOutcome, MoveOutcome, Scope, apply_drop};

use super::RunOptions;
use crate::context::CliContext;
use crate::output::{self, FileRow, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Workspace the files belong to
    #[arg(short, long)]
    pub workspace: WorkspaceId,

    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// List one page of files
    List {
        /// Narrow to a project root
        #[arg(short, long)]
        project: Option<ProjectId>,
        /// Narrow to a folder of the project
        #[arg(long, requires = "project")]
        folder: Option<FolderId>,
        /// Only favorites
        #[arg(long, conflicts_with_all = ["tag", "search"])]
        favorites: bool,
        /// Only files carrying this tag
        #[arg(short, long, conflicts_with = "search")]
        tag: Option<String>,
        /// Only names containing this text
        #[arg(short, long)]
        search: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
    },
    /// Copy a local file into storage and record it
    Import {
        /// Local file to import
        source: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Project to file it under
        #[arg(short, long)]
        project: Option<ProjectId>,
        /// Folder inside the project
        #[arg(long, requires = "project")]
        folder: Option<FolderId>,
        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Rename a file
    Rename {
        /// File ID
        id: FileId,
        /// New display name
        name: String,
    },
    /// Toggle the favorite flag
    Favorite {
        /// File ID
        id: FileId,
    },
    /// Add a tag to files
    Tag {
        /// Tag to add
        tag: String,
        /// File IDs
        #[arg(required = true)]
        ids: Vec<FileId>,
    },
    /// Remove a tag from files
    Untag {
        /// Tag to remove
        tag: String,
        /// File IDs
        #[arg(required = true)]
        ids: Vec<FileId>,
    },
    /// Move files to a project root, a folder, or the workspace root
    Move {
        /// File IDs
        #[arg(required = true)]
        ids: Vec<FileId>,
        /// Destination project (omit for workspace root)
        #[arg(short, long)]
        project: Option<ProjectId>,
        /// Destination folder inside the project
        #[arg(long, requires = "project")]
        folder: Option<FolderId>,
    },
    /// Delete files
    Delete {
        /// File IDs
        #[arg(required = true)]
        ids: Vec<FileId>,
    },
    /// Apply a drag payload (`files:[...]` or `folder:<id>`) to a destination
    Drop {
        /// Drag payload text
        payload: DragPayload,
        /// Destination project (omit for workspace root)
        #[arg(short, long)]
        project: Option<ProjectId>,
        /// Destination folder inside the project
        #[arg(long, requires = "project")]
        folder: Option<FolderId>,
    },
}

fn location(project: Option<ProjectId>, folder: Option<FolderId>) -> FileLocation {
    FileLocation {
        project_id: project,
        folder_id: folder,
    }
}

fn content_filter(favorites: bool, tag: &Option<String>, search: &Option<String>) -> ContentFilter {
    match (favorites, tag, search) {
        (true, _, _) => ContentFilter::Favorites,
        (_, Some(tag), _) => ContentFilter::Tag(tag.clone()),
        (_, _, Some(text)) => ContentFilter::Search(text.clone()),
        _ => ContentFilter::All,
    }
}

/// Execute file commands
pub async fn execute(args: &FileArgs, ctx: &CliContext, opts: RunOptions) -> Result<(), AppError> {
    let collection = ctx.collection(Scope::workspace(args.workspace));

    match &args.command {
        FileCommand::List {
            project,
            folder,
            favorites,
            tag,
            search,
            page,
        } => {
            let scope = match (project, folder) {
                (Some(p), Some(f)) => Scope::folder(args.workspace, *p, *f),
                (Some(p), None) => Scope::project(args.workspace, *p),
                _ => Scope::workspace(args.workspace),
            };
            let scope = scope.with_filter(content_filter(*favorites, tag, search));
            collection.set_scope(scope).await?;
            if *page > 1 {
                collection.go_to_page(*page).await?;
            }

            let items = collection.items();
            let rows: Vec<FileRow> = items.iter().map(FileRow::from).collect();
            output::print_list(&rows, opts.format);
            if opts.format == OutputFormat::Table {
                let info = collection.page_info();
                println!(
                    "Page {} of {} ({} files)",
                    info.page,
                    info.total_pages.max(1),
                    info.total_items
                );
            }
        }
        FileCommand::Import {
            source,
            name,
            project,
            folder,
            tags,
        } => {
            let destination = location(*project, *folder);
            collection.check_destination(&destination).await?;
            let record = import(ctx, args.workspace, source, name.as_deref(), destination, tags).await?;
            collection.add_local(vec![record.clone()]);
            ctx.signal.mark_dirty();
            match opts.format {
                OutputFormat::Json => output::print_json(&record),
                OutputFormat::Table => output::print_success(&format!(
                    "Imported '{}' ({} bytes, id: {})",
                    record.name, record.size_bytes, record.id
                )),
            }
        }
        FileCommand::Rename { id, name } => {
            let patch = FilePatch {
                name: Some(name.clone()),
                ..FilePatch::default()
            };
            let record = collection.update(*id, patch).await?;
            output::print_success(&format!("File renamed to '{}'", record.name));
        }
        FileCommand::Favorite { id } => {
            let record = collection.toggle_favorite(*id).await?;
            let state = if record.is_favorite { "marked" } else { "unmarked" };
            output::print_success(&format!("'{}' {state} as favorite", record.name));
        }
        FileCommand::Tag { tag, ids } => {
            let report = collection.tag_files(ids, tag).await?;
            output::print_report("Tag", &report, opts.format);
        }
        FileCommand::Untag { tag, ids } => {
            let report = collection.untag_files(ids, tag).await?;
            output::print_report("Untag", &report, opts.format);
        }
        FileCommand::Move {
            ids,
            project,
            folder,
        } => {
            let report = collection.move_files(ids, location(*project, *folder)).await?;
            output::print_report("Move", &report, opts.format);
        }
        FileCommand::Delete { ids } => {
            if !opts.confirm(&format!("Delete {} file(s)?", ids.len()))? {
                return Ok(());
            }
            let report = collection.delete_files(ids).await?;
            output::print_report("Delete", &report, opts.format);
        }
        FileCommand::Drop {
            payload,
            project,
            folder,
        } => {
            let target = location(*project, *folder);
            let mut tree = match (payload, project) {
                (DragPayload::Folder(_), Some(p)) => Some(ctx.tree(*p).await?),
                _ => None,
            };
            match apply_drop(payload, target, &collection, tree.as_mut()).await? {
                DropOutcome::Files(report) => output::print_report("Drop", &report, opts.format),
                DropOutcome::Folder(MoveOutcome::Moved(folder)) => {
                    output::print_success(&format!("Folder moved to '{}'", folder.path))
                }
                DropOutcome::Folder(MoveOutcome::Unchanged) => {
                    output::print_warning("Folder is already there")
                }
            }
        }
    }

    Ok(())
}

/// Copy `source` into object storage and persist a record for it.
async fn import(
    ctx: &CliContext,
    workspace_id: WorkspaceId,
    source: &Path,
    name: Option<&str>,
    destination: FileLocation,
    tags: &[String],
) -> Result<FileRecord, AppError> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("Not a file: {}", source.display())))?;
    let tags = tags
        .iter()
        .map(|t| clean(t))
        .collect::<Result<Vec<_>, _>>()?;
    let storage_path = format!("{workspace_id}/{}/{file_name}", Uuid::new_v4());

    let size = ctx.objects.import(source, &storage_path).await?;
    let record = NewFileRecord {
        workspace_id,
        location: destination,
        name: name.unwrap_or(file_name).to_string(),
        size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
        mime_type: mime_guess::from_path(source)
            .first()
            .map(|m| m.essence_str().to_string()),
        storage_path: storage_path.clone(),
        tags: dedup_tags(&tags),
    }
    .into_record()?;

    let inserted = match record.to_row() {
        Ok(row) => ctx.store.insert(FileRecord::TABLE, vec![row]).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = inserted {
        if let Err(cleanup) = ctx.objects.remove(&storage_path).await {
            warn!(path = %storage_path, error = %cleanup, "Failed to remove orphaned object");
        }
        return Err(e);
    }
    Ok(record)
}
