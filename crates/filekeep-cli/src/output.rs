//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use filekeep_entity::file::FileRecord;
use filekeep_entity::folder::FolderNode;
use filekeep_entity::project::Project;
use filekeep_entity::workspace::Workspace;
use filekeep_service::{BatchReport, TagOperationReport, TagStat};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Workspace display row
#[derive(Debug, Serialize, Tabled)]
pub struct WorkspaceRow {
    /// Workspace ID
    pub id: String,
    /// Name
    pub name: String,
    /// Color
    pub color: String,
    /// Created at
    pub created_at: String,
}

impl From<&Workspace> for WorkspaceRow {
    fn from(w: &Workspace) -> Self {
        Self {
            id: w.id.to_string(),
            name: w.name.clone(),
            color: w.color.clone(),
            created_at: w.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Project display row
#[derive(Debug, Serialize, Tabled)]
pub struct ProjectRow {
    /// Project ID
    pub id: String,
    /// Name
    pub name: String,
    /// Color
    pub color: String,
    /// Description
    pub description: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            color: p.color.clone(),
            description: p.description.clone().unwrap_or_default(),
        }
    }
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    /// File ID
    pub id: String,
    /// Name
    pub name: String,
    /// Size in bytes
    pub size: i64,
    /// Favorite marker
    pub fav: String,
    /// Tags
    pub tags: String,
    /// Created at
    pub created_at: String,
}

impl From<&FileRecord> for FileRow {
    fn from(f: &FileRecord) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            size: f.size_bytes,
            fav: if f.is_favorite { "★".into() } else { String::new() },
            tags: f.tags.join(", "),
            created_at: f.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Tag statistics row
#[derive(Debug, Serialize, Tabled)]
pub struct TagRow {
    /// Tag spelling
    pub tag: String,
    /// Number of files
    pub files: usize,
}

impl From<&TagStat> for TagRow {
    fn from(s: &TagStat) -> Self {
        Self {
            tag: s.tag.clone(),
            files: s.count,
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", json);
}

/// Print a folder forest with file counts
pub fn print_tree(roots: &[FolderNode], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(roots),
        OutputFormat::Table => {
            println!("/");
            print_nodes(roots, 1);
        }
    }
}

fn print_nodes(nodes: &[FolderNode], depth: usize) {
    for node in nodes {
        println!(
            "{}├── {}/  ({} files)  {}",
            "  ".repeat(depth),
            node.folder.name,
            node.file_count,
            node.folder.id
        );
        print_nodes(&node.children, depth + 1);
    }
}

/// Print the outcome of a batch operation
pub fn print_report(label: &str, report: &BatchReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(report);
        return;
    }
    let summary = format!(
        "{label}: {} succeeded, {} skipped, {} failed",
        report.success_count(),
        report.skipped.len(),
        report.failure_count()
    );
    if report.is_complete() {
        print_success(&summary);
    } else {
        print_warning(&summary);
        for failure in &report.failed {
            println!("  {}  {}", failure.id, failure.message);
        }
    }
}

/// Print the outcome of a tag rename, merge, or delete
pub fn print_tag_report(report: &TagOperationReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(report);
        return;
    }
    let target = report
        .target
        .as_deref()
        .map(|t| format!(" → '{t}'"))
        .unwrap_or_default();
    let label = format!("{:?} '{}'{target}", report.operation, report.tag);
    print_report(&label, &report.outcome, format);
    if report.not_attempted_count() > 0 {
        print_warning(&format!(
            "{} file(s) not attempted after a failed batch",
            report.not_attempted_count()
        ));
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", key), value);
}
