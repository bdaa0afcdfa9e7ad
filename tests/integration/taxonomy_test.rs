//! Integration tests for workspace-wide tag operations.

mod helpers;

use filekeep_core::ErrorKind;
use filekeep_entity::file::FileLocation;
use filekeep_service::tag::normalize;
use filekeep_service::{Scope, TagOperation};

async fn seed_todo(app: &helpers::TestApp) {
    let root = FileLocation::workspace_root();
    let files = [
        app.file(root, 1, &["todo"]),
        app.file(root, 2, &["TODO"]),
        app.file(root, 3, &["todo", "urgent"]),
        app.file(root, 4, &["urgent"]),
    ];
    app.seed(&files).await;
}

async fn tags_by_name(app: &helpers::TestApp) -> Vec<(String, Vec<String>)> {
    let mut all: Vec<(String, Vec<String>)> = app
        .taxonomy()
        .workspace_files()
        .await
        .expect("files")
        .into_iter()
        .map(|f| (f.name, f.tags))
        .collect();
    all.sort();
    all
}

#[tokio::test]
async fn test_case_colliding_rename_behaves_like_merge() {
    let renamed = helpers::TestApp::new().await;
    let merged = helpers::TestApp::new().await;
    seed_todo(&renamed).await;
    seed_todo(&merged).await;

    let rename = renamed.taxonomy().rename("todo", "TODO").await.expect("rename");
    let merge = merged.taxonomy().merge("todo", "TODO").await.expect("merge");

    assert_eq!(rename.operation, TagOperation::Merge);
    assert_eq!(rename.operation, merge.operation);
    assert_eq!(rename.updated_count(), merge.updated_count());
    assert_eq!(rename.updated_count(), 2);
    assert_eq!(tags_by_name(&renamed).await, tags_by_name(&merged).await);
    assert!(
        tags_by_name(&renamed)
            .await
            .iter()
            .flat_map(|(_, tags)| tags)
            .all(|t| t != "todo")
    );
}

#[tokio::test]
async fn test_merge_converges_on_one_spelling() {
    let app = helpers::TestApp::new().await;
    let root = FileLocation::workspace_root();
    let files = [
        app.file(root, 1, &["Invoice"]),
        app.file(root, 2, &["invoice"]),
        app.file(root, 3, &["Invoice", "invoice", "paid"]),
        app.file(root, 4, &["paid"]),
    ];
    app.seed(&files).await;

    let report = app.taxonomy().merge("Invoice", "invoice").await.expect("merge");
    assert!(report.is_complete());
    assert_eq!(report.updated_count(), 2);

    for file in &files {
        let stored = app.stored(file).await;
        let keys: Vec<String> = stored.tags.iter().map(|t| normalize(t)).collect();
        assert!(keys.iter().filter(|k| *k == "invoice").count() <= 1);
        if file.tags.iter().any(|t| normalize(t) == "invoice") {
            assert!(stored.tags.contains(&"invoice".to_string()));
            assert!(!stored.tags.contains(&"Invoice".to_string()));
        }
    }

    let stats = app.taxonomy().stats().await.expect("stats");
    let invoice: Vec<_> = stats.iter().filter(|s| s.normalized == "invoice").collect();
    assert_eq!(invoice.len(), 1);
    assert_eq!(invoice[0].count, 3);
    assert!(app.signal.is_dirty());
}

#[tokio::test]
async fn test_rename_is_visible_after_collection_refresh() {
    let app = helpers::TestApp::new().await;
    seed_todo(&app).await;
    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");

    let report = app.taxonomy().rename("urgent", "Priority").await.expect("rename");
    assert_eq!(report.operation, TagOperation::Rename);
    assert_eq!(report.updated_count(), 2);
    assert_eq!(report.affected.len(), 2);

    assert!(coll.refresh_if_dirty().await.expect("refresh").is_some());
    assert!(!app.signal.is_dirty());
    let stats = coll.tag_stats();
    assert!(stats.iter().any(|s| s.tag == "Priority" && s.count == 2));
    assert!(stats.iter().all(|s| s.normalized != "urgent"));
}

#[tokio::test]
async fn test_deleted_files_are_left_alone() {
    let app = helpers::TestApp::new().await;
    seed_todo(&app).await;
    let coll = app.collection(Scope::workspace(app.ws()));
    let gone = app.file(FileLocation::workspace_root(), 9, &["urgent"]);
    app.seed(std::slice::from_ref(&gone)).await;
    coll.remove(gone.id).await.expect("remove");

    let report = app.taxonomy().delete("URGENT").await.expect("delete");
    assert_eq!(report.updated_count(), 2);
    assert_eq!(app.stored(&gone).await.tags, vec!["urgent".to_string()]);

    let err = app.taxonomy().delete("urgent").await.expect_err("unused now");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
