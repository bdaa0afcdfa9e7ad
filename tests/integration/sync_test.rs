//! Integration tests for push-driven collection refresh.

mod helpers;

use std::time::Duration;

use filekeep_entity::file::{FileLocation, FileRecord};
use filekeep_service::{CollectionSync, Scope};

const DELAY: Duration = Duration::from_millis(300);

#[tokio::test(start_paused = true)]
async fn test_remote_tag_rename_reaches_open_view_once() {
    let app = helpers::TestApp::new().await;
    let root = FileLocation::workspace_root();
    let files: Vec<FileRecord> = (1..=3).map(|n| app.file(root, n, &["wip"])).collect();
    app.seed(&files).await;

    let view = app.collection(Scope::workspace(app.ws()));
    view.load(1).await.expect("load");
    let _sync = CollectionSync::start(view.clone(), app.feed.clone(), DELAY).await;

    // Three writes spread over two batches.
    let report = app.taxonomy().rename("wip", "In progress").await.expect("rename");
    assert_eq!(report.updated_count(), 3);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(view.load_count(), 2);
    assert!(view.items().iter().all(|f| f.tags == vec!["In progress".to_string()]));
}

#[tokio::test(start_paused = true)]
async fn test_remote_delete_drops_record_from_open_view() {
    let app = helpers::TestApp::new().await;
    let root = FileLocation::workspace_root();
    let files: Vec<FileRecord> = (1..=2).map(|n| app.file(root, n, &[])).collect();
    app.seed(&files).await;

    let view = app.collection(Scope::workspace(app.ws()));
    view.load(1).await.expect("load");
    let _sync = CollectionSync::start(view.clone(), app.feed.clone(), DELAY).await;

    let other = app.collection(Scope::workspace(app.ws()));
    other.remove(files[0].id).await.expect("remove");
    assert!(view.get(files[0].id).is_some());

    tokio::time::sleep(DELAY * 2).await;
    assert!(view.get(files[0].id).is_none());
    assert_eq!(view.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_other_workspace_changes_do_not_reload() {
    let app = helpers::TestApp::new().await;
    let view = app.collection(Scope::workspace(app.ws()));
    view.load(1).await.expect("load");
    let _sync = CollectionSync::start(view.clone(), app.feed.clone(), DELAY).await;

    let elsewhere = app
        .workspaces()
        .create_workspace("Side project", None)
        .await
        .expect("workspace");
    let mut record = app.file(FileLocation::workspace_root(), 1, &[]);
    record.workspace_id = elsewhere.id;
    app.seed(std::slice::from_ref(&record)).await;

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(view.load_count(), 1);
}
