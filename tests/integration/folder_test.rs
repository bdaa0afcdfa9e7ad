//! Integration tests for folder hierarchy operations.

mod helpers;

use filekeep_core::ErrorKind;
use filekeep_core::types::FolderId;
use filekeep_entity::file::FileLocation;
use filekeep_entity::folder::FolderNode;
use filekeep_service::{DragPayload, DropOutcome, MoveOutcome, Scope, apply_drop};

fn all_ids(nodes: &[FolderNode]) -> Vec<FolderId> {
    nodes
        .iter()
        .flat_map(|n| std::iter::once(n.folder.id).chain(all_ids(&n.children)))
        .collect()
}

#[tokio::test]
async fn test_delete_reports_moves_file_to_project_root() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let reports = tree.create("Reports", None).await.expect("create");
    let x = app.file(FileLocation::folder(app.project.id, reports.id), 1, &["draft"]);
    app.seed(std::slice::from_ref(&x)).await;

    tree.delete(reports.id).await.expect("delete");

    let stored = app.stored(&x).await;
    assert_eq!(stored.folder_id, None);
    assert_eq!(stored.project_id, Some(app.project.id));
    assert_eq!(stored.tags, vec!["draft".to_string()]);
    assert!(!all_ids(&tree.build()).contains(&reports.id));

    let fresh = app.tree().await;
    assert!(fresh.get(reports.id).is_none());
}

#[tokio::test]
async fn test_delete_root_folder_lifts_children_to_project_root() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let f = tree.create("Design", None).await.expect("f");
    let c1 = tree.create("Logos", Some(f.id)).await.expect("c1");
    let c2 = tree.create("Mockups", Some(f.id)).await.expect("c2");
    let location = FileLocation::folder(app.project.id, f.id);
    let files = [app.file(location, 1, &[]), app.file(location, 2, &[])];
    app.seed(&files).await;
    tree.reload().await.expect("reload");

    let deletion = tree.delete(f.id).await.expect("delete");
    assert_eq!(deletion.new_parent, None);
    assert_eq!(deletion.files_reparented, 2);
    assert_eq!(deletion.folders_reparented, 2);

    for child in [&c1, &c2] {
        let held = tree.get(child.id).expect("child kept");
        assert_eq!(held.parent_id, None);
        assert_eq!(held.path, child.name);
    }
    for file in &files {
        assert_eq!(app.stored(file).await.folder_id, None);
    }
    let roots: Vec<FolderId> = tree.build().iter().map(|n| n.folder.id).collect();
    assert_eq!(roots.len(), 2);
    assert!(!roots.contains(&f.id));
}

#[tokio::test]
async fn test_delete_nested_folder_lifts_children_one_level() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let top = tree.create("Clients", None).await.expect("top");
    let f = tree.create("Acme", Some(top.id)).await.expect("f");
    let c1 = tree.create("Contracts", Some(f.id)).await.expect("c1");
    let c2 = tree.create("Invoices", Some(f.id)).await.expect("c2");
    let location = FileLocation::folder(app.project.id, f.id);
    let files = [app.file(location, 1, &[]), app.file(location, 2, &[])];
    app.seed(&files).await;

    tree.delete(f.id).await.expect("delete");

    assert_eq!(tree.get(c1.id).and_then(|c| c.parent_id), Some(top.id));
    assert_eq!(tree.get(c2.id).map(|c| c.path.as_str()), Some("Clients/Invoices"));
    for file in &files {
        assert_eq!(app.stored(file).await.folder_id, Some(top.id));
    }
    assert_eq!(tree.file_count(top.id), 2);
    assert!(!all_ids(&tree.build()).contains(&f.id));
}

#[tokio::test]
async fn test_tree_counts_only_live_files() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let docs = tree.create("Docs", None).await.expect("docs");
    let location = FileLocation::folder(app.project.id, docs.id);
    let files = [app.file(location, 1, &[]), app.file(location, 2, &[])];
    app.seed(&files).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.remove(files[0].id).await.expect("remove");
    tree.reload().await.expect("reload");

    let nodes = tree.build();
    assert_eq!(nodes[0].file_count, 1);
}

#[tokio::test]
async fn test_folder_drop_moves_and_rejects_cycles() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let a = tree.create("a", None).await.expect("a");
    let b = tree.create("b", None).await.expect("b");
    let child = tree.create("child", Some(a.id)).await.expect("child");
    let coll = app.collection(Scope::workspace(app.ws()));

    let payload: DragPayload = format!("folder:{}", a.id).parse().expect("payload");
    let target = FileLocation::folder(app.project.id, b.id);
    let outcome = apply_drop(&payload, target, &coll, Some(&mut tree))
        .await
        .expect("drop");
    let DropOutcome::Folder(MoveOutcome::Moved(moved)) = outcome else {
        panic!("expected a folder move, got {outcome:?}");
    };
    assert_eq!(moved.path, "b/a");
    assert_eq!(tree.get(child.id).map(|f| f.path.as_str()), Some("b/a/child"));

    let payload: DragPayload = format!("folder:{}", b.id).parse().expect("payload");
    let target = FileLocation::folder(app.project.id, child.id);
    let err = apply_drop(&payload, target, &coll, Some(&mut tree))
        .await
        .expect_err("cycle");
    assert_eq!(err.kind, ErrorKind::InvalidMove);
}
