//! Integration tests for the paged file collection.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use filekeep_core::ErrorKind;
use filekeep_core::config::CollectionConfig;
use filekeep_core::traits::RecordStore;
use filekeep_entity::file::{FileLocation, FilePatch, FileRecord};
use filekeep_service::{ContentFilter, FileCollection, LoadOutcome, Scope};
use filekeep_store::{FailingStore, FailureRule};

fn root() -> FileLocation {
    FileLocation::workspace_root()
}

#[tokio::test]
async fn test_third_page_of_forty_five() {
    let app = helpers::TestApp::new().await;
    let files: Vec<FileRecord> = (1..=45).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("first page");
    let outcome = coll.go_to_page(3).await.expect("third page");

    let LoadOutcome::Loaded(info) = outcome else {
        panic!("expected a loaded page, got {outcome:?}");
    };
    assert_eq!(info.page, 3);
    assert_eq!(info.total_items, 45);
    assert!(!info.has_next);
    assert!(info.has_previous);
    assert_eq!(coll.items().len(), 5);

    let oldest: HashSet<_> = files[..5].iter().map(|f| f.id).collect();
    assert!(coll.items().iter().all(|f| oldest.contains(&f.id)));
}

#[tokio::test]
async fn test_pages_partition_the_scope() {
    let app = helpers::TestApp::new().await;
    let files: Vec<FileRecord> = (1..=23).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    for page_size in [1, 5, 7, 23, 50] {
        let config = CollectionConfig {
            page_size,
            ..CollectionConfig::default()
        };
        let coll = FileCollection::new(
            app.store.clone(),
            Arc::new(app.objects.clone()),
            app.signal.clone(),
            &config,
            Scope::workspace(app.ws()),
        );
        coll.load(1).await.expect("load");

        let mut seen = HashSet::new();
        loop {
            for record in coll.items() {
                assert!(seen.insert(record.id), "page size {page_size} repeats a record");
            }
            let info = coll.page_info();
            assert_eq!(info.has_next, info.page < info.total_pages);
            if coll.next_page().await.expect("next") == LoadOutcome::Skipped {
                break;
            }
        }
        assert_eq!(seen.len(), files.len(), "page size {page_size}");
    }
}

#[tokio::test]
async fn test_filters_narrow_the_scope() {
    let app = helpers::TestApp::new().await;
    let mut favorite = app.file(root(), 1, &["Invoice"]);
    favorite.is_favorite = true;
    let mut report = app.file(root(), 2, &["invoice"]);
    report.name = "Quarterly report.pdf".into();
    let plain = app.file(FileLocation::project_root(app.project.id), 3, &[]);
    app.seed(&[favorite.clone(), report.clone(), plain.clone()]).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");
    assert_eq!(coll.total(), 3);

    coll.set_filter(ContentFilter::Favorites).await.expect("favorites");
    assert_eq!(coll.items().iter().map(|f| f.id).collect::<Vec<_>>(), vec![favorite.id]);

    coll.set_filter(ContentFilter::Tag("invoice".into())).await.expect("tag");
    assert_eq!(coll.items().iter().map(|f| f.id).collect::<Vec<_>>(), vec![report.id]);

    coll.set_filter(ContentFilter::Search("REPORT".into())).await.expect("search");
    assert_eq!(coll.items().iter().map(|f| f.id).collect::<Vec<_>>(), vec![report.id]);

    coll.set_filter(ContentFilter::All).await.expect("all");
    coll.select_project(Some(app.project.id)).await.expect("project");
    assert_eq!(coll.items().iter().map(|f| f.id).collect::<Vec<_>>(), vec![plain.id]);
    assert_eq!(coll.set_scope(coll.scope()).await.expect("same"), LoadOutcome::Skipped);
}

#[tokio::test]
async fn test_add_local_never_duplicates() {
    let app = helpers::TestApp::new().await;
    let existing = app.file(root(), 1, &[]);
    app.seed(std::slice::from_ref(&existing)).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");

    let upload = app.file(root(), 2, &[]);
    assert_eq!(coll.add_local(vec![existing.clone(), upload.clone()]), 1);
    assert_eq!(coll.add_local(vec![upload.clone()]), 0);
    assert_eq!(coll.items().len(), 2);
    assert_eq!(coll.items()[0].id, upload.id);

    // The upload reaches the store afterwards; the reload still holds it once.
    app.seed(std::slice::from_ref(&upload)).await;
    coll.reload().await.expect("reload");
    let ids: Vec<_> = coll.items().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![upload.id, existing.id]);
}

#[tokio::test]
async fn test_rejected_rename_leaves_state_untouched() {
    let failing = std::sync::OnceLock::new();
    let app = helpers::TestApp::with_store(|inner| {
        let store = FailingStore::new(inner);
        let _ = failing.set(store.clone());
        Arc::new(store) as Arc<dyn RecordStore>
    })
    .await;
    let failing = failing.get().expect("failing store").clone();
    let record = app.file(root(), 1, &["draft"]);
    app.seed(std::slice::from_ref(&record)).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");
    let held = coll.get(record.id).expect("held");
    let writes = failing.write_count();

    let err = coll
        .update(record.id, FilePatch { name: Some("  ".into()), ..FilePatch::default() })
        .await
        .expect_err("blank name");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(failing.write_count(), writes);

    failing.fail(FailureRule::UpdateOf(record.id.into_uuid()));
    let err = coll
        .update(record.id, FilePatch { name: Some("final.txt".into()), ..FilePatch::default() })
        .await
        .expect_err("store failure");
    assert_eq!(err.kind, ErrorKind::Store);
    assert_eq!(coll.get(record.id), Some(held));
    assert_eq!(app.stored(&record).await.name, record.name);
    assert!(!app.signal.is_dirty());
}

#[tokio::test]
async fn test_batch_tag_reports_partial_failure() {
    let failing = std::sync::OnceLock::new();
    let app = helpers::TestApp::with_store(|inner| {
        let store = FailingStore::new(inner);
        let _ = failing.set(store.clone());
        Arc::new(store) as Arc<dyn RecordStore>
    })
    .await;
    let failing = failing.get().expect("failing store").clone();
    let files: Vec<FileRecord> = (1..=4).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");
    failing.fail(FailureRule::UpdateOf(files[1].id.into_uuid()));

    let ids: Vec<_> = files.iter().map(|f| f.id).collect();
    let report = coll.tag_files(&ids, "Reviewed").await.expect("batch");

    assert_eq!(report.success_count(), 3);
    assert_eq!(report.failed_ids(), vec![files[1].id]);
    assert!(coll.get(files[1].id).expect("held").tags.is_empty());
    for file in [&files[0], &files[2], &files[3]] {
        assert_eq!(app.stored(file).await.tags, vec!["Reviewed".to_string()]);
    }
    assert!(app.signal.is_dirty());
}

#[tokio::test]
async fn test_batch_delete_then_reload_steps_back() {
    let app = helpers::TestApp::new().await;
    let files: Vec<FileRecord> = (1..=21).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    for file in &files {
        app.objects.put(file.storage_path.clone());
    }

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(2).await.expect("second page");
    assert_eq!(coll.items().len(), 1);

    let report = coll.delete_files(&[files[0].id, files[1].id]).await.expect("delete");
    assert_eq!(report.success_count(), 2);
    assert_eq!(app.objects.len(), 19);

    coll.reload().await.expect("reload");
    assert_eq!(coll.page(), 1);
    assert_eq!(coll.total(), 19);
    assert!(app.stored(&files[0]).await.is_deleted());
}

#[tokio::test]
async fn test_files_drop_moves_into_folder() {
    let app = helpers::TestApp::new().await;
    let mut tree = app.tree().await;
    let inbox = tree.create("Inbox", None).await.expect("folder");
    let files: Vec<FileRecord> = (1..=2).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");
    let payload = filekeep_service::DragPayload::Files(files.iter().map(|f| f.id).collect());
    let text = payload.to_string();
    let parsed: filekeep_service::DragPayload = text.parse().expect("round trip");

    let target = FileLocation::folder(app.project.id, inbox.id);
    let outcome = filekeep_service::apply_drop(&parsed, target, &coll, None)
        .await
        .expect("drop");
    let filekeep_service::DropOutcome::Files(report) = outcome else {
        panic!("expected a file move, got {outcome:?}");
    };
    assert_eq!(report.success_count(), 2);
    for file in &files {
        assert_eq!(app.stored(file).await.location(), target);
    }
    tree.reload().await.expect("reload");
    assert_eq!(tree.file_count(inbox.id), 2);
}

#[tokio::test]
async fn test_moves_stay_inside_the_workspace() {
    let app = helpers::TestApp::new().await;
    let files: Vec<FileRecord> = (1..=2).map(|n| app.file(root(), n, &[])).collect();
    app.seed(&files).await;

    let service = app.workspaces();
    let other_ws = service.create_workspace("Globex", None).await.expect("workspace");
    let foreign = service
        .create_project(other_ws.id, "Intranet", None, None)
        .await
        .expect("project");

    let coll = app.collection(Scope::workspace(app.ws()));
    coll.load(1).await.expect("load");
    let ids: Vec<_> = files.iter().map(|f| f.id).collect();

    let err = coll
        .move_files(&ids, FileLocation::project_root(foreign.id))
        .await
        .expect_err("foreign project");
    assert_eq!(err.kind, ErrorKind::InvalidMove);

    let missing = filekeep_core::types::ProjectId::new();
    let err = coll
        .update(files[0].id, FilePatch::location(FileLocation::project_root(missing)))
        .await
        .expect_err("unknown project");
    assert_eq!(err.kind, ErrorKind::InvalidMove);

    let payload = filekeep_service::DragPayload::Files(ids.clone());
    let err = filekeep_service::apply_drop(&payload, FileLocation::project_root(foreign.id), &coll, None)
        .await
        .expect_err("foreign drop");
    assert_eq!(err.kind, ErrorKind::InvalidMove);

    for file in &files {
        assert_eq!(app.stored(file).await.location(), root());
    }

    let report = coll
        .move_files(&ids, FileLocation::project_root(app.project.id))
        .await
        .expect("own project");
    assert_eq!(report.success_count(), 2);
}
