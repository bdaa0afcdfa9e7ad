//! Integration tests for workspace and project management.

mod helpers;

use filekeep_core::ErrorKind;
use filekeep_entity::file::FileLocation;
use filekeep_service::{ProjectUpdate, Scope};

#[tokio::test]
async fn test_project_delete_waits_for_empty_project() {
    let app = helpers::TestApp::new().await;
    let service = app.workspaces();
    let mut tree = app.tree().await;
    let folder = tree.create("Assets", None).await.expect("folder");
    let file = app.file(FileLocation::project_root(app.project.id), 1, &[]);
    app.seed(std::slice::from_ref(&file)).await;

    let err = service.delete_project(app.project.id).await.expect_err("has folders");
    assert_eq!(err.kind, ErrorKind::Conflict);

    tree.delete(folder.id).await.expect("delete folder");
    let err = service.delete_project(app.project.id).await.expect_err("has files");
    assert_eq!(err.kind, ErrorKind::Conflict);

    app.collection(Scope::workspace(app.ws()))
        .remove(file.id)
        .await
        .expect("remove file");
    service.delete_project(app.project.id).await.expect("empty now");

    let err = service.get_project(app.project.id).await.expect_err("gone");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(service.list_projects(app.ws()).await.expect("list").is_empty());
    assert!(app.signal.is_dirty());
}

#[tokio::test]
async fn test_project_update_validates_before_writing() {
    let app = helpers::TestApp::new().await;
    let service = app.workspaces();

    let err = service
        .update_project(app.project.id, ProjectUpdate::default())
        .await
        .expect_err("empty update");
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = service
        .update_project(
            app.project.id,
            ProjectUpdate {
                color: Some("blue".into()),
                ..ProjectUpdate::default()
            },
        )
        .await
        .expect_err("bad color");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!app.signal.is_dirty());

    let updated = service
        .update_project(
            app.project.id,
            ProjectUpdate {
                name: Some("Storefront".into()),
                description: Some(Some("Public site".into())),
                ..ProjectUpdate::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.name, "Storefront");
    assert_eq!(updated.description.as_deref(), Some("Public site"));
    assert_eq!(service.get_project(app.project.id).await.expect("get"), updated);
}

#[tokio::test]
async fn test_workspace_delete_requires_no_projects() {
    let app = helpers::TestApp::new().await;
    let service = app.workspaces();

    let err = service.delete_workspace(app.ws()).await.expect_err("has project");
    assert_eq!(err.kind, ErrorKind::Conflict);

    service.delete_project(app.project.id).await.expect("delete project");
    service.delete_workspace(app.ws()).await.expect("delete workspace");
    assert!(service.list_workspaces().await.expect("list").is_empty());
}
