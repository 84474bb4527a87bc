//! Service unit tests over mocked repositories.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockall::{predicate::eq, Sequence};
use serde_json::json;
use uuid::Uuid;

use common::{claims_for, user_token, StaticDecoder, TestApp, TestUnitOfWork};
use taskmanager::config::{MSG_PROJECT_NOT_OWNED, MSG_USER_NOT_FOUND};
use taskmanager::domain::{
    Authentication, CreateUserRequest, NewTaskRequest, Project, ProjectRequest, Task,
    TaskRequest, UpdateUserRequest, User, UserRole,
};
use taskmanager::errors::AppError;
use taskmanager::infra::Persistence;
use taskmanager::services::{
    AuthService, Authenticator, KeycloakAuthorities, ProjectManager, ProjectService, TaskManager,
    TaskService, UserManager, UserService,
};

fn create_test_user(id: Uuid) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        password_hash: "hashed".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
    }
}

fn jwt(role: &str, sub: &str) -> Authentication {
    let claims = claims_for(role, sub);
    let authorities = KeycloakAuthorities::new(None).convert(&claims);
    Authentication::jwt(claims, authorities)
}

fn authenticator(uow: TestUnitOfWork, dev_user_id: Option<Uuid>) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(
        Arc::new(uow),
        Arc::new(StaticDecoder),
        KeycloakAuthorities::new(None),
        dev_user_id,
        1,
    )
}

// =============================================================================
// UserManager
// =============================================================================

#[tokio::test]
async fn test_get_user_not_found() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_find_by_id()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(None));

    let service = UserManager::new(Arc::new(uow), 1);
    let result = service.get_user(id).await;

    assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == MSG_USER_NOT_FOUND));
}

#[tokio::test]
async fn test_register_stores_lowercased_email_and_hash() {
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_insert()
        .withf(|user| {
            user.email == "new-user@example.com"
                && user.role == UserRole::User
                && user.password_hash != "Password123"
        })
        .times(1)
        .returning(Ok);

    let service = UserManager::new(Arc::new(uow), 1);
    let user = service
        .register(CreateUserRequest {
            email: "New-User@Example.com".into(),
            password: "Password123".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.email, "new-user@example.com");
}

#[tokio::test]
async fn test_ensure_user_skips_existing_email() {
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_find_by_email()
        .withf(|email| email == "admin@example.com")
        .times(1)
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4()))));
    uow.users.expect_insert().never();

    let service = UserManager::new(Arc::new(uow), 1);
    let created = service
        .ensure_user("Admin@Example.com", "ChangeMeNow1", UserRole::Admin)
        .await
        .unwrap();

    assert!(created.is_none());
}

#[tokio::test]
async fn test_admin_update_changes_role_only() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_find_by_id()
        .with(eq(id))
        .returning(|id| Ok(Some(create_test_user(id))));
    uow.users
        .expect_update()
        .withf(|user| user.role == UserRole::Admin && user.password_hash == "hashed")
        .times(1)
        .returning(Ok);

    let service = UserManager::new(Arc::new(uow), 1);
    let user = service
        .admin_update_user(
            id,
            UpdateUserRequest {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.email, "test@example.com");
    assert!(user.is_admin());
}

// =============================================================================
// Authenticator
// =============================================================================

#[tokio::test]
async fn test_provision_reconciles_insert_race() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_exists_by_id()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(false));
    uow.users
        .expect_insert()
        .times(1)
        .returning(|_| Err(AppError::IntegrityViolation("duplicate key".into())));
    uow.users
        .expect_find_by_id()
        .with(eq(id))
        .times(1)
        .returning(|id| Ok(Some(create_test_user(id))));

    let auth = jwt("user", &id.to_string());
    let result = authenticator(uow, None).provision(&auth).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_provision_creates_admin_from_realm_role() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users.expect_exists_by_id().returning(|_| Ok(false));
    uow.users
        .expect_insert()
        .withf(move |user| {
            user.id == id && user.role == UserRole::Admin && user.email == format!("{id}@example.com")
        })
        .times(1)
        .returning(Ok);

    let auth = jwt("admin", &id.to_string());
    authenticator(uow, None).provision(&auth).await.unwrap();
}

#[tokio::test]
async fn test_provision_uses_preferred_username_as_email() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users.expect_exists_by_id().returning(|_| Ok(false));
    uow.users
        .expect_insert()
        .withf(move |user| user.id == id && user.email == "bob@example.com")
        .times(1)
        .returning(Ok);

    let mut claims = claims_for("user", &id.to_string());
    claims.remove("email");
    claims.insert("preferred_username".into(), "Bob@Example.com".into());
    let auth = Authentication::jwt(claims, vec![]);

    authenticator(uow, None).provision(&auth).await.unwrap();
}

#[tokio::test]
async fn test_provision_skips_known_subject() {
    let mut uow = TestUnitOfWork::new();
    uow.users.expect_exists_by_id().returning(|_| Ok(true));
    uow.users.expect_insert().never();

    let auth = jwt("user", &Uuid::new_v4().to_string());
    authenticator(uow, None).provision(&auth).await.unwrap();
}

#[tokio::test]
async fn test_resolve_prefers_token_subject() {
    let id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_exists_by_id()
        .with(eq(id))
        .returning(|_| Ok(true));
    uow.users.expect_find_by_email().never();

    let auth = jwt("user", &id.to_string());
    let resolved = authenticator(uow, Some(Uuid::new_v4()))
        .resolve_user_id(Some(&auth))
        .await
        .unwrap();

    assert_eq!(resolved, id);
}

#[tokio::test]
async fn test_resolve_email_miss_is_unmapped() {
    let mut uow = TestUnitOfWork::new();
    uow.users
        .expect_find_by_email()
        .withf(|email| email == "alice@example.com")
        .times(1)
        .returning(|_| Ok(None));

    let auth = jwt("user", "alice");
    let result = authenticator(uow, None).resolve_user_id(Some(&auth)).await;

    assert!(matches!(result, Err(AppError::IdentityUnmapped(_))));
}

#[tokio::test]
async fn test_resolve_falls_back_to_dev_user() {
    let dev_id = Uuid::new_v4();

    let resolved = authenticator(TestUnitOfWork::new(), Some(dev_id))
        .resolve_user_id(None)
        .await
        .unwrap();
    assert_eq!(resolved, dev_id);

    let anonymous = authenticator(TestUnitOfWork::new(), None)
        .resolve_user_id(None)
        .await;
    assert!(matches!(anonymous, Err(AppError::IdentityUnmapped(_))));
}

#[tokio::test]
async fn test_resolve_named_principal() {
    let id = Uuid::new_v4();
    let auth = Authentication::named(id.to_string(), vec![]);

    let resolved = authenticator(TestUnitOfWork::new(), None)
        .resolve_user_id(Some(&auth))
        .await
        .unwrap();

    assert_eq!(resolved, id);
}

// =============================================================================
// ProjectManager
// =============================================================================

#[tokio::test]
async fn test_create_project_requires_existing_owner() {
    let mut uow = TestUnitOfWork::new();
    uow.users.expect_exists_by_id().returning(|_| Ok(false));
    uow.projects.expect_insert().never();

    let service = ProjectManager::new(Arc::new(uow));
    let result = service
        .create(Uuid::new_v4(), ProjectRequest { name: "Alpha".into() })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == MSG_USER_NOT_FOUND));
}

#[tokio::test]
async fn test_delete_project_removes_tasks_first() {
    let owner = Uuid::new_v4();
    let project = Project::new("Doomed".into(), owner);
    let project_id = project.id;
    let mut seq = Sequence::new();
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .with(eq(project_id), eq(owner))
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _| Ok(Some(project.clone())));
    uow.tasks
        .expect_delete_all_by_project_id()
        .with(eq(project_id))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(3));
    uow.projects
        .expect_delete()
        .with(eq(project_id))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let service = ProjectManager::new(Arc::new(uow));
    service.delete(owner, project_id).await.unwrap();
}

#[tokio::test]
async fn test_list_projects_is_owner_scoped() {
    let owner = Uuid::new_v4();
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_all_by_owner_id()
        .with(eq(owner))
        .times(1)
        .returning(|owner| {
            Ok(vec![
                Project::new("Alpha".into(), owner),
                Project::new("Beta".into(), owner),
            ])
        });

    let service = ProjectManager::new(Arc::new(uow));
    let projects = service.list(owner).await.unwrap();

    assert_eq!(projects.len(), 2);
    assert!(projects.iter().all(|p| p.owner_id == owner));
}

#[tokio::test]
async fn test_rename_of_foreign_project_is_not_found() {
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .returning(|_, _| Ok(None));
    uow.projects.expect_update().never();

    let service = ProjectManager::new(Arc::new(uow));
    let result = service
        .update_name(Uuid::new_v4(), Uuid::new_v4(), ProjectRequest { name: "Renamed".into() })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// =============================================================================
// TaskManager
// =============================================================================

#[tokio::test]
async fn test_create_task_requires_owned_project() {
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .returning(|_, _| Ok(None));
    uow.tasks.expect_insert().never();

    let service = TaskManager::new(Arc::new(uow));
    let result = service
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewTaskRequest(TaskRequest {
                title: Some("Write tests".into()),
                ..Default::default()
            }),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == MSG_PROJECT_NOT_OWNED));
}

#[tokio::test]
async fn test_create_task_defaults_status() {
    let owner = Uuid::new_v4();
    let project = Project::new("Home".into(), owner);
    let project_id = project.id;
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .returning(move |_, _| Ok(Some(project.clone())));
    uow.tasks
        .expect_insert()
        .withf(move |task| task.project_id == project_id && task.title == "Write tests")
        .times(1)
        .returning(Ok);

    let service = TaskManager::new(Arc::new(uow));
    let task = service
        .create(
            owner,
            project_id,
            NewTaskRequest(TaskRequest {
                title: Some("Write tests".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(task.status.as_str(), "TODO");
    assert_eq!(task.priority, None);
}

#[tokio::test]
async fn test_list_tasks_requires_owned_project() {
    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .returning(|_, _| Ok(None));
    uow.tasks.expect_find_all_by_project_id().never();

    let service = TaskManager::new(Arc::new(uow));
    let result = service.list(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == MSG_PROJECT_NOT_OWNED));
}

#[tokio::test]
async fn test_list_tasks_keeps_newest_first() {
    let owner = Uuid::new_v4();
    let project = Project::new("Home".into(), owner);
    let project_id = project.id;
    let mut older = Task::new(project_id, "Older".into(), TaskRequest::default());
    older.created_at = Utc::now() - Duration::hours(1);
    let newer = Task::new(project_id, "Newer".into(), TaskRequest::default());
    let expected = vec![newer.id, older.id];

    let mut uow = TestUnitOfWork::new();
    uow.projects
        .expect_find_by_id_and_owner_id()
        .with(eq(project_id), eq(owner))
        .returning(move |_, _| Ok(Some(project.clone())));
    uow.tasks
        .expect_find_all_by_project_id()
        .with(eq(project_id))
        .times(1)
        .returning(move |_| Ok(vec![newer.clone(), older.clone()]));

    let service = TaskManager::new(Arc::new(uow));
    let tasks = service.list(owner, project_id).await.unwrap();

    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), expected);
}

// =============================================================================
// Listing against the database
// =============================================================================

#[tokio::test]
async fn test_list_against_database_scopes_and_orders() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let project_id = app.create_project(&user_token(owner), "Mine").await;
    app.create_project(&user_token(other), "Theirs").await;
    let older = app
        .create_task(&user_token(owner), project_id, json!({ "title": "Older" }))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = app
        .create_task(&user_token(owner), project_id, json!({ "title": "Newer" }))
        .await;

    let uow = Arc::new(Persistence::new(app.database.get_connection()));

    let projects = ProjectManager::new(uow.clone()).list(owner).await.unwrap();
    assert_eq!(projects.iter().map(|p| p.id).collect::<Vec<_>>(), vec![project_id]);

    let tasks = TaskManager::new(uow.clone()).list(owner, project_id).await.unwrap();
    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![newer, older]);

    let foreign = TaskManager::new(uow).list(other, project_id).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));
}
