use sea_orm::DatabaseConnection;
use taskboard_server::directory::{DirectoryService, NewTeam, NewUser};
use taskboard_server::error::ServiceError;
use testcontainers_modules::{postgres, testcontainers};

mod common;

/// Test context for directory service tests.
pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub db: DatabaseConnection,
}

/// Setup function for directory service tests using PostgreSQL container.
async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let container = common::setup_container().await?;
    let db = common::setup_db(&container).await?;
    Ok(TestContext { db, container })
}

#[tokio::test]
async fn can_create_and_list_users() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let service = DirectoryService::new(&ctx.db);

    let alice = service
        .create_user(NewUser {
            username: Some("alice".to_string()),
            profile_picture_url: Some("p1.jpeg".to_string()),
        })
        .await?;
    common::create_user(&ctx.db, "bob").await?;

    let users = service.get_all_users().await?;

    assert_eq!(users.len(), 2);
    assert_eq!(users[0], alice);
    assert_eq!(users[0].profile_picture_url.as_deref(), Some("p1.jpeg"));
    assert_eq!(users[1].username, "bob");
    Ok(())
}

#[tokio::test]
async fn can_reject_duplicate_username() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::create_user(&ctx.db, "alice").await?;

    let result = DirectoryService::new(&ctx.db)
        .create_user(NewUser {
            username: Some("alice".to_string()),
            profile_picture_url: None,
        })
        .await;

    match result {
        Err(ServiceError::Validation(message)) => {
            assert_eq!(message, "Username 'alice' is already taken");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn can_reject_user_without_username() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let result = DirectoryService::new(&ctx.db)
        .create_user(NewUser::default())
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn can_resolve_team_role_holders_to_usernames() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let owner = common::create_user(&ctx.db, "olivia").await?;
    let manager = common::create_user(&ctx.db, "max").await?;
    let service = DirectoryService::new(&ctx.db);

    let created = service
        .create_team(NewTeam {
            team_name: Some("Quality Assurance".to_string()),
            product_owner_user_id: Some(owner.user_id),
            project_manager_user_id: Some(manager.user_id),
        })
        .await?;
    service
        .create_team(NewTeam {
            team_name: Some("Unstaffed".to_string()),
            product_owner_user_id: None,
            project_manager_user_id: None,
        })
        .await?;

    assert_eq!(created.product_owner_username.as_deref(), Some("olivia"));

    let teams = service.get_all_teams().await?;
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0], created);
    assert_eq!(teams[0].project_manager_username.as_deref(), Some("max"));
    assert_eq!(teams[1].team_name, "Unstaffed");
    assert_eq!(teams[1].product_owner_username, None);
    Ok(())
}

#[tokio::test]
async fn can_reject_team_with_missing_role_holder() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let result = DirectoryService::new(&ctx.db)
        .create_team(NewTeam {
            team_name: Some("Ghosts".to_string()),
            product_owner_user_id: Some(31337),
            project_manager_user_id: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound {
            entity: "User",
            id: 31337
        })
    ));
    assert!(DirectoryService::new(&ctx.db).get_all_teams().await?.is_empty());
    Ok(())
}
