#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use taskboard_server::directory::{DirectoryService, NewUser, User};
use taskboard_server::project::{NewProject, Project, ProjectService};
use taskboard_server::task::{NewTask, Task, TaskService};
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Test helper to create a user with the given username.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> anyhow::Result<User> {
    let user = DirectoryService::new(db)
        .create_user(NewUser {
            username: Some(username.to_string()),
            profile_picture_url: None,
        })
        .await?;
    Ok(user)
}

/// Test helper to create a project running through the first half of 2024.
pub async fn create_project(db: &DatabaseConnection, name: &str) -> anyhow::Result<Project> {
    let project = ProjectService::new(db)
        .create_project(NewProject {
            name: Some(name.to_string()),
            description: None,
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        })
        .await?;
    Ok(project)
}

/// Test helper to create a task with default status and priority.
pub async fn create_task(
    db: &DatabaseConnection,
    project_id: i32,
    author_user_id: i32,
    title: &str,
) -> anyhow::Result<Task> {
    let task = TaskService::new(db)
        .create_task(NewTask {
            title: Some(title.to_string()),
            author_user_id: Some(author_user_id),
            project_id: Some(project_id),
            ..Default::default()
        })
        .await?;
    Ok(task)
}
