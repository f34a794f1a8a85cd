use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use std::time::Duration;
use taskboard_server::entities::{attachment, comment, project, task, task_assignment};
use taskboard_server::error::ServiceError;
use taskboard_server::project::{NewProject, ProjectService};
use taskboard_server::task::{NewAttachment, NewComment, TaskService};
use testcontainers_modules::{postgres, testcontainers};

mod common;

/// Test context for project service tests.
pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub db: DatabaseConnection,
}

/// Setup function for project service tests using PostgreSQL container.
async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let container = common::setup_container().await?;
    let db = common::setup_db(&container).await?;
    Ok(TestContext { db, container })
}

/// Row counts of everything hanging off the given tasks.
#[derive(Debug, PartialEq, Eq)]
struct DependentRows {
    tasks: u64,
    comments: u64,
    attachments: u64,
    assignments: u64,
}

async fn count_rows(db: &DatabaseConnection, project_id: i32) -> anyhow::Result<DependentRows> {
    let task_ids: Vec<i32> = task::Entity::find()
        .filter(task::Column::ProjectId.eq(project_id))
        .all(db)
        .await?
        .into_iter()
        .map(|model| model.id)
        .collect();

    Ok(DependentRows {
        tasks: task_ids.len() as u64,
        comments: comment::Entity::find()
            .filter(comment::Column::TaskId.is_in(task_ids.clone()))
            .count(db)
            .await?,
        attachments: attachment::Entity::find()
            .filter(attachment::Column::TaskId.is_in(task_ids.clone()))
            .count(db)
            .await?,
        assignments: task_assignment::Entity::find()
            .filter(task_assignment::Column::TaskId.is_in(task_ids))
            .count(db)
            .await?,
    })
}

/// Creates a project with two tasks, each carrying a comment, an attachment
/// and an assignment. Returns the project ID.
async fn create_populated_project(db: &DatabaseConnection, name: &str) -> anyhow::Result<i32> {
    let author = common::create_user(db, &format!("{name}_author")).await?;
    let assignee = common::create_user(db, &format!("{name}_assignee")).await?;
    let project = common::create_project(db, name).await?;
    let task_service = TaskService::new(db);

    for title in ["first", "second"] {
        let task = common::create_task(db, project.id, author.user_id, title).await?;
        task_service
            .assign_task(task.id, Some(assignee.user_id))
            .await?;
        task_service
            .add_comment(
                task.id,
                NewComment {
                    text: Some(format!("comment on {title}")),
                    user_id: Some(author.user_id),
                },
            )
            .await?;
        task_service
            .add_attachment(
                task.id,
                NewAttachment {
                    file_url: Some(format!("https://files.example.com/{title}.png")),
                    file_name: Some(format!("{title}.png")),
                    uploaded_by_id: Some(assignee.user_id),
                },
            )
            .await?;
    }
    Ok(project.id)
}

#[tokio::test]
async fn can_create_project() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let service = ProjectService::new(&ctx.db);

    let project = service
        .create_project(NewProject {
            name: Some("Apollo".to_string()),
            description: Some("Moon landing".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        })
        .await?;

    assert_eq!(project.name, "Apollo");
    assert_eq!(project.description.as_deref(), Some("Moon landing"));
    assert_eq!(service.get_project_by_id(project.id).await?, project);
    Ok(())
}

#[tokio::test]
async fn can_reject_project_without_required_fields() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let service = ProjectService::new(&ctx.db);

    let result = service
        .create_project(NewProject {
            name: Some("   ".to_string()),
            description: Some("no dates".to_string()),
            start_date: None,
            end_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        })
        .await;

    match result {
        Err(ServiceError::Validation(message)) => {
            assert_eq!(message, "Missing required fields: name, startDate");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(project::Entity::find().count(&ctx.db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn can_list_all_projects() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::create_project(&ctx.db, "Apollo").await?;
    common::create_project(&ctx.db, "Gemini").await?;

    let mut names: Vec<String> = ProjectService::new(&ctx.db)
        .get_all_projects()
        .await?
        .into_iter()
        .map(|project| project.name)
        .collect();
    names.sort();

    assert_eq!(names, vec!["Apollo", "Gemini"]);
    Ok(())
}

#[tokio::test]
async fn can_report_missing_project() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let result = ProjectService::new(&ctx.db).get_project_by_id(999).await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound {
            entity: "Project",
            id: 999
        })
    ));
    Ok(())
}

#[tokio::test]
async fn can_delete_project_with_all_dependents() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let doomed = create_populated_project(&ctx.db, "doomed").await?;
    let survivor = create_populated_project(&ctx.db, "survivor").await?;

    let deletion = ProjectService::new(&ctx.db).delete_project(doomed).await?;

    assert_eq!(deletion.project_id, doomed);
    assert_eq!(deletion.tasks, 2);
    assert_eq!(deletion.dependents.comments, 2);
    assert_eq!(deletion.dependents.attachments, 2);
    assert_eq!(deletion.dependents.assignments, 2);

    assert!(project::Entity::find_by_id(doomed).one(&ctx.db).await?.is_none());
    assert_eq!(
        count_rows(&ctx.db, doomed).await?,
        DependentRows {
            tasks: 0,
            comments: 0,
            attachments: 0,
            assignments: 0
        }
    );
    assert_eq!(
        count_rows(&ctx.db, survivor).await?,
        DependentRows {
            tasks: 2,
            comments: 2,
            attachments: 2,
            assignments: 2
        }
    );
    assert_eq!(comment::Entity::find().count(&ctx.db).await?, 2);
    Ok(())
}

#[tokio::test]
async fn can_delete_project_without_tasks() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let project = common::create_project(&ctx.db, "Empty").await?;

    let deletion = ProjectService::new(&ctx.db)
        .delete_project(project.id)
        .await?;

    assert_eq!(deletion.tasks, 0);
    assert_eq!(project::Entity::find().count(&ctx.db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn can_leave_store_untouched_when_deleting_missing_project() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let existing = create_populated_project(&ctx.db, "existing").await?;

    let result = ProjectService::new(&ctx.db).delete_project(existing + 100).await;

    assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    assert_eq!(project::Entity::find().count(&ctx.db).await?, 1);
    assert_eq!(
        count_rows(&ctx.db, existing).await?,
        DependentRows {
            tasks: 2,
            comments: 2,
            attachments: 2,
            assignments: 2
        }
    );
    Ok(())
}

#[tokio::test]
async fn can_roll_back_cascade_when_a_step_fails() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let project_id = create_populated_project(&ctx.db, "guarded").await?;

    // Comments go first, so this fails the cascade after they are deleted.
    ctx.db
        .execute_unprepared(
            "CREATE FUNCTION refuse_attachment_delete() RETURNS trigger AS $$ \
             BEGIN RAISE EXCEPTION 'attachment delete refused'; END; \
             $$ LANGUAGE plpgsql",
        )
        .await?;
    ctx.db
        .execute_unprepared(
            "CREATE TRIGGER refuse_attachment_delete BEFORE DELETE ON attachments \
             FOR EACH ROW EXECUTE FUNCTION refuse_attachment_delete()",
        )
        .await?;

    let result = ProjectService::new(&ctx.db).delete_project(project_id).await;

    match result {
        Err(ServiceError::Database(err)) => {
            assert!(err.to_string().contains("attachment delete refused"));
        }
        other => panic!("expected store failure, got {other:?}"),
    }
    assert!(
        project::Entity::find_by_id(project_id)
            .one(&ctx.db)
            .await?
            .is_some()
    );
    assert_eq!(
        count_rows(&ctx.db, project_id).await?,
        DependentRows {
            tasks: 2,
            comments: 2,
            attachments: 2,
            assignments: 2
        }
    );
    Ok(())
}

#[tokio::test]
async fn can_delete_project_while_comment_write_is_in_flight() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let author = common::create_user(&ctx.db, "alice").await?;
    let project = common::create_project(&ctx.db, "Busy").await?;
    let task = common::create_task(&ctx.db, project.id, author.user_id, "T1").await?;

    // A comment writer that has locked its task and inserted, but not yet
    // committed.
    let writer = ctx.db.begin().await?;
    task::Entity::find_by_id(task.id)
        .lock_shared()
        .one(&writer)
        .await?;
    comment::ActiveModel {
        text: ActiveValue::Set("late comment".to_string()),
        task_id: ActiveValue::Set(task.id),
        user_id: ActiveValue::Set(author.user_id),
        ..Default::default()
    }
    .insert(&writer)
    .await?;

    let db = ctx.db.clone();
    let project_id = project.id;
    let cascade =
        tokio::spawn(async move { ProjectService::new(&db).delete_project(project_id).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    writer.commit().await?;

    let deletion = cascade.await??;
    assert_eq!(deletion.tasks, 1);
    assert_eq!(deletion.dependents.comments, 1);
    assert_eq!(comment::Entity::find().count(&ctx.db).await?, 0);
    assert!(
        project::Entity::find_by_id(project_id)
            .one(&ctx.db)
            .await?
            .is_none()
    );
    Ok(())
}
