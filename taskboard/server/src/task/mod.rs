use crate::entities::*;
use crate::error::{ServiceError, non_blank};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::*;
use serde::Deserialize;
use utoipa::ToSchema;

pub mod api {
    pub mod v1;
}

pub use crate::entities::task::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub tags: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub points: Option<i32>,
    pub project_id: i32,
    pub author_user_id: i32,
    pub assigned_user_id: Option<i32>,
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            tags: model.tags,
            start_date: model.start_date,
            due_date: model.due_date,
            points: model.points,
            project_id: model.project_id,
            author_user_id: model.author_user_id,
            assigned_user_id: model.assigned_user_id,
        }
    }
}

/// Fields accepted when creating a task. Required fields are optional here so
/// that their absence is reported as a validation failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub points: Option<i32>,
    pub author_user_id: Option<i32>,
    pub assigned_user_id: Option<i32>,
    pub project_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub task_id: i32,
    pub user_id: i32,
}

impl From<comment::Model> for Comment {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            task_id: model.task_id,
            user_id: model.user_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i32,
    pub file_url: String,
    pub file_name: Option<String>,
    pub task_id: i32,
    pub uploaded_by_id: i32,
}

impl From<attachment::Model> for Attachment {
    fn from(model: attachment::Model) -> Self {
        Self {
            id: model.id,
            file_url: model.file_url,
            file_name: model.file_name,
            task_id: model.task_id,
            uploaded_by_id: model.uploaded_by_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub uploaded_by_id: Option<i32>,
}

/// Row counts removed from the tables that hang off tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependentDeletion {
    pub comments: u64,
    pub attachments: u64,
    pub assignments: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDeletion {
    pub task_id: i32,
    pub dependents: DependentDeletion,
}

/// Deletes comments, attachments and assignments of the tasks selected by
/// `task_ids`, in that order. Must run inside the caller's transaction.
pub(crate) async fn delete_task_dependents<C>(
    conn: &C,
    task_ids: SelectStatement,
) -> Result<DependentDeletion, DbErr>
where
    C: ConnectionTrait,
{
    let comments = comment::Entity::delete_many()
        .filter(comment::Column::TaskId.in_subquery(task_ids.clone()))
        .exec(conn)
        .await?
        .rows_affected;
    let attachments = attachment::Entity::delete_many()
        .filter(attachment::Column::TaskId.in_subquery(task_ids.clone()))
        .exec(conn)
        .await?
        .rows_affected;
    let assignments = task_assignment::Entity::delete_many()
        .filter(task_assignment::Column::TaskId.in_subquery(task_ids))
        .exec(conn)
        .await?
        .rows_affected;

    Ok(DependentDeletion {
        comments,
        attachments,
        assignments,
    })
}

pub struct TaskService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        TaskService { db }
    }

    /// Creates a task in an existing project.
    ///
    /// `title`, `authorUserId` and `projectId` are required. Status defaults to
    /// `To Do` and priority to `Backlog`. When an assignee is given, the
    /// matching assignment row is written in the same transaction.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, ServiceError> {
        let title = non_blank(new_task.title);
        let (Some(title), Some(author_user_id), Some(project_id)) =
            (title.clone(), new_task.author_user_id, new_task.project_id)
        else {
            return Err(ServiceError::missing_fields([
                ("title", title.is_none()),
                ("authorUserId", new_task.author_user_id.is_none()),
                ("projectId", new_task.project_id.is_none()),
            ]));
        };

        let txn = self.db.begin().await?;

        // Shared lock so a concurrent cascade delete cannot remove the
        // project between this check and the insert.
        project::Entity::find_by_id(project_id)
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Project", project_id))?;
        ensure_user_exists(&txn, author_user_id).await?;
        if let Some(assignee) = new_task.assigned_user_id {
            ensure_user_exists(&txn, assignee).await?;
        }

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(non_blank(new_task.description)),
            status: ActiveValue::Set(new_task.status.unwrap_or(TaskStatus::ToDo)),
            priority: ActiveValue::Set(new_task.priority.unwrap_or(TaskPriority::Backlog)),
            tags: ActiveValue::Set(non_blank(new_task.tags)),
            start_date: ActiveValue::Set(new_task.start_date),
            due_date: ActiveValue::Set(new_task.due_date),
            points: ActiveValue::Set(new_task.points),
            project_id: ActiveValue::Set(project_id),
            author_user_id: ActiveValue::Set(author_user_id),
            assigned_user_id: ActiveValue::Set(new_task.assigned_user_id),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;

        if let Some(assignee) = created_model.assigned_user_id {
            insert_assignment(&txn, created_model.id, assignee).await?;
        }

        txn.commit().await?;
        tracing::info!(task_id = created_model.id, project_id, "Task created");
        Ok(Task::from(created_model))
    }

    /// Retrieves a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, ServiceError> {
        let model = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(ServiceError::not_found("Task", id))?;
        Ok(Task::from(model))
    }

    /// Retrieves the tasks of a project, optionally restricted to one priority.
    /// An unknown project yields an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn get_tasks_by_project(
        &self,
        project_id: i32,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Task>, ServiceError> {
        let mut query = task::Entity::find().filter(task::Column::ProjectId.eq(project_id));
        if let Some(priority) = priority {
            query = query.filter(task::Column::Priority.eq(priority));
        }
        let tasks = query
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves the tasks a user authored or is assigned to.
    #[tracing::instrument(skip(self))]
    pub async fn get_tasks_by_user(&self, user_id: i32) -> Result<Vec<Task>, ServiceError> {
        let tasks = task::Entity::find()
            .filter(
                Condition::any()
                    .add(task::Column::AuthorUserId.eq(user_id))
                    .add(task::Column::AssignedUserId.eq(user_id)),
            )
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Moves a task to `status`. Every state is reachable from every other
    /// state; concurrent updates resolve as last write wins.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Task, ServiceError> {
        let active_model = task::ActiveModel {
            id: ActiveValue::Unchanged(id),
            status: ActiveValue::Set(status),
            ..Default::default()
        };
        match active_model.update(self.db).await {
            Ok(updated_model) => Ok(Task::from(updated_model)),
            Err(DbErr::RecordNotUpdated) => Err(ServiceError::not_found("Task", id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Sets or clears the assignee of a task and replaces its assignment rows.
    #[tracing::instrument(skip(self))]
    pub async fn assign_task(
        &self,
        id: i32,
        assigned_user_id: Option<i32>,
    ) -> Result<Task, ServiceError> {
        let txn = self.db.begin().await?;

        task::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Task", id))?;
        if let Some(assignee) = assigned_user_id {
            ensure_user_exists(&txn, assignee).await?;
        }

        let active_model = task::ActiveModel {
            id: ActiveValue::Unchanged(id),
            assigned_user_id: ActiveValue::Set(assigned_user_id),
            ..Default::default()
        };
        let updated_model = match active_model.update(&txn).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Err(ServiceError::not_found("Task", id)),
            Err(err) => return Err(err.into()),
        };

        task_assignment::Entity::delete_many()
            .filter(task_assignment::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        if let Some(assignee) = assigned_user_id {
            insert_assignment(&txn, id, assignee).await?;
        }

        txn.commit().await?;
        Ok(Task::from(updated_model))
    }

    /// Deletes a task together with its comments, attachments and
    /// assignments, atomically.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: i32) -> Result<TaskDeletion, ServiceError> {
        let txn = self.db.begin().await?;

        task::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Task", id))?;

        let task_ids = Query::select()
            .column(task::Column::Id)
            .from(task::Entity)
            .and_where(task::Column::Id.eq(id))
            .to_owned();
        let dependents = delete_task_dependents(&txn, task_ids).await?;
        task::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(task_id = id, ?dependents, "Task deleted");
        Ok(TaskDeletion {
            task_id: id,
            dependents,
        })
    }

    /// Adds a comment to a task.
    #[tracing::instrument(skip(self))]
    pub async fn add_comment(
        &self,
        task_id: i32,
        new_comment: NewComment,
    ) -> Result<Comment, ServiceError> {
        let text = non_blank(new_comment.text);
        let (Some(text), Some(user_id)) = (text.clone(), new_comment.user_id) else {
            return Err(ServiceError::missing_fields([
                ("text", text.is_none()),
                ("userId", new_comment.user_id.is_none()),
            ]));
        };

        let txn = self.db.begin().await?;
        lock_task(&txn, task_id).await?;
        ensure_user_exists(&txn, user_id).await?;

        let active_model = comment::ActiveModel {
            text: ActiveValue::Set(text),
            task_id: ActiveValue::Set(task_id),
            user_id: ActiveValue::Set(user_id),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(Comment::from(created_model))
    }

    /// Retrieves the comments of a task, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_comments(&self, task_id: i32) -> Result<Vec<Comment>, ServiceError> {
        self.ensure_task_exists(task_id).await?;
        let comments = comment::Entity::find()
            .filter(comment::Column::TaskId.eq(task_id))
            .order_by_asc(comment::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Comment::from)
            .collect();
        Ok(comments)
    }

    /// Records an attachment for a task. Only metadata is stored.
    #[tracing::instrument(skip(self))]
    pub async fn add_attachment(
        &self,
        task_id: i32,
        new_attachment: NewAttachment,
    ) -> Result<Attachment, ServiceError> {
        let file_url = non_blank(new_attachment.file_url);
        let (Some(file_url), Some(uploaded_by_id)) =
            (file_url.clone(), new_attachment.uploaded_by_id)
        else {
            return Err(ServiceError::missing_fields([
                ("fileUrl", file_url.is_none()),
                ("uploadedById", new_attachment.uploaded_by_id.is_none()),
            ]));
        };

        let txn = self.db.begin().await?;
        lock_task(&txn, task_id).await?;
        ensure_user_exists(&txn, uploaded_by_id).await?;

        let active_model = attachment::ActiveModel {
            file_url: ActiveValue::Set(file_url),
            file_name: ActiveValue::Set(non_blank(new_attachment.file_name)),
            task_id: ActiveValue::Set(task_id),
            uploaded_by_id: ActiveValue::Set(uploaded_by_id),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(Attachment::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_attachments(&self, task_id: i32) -> Result<Vec<Attachment>, ServiceError> {
        self.ensure_task_exists(task_id).await?;
        let attachments = attachment::Entity::find()
            .filter(attachment::Column::TaskId.eq(task_id))
            .order_by_asc(attachment::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Attachment::from)
            .collect();
        Ok(attachments)
    }

    async fn ensure_task_exists(&self, task_id: i32) -> Result<(), ServiceError> {
        task::Entity::find_by_id(task_id)
            .one(self.db)
            .await?
            .ok_or(ServiceError::not_found("Task", task_id))?;
        Ok(())
    }
}

/// Takes a shared lock on a task row for the rest of the transaction. A
/// cascade delete holding the row makes this wait, then report `NotFound`.
async fn lock_task<C>(conn: &C, task_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    task::Entity::find_by_id(task_id)
        .lock_shared()
        .one(conn)
        .await?
        .ok_or(ServiceError::not_found("Task", task_id))?;
    Ok(())
}

async fn ensure_user_exists<C>(conn: &C, user_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(ServiceError::not_found("User", user_id))?;
    Ok(())
}

async fn insert_assignment<C>(conn: &C, task_id: i32, user_id: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    task_assignment::ActiveModel {
        task_id: ActiveValue::Set(task_id),
        user_id: ActiveValue::Set(user_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn can_parse_every_status_from_wire_value() {
        let cases = [
            ("\"To Do\"", TaskStatus::ToDo),
            ("\"Work In Progress\"", TaskStatus::WorkInProgress),
            ("\"Under Review\"", TaskStatus::UnderReview),
            ("\"Completed\"", TaskStatus::Completed),
            ("\"Complete\"", TaskStatus::Completed),
        ];
        for (wire, expected) in cases {
            let parsed: TaskStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, expected, "parsing {wire}");
        }
    }

    #[test]
    fn can_reject_unknown_status() {
        for wire in ["\"Done\"", "\"to do\"", "\"ToDo\"", "\"\""] {
            assert!(
                serde_json::from_str::<TaskStatus>(wire).is_err(),
                "{wire} should be rejected"
            );
        }
    }

    #[test]
    fn can_reject_unknown_priority() {
        assert!(serde_json::from_str::<TaskPriority>("\"Critical\"").is_err());
        assert_eq!(
            serde_json::from_str::<TaskPriority>("\"Urgent\"").unwrap(),
            TaskPriority::Urgent
        );
    }

    #[test]
    fn can_store_same_values_as_wire_format() {
        for status in TaskStatus::iter() {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, serde_json::Value::String(status.to_value()));
        }
        for priority in TaskPriority::iter() {
            let wire = serde_json::to_value(priority).unwrap();
            assert_eq!(wire, serde_json::Value::String(priority.to_value()));
        }
    }

    #[test]
    fn can_list_exactly_the_fixed_states() {
        assert_eq!(TaskStatus::iter().count(), 4);
        assert_eq!(TaskPriority::iter().count(), 5);
    }

    #[test]
    fn can_deserialize_new_task_with_missing_fields() {
        let new_task: NewTask = serde_json::from_str(r#"{"description": "no title"}"#).unwrap();
        assert!(new_task.title.is_none());
        assert!(new_task.author_user_id.is_none());
        assert_eq!(new_task.description.as_deref(), Some("no title"));
    }
}
