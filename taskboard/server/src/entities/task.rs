use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workflow state of a task. Any state may follow any other.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
pub enum TaskStatus {
    #[sea_orm(string_value = "To Do")]
    #[serde(rename = "To Do")]
    ToDo,
    #[sea_orm(string_value = "Work In Progress")]
    #[serde(rename = "Work In Progress")]
    WorkInProgress,
    #[sea_orm(string_value = "Under Review")]
    #[serde(rename = "Under Review")]
    UnderReview,
    // The board column is labelled "Complete".
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed", alias = "Complete")]
    Completed,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
pub enum TaskPriority {
    #[sea_orm(string_value = "Backlog")]
    Backlog,
    #[sea_orm(string_value = "Low")]
    Low,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Urgent")]
    Urgent,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub tags: Option<String>,
    pub start_date: Option<DateTimeUtc>,
    pub due_date: Option<DateTimeUtc>,
    pub points: Option<i32>,
    #[sea_orm(indexed)]
    pub project_id: i32,
    pub author_user_id: i32,
    pub assigned_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorUserId",
        to = "super::user::Column::UserId"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedUserId",
        to = "super::user::Column::UserId",
        on_delete = "SetNull"
    )]
    Assignee,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
    #[sea_orm(has_many = "super::task_assignment::Entity")]
    TaskAssignment,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl Related<super::task_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
