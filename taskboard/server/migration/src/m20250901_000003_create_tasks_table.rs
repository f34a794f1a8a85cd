use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_directory_tables::Users;
use crate::m20250901_000002_create_projects_table::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Tasks {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    Tags,
    StartDate,
    DueDate,
    Points,
    ProjectId,
    AuthorUserId,
    AssignedUserId,
}

const TASK_STATUS: &str = "task_status";
const TASK_PRIORITY: &str = "task_priority";
const TASK_STATUS_VALUES: [&str; 4] = ["To Do", "Work In Progress", "Under Review", "Completed"];
const TASK_PRIORITY_VALUES: [&str; 5] = ["Backlog", "Low", "Medium", "High", "Urgent"];

const FK_TASKS_TO_PROJECTS: &str = "fk-tasks-project_id";
const FK_TASKS_TO_AUTHOR: &str = "fk-tasks-author_user_id";
const FK_TASKS_TO_ASSIGNEE: &str = "fk-tasks-assigned_user_id";
const IDX_TASKS_PROJECT_ID: &str = "idx-tasks-project_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new(TASK_STATUS))
                    .values(TASK_STATUS_VALUES.map(Alias::new))
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new(TASK_PRIORITY))
                    .values(TASK_PRIORITY_VALUES.map(Alias::new))
                    .to_owned(),
            )
            .await?;

        // Dependents are removed by the application in a fixed order, so the
        // foreign keys carry no cascade action.
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string(Tasks::Title))
                    .col(text_null(Tasks::Description))
                    .col(enumeration(
                        Tasks::Status,
                        Alias::new(TASK_STATUS),
                        TASK_STATUS_VALUES.map(Alias::new),
                    ))
                    .col(enumeration(
                        Tasks::Priority,
                        Alias::new(TASK_PRIORITY),
                        TASK_PRIORITY_VALUES.map(Alias::new),
                    ))
                    .col(string_null(Tasks::Tags))
                    .col(timestamp_with_time_zone_null(Tasks::StartDate))
                    .col(timestamp_with_time_zone_null(Tasks::DueDate))
                    .col(integer_null(Tasks::Points))
                    .col(integer(Tasks::ProjectId))
                    .col(integer(Tasks::AuthorUserId))
                    .col(integer_null(Tasks::AssignedUserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASKS_TO_PROJECTS)
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASKS_TO_AUTHOR)
                            .from(Tasks::Table, Tasks::AuthorUserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASKS_TO_ASSIGNEE)
                            .from(Tasks::Table, Tasks::AssignedUserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TASKS_PROJECT_ID)
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new(TASK_PRIORITY)).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new(TASK_STATUS)).to_owned())
            .await
    }
}
