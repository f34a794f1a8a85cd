use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_directory_tables::Users;
use crate::m20250901_000003_create_tasks_table::Tasks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    Text,
    TaskId,
    UserId,
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    FileUrl,
    FileName,
    TaskId,
    UploadedById,
}

#[derive(DeriveIden)]
enum TaskAssignments {
    Table,
    Id,
    UserId,
    TaskId,
}

const FK_COMMENTS_TO_TASKS: &str = "fk-comments-task_id";
const FK_COMMENTS_TO_USERS: &str = "fk-comments-user_id";
const FK_ATTACHMENTS_TO_TASKS: &str = "fk-attachments-task_id";
const FK_ATTACHMENTS_TO_USERS: &str = "fk-attachments-uploaded_by_id";
const FK_TASK_ASSIGNMENTS_TO_TASKS: &str = "fk-task_assignments-task_id";
const FK_TASK_ASSIGNMENTS_TO_USERS: &str = "fk-task_assignments-user_id";
const IDX_TASK_ASSIGNMENTS_UNIQUE: &str = "task_assignments_task_id_user_id_unique";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_auto(Comments::Id))
                    .col(text(Comments::Text))
                    .col(integer(Comments::TaskId))
                    .col(integer(Comments::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_COMMENTS_TO_TASKS)
                            .from(Comments::Table, Comments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_COMMENTS_TO_USERS)
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(pk_auto(Attachments::Id))
                    .col(string(Attachments::FileUrl))
                    .col(string_null(Attachments::FileName))
                    .col(integer(Attachments::TaskId))
                    .col(integer(Attachments::UploadedById))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ATTACHMENTS_TO_TASKS)
                            .from(Attachments::Table, Attachments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ATTACHMENTS_TO_USERS)
                            .from(Attachments::Table, Attachments::UploadedById)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskAssignments::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskAssignments::Id))
                    .col(integer(TaskAssignments::UserId))
                    .col(integer(TaskAssignments::TaskId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASK_ASSIGNMENTS_TO_TASKS)
                            .from(TaskAssignments::Table, TaskAssignments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASK_ASSIGNMENTS_TO_USERS)
                            .from(TaskAssignments::Table, TaskAssignments::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TASK_ASSIGNMENTS_UNIQUE)
                    .table(TaskAssignments::Table)
                    .col(TaskAssignments::TaskId)
                    .col(TaskAssignments::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await
    }
}
