use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    UserId,
    Username,
    ProfilePictureUrl,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    TeamName,
    ProductOwnerUserId,
    ProjectManagerUserId,
}

const FK_TEAMS_PRODUCT_OWNER: &str = "fk-teams-product_owner_user_id";
const FK_TEAMS_PROJECT_MANAGER: &str = "fk-teams-project_manager_user_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::UserId))
                    .col(string_uniq(Users::Username))
                    .col(string_null(Users::ProfilePictureUrl))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(pk_auto(Teams::Id))
                    .col(string(Teams::TeamName))
                    .col(integer_null(Teams::ProductOwnerUserId))
                    .col(integer_null(Teams::ProjectManagerUserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TEAMS_PRODUCT_OWNER)
                            .from(Teams::Table, Teams::ProductOwnerUserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TEAMS_PROJECT_MANAGER)
                            .from(Teams::Table, Teams::ProjectManagerUserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
