use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub team_name: String,
    pub product_owner_user_id: Option<i32>,
    pub project_manager_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ProductOwnerUserId",
        to = "super::user::Column::UserId",
        on_delete = "SetNull"
    )]
    ProductOwner,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ProjectManagerUserId",
        to = "super::user::Column::UserId",
        on_delete = "SetNull"
    )]
    ProjectManager,
}

impl ActiveModelBehavior for ActiveModel {}
