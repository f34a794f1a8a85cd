//! Users and teams.
//!
//! Both collections are returned whole; narrowing them down by a search box
//! is left to the caller.

use crate::entities::*;
use crate::error::{ServiceError, non_blank};
use sea_orm::*;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;

pub mod api {
    pub mod v1;
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub profile_picture_url: Option<String>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            profile_picture_url: model.profile_picture_url,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// A team with its product owner and project manager resolved to usernames.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Team {
    pub id: i32,
    pub team_name: String,
    pub product_owner_username: Option<String>,
    pub project_manager_username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub team_name: Option<String>,
    pub product_owner_user_id: Option<i32>,
    pub project_manager_user_id: Option<i32>,
}

pub struct DirectoryService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DirectoryService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        DirectoryService { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::UserId)
            .all(self.db)
            .await?
            .into_iter()
            .map(User::from)
            .collect();
        Ok(users)
    }

    /// Creates a user. `username` is required and unique.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        let Some(username) = non_blank(new_user.username) else {
            return Err(ServiceError::missing_fields([("username", true)]));
        };

        let active_model = user::ActiveModel {
            username: ActiveValue::Set(username.clone()),
            profile_picture_url: ActiveValue::Set(non_blank(new_user.profile_picture_url)),
            ..Default::default()
        };
        match active_model.insert(self.db).await {
            Ok(created_model) => Ok(User::from(created_model)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                ServiceError::Validation(format!("Username '{}' is already taken", username)),
            ),
            Err(err) => Err(err.into()),
        }
    }

    /// Retrieves all teams with role holders resolved to usernames.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_teams(&self) -> Result<Vec<Team>, ServiceError> {
        let teams = team::Entity::find()
            .order_by_asc(team::Column::Id)
            .all(self.db)
            .await?;

        let user_ids: BTreeSet<i32> = teams
            .iter()
            .flat_map(|team| [team.product_owner_user_id, team.project_manager_user_id])
            .flatten()
            .collect();
        let usernames = self.usernames_by_id(user_ids).await?;

        let resolve = |user_id: Option<i32>| user_id.and_then(|id| usernames.get(&id).cloned());
        Ok(teams
            .into_iter()
            .map(|model| Team {
                id: model.id,
                team_name: model.team_name,
                product_owner_username: resolve(model.product_owner_user_id),
                project_manager_username: resolve(model.project_manager_user_id),
            })
            .collect())
    }

    /// Creates a team. `teamName` is required; role holders must exist.
    #[tracing::instrument(skip(self))]
    pub async fn create_team(&self, new_team: NewTeam) -> Result<Team, ServiceError> {
        let Some(team_name) = non_blank(new_team.team_name) else {
            return Err(ServiceError::missing_fields([("teamName", true)]));
        };

        let role_holders: BTreeSet<i32> = [
            new_team.product_owner_user_id,
            new_team.project_manager_user_id,
        ]
        .into_iter()
        .flatten()
        .collect();
        let usernames = self.usernames_by_id(role_holders.clone()).await?;
        if let Some(missing) = role_holders.iter().find(|id| !usernames.contains_key(*id)) {
            return Err(ServiceError::not_found("User", *missing));
        }

        let active_model = team::ActiveModel {
            team_name: ActiveValue::Set(team_name),
            product_owner_user_id: ActiveValue::Set(new_team.product_owner_user_id),
            project_manager_user_id: ActiveValue::Set(new_team.project_manager_user_id),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;

        let resolve = |user_id: Option<i32>| user_id.and_then(|id| usernames.get(&id).cloned());
        Ok(Team {
            id: created_model.id,
            team_name: created_model.team_name,
            product_owner_username: resolve(created_model.product_owner_user_id),
            project_manager_username: resolve(created_model.project_manager_user_id),
        })
    }

    async fn usernames_by_id(
        &self,
        user_ids: BTreeSet<i32>,
    ) -> Result<HashMap<i32, String>, ServiceError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let usernames = user::Entity::find()
            .filter(user::Column::UserId.is_in(user_ids))
            .all(self.db)
            .await?
            .into_iter()
            .map(|model| (model.user_id, model.username))
            .collect();
        Ok(usernames)
    }
}
