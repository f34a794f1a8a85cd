use crate::entities::*;
use crate::error::{ServiceError, non_blank};
use crate::task::{DependentDeletion, delete_task_dependents};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Query;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api {
    pub mod v1;
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Project {
    /// A project counts as completed once it has an end date.
    pub fn status(&self) -> ProjectStatus {
        if self.end_date.is_some() {
            ProjectStatus::Completed
        } else {
            ProjectStatus::Active
        }
    }
}

impl From<project::Model> for Project {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
pub enum ProjectStatus {
    Active,
    Completed,
}

/// Fields accepted when creating a project.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Row counts removed by a project cascade delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectDeletion {
    pub project_id: i32,
    pub tasks: u64,
    pub dependents: DependentDeletion,
}

pub struct ProjectService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProjectService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        ProjectService { db }
    }

    /// Creates a new project.
    ///
    /// # Arguments
    ///
    /// * `new_project` - `name`, `startDate` and `endDate` are required.
    ///
    /// # Returns
    ///
    /// The created `Project`, or `ServiceError::Validation` without touching
    /// the database when a required field is missing.
    #[tracing::instrument(skip(self))]
    pub async fn create_project(&self, new_project: NewProject) -> Result<Project, ServiceError> {
        let name = non_blank(new_project.name);
        let (Some(name), Some(start_date), Some(end_date)) =
            (name.clone(), new_project.start_date, new_project.end_date)
        else {
            return Err(ServiceError::missing_fields([
                ("name", name.is_none()),
                ("startDate", new_project.start_date.is_none()),
                ("endDate", new_project.end_date.is_none()),
            ]));
        };

        let active_model = project::ActiveModel {
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(non_blank(new_project.description)),
            start_date: ActiveValue::Set(Some(start_date)),
            end_date: ActiveValue::Set(Some(end_date)),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!(project_id = created_model.id, "Project created");
        Ok(Project::from(created_model))
    }

    /// Retrieves all projects. No ordering is promised.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let projects = project::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Project::from)
            .collect();
        Ok(projects)
    }

    /// Retrieves a project by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_project_by_id(&self, id: i32) -> Result<Project, ServiceError> {
        let model = project::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(ServiceError::not_found("Project", id))?;
        Ok(Project::from(model))
    }

    /// Deletes a project and everything that depends on it.
    ///
    /// Runs as one transaction: the project row and its task rows are locked,
    /// then comments, attachments and assignments of its tasks are removed,
    /// then the tasks,
    /// then the project. Any failure drops the transaction and rolls the
    /// whole sequence back. A missing project fails with `NotFound` and
    /// mutates nothing.
    #[tracing::instrument(skip(self))]
    pub async fn delete_project(&self, id: i32) -> Result<ProjectDeletion, ServiceError> {
        let txn = self.db.begin().await?;

        project::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Project", id))?;

        // Writers of comments, attachments and assignments lock their task row,
        // so none can land between the dependent deletes and the task delete.
        task::Entity::find()
            .filter(task::Column::ProjectId.eq(id))
            .order_by_asc(task::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let project_task_ids = Query::select()
            .column(task::Column::Id)
            .from(task::Entity)
            .and_where(task::Column::ProjectId.eq(id))
            .to_owned();
        let dependents = delete_task_dependents(&txn, project_task_ids).await?;

        let tasks = task::Entity::delete_many()
            .filter(task::Column::ProjectId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        project::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(project_id = id, tasks, ?dependents, "Project deleted");

        Ok(ProjectDeletion {
            project_id: id,
            tasks,
            dependents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn project_with_end_date(end_date: Option<DateTime<Utc>>) -> Project {
        Project {
            id: 1,
            name: "Apollo".to_string(),
            description: None,
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end_date,
        }
    }

    #[test]
    fn can_derive_active_status_without_end_date() {
        assert_eq!(project_with_end_date(None).status(), ProjectStatus::Active);
    }

    #[test]
    fn can_derive_completed_status_from_end_date() {
        let end_date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            project_with_end_date(Some(end_date)).status(),
            ProjectStatus::Completed
        );
    }

    #[test]
    fn can_deserialize_camel_case_project_payload() {
        let new_project: NewProject = serde_json::from_str(
            r#"{"name": "P1", "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-06-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(new_project.name.as_deref(), Some("P1"));
        assert_eq!(
            new_project.start_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(new_project.end_date.is_some());
        assert!(new_project.description.is_none());
    }
}
