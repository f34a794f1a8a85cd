use crate::entities::*;
use crate::error::ServiceError;
use crate::project::ProjectStatus;
use crate::task::TaskPriority;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::collections::BTreeMap;

pub mod api {
    pub mod v1;
}

/// Aggregates behind the home page charts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub project_status: BTreeMap<ProjectStatus, u64>,
    pub task_priority: BTreeMap<TaskPriority, u64>,
}

pub struct DashboardService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DashboardService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        DashboardService { db }
    }

    /// Counts projects by derived status and tasks by priority. Task counts
    /// cover every project unless `project_id` is given. Levels with no tasks
    /// are absent from the map.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self, project_id: Option<i32>) -> Result<DashboardSummary, ServiceError> {
        let completed = project::Entity::find()
            .filter(project::Column::EndDate.is_not_null())
            .count(self.db)
            .await?;
        let active = project::Entity::find()
            .filter(project::Column::EndDate.is_null())
            .count(self.db)
            .await?;

        let mut priority_query = task::Entity::find()
            .select_only()
            .column(task::Column::Priority)
            .column_as(Expr::col(task::Column::Id).count(), "count")
            .group_by(task::Column::Priority);
        if let Some(project_id) = project_id {
            priority_query = priority_query.filter(task::Column::ProjectId.eq(project_id));
        }
        let priority_counts: Vec<(TaskPriority, i64)> =
            priority_query.into_tuple().all(self.db).await?;

        let project_status = [
            (ProjectStatus::Active, active),
            (ProjectStatus::Completed, completed),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
        let task_priority = priority_counts
            .into_iter()
            .map(|(priority, count)| (priority, count.max(0) as u64))
            .collect();

        Ok(DashboardSummary {
            project_status,
            task_priority,
        })
    }
}
