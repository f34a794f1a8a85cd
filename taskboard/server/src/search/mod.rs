use crate::directory::User;
use crate::entities::*;
use crate::error::ServiceError;
use crate::project::Project;
use crate::task::Task;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::*;

pub mod api {
    pub mod v1;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
}

/// Case-insensitive substring search over projects, tasks and users.
pub struct SearchService<'a> {
    db: &'a DatabaseConnection,
    min_query_length: usize,
}

impl<'a> SearchService<'a> {
    pub fn new(db: &'a DatabaseConnection, min_query_length: usize) -> Self {
        SearchService {
            db,
            min_query_length,
        }
    }

    /// Matches project name/description, task title/description and
    /// username. Queries shorter than the configured minimum (after trimming)
    /// are rejected.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResults, ServiceError> {
        let query = query.trim();
        if query.chars().count() < self.min_query_length {
            return Err(ServiceError::Validation(format!(
                "Search query must be at least {} characters long",
                self.min_query_length
            )));
        }

        let projects = project::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ignore_case(project::Column::Name, query))
                    .add(contains_ignore_case(project::Column::Description, query)),
            )
            .order_by_asc(project::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Project::from)
            .collect();

        let tasks = task::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ignore_case(task::Column::Title, query))
                    .add(contains_ignore_case(task::Column::Description, query)),
            )
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();

        let users = user::Entity::find()
            .filter(contains_ignore_case(user::Column::Username, query))
            .order_by_asc(user::Column::UserId)
            .all(self.db)
            .await?
            .into_iter()
            .map(User::from)
            .collect();

        let results = SearchResults {
            projects,
            tasks,
            users,
        };
        tracing::debug!(
            projects = results.projects.len(),
            tasks = results.tasks.len(),
            users = results.users.len(),
            "Search completed"
        );
        Ok(results)
    }
}

/// `column ILIKE '%needle%'` with LIKE wildcards in `needle` matched
/// literally. Case folding is left to Postgres so both sides fold alike.
fn contains_ignore_case<C>(column: C, needle: &str) -> SimpleExpr
where
    C: ColumnTrait,
{
    let pattern = format!("%{}%", escape_like(needle));
    Expr::col(column).ilike(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
