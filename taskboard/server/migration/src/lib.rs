pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_directory_tables;
mod m20250901_000002_create_projects_table;
mod m20250901_000003_create_tasks_table;
mod m20250901_000004_create_task_dependents_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_directory_tables::Migration),
            Box::new(m20250901_000002_create_projects_table::Migration),
            Box::new(m20250901_000003_create_tasks_table::Migration),
            Box::new(m20250901_000004_create_task_dependents_tables::Migration),
        ]
    }
}
