
pub mod attachment;
pub mod comment;
pub mod project;
pub mod task;
pub mod task_assignment;
pub mod team;
pub mod user;
