pub mod config;
pub mod dashboard;
pub mod directory;
pub mod entities;
pub mod error;
pub mod preferences;
pub mod project;
pub mod search;
pub mod task;
pub mod web;
