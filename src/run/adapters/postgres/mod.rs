//! `PostgreSQL` adapters for run persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresRunRepository, RunPgPool};
