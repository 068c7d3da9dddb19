//! Project-request data access and lifecycle orchestration.

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{PgProjectsDao, ProjectsDao};
pub use service::ProjectsService;
