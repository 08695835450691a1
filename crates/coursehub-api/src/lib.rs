//! # coursehub-api
//!
//! HTTP API layer for CourseHub built on Axum.
//!
//! A thin adapter over [`EnrollmentService`](coursehub_service::EnrollmentService):
//! routes, request logging, DTOs and the mapping of enrollment outcomes and
//! errors to HTTP responses. The student id in the path is trusted input
//! from an upstream authentication gateway.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
