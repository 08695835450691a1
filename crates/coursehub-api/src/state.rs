//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use coursehub_core::config::AppConfig;
use coursehub_core::traits::CoordinationStore;
use coursehub_database::EnrollmentStore;
use coursehub_service::EnrollmentService;

/// Shared application state.
///
/// Cloned per request by Axum; every field is behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Enrollment use cases.
    pub enrollment: Arc<EnrollmentService>,
    /// Enrollment store, for health checks.
    pub store: Arc<dyn EnrollmentStore>,
    /// Coordination store, for health checks.
    pub coordination: Arc<dyn CoordinationStore>,
}
