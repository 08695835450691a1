//! Timetable handler.

use axum::Json;
use axum::extract::{Path, Query, State};

use coursehub_core::error::AppError;
use coursehub_core::types::StudentId;
use coursehub_service::Timetable;

use crate::dto::request::TimetableQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/students/{student_id}/timetable?week=N
pub async fn timetable(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<ApiResponse<Timetable>>, ApiError> {
    if query.week < 0 {
        return Err(AppError::validation("week must be zero or positive").into());
    }
    let grid = state.enrollment.timetable(student_id, query.week).await?;
    Ok(Json(ApiResponse::ok(grid)))
}
