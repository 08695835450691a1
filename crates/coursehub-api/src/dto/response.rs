//! Response DTOs.

use serde::{Deserialize, Serialize};

use coursehub_core::types::CourseId;
use coursehub_entity::course::Course;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Enrolled course summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    /// Course ID.
    pub id: CourseId,
    /// Name.
    pub name: String,
    /// Instructor.
    pub instructor: Option<String>,
    /// Seat capacity.
    pub capacity: i32,
    /// Seats taken.
    pub enrolled: i32,
}

impl From<Course> for CourseResponse {
    fn from(c: Course) -> Self {
        Self {
            id: c.id,
            name: c.name,
            instructor: c.instructor,
            capacity: c.capacity,
            enrolled: c.enrolled,
        }
    }
}

/// Result of a successful drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropResponse {
    /// Course the seat was released from.
    pub course_id: CourseId,
    /// Always `"dropped"`.
    pub status: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Relational store reachable.
    pub database: bool,
    /// Coordination store reachable.
    pub coordination: bool,
}
