//! Course entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::CourseId;

/// A course with a fixed number of seats.
///
/// `enrolled` is the cached occupancy count and `version` the optimistic
/// concurrency stamp. Both change only inside the capacity ledger's
/// transaction, and always together: every committed occupancy mutation
/// bumps `version` by exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Name of the teaching staff member.
    pub instructor: Option<String>,
    /// Maximum number of seats.
    pub capacity: i32,
    /// Seats currently taken.
    pub enrolled: i32,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Build an empty course at version zero.
    pub fn new(name: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: CourseId::new(),
            name: name.into(),
            description: None,
            instructor: None,
            capacity,
            enrolled: 0,
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Whether every seat is taken.
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    /// Seats still available (never negative).
    pub fn remaining_seats(&self) -> i32 {
        (self.capacity - self.enrolled).max(0)
    }
}
