//! Weekly schedule slot entity.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::{CourseId, ScheduleSlotId};

/// One weekly meeting of a course.
///
/// Slots are reference data: the enrollment path reads them for conflict
/// detection and timetable rendering but never writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ScheduleSlot {
    /// Unique slot identifier.
    pub id: ScheduleSlotId,
    /// Course this slot belongs to.
    pub course_id: CourseId,
    /// ISO day of week, 1 = Monday through 7 = Sunday.
    pub day_of_week: i16,
    /// Start of the meeting (inclusive).
    pub start_time: NaiveTime,
    /// End of the meeting (exclusive).
    pub end_time: NaiveTime,
    /// First teaching week the slot is held.
    pub start_week: i16,
    /// Last teaching week the slot is held.
    pub end_week: i16,
    /// Room, if assigned.
    pub classroom: Option<String>,
}

impl ScheduleSlot {
    /// Build a slot valid for weeks 1 through 16 with no room assigned.
    pub fn new(course_id: CourseId, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: ScheduleSlotId::new(),
            course_id,
            day_of_week: weekday.number_from_monday() as i16,
            start_time: start,
            end_time: end,
            start_week: 1,
            end_week: 16,
            classroom: None,
        }
    }

    /// Day of week, if `day_of_week` is in range.
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_iso(self.day_of_week)
    }

    /// Whether the slot is held in the given teaching week.
    pub fn is_held_in_week(&self, week: i16) -> bool {
        (self.start_week..=self.end_week).contains(&week)
    }

    /// Human-readable `Monday 09:00-10:30`.
    pub fn describe(&self) -> String {
        let day = self.weekday().map(weekday_name).unwrap_or("Unknown day");
        format!(
            "{day} {}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Convert an ISO day number (1 = Monday) to a [`Weekday`].
pub fn weekday_from_iso(day: i16) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
