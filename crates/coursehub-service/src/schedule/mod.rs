//! Weekly schedule logic: conflict detection and timetable rendering.

pub mod conflict;
pub mod timetable;

pub use conflict::{SlotConflict, find_conflict, overlaps};
pub use timetable::{DaySchedule, Timetable, TimetableEntry};
