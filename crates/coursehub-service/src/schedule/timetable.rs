//! Weekly timetable grid.

use std::collections::HashMap;

use chrono::{NaiveTime, Weekday};
use serde::Serialize;

use coursehub_core::types::CourseId;
use coursehub_entity::course::{Course, ScheduleSlot, weekday_from_iso, weekday_name};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One meeting in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableEntry {
    /// Course ID.
    pub course_id: CourseId,
    /// Course name, when the course row is known.
    pub course_name: Option<String>,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time.
    pub end_time: NaiveTime,
    /// Room.
    pub classroom: Option<String>,
    /// First teaching week.
    pub start_week: i16,
    /// Last teaching week.
    pub end_week: i16,
}

/// All meetings on one day, by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    /// ISO day number, 1 = Monday.
    pub day_of_week: i16,
    /// Day name.
    pub day: &'static str,
    /// Meetings.
    pub entries: Vec<TimetableEntry>,
}

/// A student's week, Monday through Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timetable {
    /// Teaching week shown (`0` = every week).
    pub week: i16,
    /// Seven days, Monday first.
    pub days: Vec<DaySchedule>,
}

impl Timetable {
    /// Build the grid from enrolled courses and their slots.
    ///
    /// Only slots held in `week` are included; `week == 0` keeps all of
    /// them. Slots with an out-of-range day are skipped.
    pub fn build(courses: &[Course], slots: &[ScheduleSlot], week: i16) -> Self {
        let names: HashMap<CourseId, &str> =
            courses.iter().map(|c| (c.id, c.name.as_str())).collect();

        let mut days: Vec<DaySchedule> = WEEK
            .iter()
            .map(|&day| DaySchedule {
                day_of_week: day.number_from_monday() as i16,
                day: weekday_name(day),
                entries: Vec::new(),
            })
            .collect();

        for slot in slots {
            if week != 0 && !slot.is_held_in_week(week) {
                continue;
            }
            let Some(day) = weekday_from_iso(slot.day_of_week) else {
                continue;
            };
            days[day.num_days_from_monday() as usize]
                .entries
                .push(TimetableEntry {
                    course_id: slot.course_id,
                    course_name: names.get(&slot.course_id).map(|n| n.to_string()),
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    classroom: slot.classroom.clone(),
                    start_week: slot.start_week,
                    end_week: slot.end_week,
                });
        }

        for day in &mut days {
            day.entries.sort_by_key(|e| (e.start_time, e.end_time));
        }

        Self { week, days }
    }

    /// Total number of meetings in the grid.
    pub fn len(&self) -> usize {
        self.days.iter().map(|d| d.entries.len()).sum()
    }

    /// Whether the grid has no meetings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
