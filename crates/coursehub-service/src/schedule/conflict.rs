//! Schedule conflict detection.
//!
//! Two slots collide when they share a day of week and their time ranges
//! overlap as half-open intervals `[start, end)`. Touching boundaries
//! (one ends at 10:30, the other starts at 10:30) do not collide. Teaching
//! week ranges are not considered.

use coursehub_entity::course::ScheduleSlot;

/// The first colliding pair found by [`find_conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConflict<'a> {
    /// Slot of the course being enrolled.
    pub proposed: &'a ScheduleSlot,
    /// Slot the student already holds.
    pub existing: &'a ScheduleSlot,
}

impl SlotConflict<'_> {
    /// Human-readable reason naming the course already on the timetable.
    pub fn describe(&self, existing_course: Option<&str>) -> String {
        match existing_course {
            Some(name) => format!(
                "Time conflict with course '{name}' ({})",
                self.existing.describe()
            ),
            None => format!("Time conflict with an enrolled course ({})", self.existing.describe()),
        }
    }
}

/// Whether two slots overlap on the same day.
pub fn overlaps(a: &ScheduleSlot, b: &ScheduleSlot) -> bool {
    a.day_of_week == b.day_of_week && a.start_time < b.end_time && b.start_time < a.end_time
}

/// Check every `(proposed, existing)` pair and return the first collision.
///
/// Proposed slots form the outer scan and existing slots the inner one, so
/// the earliest proposed slot that collides decides the result. An empty
/// `proposed` set never conflicts.
pub fn find_conflict<'a>(
    proposed: &'a [ScheduleSlot],
    existing: &'a [ScheduleSlot],
) -> Option<SlotConflict<'a>> {
    proposed.iter().find_map(|candidate| {
        existing
            .iter()
            .find(|held| overlaps(candidate, held))
            .map(|held| SlotConflict {
                proposed: candidate,
                existing: held,
            })
    })
}
