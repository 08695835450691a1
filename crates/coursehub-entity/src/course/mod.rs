//! Course entities: the capacity-bearing course row and its weekly slots.

pub mod model;
pub mod schedule;

pub use model::Course;
pub use schedule::{ScheduleSlot, weekday_from_iso, weekday_name};
