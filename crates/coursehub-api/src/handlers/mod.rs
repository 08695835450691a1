//! Request handlers.

pub mod enrollment;
pub mod health;
pub mod schedule;
