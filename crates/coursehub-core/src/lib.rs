//! # coursehub-core
//!
//! Core crate for CourseHub. Contains configuration schemas, typed
//! identifiers, the coordination-store trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CourseHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
