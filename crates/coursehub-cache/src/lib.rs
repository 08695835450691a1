//! # coursehub-cache
//!
//! Coordination store backends for CourseHub's distributed course locks:
//!
//! - **memory**: in-process store on [dashmap](https://crates.io/crates/dashmap), for a single node
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The backend is selected at runtime from the `[coordination]` section.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CoordinationManager;
