//! Core traits defined in `coursehub-core` and implemented by other crates.

pub mod coordination;

pub use coordination::CoordinationStore;
