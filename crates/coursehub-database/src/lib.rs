//! # coursehub-database
//!
//! PostgreSQL connection management, read repositories, and the
//! [`EnrollmentStore`](store::EnrollmentStore) abstraction that owns the
//! versioned capacity ledger.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
#[cfg(feature = "memory")]
pub use store::MemoryEnrollmentStore;
pub use store::{EnrollmentStore, PgEnrollmentStore, TryDropOutcome, TryEnrollOutcome};
