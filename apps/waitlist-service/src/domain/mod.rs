//! Domain Layer - Core waitlist types and business rules.
//!
//! This layer contains the waitlist registry with no I/O. Everything here
//! is pure Rust with serialization support.

/// Waitlist registry: admission, deduplication and recency queries.
pub mod waitlist;
