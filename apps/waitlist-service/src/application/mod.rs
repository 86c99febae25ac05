//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the join use case and the port interfaces that
//! define how the domain reaches external systems.

/// Port interfaces for external systems (profile lookup).
pub mod ports;

/// Application services for joining the waitlist.
pub mod services;
