//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `JoinService`: profile lookup followed by waitlist admission

mod join;

pub use join::{JoinError, JoinService};
