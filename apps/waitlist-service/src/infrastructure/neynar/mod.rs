//! Neynar Profile Lookup Adapter
//!
//! Resolves Farcaster identities through the Neynar user API.
//!
//! # Components
//!
//! - `NeynarClient`: `ProfileLookupPort` implementation over reqwest
//! - `api_types`: wire types for the bulk user endpoint
//! - `backoff`: exponential backoff with jitter for retries

pub mod api_types;
mod backoff;
mod client;

pub use client::NeynarClient;
