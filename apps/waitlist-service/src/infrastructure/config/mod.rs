//! Configuration Module
//!
//! Configuration loading for the waitlist service.

mod settings;

pub use settings::{
    AdminSecret, ConfigError, DEFAULT_NEYNAR_BASE_URL, NeynarSettings, RetrySettings,
    ServerSettings, ServiceConfig, WaitlistSettings,
};
