//! Configuration modules for the Scorebook API.
//!
//! Each submodule handles one concern, loaded from environment variables
//! with sensible defaults for local development.
//!
//! # Modules
//!
//! - [`capacity`]: Concurrent-client capacity gate configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL database connection pool initialization
//! - [`email`]: Email/SMTP configuration for outbound notifications
//! - [`rate_limit`]: Fixed-window rate limiter configuration
//! - [`session`]: Session lifetime and cache TTL configuration

pub mod capacity;
pub mod cors;
pub mod database;
pub mod email;
pub mod rate_limit;
pub mod session;
