//! Utility modules for the Scorebook API.
//!
//! This module contains shared utilities used throughout the application:
//!
//! - [`email`]: Email sending utilities using SMTP
//! - [`errors`]: Application error types and handling
//! - [`isolation`]: Organization-scoped data isolation
//! - [`pagination`]: Request pagination utilities
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde serialization/deserialization helpers
//! - [`token`]: Session token and passcode generation

pub mod email;
pub mod errors;
pub mod isolation;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod token;
