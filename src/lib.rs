//! # Scorebook API
//!
//! A multi-tenant assessment reporting backend built with Rust, Axum, and
//! PostgreSQL. Organizations are the tenants; each owns cohorts of
//! participants whose assessment attempts and score reports are tracked.
//!
//! ## Overview
//!
//! - **Sessions**: opaque bearer tokens stored in Postgres with an
//!   in-process validation cache
//! - **Request gating**: per-client fixed-window rate limiting with
//!   role-differentiated thresholds, plus a concurrent-client capacity cap
//! - **Data isolation**: every tenant-scoped query is checked against the
//!   caller's organization memberships
//! - **Assessments**: pre/post attempts per participant, answer recording,
//!   and score reports computed against an answer key
//!
//! ## Architecture
//!
//! The codebase follows a modular architecture inspired by NestJS:
//!
//! ```text
//! src/
//! ├── config/           # Environment-driven configuration structs
//! ├── middleware/       # Client gate, auth extractor, request context
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Login, passcodes, password reset
//! │   ├── sessions/    # Session rows and the validation cache
//! │   ├── organizations/ # Tenants and memberships
//! │   ├── cohorts/     # Cohorts within an organization
//! │   ├── participants/ # Participants within an organization
//! │   └── attempts/    # Attempts, responses, reports
//! ├── limiter.rs        # Fixed-window rate limiter
//! ├── presence.rs       # Active-client capacity tracking
//! └── utils/            # Errors, pagination, email, isolation, tokens
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers (routes)
//! - `service.rs`: Business logic
//! - `model.rs`: Data models, DTOs, database structs
//! - `router.rs`: Axum router configuration

pub mod cli;
pub mod config;
pub mod docs;
pub mod limiter;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod presence;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;
