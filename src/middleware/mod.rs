//! Middleware modules for request processing.
//!
//! # Request flow through `/api`
//!
//! 1. The logging middleware assigns a [`context::RequestContext`] id and
//!    logs the request lifecycle.
//! 2. The [`gate::client_gate`] resolves the session (best effort), checks
//!    the concurrent-client capacity, applies the rate limiter (fail-open)
//!    and the coarse path-prefix rules, then forwards to the handler.
//! 3. Handlers extract [`auth::AuthUser`] for per-route authorization and
//!    tenant scoping.

pub mod auth;
pub mod context;
pub mod gate;
pub mod role;
