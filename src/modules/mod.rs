pub mod admin;
pub mod attempts;
pub mod auth;
pub mod cohorts;
pub mod organizations;
pub mod participants;
pub mod sessions;
