//! Contact-form intake: validation, storage, notification, and submission administration.

pub mod config;
pub mod error;
pub mod submissions;
pub mod telemetry;
