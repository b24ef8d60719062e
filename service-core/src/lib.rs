//! service-core: Shared infrastructure for the insight services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
