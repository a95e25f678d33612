//! # taskdeck
//!
//! Client-side core for a project/task management REST backend. This crate
//! implements everything a frontend needs short of rendering: a typed remote
//! data client, guarded concurrent fetching, an in-memory list query pipeline
//! (filter → sort → paginate), and the create/attach mutation workflows.
//!
//! ## Module Organization
//!
//! - `models`: Projects, tasks, calendar events, members, and create payloads
//! - `api`: The `Backend` trait, the HTTP implementation, and a mock backend
//! - `fetch`: Resource state triples, stale-response guards, fetch fallbacks
//! - `query`: The pure filter/sort/paginate pipeline over task collections
//! - `screen`: The project details view model binding it all together
//! - `permissions`: The management capability predicate
//! - `config`: Environment-driven configuration
//! - `error`: Common error types

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod permissions;
pub mod query;
pub mod screen;

pub use error::{ApiError, ApiResult};
pub use screen::ProjectScreen;

/// Current version of the taskdeck library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
