/// Study Gate - subscription-gated student access
///
/// Student registration, the administrator-driven account lifecycle, and
/// the ordered login decision that admits approved students with remaining
/// subscription days.

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod crypto;
pub mod db;
pub mod error;
pub mod metrics;
pub mod rate_limit;
pub mod server;
pub mod usage;

pub use context::AppContext;
