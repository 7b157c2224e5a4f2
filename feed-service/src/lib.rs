/// Feed Service Library
///
/// Serves a paginated, reverse-chronological content feed from a bounded
/// cache with database fallback, and runs the retry-wrapped write path for
/// posts and comments. HTTP routing, auth, blob storage and the message
/// broker itself are external collaborators; this crate exposes the
/// service structs and the seams they plug into.
///
/// # Modules
///
/// - `cache`: feed index, content store, comment ring, eviction
/// - `cursor`: opaque pagination token codec
/// - `db`: durable store seam and Postgres repositories
/// - `queue`: comment channel contract and in-process implementation
/// - `services`: page fetch and write-path business logic
/// - `consumers`: asynchronous comment persistence
/// - `retry`: bounded-retry helper for the write path
/// - `error`: error types and transient classification
/// - `config`: environment-driven configuration
pub mod cache;
pub mod config;
pub mod consumers;
pub mod cursor;
pub mod db;
pub mod error;
pub mod models;
pub mod queue;
pub mod retry;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
