//! Core types and errors for the `coffer` cache engine.
//!
//! This crate establishes the foundational data structures and error
//! handling used throughout the workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing all possible failure modes for predictable error handling.
//! - **`removal`**: The removal-event types delivered to caller-supplied
//!   listeners when entries leave a cache.
//! - **`loader`**: Type aliases for caller-supplied value loaders in their
//!   synchronous and deferred forms.

pub mod errors;
pub mod loader;
pub mod removal;

pub use self::{
    errors::{BoxError, Error, Result},
    loader::{LoadFuture, LoadResult},
    removal::{noop_listener, RemovalCause, RemovalEvent, RemovalListener},
};
