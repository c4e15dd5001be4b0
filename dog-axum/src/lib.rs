//! dog-axum: Axum adapter for DogRS.
//!
//! Mounts range-aware blob streaming from `dog-blob` on an axum router and
//! carries the HTTP plumbing around it: request ids, tracing, JSON errors
//! and graceful shutdown.

pub mod app;
pub mod params;
pub mod sink;
pub mod state;
pub mod stream;
mod error;
pub use error::DogAxumError;
pub use sink::{ChannelSink, PendingResponse};
pub use state::StreamState;

pub use app::{axum, AxumApp};
