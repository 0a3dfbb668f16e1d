//! Triage HTTP API.
//!
//! Exposes the triage orchestrator as JSON endpoints under `/api/`,
//! behind a per-client rate limiter. The router is composable:
//! `triage_api_router()` returns a `Router` that can be mounted on any
//! axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::triage_api_router;
pub use server::{start_server, ServerError, ServerSession, TriageServer};
pub use types::ApiContext;
