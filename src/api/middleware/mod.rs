//! API middleware stack.
//!
//! A single per-client rate limiter sits in front of every `/api` route.

pub mod rate;
