//! Cross-cutting plumbing shared by Foodgram binaries: configuration,
//! error bodies, health checks, request ids, tracing and query helpers.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod tracing;
