//! Library crate for mcdb-back, exposing modules for binaries and integration tests.

/// Layered configuration: defaults, JSON file, environment.
pub mod config;
/// Persistence and upstream provider gateways.
pub mod dao;
mod dto;
mod error;
/// HTTP handlers grouped by resource.
pub mod routes;
/// Business logic behind the handlers, plus background tasks.
pub mod services;
/// Shared application state handed to every handler.
pub mod state;
