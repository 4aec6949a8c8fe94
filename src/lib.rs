//! Core library exports for the temple directory service.
//!
//! With only the `data` feature the crate exposes the domain model, Diesel
//! models and repositories. The `server` feature adds forms, services and the
//! Actix routes used by the web application.

/// Role that grants access to moderation and catalog maintenance.
pub const SERVICE_ADMIN_ROLE: &str = "temples_admin";

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
