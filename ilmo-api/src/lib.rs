//! # Ilmo Web Server Library
//!
//! Router, handlers and HTML pages of the Ilmo event registration service.
//!
//! ## Modules
//!
//! - `app`: application state, router and admin authentication
//! - `config`: configuration from the environment
//! - `error`: error type and HTTP response mapping
//! - `routes`: route handlers
//! - `templates`: askama page templates and their view models

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod templates;
