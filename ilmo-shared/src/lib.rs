//! # Ilmo Shared Library
//!
//! Domain logic and persistence for the Ilmo event registration service,
//! used by the API server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migrations
//! - `models`: places, payments, events, attendees
//! - `forms`: field specifications and dynamic registration forms
//! - `gender`: first-name gender classifier
//! - `registration`: attendee persistence and event detail aggregation
//! - `reference`: payment reference numbers
//! - `export`: attendee CSV export

pub mod db;
pub mod export;
pub mod forms;
pub mod gender;
pub mod models;
pub mod reference;
pub mod registration;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
