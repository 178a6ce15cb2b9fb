/// Route handlers
///
/// - `health`: health check
/// - `events`: upcoming event list
/// - `registration`: registration form, submission and confirmation page
/// - `admin`: token-protected management endpoints

pub mod admin;
pub mod events;
pub mod health;
pub mod registration;
