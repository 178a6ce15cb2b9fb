/// Database layer: connection pool and schema migrations
///
/// Models live in the crate-level `models` module.

pub mod migrations;
pub mod pool;
