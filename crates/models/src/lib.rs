//! SeaORM entities for the two persisted collections, `users` and `places`,
//! plus field validation shared by the service layer.

pub mod errors;
pub mod db;
pub mod user;
pub mod place;

/// Layout version written to every persisted record.
pub const SCHEMA_VERSION: i16 = 1;

#[cfg(test)]
mod tests;
