/*!
 * Database module for persistent storage of translations.
 *
 * This module provides SQLite-based persistence for the translation cache,
 * so labels translated in one run are reused by later runs on other drawings.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
