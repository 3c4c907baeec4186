/*!
 * Database module for persistent storage of cached translations.
 *
 * This module provides SQLite-based persistence for the translation cache:
 * one table keyed by (source text, source language, target language) with
 * creation and expiry timestamps.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::CacheEntry;
pub use repository::Repository;
