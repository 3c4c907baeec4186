/*!
 * # Anuvad - cached translation relay for Bhashini
 *
 * A Rust service that fronts the Bhashini (ULCA) pipeline API with a
 * persistent cache-aside layer, so repeated identical translation requests are
 * served from storage instead of re-invoking the remote pipeline.
 *
 * ## Features
 *
 * - Cache-aside translation with per-entry expiry (SQLite or in-memory)
 * - One-level fallback to an alternate pipeline when the active one fails
 * - Ordered all-or-nothing batch translation
 * - HTTP API (axum) and command-line interface
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Cache-aside orchestration:
 *   - `translation::core`: The translation service
 *   - `translation::batch`: Batch translation
 *   - `translation::cache`: Cache store contract and in-memory backend
 * - `providers`: Remote pipeline clients:
 *   - `providers::bhashini`: Bhashini/ULCA API client
 *   - `providers::resolver`: Fallback pipeline strategies
 * - `database`: SQLite persistence for the cache
 * - `server`: HTTP routes and handlers
 * - `app_controller`: Main application controller
 * - `language_utils`: Supported language codes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod server;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, StoreError, TranslationError};
pub use language_utils::{get_language_name, is_supported_language, SUPPORTED_LANGUAGES};
pub use translation::{BatchTranslator, CacheStore, TranslationService};
