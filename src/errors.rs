/*!
 * Error types for the anuvad translation relay.
 *
 * This module contains custom error types for the different layers of the
 * service, using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: failures talking to the remote pipeline provider
 * - `StoreError`: failures of the translation cache store
 * - `TranslationError`: failures surfaced by the translation orchestrator
 * - `AppError`: top-level wrapper used by the binary
 */

use thiserror::Error;

/// Errors that can occur when talking to the remote pipeline provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Credentials are missing/malformed or the config endpoint rejected the request
    #[error("Pipeline config error: {0}")]
    Config(String),

    /// The pipeline config holds no translation service at all
    #[error("Could not find a translation service for {source_lang} -> {target_lang}")]
    NoService {
        /// Requested source language
        source_lang: String,
        /// Requested target language
        target_lang: String,
    },

    /// The pipeline config does not carry an inference endpoint
    #[error("Callback URL not found in pipeline config")]
    EmptyCallback,

    /// The compute response held no translation output
    #[error("No translation output received")]
    NoOutput,

    /// The compute endpoint answered with a non-success status
    #[error("API returned status {status}: {body}. Request payload was: {payload}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
        /// Outgoing JSON payload
        payload: String,
    },

    /// Timeout, connection or I/O failure while talking to the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// Errors raised by a translation cache store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying storage could not be reached or queried
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unavailable(format!("{:#}", error))
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Source text was empty after trimming
    #[error("Source text cannot be empty")]
    EmptyInput,

    /// Neither the active pipeline nor the fallback pipeline produced a config
    #[error("Failed to get pipeline config: {0}")]
    PipelineUnavailable(#[source] ProviderError),

    /// The pipeline call itself failed
    #[error("Failed to translate: {0}")]
    TranslationFailed(#[source] ProviderError),

    /// One item of a batch failed, which fails the whole batch
    #[error("item[{index}]: {source}")]
    BatchItem {
        /// Position of the failing item in the batch
        index: usize,
        /// Failure of that item
        #[source]
        source: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Whether the error was caused by the caller's input rather than upstream
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::EmptyInput => true,
            Self::BatchItem { source, .. } => source.is_client_error(),
            _ => false,
        }
    }

    /// Index of the failing batch item, if any
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Self::BatchItem { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the cache store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
