//! Error types for the Minuta domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them all.

use thiserror::Error;

/// The top-level error type for all Minuta operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Remote fetch errors ---
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    // --- Draft state errors ---
    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A remote call for movements or piece content failed.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote call failed: {message} (status: {status_code})")]
    Remote { status_code: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Violations and empty states inside the drafting core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("No movement with pieces found for process {process}")]
    EmptyResult { process: String },

    #[error("Fragment {id} is already part of the document")]
    DuplicateFragment { id: String },

    #[error("Two fragments share order {order}")]
    OrderConflict { order: usize },

    #[error("No content available to import")]
    EmptyContent,

    #[error("Unknown fragment: {0}")]
    UnknownFragment(String),
}

/// Failures while generating or adjusting a draft.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("At least one fragment is required")]
    MissingFragments,

    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("Generate a draft before requesting adjustments")]
    NoBaseGeneration,

    #[error("Describe the adjustment to apply")]
    EmptyAdjustment,

    #[error("Generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Generation service failed: {message} (status: {status_code})")]
    Service { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No result received from the generation service")]
    EmptyResult,
}
