//! # Minuta Core
//!
//! Domain types, collaborator traits, and error definitions for the Minuta
//! drafting controller. This crate performs **no I/O**: it defines the
//! domain model that the drafting state machine and the HTTP client
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (court-record fetches, the generation
//! service, its model catalog) is a trait here. Implementations live in
//! their respective crates. This enables:
//! - Driving the drafting state machine from tests with scripted sources
//! - Swapping the transport without touching the state machine
//! - Clean dependency graph (all crates depend inward on core)

pub mod candidate;
pub mod error;
pub mod event;
pub mod fragment;
pub mod generation;
pub mod process;
pub mod source;

// Re-export key types at crate root for ergonomics
pub use candidate::{CandidateEvent, CandidatePiece, CandidateRow, format_event_date, format_size};
pub use error::{DraftError, Error, FetchError, GenerationError, Result};
pub use event::{DraftEvent, EventBus};
pub use fragment::{Fragment, FragmentId, ImportedPiece, Origin};
pub use generation::{
    AdjustmentRequest, CostInfo, GenerationCatalog, GenerationRequest, GenerationResponse,
    GenerationService, ModelInfo, Objective, ObjectiveFields, PromptInfo, SubmittedFragment,
    TokensInfo,
};
pub use process::ProcessNumber;
pub use source::{MovementRequest, MovementSource, PieceContent, PieceContentSource, PieceRequest};
