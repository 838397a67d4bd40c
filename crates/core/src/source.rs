//! Case-record collaborators: where candidate events and piece contents
//! come from.
//!
//! Implementations: the HTTP client in `minuta-client`; scripted sources in
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::candidate::CandidateEvent;
use crate::error::FetchError;
use crate::fragment::FragmentId;
use crate::process::ProcessNumber;

/// Request for the movements of a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub process: ProcessNumber,

    /// Court system identifier (e.g. "br.jus.jfrj.eproc")
    pub system_id: String,
}

/// Request for the content of one piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceRequest {
    pub process: ProcessNumber,
    pub piece_id: FragmentId,
    pub system_id: String,
}

/// Content returned for a piece.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceContent {
    /// Document format (e.g. "pdf", "html")
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub size_bytes: Option<u64>,

    /// Whether the service could read the document at all
    #[serde(default)]
    pub content_available: bool,

    /// Text extracted from the document
    #[serde(default)]
    pub extracted_text: Option<String>,

    /// Explanation from the service when no text is available
    #[serde(default)]
    pub message: Option<String>,
}

impl PieceContent {
    /// Extracted text, if any non-blank text was extracted.
    pub fn text(&self) -> Option<&str> {
        self.extracted_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Source of candidate events for a case.
#[async_trait]
pub trait MovementSource: Send + Sync {
    /// Fetch all movements of a case, in the order the court system returns
    /// them.
    async fn fetch_movements(
        &self,
        request: MovementRequest,
    ) -> std::result::Result<Vec<CandidateEvent>, FetchError>;
}

/// Source of piece contents.
#[async_trait]
pub trait PieceContentSource: Send + Sync {
    async fn fetch_piece(
        &self,
        request: PieceRequest,
    ) -> std::result::Result<PieceContent, FetchError>;
}
