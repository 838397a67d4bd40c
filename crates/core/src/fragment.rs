//! Fragment domain types.
//!
//! A fragment is one named block of text contributed to the final document,
//! either imported from the case record or written by hand.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fragment.
///
/// Imported fragments reuse the candidate piece id, so the same id identifies
/// a piece in the candidate list and in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(pub String);

impl FragmentId {
    /// A fresh id for a manually authored fragment.
    pub fn manual() -> Self {
        Self(format!("manual_{}", Uuid::new_v4()))
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a fragment came from. Also names the container that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Imported from the case record (eproc)
    Imported,
    /// Written by the user
    Manual,
}

impl Origin {
    /// The badge shown next to a fragment of this origin.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Imported => "Importada do Eproc",
            Self::Manual => "Manual",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imported => write!(f, "imported"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Stable identifier, unique within the document
    pub id: FragmentId,

    /// Display name
    pub label: String,

    /// Text body
    pub content: String,

    /// Imported or manual; decides the container
    pub origin: Origin,

    /// 1-based position in the submission sequence
    pub order: usize,
}

impl Fragment {
    /// An empty manual fragment.
    pub fn manual() -> Self {
        Self {
            id: FragmentId::manual(),
            label: String::new(),
            content: String::new(),
            origin: Origin::Manual,
            order: 0,
        }
    }

    /// A fragment built from an imported piece.
    pub fn imported(piece: ImportedPiece) -> Self {
        Self {
            id: piece.id,
            label: piece.label,
            content: piece.content,
            origin: Origin::Imported,
            order: 0,
        }
    }

    /// The badge tied to the current origin.
    pub fn badge(&self) -> &'static str {
        self.origin.badge()
    }
}

/// The data needed to add an imported fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedPiece {
    pub id: FragmentId,
    pub label: String,
    pub content: String,
}
