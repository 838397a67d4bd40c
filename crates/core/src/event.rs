//! Draft event system: how a presentation layer learns about state changes.
//!
//! Components publish events after each completed transition. Renderers
//! subscribe and redraw without being coupled to the state objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All draft events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DraftEvent {
    /// Movements of a case were fetched and cached
    CandidatesLoaded {
        process: String,
        events: usize,
        pieces: usize,
        timestamp: DateTime<Utc>,
    },

    /// A piece was added to the document during a bulk import
    PieceImported {
        piece_id: String,
        /// Content is a fallback notice instead of extracted text
        fallback: bool,
        timestamp: DateTime<Utc>,
    },

    /// A bulk import finished
    ImportFinished {
        imported: usize,
        with_fallback: usize,
        timestamp: DateTime<Utc>,
    },

    /// The generation service returned a draft
    DraftGenerated {
        objective: String,
        model: Option<String>,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// An adjustment produced a new version
    VersionCreated {
        number: u32,
        timestamp: DateTime<Utc>,
    },

    /// An error occurred
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for draft events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DraftEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DraftEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DraftEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
