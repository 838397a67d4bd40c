//! Import Reconciler: moves selected candidates into the document.
//!
//! Computes which selected pieces still need importing, fetches their
//! contents one at a time, and appends them to the imported list. A failed
//! fetch never aborts the batch: the piece is imported with a fallback body
//! naming the error.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use minuta_core::{
    DraftError, DraftEvent, EventBus, FetchError, FragmentId, ImportedPiece, PieceContent,
    PieceContentSource, PieceRequest, ProcessNumber, format_event_date, format_size,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assembler::DocumentAssembler;
use crate::candidates::CandidateStore;

/// A selected piece that still needs importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidate {
    pub id: FragmentId,
    /// Label of the fragment to create
    pub label: String,
    pub descriptor: String,
    pub event_id: String,
    pub event_date: String,
}

/// The selection split against the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In the store's display order
    pub to_import: Vec<ImportCandidate>,
    /// Selected but already in the document
    pub already_present: Vec<FragmentId>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_import.is_empty()
    }
}

/// Reported before each piece is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    /// 1-based
    pub index: usize,
    pub total: usize,
    pub descriptor: String,
}

impl std::fmt::Display for ImportProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extraindo texto da peça {} de {}: {}",
            self.index, self.total, self.descriptor
        )
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Every fragment added, fallback or not
    pub imported: Vec<FragmentId>,
    /// Imported with a message or error notice instead of extracted text
    pub with_fallback: Vec<FragmentId>,
    pub already_present: Vec<FragmentId>,
    /// Refused by the assembler
    pub rejected: Vec<FragmentId>,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.imported.is_empty() && self.rejected.is_empty()
    }
}

/// A piece's content fetched for display before importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PiecePreview {
    pub id: FragmentId,
    pub format: Option<String>,
    /// Human-readable size (`"1.5 KB"`)
    pub size: Option<String>,
    pub available: bool,
    pub text: Option<String>,
    pub message: Option<String>,
}

/// The body of an imported fragment: event header, blank line, text.
pub fn piece_body(event_id: &str, event_date: &str, text: &str) -> String {
    format!(
        "Evento: {event_id} ({})\n\n{text}",
        format_event_date(event_date)
    )
}

/// Notice used in place of text when a piece could not be fetched.
pub fn fetch_error_notice(error: &FetchError) -> String {
    format!("[Erro ao buscar conteúdo da peça: {error}]")
}

/// Split the selection into pieces to import and pieces already present.
pub fn reconcile_selection(
    store: &CandidateStore,
    assembler: &DocumentAssembler,
) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();

    for (event, piece) in store.pieces() {
        if !store.is_selected(&piece.id) {
            continue;
        }
        if assembler.contains(&piece.id) {
            reconciliation.already_present.push(piece.id.clone());
            continue;
        }
        reconciliation.to_import.push(ImportCandidate {
            id: piece.id.clone(),
            label: piece.display_label().to_string(),
            descriptor: piece.descriptor.clone(),
            event_id: event.event_id.clone(),
            event_date: event.date.clone(),
        });
    }

    reconciliation
}

/// Make the selection mirror the document: selected and disabled pieces are
/// exactly the candidates already in the assembler. Returns their count.
pub fn sync_selection_from_assembler(
    store: &mut CandidateStore,
    assembler: &DocumentAssembler,
) -> usize {
    let present: HashSet<FragmentId> = store
        .pieces()
        .map(|(_, piece)| piece.id.clone())
        .filter(|id| assembler.contains(id))
        .collect();

    let count = present.len();
    store.replace_disabled(present.clone());
    store.replace_selection(present);
    debug!(already_imported = count, "Selection synchronized with document");
    count
}

/// Fetches piece contents and imports them into the document.
pub struct ImportReconciler {
    source: Arc<dyn PieceContentSource>,
    system_id: String,
    event_bus: Option<Arc<EventBus>>,
}

impl ImportReconciler {
    pub fn new(source: Arc<dyn PieceContentSource>, system_id: impl Into<String>) -> Self {
        Self {
            source,
            system_id: system_id.into(),
            event_bus: None,
        }
    }

    /// Publish import events on the given bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn request(&self, process: &ProcessNumber, piece_id: &FragmentId) -> PieceRequest {
        PieceRequest {
            process: process.clone(),
            piece_id: piece_id.clone(),
            system_id: self.system_id.clone(),
        }
    }

    /// Import every selected piece not yet in the document.
    ///
    /// Pieces are fetched strictly one after another. With nothing to import
    /// the selection is left as it was and an empty report is returned.
    pub async fn import_selected<F>(
        &self,
        process: &ProcessNumber,
        store: &mut CandidateStore,
        assembler: &mut DocumentAssembler,
        mut on_progress: F,
    ) -> ImportReport
    where
        F: FnMut(ImportProgress),
    {
        let Reconciliation {
            to_import,
            already_present,
        } = reconcile_selection(store, assembler);

        let mut report = ImportReport {
            already_present,
            ..ImportReport::default()
        };

        if to_import.is_empty() {
            debug!(
                already_present = report.already_present.len(),
                "Nothing to import"
            );
            return report;
        }

        let total = to_import.len();
        info!(process = %process, total, "Importing pieces");

        for (position, candidate) in to_import.into_iter().enumerate() {
            on_progress(ImportProgress {
                index: position + 1,
                total,
                descriptor: candidate.descriptor.clone(),
            });

            let request = self.request(process, &candidate.id);
            let (text, fallback) = match self.source.fetch_piece(request).await {
                Ok(content) => match content.text() {
                    Some(text) => (text.to_string(), false),
                    None => {
                        debug!(piece = %candidate.id, "No extracted text, using service message");
                        (content.message.unwrap_or_default(), true)
                    }
                },
                Err(e) => {
                    warn!(piece = %candidate.id, error = %e, "Piece fetch failed");
                    (fetch_error_notice(&e), true)
                }
            };

            let piece = ImportedPiece {
                id: candidate.id.clone(),
                label: candidate.label,
                content: piece_body(&candidate.event_id, &candidate.event_date, &text),
            };

            match assembler.add_imported(piece) {
                Ok(_) => {
                    if fallback {
                        report.with_fallback.push(candidate.id.clone());
                    }
                    self.publish(DraftEvent::PieceImported {
                        piece_id: candidate.id.to_string(),
                        fallback,
                        timestamp: Utc::now(),
                    });
                    report.imported.push(candidate.id);
                }
                Err(e) => {
                    warn!(piece = %candidate.id, error = %e, "Piece rejected by document");
                    report.rejected.push(candidate.id);
                }
            }
        }

        store.clear();
        assembler.renumber();
        store.mark_disabled(report.imported.iter().cloned());

        info!(
            imported = report.imported.len(),
            with_fallback = report.with_fallback.len(),
            rejected = report.rejected.len(),
            "Import finished"
        );
        self.publish(DraftEvent::ImportFinished {
            imported: report.imported.len(),
            with_fallback: report.with_fallback.len(),
            timestamp: Utc::now(),
        });

        report
    }

    /// Fetch one piece's content for display.
    pub async fn preview(
        &self,
        process: &ProcessNumber,
        piece_id: &FragmentId,
    ) -> Result<PiecePreview, FetchError> {
        let PieceContent {
            format,
            size_bytes,
            content_available,
            extracted_text,
            message,
        } = self.source.fetch_piece(self.request(process, piece_id)).await?;

        Ok(PiecePreview {
            id: piece_id.clone(),
            format,
            size: size_bytes.map(format_size),
            available: content_available,
            text: extracted_text.filter(|t| !t.trim().is_empty()),
            message,
        })
    }

    /// Import a previewed piece with text edited by the user.
    pub fn import_preview(
        &self,
        store: &mut CandidateStore,
        assembler: &mut DocumentAssembler,
        preview: &PiecePreview,
        edited_text: &str,
    ) -> Result<FragmentId, DraftError> {
        if edited_text.trim().is_empty() {
            return Err(DraftError::EmptyContent);
        }
        if assembler.contains(&preview.id) {
            return Err(DraftError::DuplicateFragment {
                id: preview.id.to_string(),
            });
        }

        let (event, piece) = store
            .find_piece(&preview.id)
            .ok_or_else(|| DraftError::UnknownFragment(preview.id.to_string()))?;

        let imported = ImportedPiece {
            id: preview.id.clone(),
            label: piece.display_label().to_string(),
            content: piece_body(&event.event_id, &event.date, edited_text),
        };
        let id = assembler.add_imported(imported)?.id.clone();

        store.deselect(&id);
        store.mark_disabled([id.clone()]);
        info!(piece = %id, "Previewed piece imported");
        self.publish(DraftEvent::PieceImported {
            piece_id: id.to_string(),
            fallback: false,
            timestamp: Utc::now(),
        });

        Ok(id)
    }

    fn publish(&self, event: DraftEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
