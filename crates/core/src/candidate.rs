//! Candidate events and pieces fetched from the case record.

use serde::{Deserialize, Serialize};

use crate::fragment::FragmentId;

/// A piece available for import, not yet part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePiece {
    pub id: FragmentId,

    /// Short description of the piece (e.g. "Petição")
    pub descriptor: String,

    /// Piece kind as reported by the court system
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub mime_type: String,

    /// Display label; falls back to the descriptor when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Size in bytes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default)]
    pub date: String,
}

impl CandidatePiece {
    /// The name to show for this piece.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.descriptor,
        }
    }
}

/// A movement in the case record grouping zero or more pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub event_id: String,

    /// Fixed-width numeric timestamp (`YYYYMMDDHHMMSS`)
    pub date: String,

    pub description: String,

    #[serde(default)]
    pub pieces: Vec<CandidatePiece>,
}

impl CandidateEvent {
    pub fn has_pieces(&self) -> bool {
        !self.pieces.is_empty()
    }
}

/// One display row: an (event, piece) pair, or a placeholder for an event
/// without pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub event_id: String,
    pub date: String,
    pub description: String,

    /// `None` for placeholder rows
    pub piece: Option<CandidatePiece>,

    /// Whether the piece is in the selection set
    pub checked: bool,

    /// Already part of the document; cannot be toggled
    pub disabled: bool,
}

impl CandidateRow {
    /// Placeholder rows are never selectable.
    pub fn is_placeholder(&self) -> bool {
        self.piece.is_none()
    }

    /// Whether the row's checkbox can be toggled.
    pub fn is_selectable(&self) -> bool {
        self.piece.is_some() && !self.disabled
    }

    pub fn piece_id(&self) -> Option<&FragmentId> {
        self.piece.as_ref().map(|p| &p.id)
    }
}

/// Format a `YYYYMMDDHHMMSS` timestamp as `DD/MM/YYYY HH:MM`.
///
/// Missing hour or minute digits default to `00`. Inputs shorter than eight
/// characters or containing non-digits are returned unchanged.
pub fn format_event_date(raw: &str) -> String {
    if raw.len() < 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }

    let year = &raw[0..4];
    let month = &raw[4..6];
    let day = &raw[6..8];
    let hour = raw.get(8..10).unwrap_or("00");
    let minute = raw.get(10..12).unwrap_or("00");

    format!("{day}/{month}/{year} {hour}:{minute}")
}

/// Human-readable byte size (`"1.5 KB"`), base 1024, two decimals at most.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".into();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(label: Option<&str>) -> CandidatePiece {
        CandidatePiece {
            id: FragmentId::from("p1"),
            descriptor: "Petição".into(),
            kind: "PET".into(),
            mime_type: "application/pdf".into(),
            label: label.map(String::from),
            size: Some(2048),
            date: "20240110093000".into(),
        }
    }

    #[test]
    fn display_label_falls_back_to_descriptor() {
        assert_eq!(piece(None).display_label(), "Petição");
        assert_eq!(piece(Some("  ")).display_label(), "Petição");
        assert_eq!(piece(Some("INIC1")).display_label(), "INIC1");
    }

    #[test]
    fn formats_full_timestamp() {
        assert_eq!(format_event_date("20240110093015"), "10/01/2024 09:30");
    }

    #[test]
    fn formats_date_without_time() {
        assert_eq!(format_event_date("20240110"), "10/01/2024 00:00");
    }

    #[test]
    fn leaves_short_or_non_numeric_dates_alone() {
        assert_eq!(format_event_date("2024"), "2024");
        assert_eq!(format_event_date("10/01/2024"), "10/01/2024");
        assert_eq!(format_event_date(""), "");
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
    }

    #[test]
    fn placeholder_rows_are_not_selectable() {
        let row = CandidateRow {
            event_id: "2".into(),
            date: "20240101000000".into(),
            description: "Conclusos".into(),
            piece: None,
            checked: false,
            disabled: false,
        };
        assert!(row.is_placeholder());
        assert!(!row.is_selectable());
    }
}
