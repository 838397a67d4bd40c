//! Candidate Store: the cached movement list of one case.
//!
//! Holds the events fetched for the current process, presents them as
//! fixed-size pages of flattened rows, flips their order and owns the
//! selection set. Loading is split into [`CandidateStore::begin_load`] and
//! [`CandidateStore::finish_load`] so a front end can drive the fetch itself;
//! [`CandidateStore::load`] does both against a [`MovementSource`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use minuta_core::{
    CandidateEvent, CandidatePiece, CandidateRow, DraftError, DraftEvent, EventBus, FetchError,
    FragmentId, MovementRequest, MovementSource, ProcessNumber, Result,
};
use tracing::{debug, info, warn};

/// Where the store is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet (or cleared)
    Idle,
    /// A fetch is in flight
    Loading,
    /// Events with at least one piece are cached
    Populated,
    /// The fetch succeeded but no event had pieces
    Empty,
    /// The fetch failed; holds the error text
    Failed(String),
}

/// Proof that a load was started. Consumed by [`CandidateStore::finish_load`].
#[derive(Debug)]
pub struct LoadTicket {
    process: ProcessNumber,
}

impl LoadTicket {
    pub fn process(&self) -> &ProcessNumber {
        &self.process
    }

    /// The request to send to a [`MovementSource`].
    pub fn request(&self, system_id: &str) -> MovementRequest {
        MovementRequest {
            process: self.process.clone(),
            system_id: system_id.to_string(),
        }
    }
}

/// Position of a page within the flattened rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub page_count: usize,
    /// 1-based index of the first row on the page
    pub first: usize,
    /// 1-based index of the last row on the page
    pub last: usize,
    pub total: usize,
}

impl std::fmt::Display for PageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mostrando {}-{} de {}", self.first, self.last, self.total)
    }
}

/// State of a "select all" control over one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    Unchecked,
    Checked,
    Indeterminate,
}

/// Cached candidates of one process plus the user's selection.
pub struct CandidateStore {
    /// Court system identifier sent with each fetch
    system_id: String,

    /// Process the cache belongs to
    process: Option<ProcessNumber>,

    /// Events in display order
    events: Vec<CandidateEvent>,

    /// Whether `events` is the reverse of the fetch order
    is_reversed: bool,

    state: LoadState,

    /// 1-based page shown by the front end
    current_page: usize,

    /// Pieces chosen for import
    selection: HashSet<FragmentId>,

    /// Pieces already in the document
    disabled: HashSet<FragmentId>,

    event_bus: Option<Arc<EventBus>>,
}

impl CandidateStore {
    pub fn new(system_id: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            process: None,
            events: Vec::new(),
            is_reversed: false,
            state: LoadState::Idle,
            current_page: 1,
            selection: HashSet::new(),
            disabled: HashSet::new(),
            event_bus: None,
        }
    }

    /// Publish load events on the given bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn process(&self) -> Option<&ProcessNumber> {
        self.process.as_ref()
    }

    /// Events in the current display order.
    pub fn events(&self) -> &[CandidateEvent] {
        &self.events
    }

    pub fn is_reversed(&self) -> bool {
        self.is_reversed
    }

    pub fn is_populated(&self) -> bool {
        self.state == LoadState::Populated
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Start loading `process`.
    ///
    /// Returns `None` when that process is already loading or loaded. A
    /// different process discards the cached events and selection.
    pub fn begin_load(&mut self, process: &ProcessNumber) -> Option<LoadTicket> {
        if self.process.as_ref() == Some(process)
            && matches!(self.state, LoadState::Loading | LoadState::Populated)
        {
            debug!(process = %process, state = ?self.state, "Load skipped");
            return None;
        }

        if self.process.as_ref() != Some(process) {
            self.reset();
        }

        self.process = Some(process.clone());
        self.state = LoadState::Loading;
        debug!(process = %process, "Loading candidates");

        Some(LoadTicket {
            process: process.clone(),
        })
    }

    /// Apply the result of a fetch started with [`begin_load`](Self::begin_load).
    ///
    /// Tickets for a process that is no longer current are ignored.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<CandidateEvent>, FetchError>,
    ) -> Result<()> {
        if self.process.as_ref() != Some(&ticket.process) || self.state != LoadState::Loading {
            debug!(process = %ticket.process, "Ignoring stale load result");
            return Ok(());
        }

        let events = match result {
            Ok(events) => events,
            Err(e) => {
                warn!(process = %ticket.process, error = %e, "Failed to fetch movements");
                self.state = LoadState::Failed(e.to_string());
                self.publish(DraftEvent::ErrorOccurred {
                    context: "load_candidates".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e.into());
            }
        };

        if !events.iter().any(CandidateEvent::has_pieces) {
            info!(process = %ticket.process, events = events.len(), "No movement with pieces");
            self.events.clear();
            self.state = LoadState::Empty;
            return Err(DraftError::EmptyResult {
                process: ticket.process.display(),
            }
            .into());
        }

        self.events = events;
        self.is_reversed = false;
        // Most recent first
        self.reverse_events();
        self.is_reversed = true;
        self.current_page = 1;
        self.state = LoadState::Populated;

        let pieces: usize = self.events.iter().map(|e| e.pieces.len()).sum();
        info!(
            process = %ticket.process,
            events = self.events.len(),
            pieces,
            "Candidates loaded"
        );
        self.publish(DraftEvent::CandidatesLoaded {
            process: ticket.process.display(),
            events: self.events.len(),
            pieces,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Fetch and cache the movements of `process`.
    ///
    /// A no-op when the same process is already loaded.
    pub async fn load(
        &mut self,
        process: &ProcessNumber,
        source: &dyn MovementSource,
    ) -> Result<()> {
        let Some(ticket) = self.begin_load(process) else {
            return Ok(());
        };
        let result = source.fetch_movements(ticket.request(&self.system_id)).await;
        self.finish_load(ticket, result)
    }

    /// Discard everything and load `process` again.
    pub async fn reload(
        &mut self,
        process: &ProcessNumber,
        source: &dyn MovementSource,
    ) -> Result<()> {
        self.reset();
        self.load(process, source).await
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        self.process = None;
        self.events.clear();
        self.is_reversed = false;
        self.state = LoadState::Idle;
        self.current_page = 1;
        self.selection.clear();
        self.disabled.clear();
    }

    // ── Pages ────────────────────────────────────────────────────────────

    fn row_iter(&self) -> impl Iterator<Item = CandidateRow> + '_ {
        self.events.iter().flat_map(move |event| {
            let rows: Vec<CandidateRow> = if event.pieces.is_empty() {
                vec![CandidateRow {
                    event_id: event.event_id.clone(),
                    date: event.date.clone(),
                    description: event.description.clone(),
                    piece: None,
                    checked: false,
                    disabled: false,
                }]
            } else {
                event
                    .pieces
                    .iter()
                    .map(|piece| CandidateRow {
                        event_id: event.event_id.clone(),
                        date: event.date.clone(),
                        description: event.description.clone(),
                        piece: Some(piece.clone()),
                        checked: self.selection.contains(&piece.id),
                        disabled: self.disabled.contains(&piece.id),
                    })
                    .collect()
            };
            rows
        })
    }

    /// Number of flattened rows: one per piece, one per event without pieces.
    pub fn row_count(&self) -> usize {
        self.events.iter().map(|e| e.pieces.len().max(1)).sum()
    }

    /// All rows in display order.
    pub fn rows(&self) -> Vec<CandidateRow> {
        self.row_iter().collect()
    }

    /// Rows of 1-based page `n`. Empty when `n` or `page_size` is zero or
    /// `n` is past the last page.
    pub fn page(&self, n: usize, page_size: usize) -> Vec<CandidateRow> {
        if n == 0 || page_size == 0 {
            return Vec::new();
        }
        let start = (n - 1).saturating_mul(page_size);
        self.row_iter().skip(start).take(page_size).collect()
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.row_count().div_ceil(page_size)
    }

    /// Where page `n` sits in the rows; `None` for an empty page.
    pub fn page_info(&self, n: usize, page_size: usize) -> Option<PageInfo> {
        let page_count = self.page_count(page_size);
        if n == 0 || n > page_count {
            return None;
        }
        let total = self.row_count();
        let first = (n - 1) * page_size + 1;
        let last = (n * page_size).min(total);
        Some(PageInfo {
            page: n,
            page_count,
            first,
            last,
            total,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Rows of the current page.
    pub fn current_rows(&self, page_size: usize) -> Vec<CandidateRow> {
        self.page(self.current_page, page_size)
    }

    /// Jump to page `n` if it exists.
    pub fn set_page(&mut self, n: usize, page_size: usize) -> bool {
        if n == 0 || n > self.page_count(page_size) {
            return false;
        }
        self.current_page = n;
        true
    }

    pub fn next_page(&mut self, page_size: usize) -> bool {
        self.set_page(self.current_page + 1, page_size)
    }

    pub fn previous_page(&mut self, page_size: usize) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.set_page(self.current_page - 1, page_size)
    }

    // ── Order ────────────────────────────────────────────────────────────

    fn reverse_events(&mut self) {
        self.events.reverse();
        for event in &mut self.events {
            event.pieces.reverse();
        }
    }

    /// Reverse the events and the pieces within each event.
    pub fn toggle_order(&mut self) {
        if self.events.is_empty() {
            return;
        }
        self.reverse_events();
        self.is_reversed = !self.is_reversed;
        debug!(reversed = self.is_reversed, "Candidate order toggled");
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    /// A piece and the event holding it.
    pub fn find_piece(&self, id: &FragmentId) -> Option<(&CandidateEvent, &CandidatePiece)> {
        self.pieces().find(|(_, piece)| &piece.id == id)
    }

    /// Every piece with its event, in display order.
    pub fn pieces(&self) -> impl Iterator<Item = (&CandidateEvent, &CandidatePiece)> {
        self.events
            .iter()
            .flat_map(|event| event.pieces.iter().map(move |piece| (event, piece)))
    }

    pub fn is_known(&self, id: &FragmentId) -> bool {
        self.find_piece(id).is_some()
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Add a known, enabled piece to the selection.
    pub fn select(&mut self, id: &FragmentId) -> bool {
        if self.disabled.contains(id) || !self.is_known(id) {
            return false;
        }
        self.selection.insert(id.clone())
    }

    pub fn deselect(&mut self, id: &FragmentId) -> bool {
        if self.disabled.contains(id) {
            return false;
        }
        self.selection.remove(id)
    }

    /// Flip a piece's selection. Returns whether anything changed.
    pub fn toggle(&mut self, id: &FragmentId) -> bool {
        if self.selection.contains(id) {
            self.deselect(id)
        } else {
            self.select(id)
        }
    }

    fn enabled_ids<'a>(&'a self, rows: &'a [CandidateRow]) -> impl Iterator<Item = &'a FragmentId> {
        rows.iter()
            .filter(|row| row.is_selectable())
            .filter_map(CandidateRow::piece_id)
            .filter(move |id| !self.disabled.contains(*id))
    }

    /// Select every enabled piece on `rows`. Returns how many were added.
    pub fn select_all(&mut self, rows: &[CandidateRow]) -> usize {
        let ids: Vec<FragmentId> = self.enabled_ids(rows).cloned().collect();
        ids.into_iter().filter(|id| self.select(id)).count()
    }

    /// Deselect every enabled piece on `rows`. Returns how many were removed.
    pub fn deselect_all(&mut self, rows: &[CandidateRow]) -> usize {
        let ids: Vec<FragmentId> = self.enabled_ids(rows).cloned().collect();
        ids.into_iter().filter(|id| self.deselect(id)).count()
    }

    pub fn select_all_state(&self, rows: &[CandidateRow]) -> SelectAllState {
        let (enabled, checked) =
            self.enabled_ids(rows)
                .fold((0usize, 0usize), |(enabled, checked), id| {
                    (enabled + 1, checked + usize::from(self.selection.contains(id)))
                });

        match checked {
            0 => SelectAllState::Unchecked,
            n if n == enabled => SelectAllState::Checked,
            _ => SelectAllState::Indeterminate,
        }
    }

    pub fn is_selected(&self, id: &FragmentId) -> bool {
        self.selection.contains(id)
    }

    pub fn selection(&self) -> &HashSet<FragmentId> {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        self.selection.clear();
    }

    pub(crate) fn replace_selection(&mut self, ids: HashSet<FragmentId>) {
        self.selection = ids;
    }

    // ── Disabled pieces ──────────────────────────────────────────────────

    pub fn is_disabled(&self, id: &FragmentId) -> bool {
        self.disabled.contains(id)
    }

    /// Mark pieces as part of the document.
    pub fn mark_disabled<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = FragmentId>,
    {
        self.disabled.extend(ids);
    }

    /// Make a piece importable again.
    pub fn release(&mut self, id: &FragmentId) -> bool {
        self.disabled.remove(id)
    }

    pub(crate) fn replace_disabled(&mut self, ids: HashSet<FragmentId>) {
        self.disabled = ids;
    }

    fn publish(&self, event: DraftEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use minuta_core::Error;
    use std::sync::Mutex;

    pub(crate) fn piece(id: &str, descriptor: &str) -> CandidatePiece {
        CandidatePiece {
            id: FragmentId::from(id),
            descriptor: descriptor.into(),
            kind: "DOC".into(),
            mime_type: "application/pdf".into(),
            label: None,
            size: Some(1024),
            date: "20240110093000".into(),
        }
    }

    pub(crate) fn event(id: &str, date: &str, pieces: Vec<CandidatePiece>) -> CandidateEvent {
        CandidateEvent {
            event_id: id.into(),
            date: date.into(),
            description: format!("Evento {id}"),
            pieces,
        }
    }

    pub(crate) fn process() -> ProcessNumber {
        ProcessNumber::parse("0000001-00.2024.0.00.0000").unwrap()
    }

    /// Two events, the first with "Petição", the second empty.
    pub(crate) fn petition_events() -> Vec<CandidateEvent> {
        vec![
            event("1", "20240110093000", vec![piece("p1", "Petição")]),
            event("2", "20240215140000", vec![]),
        ]
    }

    /// Returns the same result for every call.
    pub(crate) struct StaticMovements {
        result: std::result::Result<Vec<CandidateEvent>, FetchError>,
        calls: Mutex<usize>,
    }

    impl StaticMovements {
        pub(crate) fn ok(events: Vec<CandidateEvent>) -> Self {
            Self {
                result: Ok(events),
                calls: Mutex::new(0),
            }
        }

        pub(crate) fn failing(error: FetchError) -> Self {
            Self {
                result: Err(error),
                calls: Mutex::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl MovementSource for StaticMovements {
        async fn fetch_movements(
            &self,
            _request: MovementRequest,
        ) -> std::result::Result<Vec<CandidateEvent>, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.result.clone()
        }
    }

    pub(crate) async fn loaded_store(events: Vec<CandidateEvent>) -> CandidateStore {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        store
            .load(&process(), &StaticMovements::ok(events))
            .await
            .unwrap();
        store
    }

    fn piece_ids(store: &CandidateStore) -> Vec<String> {
        store.pieces().map(|(_, p)| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn load_flattens_events_into_rows() {
        let store = loaded_store(petition_events()).await;

        assert!(store.is_populated());
        assert!(store.is_reversed());

        let rows = store.page(1, 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().filter(|r| r.is_selectable()).count(), 1);
        assert_eq!(rows.iter().filter(|r| r.is_placeholder()).count(), 1);

        let selectable = rows.iter().find(|r| r.is_selectable()).unwrap();
        assert_eq!(selectable.piece.as_ref().unwrap().descriptor, "Petição");
    }

    #[tokio::test]
    async fn load_shows_most_recent_first() {
        let store = loaded_store(vec![
            event("1", "20240101000000", vec![piece("a", "A"), piece("b", "B")]),
            event("2", "20240201000000", vec![piece("c", "C")]),
        ])
        .await;

        assert_eq!(store.events()[0].event_id, "2");
        assert_eq!(piece_ids(&store), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn second_load_of_same_process_is_noop() {
        let source = StaticMovements::ok(petition_events());
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");

        store.load(&process(), &source).await.unwrap();
        store.select(&FragmentId::from("p1"));
        store.load(&process(), &source).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert!(store.is_selected(&FragmentId::from("p1")));
    }

    #[tokio::test]
    async fn loading_another_process_discards_cache() {
        let mut store = loaded_store(petition_events()).await;
        store.select(&FragmentId::from("p1"));

        let other = ProcessNumber::parse("5000123-45.2023.4.02.5101").unwrap();
        let source = StaticMovements::ok(vec![event("9", "20230101", vec![piece("x", "X")])]);
        store.load(&other, &source).await.unwrap();

        assert_eq!(store.process(), Some(&other));
        assert_eq!(piece_ids(&store), vec!["x"]);
        assert_eq!(store.selected_count(), 0);
    }

    #[tokio::test]
    async fn reload_fetches_again() {
        let source = StaticMovements::ok(petition_events());
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        store.load(&process(), &source).await.unwrap();
        store.select(&FragmentId::from("p1"));

        store.reload(&process(), &source).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(store.selected_count(), 0);
        assert!(store.is_populated());
    }

    #[tokio::test]
    async fn no_pieces_is_empty_not_failed() {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        let source = StaticMovements::ok(vec![event("1", "20240101", vec![])]);

        let err = store.load(&process(), &source).await.unwrap_err();

        assert!(matches!(err, Error::Draft(DraftError::EmptyResult { .. })));
        assert_eq!(store.state(), &LoadState::Empty);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_marks_store_failed() {
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let mut store = CandidateStore::new("br.jus.jfrj.eproc").with_event_bus(bus);
        let source = StaticMovements::failing(FetchError::Rejected("Processo não encontrado".into()));

        let err = store.load(&process(), &source).await.unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::Rejected(_))));
        assert_eq!(
            store.state(),
            &LoadState::Failed("Processo não encontrado".into())
        );
        assert!(matches!(
            rx.recv().await.unwrap().as_ref(),
            DraftEvent::ErrorOccurred { .. }
        ));
    }

    #[tokio::test]
    async fn failed_load_can_be_retried() {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        let failing = StaticMovements::failing(FetchError::Network("timeout".into()));
        assert!(store.load(&process(), &failing).await.is_err());

        store
            .load(&process(), &StaticMovements::ok(petition_events()))
            .await
            .unwrap();
        assert!(store.is_populated());
    }

    #[test]
    fn begin_load_is_not_reentrant() {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        let ticket = store.begin_load(&process());
        assert!(ticket.is_some());
        assert_eq!(store.state(), &LoadState::Loading);
        assert!(store.begin_load(&process()).is_none());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        let stale = store.begin_load(&process()).unwrap();

        let other = ProcessNumber::parse("5000123-45.2023.4.02.5101").unwrap();
        let current = store.begin_load(&other).unwrap();
        assert_eq!(current.request("sys").system_id, "sys");

        store.finish_load(stale, Ok(petition_events())).unwrap();
        assert_eq!(store.state(), &LoadState::Loading);
        assert!(store.events().is_empty());

        store
            .finish_load(current, Ok(vec![event("9", "20230101", vec![piece("x", "X")])]))
            .unwrap();
        assert!(store.is_populated());
        assert_eq!(piece_ids(&store), vec!["x"]);
    }

    #[tokio::test]
    async fn toggle_order_is_an_involution() {
        let mut store = loaded_store(vec![
            event("1", "20240101", vec![piece("a", "A"), piece("b", "B")]),
            event("2", "20240201", vec![]),
            event("3", "20240301", vec![piece("c", "C"), piece("d", "D")]),
        ])
        .await;
        let before = store.events().to_vec();

        store.toggle_order();
        assert!(!store.is_reversed());
        assert_eq!(piece_ids(&store), vec!["a", "b", "c", "d"]);

        store.toggle_order();
        assert!(store.is_reversed());
        assert_eq!(store.events(), before.as_slice());
    }

    #[test]
    fn toggle_order_on_empty_store_does_nothing() {
        let mut store = CandidateStore::new("br.jus.jfrj.eproc");
        store.toggle_order();
        assert!(!store.is_reversed());
    }

    #[tokio::test]
    async fn pagination_slices_flattened_rows() {
        let pieces = (1..=23).map(|i| piece(&format!("p{i}"), "Doc")).collect();
        let store = loaded_store(vec![event("1", "20240101", pieces)]).await;

        assert_eq!(store.page_count(10), 3);
        assert_eq!(store.page(1, 10).len(), 10);
        assert_eq!(store.page(3, 10).len(), 3);
        assert!(store.page(4, 10).is_empty());
        assert!(store.page(0, 10).is_empty());
        assert!(store.page(1, 0).is_empty());

        let info = store.page_info(3, 10).unwrap();
        assert_eq!((info.first, info.last, info.total), (21, 23, 23));
        assert_eq!(info.to_string(), "Mostrando 21-23 de 23");
        assert!(store.page_info(4, 10).is_none());
    }

    #[tokio::test]
    async fn page_navigation_is_clamped() {
        let pieces = (1..=15).map(|i| piece(&format!("p{i}"), "Doc")).collect();
        let mut store = loaded_store(vec![event("1", "20240101", pieces)]).await;

        assert!(!store.previous_page(10));
        assert!(store.next_page(10));
        assert_eq!(store.current_page(), 2);
        assert!(!store.next_page(10));
        assert_eq!(store.current_rows(10).len(), 5);
        assert!(store.previous_page(10));
        assert_eq!(store.current_page(), 1);
    }

    #[tokio::test]
    async fn selection_survives_pagination() {
        let pieces = (1..=15).map(|i| piece(&format!("p{i}"), "Doc")).collect();
        let mut store = loaded_store(vec![event("1", "20240101", pieces)]).await;

        let first = store.page(1, 10);
        assert_eq!(store.select_all(&first), 10);
        store.next_page(10);

        assert_eq!(store.selected_count(), 10);
        assert_eq!(
            store.select_all_state(&store.current_rows(10)),
            SelectAllState::Unchecked
        );
        assert_eq!(store.select_all_state(&first), SelectAllState::Checked);
    }

    #[tokio::test]
    async fn unknown_and_disabled_pieces_cannot_be_selected() {
        let mut store = loaded_store(vec![event(
            "1",
            "20240101",
            vec![piece("a", "A"), piece("b", "B")],
        )])
        .await;

        assert!(!store.select(&FragmentId::from("nope")));
        store.mark_disabled([FragmentId::from("a")]);
        assert!(!store.select(&FragmentId::from("a")));
        assert!(store.toggle(&FragmentId::from("b")));
        assert!(store.is_selected(&FragmentId::from("b")));
        assert!(store.toggle(&FragmentId::from("b")));
        assert!(!store.is_selected(&FragmentId::from("b")));

        assert!(store.release(&FragmentId::from("a")));
        assert!(store.select(&FragmentId::from("a")));
    }

    #[tokio::test]
    async fn select_all_skips_disabled_rows() {
        let mut store = loaded_store(vec![
            event("1", "20240101", vec![piece("a", "A"), piece("b", "B")]),
            event("2", "20240102", vec![]),
        ])
        .await;
        store.mark_disabled([FragmentId::from("a")]);

        let rows = store.page(1, 10);
        assert!(rows.iter().any(|r| r.disabled));
        assert_eq!(store.select_all(&rows), 1);
        assert_eq!(store.select_all_state(&rows), SelectAllState::Checked);
        assert!(!store.is_selected(&FragmentId::from("a")));

        assert_eq!(store.deselect_all(&rows), 1);
        assert_eq!(store.selected_count(), 0);
    }

    #[tokio::test]
    async fn partial_selection_is_indeterminate() {
        let mut store = loaded_store(vec![event(
            "1",
            "20240101",
            vec![piece("a", "A"), piece("b", "B")],
        )])
        .await;
        store.select(&FragmentId::from("a"));

        let rows = store.page(1, 10);
        assert_eq!(store.select_all_state(&rows), SelectAllState::Indeterminate);
        assert!(rows.iter().any(|r| r.checked));

        store.clear();
        assert_eq!(store.select_all_state(&rows), SelectAllState::Unchecked);
    }

    #[tokio::test]
    async fn load_publishes_event() {
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let mut store = CandidateStore::new("br.jus.jfrj.eproc").with_event_bus(bus);

        store
            .load(&process(), &StaticMovements::ok(petition_events()))
            .await
            .unwrap();

        match rx.recv().await.unwrap().as_ref() {
            DraftEvent::CandidatesLoaded {
                process,
                events,
                pieces,
                ..
            } => {
                assert_eq!(process, "0000001-00.2024.0.00.0000");
                assert_eq!(*events, 2);
                assert_eq!(*pieces, 1);
            }
            other => panic!("Expected CandidatesLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn find_piece_returns_parent_event() {
        let store = loaded_store(petition_events()).await;
        let (event, piece) = store.find_piece(&FragmentId::from("p1")).unwrap();
        assert_eq!(event.event_id, "1");
        assert_eq!(piece.descriptor, "Petição");
    }
}
