//! Drafting state machine for Minuta.
//!
//! A document is built from candidate pieces of a case and from manually
//! written fragments, then submitted for generation:
//!
//! 1. **Candidates**: [`CandidateStore`] caches the movements of a process
//!    and owns the user's selection
//! 2. **Import**: [`ImportReconciler`] fetches selected pieces one by one
//!    and appends them to the [`DocumentAssembler`], never twice
//! 3. **Arrange**: [`ReorderEngine`] moves fragments within and between
//!    the imported and manual lists, keeping order numbers contiguous
//! 4. **Generate**: [`DraftSession`] submits the ordered fragments and
//!    keeps adjustment versions
//!
//! All state is owned by these values; nothing is global.

pub mod assembler;
pub mod candidates;
pub mod models;
pub mod reconciler;
pub mod reorder;
pub mod session;

pub use assembler::DocumentAssembler;
pub use candidates::{CandidateStore, LoadState, LoadTicket, PageInfo, SelectAllState};
pub use models::{ModelChoices, PromptChoices};
pub use reconciler::{
    ImportCandidate, ImportProgress, ImportReconciler, ImportReport, PiecePreview,
    Reconciliation, piece_body, reconcile_selection, sync_selection_from_assembler,
};
pub use reorder::{
    DropOutcome, DropPosition, FragmentBounds, GestureState, Placement, ReorderEngine,
};
pub use session::{DraftSession, GenerationForm, Version};
