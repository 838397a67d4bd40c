//! Reorder Engine: drag-and-drop moves between and within the fragment
//! lists.
//!
//! Pointer input is reduced to a small gesture state machine:
//!
//! ```text
//! Idle ──start──▶ Dragging ──hover──▶ Hovering(target, position)
//!                    ▲                HoveringEmpty(container)
//!                    └────────hover───────┘
//! any ──drop/cancel──▶ Idle
//! ```
//!
//! A drop resolves the gesture into a [`Placement`] and applies it to the
//! [`DocumentAssembler`]. Drops that no longer make sense (the source or
//! target vanished, no target, dropping onto itself) are absorbed and leave
//! the document unchanged.

use minuta_core::{FragmentId, Origin};
use tracing::debug;

use crate::assembler::DocumentAssembler;

/// Share of a fragment's height, from each edge, that picks a side.
const EDGE_FRACTION: f64 = 0.3;

/// Vertical extent of a rendered fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentBounds {
    pub top: f64,
    pub height: f64,
}

/// Which side of the hovered fragment the dragged one lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

impl DropPosition {
    /// `After` only strictly inside the bottom 30% of the fragment; the top
    /// 30%, the middle band and the 70% line itself all mean `Before`.
    pub fn from_pointer(bounds: FragmentBounds, pointer_y: f64) -> Self {
        if bounds.height <= 0.0 {
            return Self::Before;
        }
        let from_bottom = bounds.top + bounds.height - pointer_y;
        if from_bottom < bounds.height * EDGE_FRACTION {
            Self::After
        } else {
            Self::Before
        }
    }
}

/// Where a moved fragment goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Before(FragmentId),
    After(FragmentId),
    /// Append to the end of a container
    End(Origin),
}

/// Gesture state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        source: FragmentId,
    },
    Hovering {
        source: FragmentId,
        container: Origin,
        target: FragmentId,
        position: DropPosition,
    },
    HoveringEmpty {
        source: FragmentId,
        container: Origin,
    },
}

impl GestureState {
    /// The fragment being dragged, if any.
    pub fn source(&self) -> Option<&FragmentId> {
        match self {
            Self::Idle => None,
            Self::Dragging { source }
            | Self::Hovering { source, .. }
            | Self::HoveringEmpty { source, .. } => Some(source),
        }
    }
}

/// Result of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        id: FragmentId,
        from: Origin,
        to: Origin,
    },
    /// Nothing changed
    Ignored,
}

impl DropOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Why a drop was ignored.
#[derive(Debug, thiserror::Error)]
enum StaleGesture {
    #[error("no drop target")]
    NoTarget,

    #[error("dragged fragment {0} is gone")]
    MissingSource(FragmentId),

    #[error("target fragment {0} is gone")]
    MissingTarget(FragmentId),

    #[error("fragment {0} dropped onto itself")]
    SelfTarget(FragmentId),
}

/// Drag-and-drop state machine over a [`DocumentAssembler`].
#[derive(Debug, Default)]
pub struct ReorderEngine {
    state: GestureState,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Begin dragging `source`, replacing any gesture in progress.
    pub fn start(&mut self, source: FragmentId) {
        debug!(source = %source, "Drag started");
        self.state = GestureState::Dragging { source };
    }

    /// Pointer over a fragment of `container`.
    pub fn hover_fragment(
        &mut self,
        container: Origin,
        target: FragmentId,
        bounds: FragmentBounds,
        pointer_y: f64,
    ) {
        let Some(source) = self.state.source().cloned() else {
            return;
        };

        self.state = if source == target {
            GestureState::HoveringEmpty { source, container }
        } else {
            GestureState::Hovering {
                source,
                container,
                target,
                position: DropPosition::from_pointer(bounds, pointer_y),
            }
        };
    }

    /// Pointer over a container but not over any fragment: drop at its end.
    pub fn hover_container(&mut self, container: Origin) {
        let Some(source) = self.state.source().cloned() else {
            return;
        };
        self.state = GestureState::HoveringEmpty { source, container };
    }

    /// Pointer released outside both containers.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("Drag cancelled");
        }
        self.state = GestureState::Idle;
    }

    /// Finish the gesture. Always returns the engine to `Idle`.
    pub fn drop(&mut self, assembler: &mut DocumentAssembler) -> DropOutcome {
        let state = std::mem::take(&mut self.state);

        let resolved = match state {
            GestureState::Hovering {
                source,
                target,
                position,
                ..
            } => {
                let placement = match position {
                    DropPosition::Before => Placement::Before(target),
                    DropPosition::After => Placement::After(target),
                };
                Ok((source, placement))
            }
            GestureState::HoveringEmpty { source, container } => {
                Ok((source, Placement::End(container)))
            }
            GestureState::Dragging { .. } | GestureState::Idle => Err(StaleGesture::NoTarget),
        };

        match resolved.and_then(|(source, placement)| apply(assembler, source, placement)) {
            Ok(outcome) => outcome,
            Err(reason) => {
                debug!(%reason, "Drop ignored");
                DropOutcome::Ignored
            }
        }
    }

    /// Move a fragment without a pointer gesture.
    pub fn move_fragment(
        assembler: &mut DocumentAssembler,
        id: &FragmentId,
        placement: Placement,
    ) -> DropOutcome {
        apply(assembler, id.clone(), placement).unwrap_or_else(|reason| {
            debug!(%reason, "Move ignored");
            DropOutcome::Ignored
        })
    }
}

fn apply(
    assembler: &mut DocumentAssembler,
    source: FragmentId,
    placement: Placement,
) -> Result<DropOutcome, StaleGesture> {
    if let Placement::Before(target) | Placement::After(target) = &placement {
        if *target == source {
            return Err(StaleGesture::SelfTarget(source));
        }
        if !assembler.contains(target) {
            return Err(StaleGesture::MissingTarget(target.clone()));
        }
    }

    let Some(fragment) = assembler.take(&source) else {
        return Err(StaleGesture::MissingSource(source));
    };
    let from = fragment.origin;

    // Positions are looked up after removal so same-list moves land right.
    let (to, index) = match &placement {
        Placement::Before(target) | Placement::After(target) => {
            let Some((container, index)) = assembler.position(target) else {
                // Checked above; put the fragment back where it can be found.
                assembler.insert(from, usize::MAX, fragment);
                return Err(StaleGesture::MissingTarget(target.clone()));
            };
            let after = matches!(placement, Placement::After(_));
            (container, if after { index + 1 } else { index })
        }
        Placement::End(container) => (*container, assembler.list(*container).len()),
    };

    assembler.insert(to, index, fragment);
    debug!(id = %source, %from, %to, index, "Fragment moved");

    Ok(DropOutcome::Moved {
        id: source,
        from,
        to,
    })
}
