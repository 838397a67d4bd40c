//! Document Assembler: the two ordered fragment lists of a document.
//!
//! Imported fragments come first, then manual ones. Order numbers are global
//! over that sequence and are recomputed after every structural change, so
//! they are always exactly `1..=len()`.

use minuta_core::{DraftError, Fragment, FragmentId, ImportedPiece, Origin};
use tracing::debug;

/// Placeholder for fragments without a label in the order preview.
const UNTITLED: &str = "(sem título)";

/// The imported and manual fragment lists.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    imported: Vec<Fragment>,
    manual: Vec<Fragment>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty manual fragment.
    pub fn add_manual(&mut self) -> &Fragment {
        let fragment = Fragment::manual();
        debug!(id = %fragment.id, "Adding manual fragment");

        let index = self.manual.len();
        self.manual.push(fragment);
        self.renumber();
        &self.manual[index]
    }

    /// Append an imported fragment.
    ///
    /// Fails with [`DraftError::DuplicateFragment`] when the id is already in
    /// either list; the existing fragment is left untouched.
    pub fn add_imported(&mut self, piece: ImportedPiece) -> Result<&Fragment, DraftError> {
        if self.contains(&piece.id) {
            return Err(DraftError::DuplicateFragment {
                id: piece.id.to_string(),
            });
        }
        debug!(id = %piece.id, label = %piece.label, "Adding imported fragment");

        let index = self.imported.len();
        self.imported.push(Fragment::imported(piece));
        self.renumber();
        Ok(&self.imported[index])
    }

    /// Remove a fragment from whichever list holds it.
    pub fn remove(&mut self, id: &FragmentId) -> Option<Fragment> {
        let fragment = self.take(id)?;
        debug!(id = %id, origin = %fragment.origin, "Removed fragment");
        self.renumber();
        Some(fragment)
    }

    pub fn set_label(&mut self, id: &FragmentId, label: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(fragment) => {
                fragment.label = label.into();
                true
            }
            None => false,
        }
    }

    pub fn set_content(&mut self, id: &FragmentId, content: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(fragment) => {
                fragment.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Recompute order numbers: imported `1..=k`, manual `k+1..=N`.
    pub fn renumber(&mut self) {
        for (index, fragment) in self
            .imported
            .iter_mut()
            .chain(self.manual.iter_mut())
            .enumerate()
        {
            fragment.order = index + 1;
        }
    }

    /// Fragments sorted by order, as they are submitted for generation.
    pub fn submission_sequence(&self) -> Result<Vec<Fragment>, DraftError> {
        let mut fragments: Vec<Fragment> = self.iter().cloned().collect();
        fragments.sort_by_key(|f| f.order);

        if let Some(pair) = fragments.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(DraftError::OrderConflict {
                order: pair[0].order,
            });
        }
        Ok(fragments)
    }

    /// One line per fragment: `"1. label (Importada do Eproc)"`.
    pub fn order_preview(&self) -> Result<Vec<String>, DraftError> {
        Ok(self
            .submission_sequence()?
            .iter()
            .map(|f| {
                let label = if f.label.trim().is_empty() {
                    UNTITLED
                } else {
                    f.label.as_str()
                };
                format!("{}. {} ({})", f.order, label, f.badge())
            })
            .collect())
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn imported(&self) -> &[Fragment] {
        &self.imported
    }

    pub fn manual(&self) -> &[Fragment] {
        &self.manual
    }

    /// Fragments of one container.
    pub fn list(&self, container: Origin) -> &[Fragment] {
        match container {
            Origin::Imported => &self.imported,
            Origin::Manual => &self.manual,
        }
    }

    /// All fragments, imported first.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.imported.iter().chain(self.manual.iter())
    }

    pub fn get(&self, id: &FragmentId) -> Option<&Fragment> {
        self.iter().find(|f| &f.id == id)
    }

    pub fn contains(&self, id: &FragmentId) -> bool {
        self.get(id).is_some()
    }

    /// The container holding `id`.
    pub fn container_of(&self, id: &FragmentId) -> Option<Origin> {
        self.position(id).map(|(container, _)| container)
    }

    pub fn ids(&self) -> Vec<FragmentId> {
        self.iter().map(|f| f.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.imported.len() + self.manual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty() && self.manual.is_empty()
    }

    // ── Structural helpers for the reorder engine ────────────────────────

    fn get_mut(&mut self, id: &FragmentId) -> Option<&mut Fragment> {
        self.imported
            .iter_mut()
            .chain(self.manual.iter_mut())
            .find(|f| &f.id == id)
    }

    fn list_mut(&mut self, container: Origin) -> &mut Vec<Fragment> {
        match container {
            Origin::Imported => &mut self.imported,
            Origin::Manual => &mut self.manual,
        }
    }

    /// Container and index of `id`.
    pub(crate) fn position(&self, id: &FragmentId) -> Option<(Origin, usize)> {
        [Origin::Imported, Origin::Manual]
            .into_iter()
            .find_map(|container| {
                self.list(container)
                    .iter()
                    .position(|f| &f.id == id)
                    .map(|index| (container, index))
            })
    }

    /// Remove without renumbering.
    pub(crate) fn take(&mut self, id: &FragmentId) -> Option<Fragment> {
        let (container, index) = self.position(id)?;
        Some(self.list_mut(container).remove(index))
    }

    /// Insert into `container` at `index` (clamped), adopting the container's
    /// origin, then renumber.
    pub(crate) fn insert(&mut self, container: Origin, index: usize, mut fragment: Fragment) {
        fragment.origin = container;
        let list = self.list_mut(container);
        let index = index.min(list.len());
        list.insert(index, fragment);
        self.renumber();
    }
}
