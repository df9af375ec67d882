//! Marker popup selection: viewing or editing a single marker.

use crate::geometry::{Marker, MarkerId, MarkerPatch};
use crate::storage::KeyValueStore;
use crate::store::AnnotationStore;

/// Which marker, if any, the popup surface is showing.
///
/// `Viewing` refers to the stored marker by id and always displays its
/// committed values. `Editing` owns a copy; changes to it stay local until
/// [`SelectionState::commit_edit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    None,
    Viewing(MarkerId),
    Editing(Marker),
}

impl SelectionState {
    /// Show `marker` read-only.
    pub fn view(&mut self, marker: &Marker) {
        *self = Self::Viewing(marker.id);
    }

    /// Start editing `marker`. Only allowed while viewing that same marker.
    ///
    /// Returns whether the transition happened.
    pub fn begin_edit(&mut self, marker: &Marker) -> bool {
        match *self {
            Self::Viewing(id) if id == marker.id => {
                *self = Self::Editing(marker.clone());
                true
            }
            _ => {
                log::debug!("Ignoring edit of marker {} from {:?}", marker.id, self);
                false
            }
        }
    }

    /// Apply `patch` to the edit copy. No effect unless editing.
    pub fn update_edit_draft(&mut self, patch: &MarkerPatch) {
        if let Self::Editing(draft) = self {
            patch.apply(draft);
        }
    }

    /// Write the edit copy to the store and go back to viewing it.
    ///
    /// Returns the committed marker, or `None` if nothing was being edited.
    pub fn commit_edit<S: KeyValueStore>(
        &mut self,
        store: &mut AnnotationStore<S>,
    ) -> Option<Marker> {
        let Self::Editing(draft) = self else {
            return None;
        };
        let draft = draft.clone();
        store.update_marker(draft.id, &draft);
        *self = Self::Viewing(draft.id);
        Some(draft)
    }

    /// Close the popup.
    pub fn cancel(&mut self) {
        *self = Self::None;
    }

    /// Delete marker `id` from the store and close the popup.
    pub fn delete_and_clear<S: KeyValueStore>(
        &mut self,
        store: &mut AnnotationStore<S>,
        id: MarkerId,
    ) {
        store.remove_marker(id);
        *self = Self::None;
    }

    /// Id of the marker being viewed or edited.
    pub fn marker_id(&self) -> Option<MarkerId> {
        match self {
            Self::None => None,
            Self::Viewing(id) => Some(*id),
            Self::Editing(draft) => Some(draft.id),
        }
    }

    /// Id of the marker being viewed, if in viewing state.
    pub fn viewing(&self) -> Option<MarkerId> {
        match self {
            Self::Viewing(id) => Some(*id),
            _ => None,
        }
    }

    /// The edit copy, if in editing state.
    pub fn edit_draft(&self) -> Option<&Marker> {
        match self {
            Self::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }
}
