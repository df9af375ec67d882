//! Top-level interaction state machine.
//!
//! All map clicks and user commands enter here. The controller decides what
//! a click means from the current [`Mode`] and dispatches into the store,
//! the draft polygon and the selection.

use crate::command::{Command, Outcome};
use crate::config::AnnotationConfig;
use crate::error::AnnotationResult;
use crate::geometry::{Marker, MarkerId, MarkerPatch, Polygon};
use crate::selection::SelectionState;
use crate::storage::KeyValueStore;
use crate::store::AnnotationStore;
use serde::{Deserialize, Serialize};

/// How the next map click is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Clicks add vertices to the draft polygon.
    #[default]
    Idle,
    /// The next click places a marker, then the mode returns to `Idle`.
    AddingMarker,
}

/// Owns the annotation state and routes every user event into it.
#[derive(Debug)]
pub struct InteractionController<S: KeyValueStore> {
    mode: Mode,
    store: AnnotationStore<S>,
    selection: SelectionState,
    config: AnnotationConfig,
}

impl<S: KeyValueStore> InteractionController<S> {
    /// Create a controller over `storage`, loading persisted annotations.
    pub fn new(storage: S, config: AnnotationConfig) -> Self {
        Self::with_store(AnnotationStore::open(storage), config)
    }

    pub fn with_store(store: AnnotationStore<S>, config: AnnotationConfig) -> Self {
        Self {
            mode: Mode::Idle,
            store,
            selection: SelectionState::None,
            config,
        }
    }

    /// Arm marker placement for the next click.
    pub fn request_add_marker(&mut self) -> Outcome {
        match self.mode {
            Mode::Idle => {
                self.mode = Mode::AddingMarker;
                log::debug!("Mode: Idle -> AddingMarker");
                Outcome::AwaitingMarkerPosition
            }
            Mode::AddingMarker => Outcome::Unchanged,
        }
    }

    /// Disarm marker placement.
    pub fn cancel_add_marker(&mut self) -> Outcome {
        match self.mode {
            Mode::AddingMarker => {
                self.mode = Mode::Idle;
                log::debug!("Mode: AddingMarker -> Idle (cancelled)");
                Outcome::AddMarkerCancelled
            }
            Mode::Idle => Outcome::Unchanged,
        }
    }

    /// Handle a click on the map.
    ///
    /// A click with a non-finite coordinate is dropped and leaves the mode
    /// as it was.
    pub fn on_map_click(&mut self, longitude: f64, latitude: f64) -> Outcome {
        match self.mode {
            Mode::AddingMarker => {
                let added = self.store.add_marker(
                    longitude,
                    latitude,
                    self.config.default_title.clone(),
                    self.config.default_image.clone(),
                );
                match added {
                    Ok(marker) => {
                        self.mode = Mode::Idle;
                        log::debug!("Mode: AddingMarker -> Idle (placed marker {})", marker.id);
                        Outcome::MarkerAdded(marker)
                    }
                    Err(e) => {
                        log::warn!("Ignoring map click: {}", e);
                        Outcome::Unchanged
                    }
                }
            }
            Mode::Idle => {
                let draft = self.store.draft_mut();
                match draft.add_point(longitude, latitude) {
                    Ok(()) => Outcome::DraftPointAdded {
                        points: draft.len(),
                    },
                    Err(e) => {
                        log::warn!("Ignoring map click: {}", e);
                        Outcome::Unchanged
                    }
                }
            }
        }
    }

    /// Save the draft as a polygon.
    pub fn save_draft_polygon(&mut self) -> AnnotationResult<Polygon> {
        self.store.commit_draft()
    }

    /// Discard the draft.
    pub fn clear_draft_polygon(&mut self) {
        self.store.clear_draft();
    }

    /// Delete the saved polygon at `index`. Out-of-range indices are ignored.
    pub fn remove_polygon(&mut self, index: usize) -> Outcome {
        match self.store.remove_polygon(index) {
            Some(polygon) => Outcome::PolygonRemoved(polygon),
            None => {
                log::debug!("Remove of unknown polygon {}", index);
                Outcome::Unchanged
            }
        }
    }

    /// Delete every saved polygon, keeping the draft.
    pub fn clear_polygons(&mut self) -> Outcome {
        self.store.clear_polygons();
        Outcome::PolygonsCleared
    }

    /// Open the popup for marker `id`. Unknown ids are ignored.
    pub fn select_marker(&mut self, id: MarkerId) -> Outcome {
        match self.store.marker(id) {
            Some(marker) => {
                self.selection.view(marker);
                Outcome::Viewing(id)
            }
            None => {
                log::debug!("Select of unknown marker {}", id);
                Outcome::Unchanged
            }
        }
    }

    /// Switch the open popup from viewing to editing.
    pub fn start_edit_marker(&mut self) -> Outcome {
        let Some(marker) = self.selection.viewing().and_then(|id| self.store.marker(id)) else {
            return Outcome::Unchanged;
        };
        let id = marker.id;
        if self.selection.begin_edit(marker) {
            Outcome::Editing(id)
        } else {
            Outcome::Unchanged
        }
    }

    /// Change a field of the edit copy.
    pub fn update_edit(&mut self, patch: &MarkerPatch) -> Outcome {
        if !self.selection.is_editing() {
            return Outcome::Unchanged;
        }
        self.selection.update_edit_draft(patch);
        Outcome::EditUpdated
    }

    /// Commit the edit copy.
    pub fn save_edit(&mut self) -> Outcome {
        match self.selection.commit_edit(&mut self.store) {
            Some(marker) => Outcome::MarkerUpdated(marker),
            None => Outcome::Unchanged,
        }
    }

    /// Delete marker `id` and close the popup.
    pub fn delete_marker(&mut self, id: MarkerId) -> Outcome {
        self.selection.delete_and_clear(&mut self.store, id);
        Outcome::MarkerDeleted(id)
    }

    /// Close the popup, discarding any uncommitted edit.
    pub fn close_popup(&mut self) -> Outcome {
        if self.selection == SelectionState::None {
            return Outcome::Unchanged;
        }
        self.selection.cancel();
        Outcome::PopupClosed
    }

    /// Dispatch a user command.
    ///
    /// The only failure is saving a draft with too few points; the draft is
    /// kept so the caller can show a notice and let the user continue.
    pub fn handle(&mut self, command: Command) -> AnnotationResult<Outcome> {
        let outcome = match command {
            Command::MapClick { longitude, latitude } => self.on_map_click(longitude, latitude),
            Command::StartAddMarker => self.request_add_marker(),
            Command::CancelAddMarker => self.cancel_add_marker(),
            Command::ClearDraftPolygon => {
                self.clear_draft_polygon();
                Outcome::DraftCleared
            }
            Command::SaveDraftPolygon => Outcome::PolygonSaved(self.save_draft_polygon()?),
            Command::RemovePolygon { index } => self.remove_polygon(index),
            Command::ClearPolygons => self.clear_polygons(),
            Command::UndoDraftPoint => {
                let draft = self.store.draft_mut();
                match draft.undo_last_point() {
                    Some(_) => Outcome::DraftPointRemoved {
                        points: draft.len(),
                    },
                    None => Outcome::Unchanged,
                }
            }
            Command::SelectMarker { id } => self.select_marker(id),
            Command::StartEditMarker => self.start_edit_marker(),
            Command::UpdateEditField { field, value } => self.update_edit(&field.patch(value)),
            Command::SaveEdit => self.save_edit(),
            Command::DeleteMarker { id } => self.delete_marker(id),
            Command::ClosePopup => self.close_popup(),
        };
        Ok(outcome)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &AnnotationStore<S> {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Marker shown in the popup with the values the popup should display:
    /// the stored marker while viewing, the edit copy while editing.
    pub fn popup_marker(&self) -> Option<&Marker> {
        match &self.selection {
            SelectionState::None => None,
            SelectionState::Viewing(id) => self.store.marker(*id),
            SelectionState::Editing(draft) => Some(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::EditField;
    use crate::error::AnnotationError;
    use crate::geometry::GeoPoint;
    use crate::storage::{MemoryStorage, POLYGONS_KEY};

    fn controller() -> InteractionController<MemoryStorage> {
        InteractionController::new(MemoryStorage::new(), AnnotationConfig::default())
    }

    #[test]
    fn test_request_add_marker_is_idempotent() {
        let mut c = controller();
        assert_eq!(c.request_add_marker(), Outcome::AwaitingMarkerPosition);
        assert_eq!(c.request_add_marker(), Outcome::Unchanged);
        assert_eq!(c.mode(), Mode::AddingMarker);
    }

    #[test]
    fn test_click_in_adding_mode_places_marker_and_returns_to_idle() {
        let mut c = controller();
        c.request_add_marker();

        let Outcome::MarkerAdded(marker) = c.on_map_click(100.5, 13.7) else {
            panic!("expected a marker");
        };

        assert_eq!(c.mode(), Mode::Idle);
        assert_eq!(marker.longitude, 100.5);
        assert_eq!(marker.latitude, 13.7);
        assert_eq!(marker.title, "New Location");
        assert_eq!(marker.image, "https://via.placeholder.com/150");
        assert!(c.store().draft().is_empty());
    }

    #[test]
    fn test_click_in_idle_adds_draft_point() {
        let mut c = controller();
        assert_eq!(
            c.on_map_click(1.0, 2.0),
            Outcome::DraftPointAdded { points: 1 }
        );
        assert_eq!(
            c.on_map_click(3.0, 4.0),
            Outcome::DraftPointAdded { points: 2 }
        );
        assert!(c.store().markers().is_empty());
        assert_eq!(c.store().draft().points()[1], GeoPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_cancel_add_marker() {
        let mut c = controller();
        assert_eq!(c.cancel_add_marker(), Outcome::Unchanged);
        c.request_add_marker();
        assert_eq!(c.cancel_add_marker(), Outcome::AddMarkerCancelled);
        assert_eq!(
            c.on_map_click(0.0, 0.0),
            Outcome::DraftPointAdded { points: 1 }
        );
    }

    #[test]
    fn test_custom_defaults_from_config() {
        let config = AnnotationConfig {
            default_title: "Pin".to_string(),
            default_image: "pin.png".to_string(),
            ..Default::default()
        };
        let mut c = InteractionController::new(MemoryStorage::new(), config);
        c.request_add_marker();

        let Outcome::MarkerAdded(marker) = c.on_map_click(0.0, 0.0) else {
            panic!("expected a marker");
        };
        assert_eq!(marker.title, "Pin");
        assert_eq!(marker.image, "pin.png");
    }

    #[test]
    fn test_save_draft_with_too_few_points_is_error() {
        let mut c = controller();
        c.on_map_click(0.0, 0.0);

        let result = c.handle(Command::SaveDraftPolygon);

        assert_eq!(
            result,
            Err(AnnotationError::InsufficientPoints { found: 1 })
        );
        assert_eq!(c.store().draft().len(), 1);
    }

    #[test]
    fn test_undo_draft_point_command() {
        let mut c = controller();
        assert_eq!(c.handle(Command::UndoDraftPoint), Ok(Outcome::Unchanged));
        c.on_map_click(0.0, 0.0);
        c.on_map_click(1.0, 1.0);
        assert_eq!(
            c.handle(Command::UndoDraftPoint),
            Ok(Outcome::DraftPointRemoved { points: 1 })
        );
    }

    #[test]
    fn test_non_finite_click_is_ignored() {
        let mut c = controller();
        assert_eq!(c.on_map_click(f64::NAN, 1.0), Outcome::Unchanged);
        assert!(c.store().draft().is_empty());

        c.request_add_marker();
        assert_eq!(c.on_map_click(1.0, f64::INFINITY), Outcome::Unchanged);
        assert_eq!(c.mode(), Mode::AddingMarker);
        assert!(c.store().markers().is_empty());
        assert!(c.store().storage().keys().unwrap().is_empty());

        assert!(matches!(c.on_map_click(1.0, 2.0), Outcome::MarkerAdded(_)));
    }

    #[test]
    fn test_polygon_commands() {
        let mut c = controller();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
            c.on_map_click(x, y);
        }
        let Ok(Outcome::PolygonSaved(first)) = c.handle(Command::SaveDraftPolygon) else {
            panic!("expected a saved polygon");
        };
        for (x, y) in [(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)] {
            c.on_map_click(x, y);
        }
        c.handle(Command::SaveDraftPolygon).unwrap();

        assert_eq!(
            c.handle(Command::RemovePolygon { index: 2 }),
            Ok(Outcome::Unchanged)
        );
        assert_eq!(
            c.handle(Command::RemovePolygon { index: 0 }),
            Ok(Outcome::PolygonRemoved(first))
        );
        assert_eq!(c.store().polygons().len(), 1);

        c.on_map_click(9.0, 9.0);
        assert_eq!(
            c.handle(Command::ClearPolygons),
            Ok(Outcome::PolygonsCleared)
        );
        assert!(c.store().polygons().is_empty());
        assert_eq!(c.store().draft().len(), 1);
        assert!(!c.store().storage().contains(POLYGONS_KEY).unwrap());
    }

    #[test]
    fn test_select_unknown_marker_is_ignored() {
        let mut c = controller();
        assert_eq!(c.select_marker(42), Outcome::Unchanged);
        assert_eq!(c.selection(), &SelectionState::None);
    }

    #[test]
    fn test_edit_flow_through_commands() {
        let mut c = controller();
        c.handle(Command::StartAddMarker).unwrap();
        let Ok(Outcome::MarkerAdded(marker)) = c.handle(Command::MapClick {
            longitude: 1.0,
            latitude: 2.0,
        }) else {
            panic!("expected a marker");
        };

        assert_eq!(c.handle(Command::StartEditMarker), Ok(Outcome::Unchanged));
        c.handle(Command::SelectMarker { id: marker.id }).unwrap();
        assert_eq!(c.handle(Command::StartEditMarker), Ok(Outcome::Editing(marker.id)));
        c.handle(Command::UpdateEditField {
            field: EditField::Title,
            value: "Cafe".to_string(),
        })
        .unwrap();

        // Popup shows the edit copy, the store still has the old title
        assert_eq!(c.popup_marker().unwrap().title, "Cafe");
        assert_eq!(c.store().marker(marker.id).unwrap().title, "New Location");

        let Ok(Outcome::MarkerUpdated(updated)) = c.handle(Command::SaveEdit) else {
            panic!("expected an update");
        };
        assert_eq!(updated.id, marker.id);
        assert_eq!(c.store().marker(marker.id).unwrap().title, "Cafe");
        assert_eq!(c.selection(), &SelectionState::Viewing(marker.id));
    }

    #[test]
    fn test_close_popup_discards_edit() {
        let mut c = controller();
        c.request_add_marker();
        let Outcome::MarkerAdded(marker) = c.on_map_click(1.0, 2.0) else {
            panic!("expected a marker");
        };
        c.select_marker(marker.id);
        c.start_edit_marker();
        c.update_edit(&MarkerPatch::image("other.png"));

        assert_eq!(c.close_popup(), Outcome::PopupClosed);
        assert_eq!(c.close_popup(), Outcome::Unchanged);
        assert_eq!(c.store().marker(marker.id).unwrap().image, marker.image);
    }

    #[test]
    fn test_delete_marker_closes_popup() {
        let mut c = controller();
        c.request_add_marker();
        let Outcome::MarkerAdded(marker) = c.on_map_click(1.0, 2.0) else {
            panic!("expected a marker");
        };
        c.select_marker(marker.id);

        assert_eq!(
            c.handle(Command::DeleteMarker { id: marker.id }),
            Ok(Outcome::MarkerDeleted(marker.id))
        );
        assert!(c.store().markers().is_empty());
        assert_eq!(c.selection(), &SelectionState::None);
        assert!(c.popup_marker().is_none());
    }
}
