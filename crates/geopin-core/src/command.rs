//! User-facing intents consumed by the interaction controller.

use crate::geometry::{Marker, MarkerId, MarkerPatch, Polygon};
use serde::{Deserialize, Serialize};

/// Editable marker field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    Title,
    Image,
}

impl EditField {
    /// Patch that sets this field to `value`.
    pub fn patch(self, value: impl Into<String>) -> MarkerPatch {
        match self {
            EditField::Title => MarkerPatch::title(value),
            EditField::Image => MarkerPatch::image(value),
        }
    }
}

/// A discrete user intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Click on the map at a WGS84 position.
    MapClick { longitude: f64, latitude: f64 },
    StartAddMarker,
    CancelAddMarker,
    ClearDraftPolygon,
    SaveDraftPolygon,
    UndoDraftPoint,
    /// Delete the saved polygon at `index` in insertion order.
    RemovePolygon { index: usize },
    ClearPolygons,
    SelectMarker { id: MarkerId },
    StartEditMarker,
    UpdateEditField { field: EditField, value: String },
    SaveEdit,
    DeleteMarker { id: MarkerId },
    ClosePopup,
}

/// What a handled command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed (already in the requested state, unknown id, ...).
    Unchanged,
    /// Now waiting for the marker position click.
    AwaitingMarkerPosition,
    /// Back to idle without placing a marker.
    AddMarkerCancelled,
    MarkerAdded(Marker),
    DraftPointAdded { points: usize },
    DraftPointRemoved { points: usize },
    DraftCleared,
    PolygonSaved(Polygon),
    PolygonRemoved(Polygon),
    PolygonsCleared,
    Viewing(MarkerId),
    Editing(MarkerId),
    EditUpdated,
    MarkerUpdated(Marker),
    MarkerDeleted(MarkerId),
    PopupClosed,
}
