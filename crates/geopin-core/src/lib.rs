//! GeoPin Core Library
//!
//! Annotation state for a geographic map: point markers, hand-drawn
//! polygons, the popup selection, and the click/command state machine that
//! drives them. State is written through to a pluggable key-value store on
//! every change. Rendering is left to the host map.

pub mod command;
pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod selection;
pub mod storage;
pub mod store;

pub use command::{Command, EditField, Outcome};
pub use config::{AnnotationConfig, ConfigError};
pub use controller::{InteractionController, Mode};
pub use draft::DraftPolygon;
pub use error::{AnnotationError, AnnotationResult};
pub use geometry::{GeoPoint, Marker, MarkerId, MarkerPatch, Polygon, MIN_POLYGON_POINTS};
pub use scene::{Drawable, OverlayStyle, RenderTarget, Scene};
pub use selection::SelectionState;
pub use storage::{KeyValueStore, MemoryStorage, PersistenceAdapter, StorageError, StorageResult};
pub use store::AnnotationStore;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
