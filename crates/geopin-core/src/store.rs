//! Authoritative marker and polygon collections.

use crate::draft::DraftPolygon;
use crate::error::AnnotationResult;
use crate::geometry::{GeoPoint, Marker, MarkerId, Polygon};
use crate::storage::{KeyValueStore, MARKERS_KEY, POLYGONS_KEY, PersistenceAdapter};
use std::collections::HashSet;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Owns markers, saved polygons and the polygon draft.
///
/// Every mutation of markers or saved polygons is written through to
/// storage before the call returns. The draft is never persisted.
#[derive(Debug)]
pub struct AnnotationStore<S: KeyValueStore> {
    markers: Vec<Marker>,
    polygons: Vec<Polygon>,
    draft: DraftPolygon,
    persistence: PersistenceAdapter<S>,
    /// Highest id issued or loaded so far.
    last_id: MarkerId,
}

impl<S: KeyValueStore> AnnotationStore<S> {
    /// Open a store, loading both collections from `storage`.
    pub fn open(storage: S) -> Self {
        let persistence = PersistenceAdapter::new(storage);

        let mut seen = HashSet::new();
        let markers: Vec<Marker> = persistence
            .load::<Marker>(MARKERS_KEY)
            .into_iter()
            .filter(|m| {
                let fresh = seen.insert(m.id);
                if !fresh {
                    log::warn!("Dropping marker with duplicate id {}", m.id);
                }
                fresh
            })
            .collect();
        let polygons = persistence.load::<Polygon>(POLYGONS_KEY);
        let last_id = markers.iter().map(|m| m.id).max().unwrap_or(0);

        Self {
            markers,
            polygons,
            draft: DraftPolygon::new(),
            persistence,
            last_id,
        }
    }

    /// Issue a timestamp-based id that is strictly greater than any before it.
    ///
    /// Once `last_id` has reached `MarkerId::MAX` there is nothing greater to
    /// hand out, so the smallest id not held by a current marker is used.
    fn next_id(&mut self) -> MarkerId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as MarkerId)
            .unwrap_or(0);
        match self.last_id.checked_add(1) {
            Some(next) => {
                self.last_id = now.max(next);
                self.last_id
            }
            None => {
                let used: HashSet<MarkerId> = self.markers.iter().map(|m| m.id).collect();
                let id = (0..=MarkerId::MAX)
                    .find(|id| !used.contains(id))
                    .unwrap_or_default();
                log::warn!("Marker id space exhausted, reusing free id {}", id);
                id
            }
        }
    }

    fn persist_markers(&self) {
        if let Err(e) = self.persistence.save(MARKERS_KEY, &self.markers) {
            log::error!("Failed to persist markers: {}", e);
        }
    }

    fn persist_polygons(&self) {
        if let Err(e) = self.persistence.save(POLYGONS_KEY, &self.polygons) {
            log::error!("Failed to persist polygons: {}", e);
        }
    }

    /// Create a marker at the given position.
    ///
    /// Non-finite coordinates are rejected, since they cannot round-trip
    /// through JSON.
    pub fn add_marker(
        &mut self,
        longitude: f64,
        latitude: f64,
        title: impl Into<String>,
        image: impl Into<String>,
    ) -> AnnotationResult<Marker> {
        GeoPoint::new(longitude, latitude).validate()?;
        let marker = Marker {
            id: self.next_id(),
            longitude,
            latitude,
            title: title.into(),
            image: image.into(),
        };
        log::debug!("Adding marker {} at ({}, {})", marker.id, longitude, latitude);
        self.markers.push(marker.clone());
        self.persist_markers();
        Ok(marker)
    }

    /// Replace the marker with `id` by `replacement`, keeping the id.
    ///
    /// Does nothing to the collection if `id` is unknown or if the
    /// replacement position is not finite.
    pub fn update_marker(&mut self, id: MarkerId, replacement: &Marker) {
        if !replacement.position().is_finite() {
            log::warn!("Ignoring update of marker {} to a non-finite position", id);
        } else if let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) {
            *marker = Marker {
                id,
                ..replacement.clone()
            };
        } else {
            log::debug!("Update for unknown marker {}", id);
        }
        self.persist_markers();
    }

    /// Remove the marker with `id`, if present.
    pub fn remove_marker(&mut self, id: MarkerId) {
        self.markers.retain(|m| m.id != id);
        self.persist_markers();
    }

    /// Save `points` as a polygon.
    pub fn add_polygon(&mut self, points: &[GeoPoint]) -> AnnotationResult<Polygon> {
        let polygon = Polygon::new(points.to_vec())?;
        self.polygons.push(polygon.clone());
        self.persist_polygons();
        Ok(polygon)
    }

    /// Remove the saved polygon at `index`.
    pub fn remove_polygon(&mut self, index: usize) -> Option<Polygon> {
        if index >= self.polygons.len() {
            return None;
        }
        let removed = self.polygons.remove(index);
        self.persist_polygons();
        Some(removed)
    }

    /// Remove every saved polygon. The draft is left alone.
    pub fn clear_polygons(&mut self) {
        self.polygons.clear();
        self.persist_polygons();
    }

    /// Commit the draft as a saved polygon.
    pub fn commit_draft(&mut self) -> AnnotationResult<Polygon> {
        let mut draft = std::mem::take(&mut self.draft);
        let result = draft.commit(self);
        self.draft = draft;
        result
    }

    /// Empty the draft without touching saved polygons.
    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    pub fn draft(&self) -> &DraftPolygon {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftPolygon {
        &mut self.draft
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }
}
