//! In-progress polygon built from sequential map clicks.

use crate::error::AnnotationResult;
use crate::geometry::{GeoPoint, Polygon, open_path};
use crate::storage::KeyValueStore;
use crate::store::AnnotationStore;
use kurbo::BezPath;

/// Ordered vertices of a polygon that has not been committed yet.
///
/// Never persisted. Points are kept exactly as clicked: no dedup, no cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPolygon {
    points: Vec<GeoPoint>,
}

impl DraftPolygon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex. Non-finite coordinates are rejected.
    pub fn add_point(&mut self, longitude: f64, latitude: f64) -> AnnotationResult<()> {
        let point = GeoPoint::new(longitude, latitude).validate()?;
        self.points.push(point);
        log::debug!("Draft polygon now has {} points", self.points.len());
        Ok(())
    }

    /// Drop the most recently added vertex.
    pub fn undo_last_point(&mut self) -> Option<GeoPoint> {
        self.points.pop()
    }

    /// Commit the draft as a saved polygon.
    ///
    /// On success the draft is emptied. On failure it is left as is so the
    /// user can keep adding points.
    pub fn commit<S: KeyValueStore>(
        &mut self,
        store: &mut AnnotationStore<S>,
    ) -> AnnotationResult<Polygon> {
        let polygon = store.add_polygon(&self.points)?;
        self.clear();
        Ok(polygon)
    }

    /// Empty the draft.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Open outline through the current vertices.
    pub fn to_path(&self) -> BezPath {
        open_path(&self.points)
    }
}
