//! Geographic value types: points, markers and polygons.

use crate::error::AnnotationError;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Minimum number of vertices in a committed polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Unique marker identifier.
pub type MarkerId = u64;

/// A WGS84 longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Error unless the point is finite.
    pub(crate) fn validate(self) -> Result<Self, AnnotationError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(AnnotationError::InvalidCoordinate {
                longitude: self.longitude,
                latitude: self.latitude,
            })
        }
    }
}

impl From<GeoPoint> for Point {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

impl From<Point> for GeoPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// A labeled point annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub longitude: f64,
    pub latitude: f64,
    pub title: String,
    /// Image URL shown in the marker popup.
    pub image: String,
}

impl Marker {
    /// Position of the marker.
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Partial update applied to a marker's edit copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl MarkerPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            image: None,
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self {
            title: None,
            image: Some(image.into()),
        }
    }

    /// Apply the set fields onto `marker`.
    pub fn apply(&self, marker: &mut Marker) {
        if let Some(title) = &self.title {
            marker.title = title.clone();
        }
        if let Some(image) = &self.image {
            marker.image = image.clone();
        }
    }
}

/// A closed ring of at least [`MIN_POLYGON_POINTS`] vertices.
///
/// Vertex order is insertion order and defines the ring boundary. The
/// only way to build one is through [`Polygon::new`] (or deserialization,
/// which goes through the same check).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct Polygon {
    points: Vec<GeoPoint>,
}

impl Polygon {
    /// Build a polygon from an ordered vertex list.
    ///
    /// Fails on fewer than [`MIN_POLYGON_POINTS`] vertices or on any
    /// non-finite coordinate.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, AnnotationError> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(AnnotationError::InsufficientPoints {
                found: points.len(),
            });
        }
        for p in &points {
            p.validate()?;
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed polygon.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed path through the vertices in lng/lat space.
    pub fn to_path(&self) -> BezPath {
        let mut path = open_path(&self.points);
        path.close_path();
        path
    }
}

impl TryFrom<Vec<GeoPoint>> for Polygon {
    type Error = AnnotationError;

    fn try_from(points: Vec<GeoPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Polygon> for Vec<GeoPoint> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

/// Open polyline through `points`; empty path for an empty slice.
pub(crate) fn open_path(points: &[GeoPoint]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(Point::from(*first));
        for p in iter {
            path.line_to(Point::from(*p));
        }
    }
    path
}
