//! Drawable primitives handed to the map renderer.
//!
//! The map collaborator owns projection, tiles and actual drawing. This
//! module only describes what should be on top of the map, in lng/lat space,
//! and in which order.

use crate::controller::InteractionController;
use crate::geometry::MarkerId;
use crate::storage::KeyValueStore;
use kurbo::{BezPath, Point};
use peniko::Color;

/// Colours used for annotation overlays.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub polygon_fill: Color,
    pub polygon_stroke: Color,
    pub draft_stroke: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            polygon_fill: Color::from_rgba8(0, 136, 136, 128),
            polygon_stroke: Color::from_rgba8(0, 136, 136, 255),
            draft_stroke: Color::from_rgba8(255, 0, 0, 255),
        }
    }
}

/// One thing to draw over the map.
#[derive(Debug, Clone)]
pub enum Drawable {
    /// Saved polygon.
    FilledPolygon {
        path: BezPath,
        fill: Color,
        stroke: Color,
    },
    /// Polygon being drawn; open path plus vertex positions.
    DraftOutline {
        path: BezPath,
        vertices: Vec<Point>,
        stroke: Color,
    },
    /// Point marker. `highlighted` when its popup is open.
    MarkerPin {
        id: MarkerId,
        position: Point,
        highlighted: bool,
    },
    /// Popup anchored at a marker.
    Popup {
        id: MarkerId,
        position: Point,
        title: String,
        image: String,
        editing: bool,
    },
}

/// Receiver of drawables, implemented by the map renderer.
pub trait RenderTarget {
    fn draw(&mut self, drawable: &Drawable);
}

impl RenderTarget for Vec<Drawable> {
    fn draw(&mut self, drawable: &Drawable) {
        self.push(drawable.clone());
    }
}

/// Ordered overlay list: polygons, draft, pins, then the popup on top.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    drawables: Vec<Drawable>,
}

impl Scene {
    /// Build the scene with default colours.
    pub fn build<S: KeyValueStore>(controller: &InteractionController<S>) -> Self {
        Self::build_with_style(controller, &OverlayStyle::default())
    }

    pub fn build_with_style<S: KeyValueStore>(
        controller: &InteractionController<S>,
        style: &OverlayStyle,
    ) -> Self {
        let store = controller.store();
        let selected = controller.selection().marker_id();
        let mut drawables = Vec::new();

        for polygon in store.polygons() {
            drawables.push(Drawable::FilledPolygon {
                path: polygon.to_path(),
                fill: style.polygon_fill,
                stroke: style.polygon_stroke,
            });
        }

        let draft = store.draft();
        if !draft.is_empty() {
            drawables.push(Drawable::DraftOutline {
                path: draft.to_path(),
                vertices: draft.points().iter().map(|p| Point::from(*p)).collect(),
                stroke: style.draft_stroke,
            });
        }

        for marker in store.markers() {
            drawables.push(Drawable::MarkerPin {
                id: marker.id,
                position: marker.position().into(),
                highlighted: selected == Some(marker.id),
            });
        }

        if let Some(marker) = controller.popup_marker() {
            drawables.push(Drawable::Popup {
                id: marker.id,
                position: marker.position().into(),
                title: marker.title.clone(),
                image: marker.image.clone(),
                editing: controller.selection().is_editing(),
            });
        }

        Self { drawables }
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Feed every drawable to `target` in order.
    pub fn render_to(&self, target: &mut impl RenderTarget) {
        for drawable in &self.drawables {
            target.draw(drawable);
        }
    }
}
