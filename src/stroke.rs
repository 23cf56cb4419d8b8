use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::id::{self, StrokeId};
use crate::layer::LayerId;

/// Which freehand tool produced a stroke. The two differ only in default
/// width but the tag is kept so saved documents round-trip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushKind {
    Pencil,
    Brush,
}

/// A committed, immutable stroke. Point data never changes after commit;
/// move/resize/erase produce replacement strokes instead of mutating, so a
/// `StrokeRef` can be shared freely between the document and undo snapshots.
///
/// A stroke with zero points is a placeholder for non-vector cell content
/// and is never rendered as a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    brush: BrushKind,
    layer: LayerId,
}

/// Shared reference to an immutable stroke.
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(
        id: StrokeId,
        points: Vec<Pos2>,
        color: Color32,
        width: f32,
        brush: BrushKind,
        layer: LayerId,
    ) -> Self {
        Self {
            id,
            points,
            color,
            width,
            brush,
            layer,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn brush(&self) -> BrushKind {
        self.brush
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn bounds(&self) -> Option<Rect> {
        geometry::points_bounds(&self.points)
    }

    /// Replacement stroke shifted by `delta`. Keeps the same id so selections
    /// keep pointing at it across a move.
    pub fn translated(&self, delta: Vec2) -> Stroke {
        Stroke {
            points: self.points.iter().map(|p| *p + delta).collect(),
            ..self.clone()
        }
    }

    /// Replacement stroke with every point remapped from `old` to `new`
    /// box coordinates. Keeps the same id.
    pub fn remapped(&self, old: Rect, new: Rect) -> Stroke {
        Stroke {
            points: self
                .points
                .iter()
                .map(|p| geometry::remap_point(*p, old, new))
                .collect(),
            ..self.clone()
        }
    }

    /// Copy with fresh identity and different point data, inheriting color,
    /// width, brush and layer. Used by the precision eraser when a stroke is
    /// split into surviving runs.
    pub fn derived(&self, points: Vec<Pos2>) -> Stroke {
        Stroke {
            id: id::next_stroke_id(),
            points,
            ..self.clone()
        }
    }
}

/// A stroke being drawn. Accumulates points while the pointer is down and
/// freezes into an immutable [`Stroke`] on commit.
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    brush: BrushKind,
    layer: LayerId,
}

impl MutableStroke {
    pub fn new(color: Color32, width: f32, brush: BrushKind, layer: LayerId) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
            brush,
            layer,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// A stroke is only worth committing once it spans at least two points.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn into_stroke(self) -> Stroke {
        Stroke::new(
            id::next_stroke_id(),
            self.points,
            self.color,
            self.width,
            self.brush,
            self.layer,
        )
    }

    pub fn into_stroke_ref(self) -> StrokeRef {
        Arc::new(self.into_stroke())
    }
}
