use std::collections::HashSet;
use std::sync::Arc;

use egui::{CursorIcon, Pos2, Rect, Vec2};
use log::debug;

use crate::editor::Editor;
use crate::geometry;
use crate::id::StrokeId;
use crate::layer::LayerId;
use crate::stroke::StrokeRef;

/// Neither side of the resize box may shrink below this.
pub const MIN_BOX_SIZE: f32 = 10.0;

/// Gap between the selection bounds and the box drawn around them.
pub const BOX_PADDING: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn pos_in(&self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Corner::TopLeft | Corner::BottomRight => CursorIcon::ResizeNwSe,
            Corner::TopRight | Corner::BottomLeft => CursorIcon::ResizeNeSw,
        }
    }
}

#[derive(Debug)]
enum ResizeDrag {
    Corner {
        corner: Corner,
        grab_rect: Rect,
        start: Pos2,
    },
    Translate {
        grab_rect: Rect,
        start: Pos2,
    },
}

/// Modal resize around a selection. On entry the selected strokes and the
/// padded box around them are frozen; every drag remaps the frozen stroke
/// geometry from the entry box to the current box in one step, so repeated
/// handle drags never accumulate rounding error. Confirm keeps the result
/// as one undo step; cancel puts everything back.
#[derive(Debug)]
pub struct ResizeState {
    initial: Rect,
    current: Rect,
    originals: Vec<StrokeRef>,
    selected: HashSet<StrokeId>,
    layer: LayerId,
    drag: Option<ResizeDrag>,
}

impl ResizeState {
    /// Freezes the current selection into a resize session. Returns `None`
    /// when there is nothing selected to resize. Takes over the pending
    /// edit snapshot; the lasso polygon is dropped since the box replaces
    /// it as the on-canvas affordance.
    pub fn begin(editor: &mut Editor) -> Option<Self> {
        let layer = editor.active_layer()?;
        if !editor.selection.active || editor.selection.is_empty() {
            return None;
        }
        let selected = editor.selection.stroke_ids.clone();
        let originals: Vec<StrokeRef> =
            editor.document.strokes().layer_strokes(layer).to_vec();
        let bounds = geometry::runs_bounds(
            originals
                .iter()
                .filter(|s| selected.contains(&s.id()))
                .map(|s| s.points()),
        )?;
        let initial = bounds.expand(BOX_PADDING);
        editor.begin_edit();
        editor.selection.clear();
        debug!("resize begin, box {initial:?}");
        Some(Self {
            initial,
            current: initial,
            originals,
            selected,
            layer,
            drag: None,
        })
    }

    pub fn box_rect(&self) -> Rect {
        self.current
    }

    pub fn changed(&self) -> bool {
        self.current != self.initial
    }

    pub fn hit_corner(&self, pos: Pos2, radius: f32) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|c| c.pos_in(self.current).distance(pos) <= radius)
    }

    /// Grabs a handle or the box body. Returns false when `pos` is outside
    /// the box entirely, which the caller treats as cancel.
    pub fn on_down(&mut self, pos: Pos2, handle_radius: f32) -> bool {
        if let Some(corner) = self.hit_corner(pos, handle_radius) {
            self.drag = Some(ResizeDrag::Corner {
                corner,
                grab_rect: self.current,
                start: pos,
            });
            return true;
        }
        if self.current.contains(pos) {
            self.drag = Some(ResizeDrag::Translate {
                grab_rect: self.current,
                start: pos,
            });
            return true;
        }
        false
    }

    pub fn on_move(&mut self, editor: &mut Editor, pos: Pos2) {
        let Some(drag) = &self.drag else {
            return;
        };
        self.current = match drag {
            ResizeDrag::Corner {
                corner,
                grab_rect,
                start,
            } => dragged_rect(*grab_rect, *corner, pos - *start),
            ResizeDrag::Translate { grab_rect, start } => grab_rect.translate(pos - *start),
        };
        self.apply(editor);
    }

    pub fn on_up(&mut self) {
        self.drag = None;
    }

    fn apply(&self, editor: &mut Editor) {
        let remapped = self
            .originals
            .iter()
            .map(|s| {
                if self.selected.contains(&s.id()) {
                    Arc::new(s.remapped(self.initial, self.current))
                } else {
                    s.clone()
                }
            })
            .collect();
        editor.document.replace_layer_strokes(self.layer, remapped);
    }
}

/// New box for a corner drag. The grabbed corner follows the pointer while
/// the opposite edges stay put, clamped so the box keeps its minimum size.
fn dragged_rect(rect: Rect, corner: Corner, delta: Vec2) -> Rect {
    let mut out = rect;
    match corner {
        Corner::TopLeft => {
            out.min.x = (rect.min.x + delta.x).min(rect.max.x - MIN_BOX_SIZE);
            out.min.y = (rect.min.y + delta.y).min(rect.max.y - MIN_BOX_SIZE);
        }
        Corner::TopRight => {
            out.max.x = (rect.max.x + delta.x).max(rect.min.x + MIN_BOX_SIZE);
            out.min.y = (rect.min.y + delta.y).min(rect.max.y - MIN_BOX_SIZE);
        }
        Corner::BottomLeft => {
            out.min.x = (rect.min.x + delta.x).min(rect.max.x - MIN_BOX_SIZE);
            out.max.y = (rect.max.y + delta.y).max(rect.min.y + MIN_BOX_SIZE);
        }
        Corner::BottomRight => {
            out.max.x = (rect.max.x + delta.x).max(rect.min.x + MIN_BOX_SIZE);
            out.max.y = (rect.max.y + delta.y).max(rect.min.y + MIN_BOX_SIZE);
        }
    }
    out
}
