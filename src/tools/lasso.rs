use std::sync::Arc;

use egui::{Pos2, Vec2};
use log::debug;

use crate::editor::Editor;
use crate::geometry;
use crate::stroke::StrokeRef;

/// Marquee points closer together than this are not recorded.
const MIN_POINT_SPACING: f32 = 1.0;

#[derive(Debug, Default)]
enum LassoPhase {
    #[default]
    Idle,
    /// Accumulating the marquee polygon.
    Selecting,
    /// Moving the active selection. `originals` is the whole layer list as
    /// it stood at drag start; every move rebuilds from it so the offset
    /// never accumulates error.
    Dragging {
        origin: Pos2,
        start_polygon: Vec<Pos2>,
        originals: Vec<StrokeRef>,
    },
}

/// Free-form select and move. A closed marquee picks up every stroke on
/// the active layer with at least one point inside it; dragging from inside
/// the polygon then moves polygon and strokes together.
#[derive(Debug, Default)]
pub struct LassoTool {
    phase: LassoPhase,
}

impl LassoTool {
    pub fn on_down(&mut self, editor: &mut Editor, pos: Pos2) {
        if editor.selection.active && editor.selection.contains(pos) {
            editor.begin_edit();
            let originals = match editor.active_layer() {
                Some(layer) => editor.document.strokes().layer_strokes(layer).to_vec(),
                None => Vec::new(),
            };
            self.phase = LassoPhase::Dragging {
                origin: pos,
                start_polygon: editor.selection.polygon.clone(),
                originals,
            };
            return;
        }
        // Pointer-down outside an active polygon dismisses it; either way a
        // fresh marquee starts here.
        editor.selection.clear();
        editor.selection.polygon.push(pos);
        self.phase = LassoPhase::Selecting;
    }

    pub fn on_move(&mut self, editor: &mut Editor, pos: Pos2) {
        match &self.phase {
            LassoPhase::Idle => {}
            LassoPhase::Selecting => {
                let far_enough = editor
                    .selection
                    .polygon
                    .last()
                    .is_none_or(|last| last.distance(pos) >= MIN_POINT_SPACING);
                if far_enough {
                    editor.selection.polygon.push(pos);
                }
            }
            LassoPhase::Dragging {
                origin,
                start_polygon,
                originals,
            } => {
                let delta = pos - *origin;
                editor.selection.polygon =
                    start_polygon.iter().map(|p| *p + delta).collect();
                Self::apply_move(editor, originals.clone(), delta);
            }
        }
    }

    pub fn on_up(&mut self, editor: &mut Editor, pos: Pos2) {
        match std::mem::take(&mut self.phase) {
            LassoPhase::Idle => {}
            LassoPhase::Selecting => self.close_marquee(editor),
            LassoPhase::Dragging {
                origin, originals, ..
            } => {
                let delta = pos - origin;
                if delta == Vec2::ZERO {
                    // A click inside the polygon; nothing moved.
                    Self::apply_move(editor, originals, delta);
                    editor.abort_edit();
                } else {
                    debug!(
                        "move {} strokes by {:?}",
                        editor.selection.stroke_ids.len(),
                        delta
                    );
                    editor.commit_edit();
                }
            }
        }
    }

    /// Rolls back an in-flight drag and forgets the marquee. The selection
    /// itself is the editor's to clear.
    pub fn cancel(&mut self, editor: &mut Editor) {
        if matches!(self.phase, LassoPhase::Dragging { .. }) {
            editor.revert_edit();
        }
        self.phase = LassoPhase::Idle;
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, LassoPhase::Selecting)
    }

    fn close_marquee(&mut self, editor: &mut Editor) {
        if editor.selection.polygon.len() < 3 {
            editor.selection.clear();
            return;
        }
        let Some(layer) = editor.active_layer() else {
            editor.selection.clear();
            return;
        };
        let polygon = editor.selection.polygon.clone();
        editor.selection.stroke_ids = editor
            .document
            .strokes()
            .layer_strokes(layer)
            .iter()
            .filter(|s| {
                s.points()
                    .iter()
                    .any(|p| geometry::polygon_contains(&polygon, *p))
            })
            .map(|s| s.id())
            .collect();
        editor.selection.active = true;
        debug!("lasso selected {} strokes", editor.selection.stroke_ids.len());
    }

    /// Rebuilds the active layer from the drag-start list, translating the
    /// selected strokes by `delta` and keeping everything else as it was.
    fn apply_move(editor: &mut Editor, originals: Vec<StrokeRef>, delta: Vec2) {
        let Some(layer) = editor.active_layer() else {
            return;
        };
        let moved = if delta == Vec2::ZERO {
            originals
        } else {
            let selected = &editor.selection.stroke_ids;
            originals
                .into_iter()
                .map(|s| {
                    if selected.contains(&s.id()) {
                        Arc::new(s.translated(delta))
                    } else {
                        s
                    }
                })
                .collect()
        };
        editor.document.replace_layer_strokes(layer, moved);
    }
}
