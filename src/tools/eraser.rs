use std::sync::Arc;

use egui::Pos2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::editor::Editor;
use crate::geometry;
use crate::stroke::StrokeRef;

use super::ToolSettings;

/// Floor for the precision eraser's drop radius, in surface units.
pub const MIN_PRECISION_RADIUS: f32 = 2.5;

/// Maximum gap between consecutive erase samples. Pointer segments longer
/// than this get intermediate samples so a fast swipe leaves no holes.
const SAMPLE_STEP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EraserMode {
    /// Removes whole strokes the eraser touches.
    #[default]
    Whole,
    /// Removes only the touched points, splitting strokes where they are
    /// cut through.
    Precision,
}

impl EraserMode {
    pub fn label(&self) -> &'static str {
        match self {
            EraserMode::Whole => "Stroke",
            EraserMode::Precision => "Precision",
        }
    }
}

/// Erase gesture state. The document is rewritten live while the pointer
/// moves; the snapshot captured at pointer-down becomes a single undo step
/// at pointer-up, but only when something was actually erased.
#[derive(Debug, Default)]
pub struct EraserTool {
    last_sample: Option<Pos2>,
    changed: bool,
}

impl EraserTool {
    pub fn on_down(&mut self, editor: &mut Editor, settings: &ToolSettings, pos: Pos2) {
        if !editor.can_edit_active_layer() {
            return;
        }
        editor.begin_edit();
        self.last_sample = Some(pos);
        self.changed = false;
        self.apply(editor, settings, &[pos]);
    }

    pub fn on_move(&mut self, editor: &mut Editor, settings: &ToolSettings, pos: Pos2) {
        let Some(last) = self.last_sample else {
            return;
        };
        let samples = geometry::densify_segment(last, pos, SAMPLE_STEP);
        self.apply(editor, settings, &samples);
        self.last_sample = Some(pos);
    }

    /// Ends the gesture, turning the pre-erase snapshot into one undo step
    /// when the pass removed anything.
    pub fn finish(&mut self, editor: &mut Editor) {
        if self.last_sample.take().is_none() {
            return;
        }
        if self.changed {
            debug!("erase gesture committed");
            editor.commit_edit();
        } else {
            editor.abort_edit();
        }
        self.changed = false;
    }

    pub fn is_erasing(&self) -> bool {
        self.last_sample.is_some()
    }

    fn apply(&mut self, editor: &mut Editor, settings: &ToolSettings, samples: &[Pos2]) {
        let Some(layer) = editor.active_layer() else {
            return;
        };
        let strokes = editor.document.strokes().layer_strokes(layer);
        let replaced = match settings.eraser_mode {
            EraserMode::Whole => erase_whole_pass(strokes, samples, settings.eraser_size),
            EraserMode::Precision => {
                erase_precision_pass(strokes, samples, settings.eraser_size)
            }
        };
        if let Some(replaced) = replaced {
            editor.document.replace_layer_strokes(layer, replaced);
            self.changed = true;
        }
    }
}

fn touches(points: &[Pos2], samples: &[Pos2], radius: f32) -> bool {
    points
        .iter()
        .any(|p| samples.iter().any(|s| s.distance(*p) <= radius))
}

/// Whole-stroke erase: a stroke with any point within `radius` of a sample
/// goes away entirely. Returns `None` when the pass touched nothing.
pub fn erase_whole_pass(
    strokes: &[StrokeRef],
    samples: &[Pos2],
    radius: f32,
) -> Option<Vec<StrokeRef>> {
    if !strokes.iter().any(|s| touches(s.points(), samples, radius)) {
        return None;
    }
    Some(
        strokes
            .iter()
            .filter(|s| !touches(s.points(), samples, radius))
            .cloned()
            .collect(),
    )
}

/// Point-level erase: points within `max(radius, MIN_PRECISION_RADIUS)` of
/// a sample are dropped and each surviving run of two or more consecutive
/// points becomes a fresh stroke inheriting the original's look. Strokes
/// the pass never cut keep their identity untouched. Returns `None` when
/// nothing was cut.
pub fn erase_precision_pass(
    strokes: &[StrokeRef],
    samples: &[Pos2],
    radius: f32,
) -> Option<Vec<StrokeRef>> {
    let radius = radius.max(MIN_PRECISION_RADIUS);
    let mut out = Vec::with_capacity(strokes.len());
    let mut changed = false;
    for stroke in strokes {
        let mut runs: Vec<Vec<Pos2>> = Vec::new();
        let mut run: Vec<Pos2> = Vec::new();
        let mut dropped = 0usize;
        for point in stroke.points() {
            if samples.iter().any(|s| s.distance(*point) <= radius) {
                dropped += 1;
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            } else {
                run.push(*point);
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
        if dropped == 0 {
            out.push(stroke.clone());
            continue;
        }
        changed = true;
        for run in runs.into_iter().filter(|r| r.len() >= 2) {
            out.push(Arc::new(stroke.derived(run)));
        }
    }
    changed.then_some(out)
}
