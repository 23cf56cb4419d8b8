mod eraser;
mod freehand;
mod lasso;
mod resize;

pub use eraser::{
    erase_precision_pass, erase_whole_pass, EraserMode, EraserTool, MIN_PRECISION_RADIUS,
};
pub use freehand::FreehandTool;
pub use lasso::LassoTool;
pub use resize::{Corner, ResizeState, BOX_PADDING, MIN_BOX_SIZE};

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::editor::Editor;
use crate::stroke::{BrushKind, MutableStroke};

/// The selectable canvas tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pencil,
    Brush,
    Eraser,
    Lasso,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Pencil,
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Lasso,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Lasso => "Lasso",
        }
    }

    pub fn brush_kind(&self) -> Option<BrushKind> {
        match self {
            ToolKind::Pencil => Some(BrushKind::Pencil),
            ToolKind::Brush => Some(BrushKind::Brush),
            _ => None,
        }
    }
}

/// Shared tool configuration, edited in the tools panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub color: Color32,
    pub pencil_width: f32,
    pub brush_width: f32,
    pub eraser_size: f32,
    pub eraser_mode: EraserMode,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            pencil_width: 2.0,
            brush_width: 6.0,
            eraser_size: 12.0,
            eraser_mode: EraserMode::Whole,
        }
    }
}

impl ToolSettings {
    pub fn width_for(&self, brush: BrushKind) -> f32 {
        match brush {
            BrushKind::Pencil => self.pencil_width,
            BrushKind::Brush => self.brush_width,
        }
    }
}

/// A pointer gesture event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
}

/// The active tool plus every tool's transient state. All canvas pointer
/// input funnels through [`ToolBox::route_pointer_event`]; paste placement
/// and an in-flight resize take the event before the active tool sees it.
pub struct ToolBox {
    pub kind: ToolKind,
    pub settings: ToolSettings,
    pub freehand: FreehandTool,
    pub eraser: EraserTool,
    pub lasso: LassoTool,
    pub resize: Option<ResizeState>,
    /// Hit radius for resize handles, in surface units.
    pub handle_radius: f32,
}

impl Default for ToolBox {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolBox {
    pub fn new() -> Self {
        Self {
            kind: ToolKind::default(),
            settings: ToolSettings::default(),
            freehand: FreehandTool::default(),
            eraser: EraserTool::default(),
            lasso: LassoTool::default(),
            resize: None,
            handle_radius: 8.0,
        }
    }

    /// Switches tools, winding down whatever the old tool had in flight.
    /// The lasso selection does not survive a tool change.
    pub fn set_tool(&mut self, editor: &mut Editor, kind: ToolKind) {
        if self.kind == kind {
            return;
        }
        self.cancel_interactions(editor);
        editor.selection.clear();
        editor.cancel_paste();
        self.kind = kind;
    }

    /// Winds down any in-flight gesture: the live stroke is discarded, a
    /// running erase is committed, a selection drag is rolled back and an
    /// open resize is cancelled.
    pub fn cancel_interactions(&mut self, editor: &mut Editor) {
        self.freehand.cancel();
        self.eraser.finish(editor);
        self.lasso.cancel(editor);
        if self.resize.is_some() {
            self.cancel_resize(editor);
        }
    }

    pub fn route_pointer_event(&mut self, editor: &mut Editor, event: PointerEvent) {
        if editor.paste_armed() {
            if let PointerEvent::Down(pos) = event {
                editor.paste_at(pos);
            }
            return;
        }

        if self.resize.is_some() {
            self.route_resize(editor, event);
            return;
        }

        match self.kind {
            ToolKind::Pencil | ToolKind::Brush => {
                let brush = self.kind.brush_kind().unwrap_or(BrushKind::Pencil);
                match event {
                    PointerEvent::Down(pos) => {
                        self.freehand.on_down(editor, &self.settings, brush, pos)
                    }
                    PointerEvent::Move(pos) => self.freehand.on_move(pos),
                    PointerEvent::Up(pos) => self.freehand.on_up(editor, pos),
                }
            }
            ToolKind::Eraser => match event {
                PointerEvent::Down(pos) => self.eraser.on_down(editor, &self.settings, pos),
                PointerEvent::Move(pos) => self.eraser.on_move(editor, &self.settings, pos),
                PointerEvent::Up(_) => self.eraser.finish(editor),
            },
            ToolKind::Lasso => match event {
                PointerEvent::Down(pos) => self.lasso.on_down(editor, pos),
                PointerEvent::Move(pos) => self.lasso.on_move(editor, pos),
                PointerEvent::Up(pos) => self.lasso.on_up(editor, pos),
            },
        }
    }

    fn route_resize(&mut self, editor: &mut Editor, event: PointerEvent) {
        let Some(resize) = self.resize.as_mut() else {
            return;
        };
        match event {
            PointerEvent::Down(pos) => {
                if !resize.on_down(pos, self.handle_radius) {
                    self.cancel_resize(editor);
                }
            }
            PointerEvent::Move(pos) => resize.on_move(editor, pos),
            PointerEvent::Up(_) => resize.on_up(),
        }
    }

    /// Enters resize mode around the current selection. Returns whether the
    /// mode was entered.
    pub fn begin_resize(&mut self, editor: &mut Editor) -> bool {
        if self.resize.is_some() {
            return false;
        }
        match ResizeState::begin(editor) {
            Some(state) => {
                self.resize = Some(state);
                true
            }
            None => false,
        }
    }

    /// Keeps the resized geometry and records one undo step, unless the box
    /// never moved.
    pub fn confirm_resize(&mut self, editor: &mut Editor) {
        if let Some(resize) = self.resize.take() {
            if resize.changed() {
                editor.commit_edit();
            } else {
                editor.abort_edit();
            }
        }
    }

    /// Leaves resize mode and restores the strokes the mode started from.
    pub fn cancel_resize(&mut self, editor: &mut Editor) {
        if self.resize.take().is_some() {
            editor.revert_edit();
        }
    }

    /// The stroke currently being drawn, for the canvas overlay.
    pub fn live_stroke(&self) -> Option<&MutableStroke> {
        self.freehand.current()
    }
}
