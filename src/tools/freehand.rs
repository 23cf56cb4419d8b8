use egui::Pos2;

use crate::editor::Editor;
use crate::stroke::{BrushKind, MutableStroke};

use super::ToolSettings;

/// Pencil and brush share this state machine; only width and the brush tag
/// differ. Points are stored raw, exactly as the pointer delivered them.
#[derive(Debug, Default)]
pub struct FreehandTool {
    current: Option<MutableStroke>,
}

impl FreehandTool {
    /// Starts a stroke on the active layer. Ignored when there is no active
    /// layer or it is hidden.
    pub fn on_down(
        &mut self,
        editor: &mut Editor,
        settings: &ToolSettings,
        brush: BrushKind,
        pos: Pos2,
    ) {
        if !editor.can_edit_active_layer() {
            return;
        }
        let Some(layer) = editor.active_layer() else {
            return;
        };
        let mut stroke =
            MutableStroke::new(settings.color, settings.width_for(brush), brush, layer);
        stroke.add_point(pos);
        self.current = Some(stroke);
    }

    pub fn on_move(&mut self, pos: Pos2) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.add_point(pos);
        }
    }

    /// Finishes the stroke. Anything under two points is a stray click and
    /// is dropped without touching the document.
    pub fn on_up(&mut self, editor: &mut Editor, _pos: Pos2) {
        if let Some(stroke) = self.current.take() {
            editor.commit_stroke(stroke);
        }
    }

    pub fn current(&self) -> Option<&MutableStroke> {
        self.current.as_ref()
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }
}
