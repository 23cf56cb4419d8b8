use std::time::Duration;

use egui::{Key, Modifiers};

use crate::assets::AssetCache;
use crate::editor::Editor;
use crate::panels;
use crate::persistence::{self, DocumentFile};
use crate::playback::PlaybackController;
use crate::renderer::{CanvasView, Compositor};
use crate::tools::ToolBox;
use crate::util::time;

/// The flipbook application: the editing session plus everything panels
/// share per frame. The document is persisted through [`DocumentFile`], not
/// by serializing this struct.
pub struct FlipbookApp {
    pub(crate) editor: Editor,
    pub(crate) tools: ToolBox,
    pub(crate) playback: PlaybackController,
    pub(crate) compositor: Compositor,
    pub(crate) assets: AssetCache,
    /// Pan/zoom of the drawing area. Seeded from a fit on first draw.
    pub(crate) canvas_view: Option<CanvasView>,
}

impl Default for FlipbookApp {
    fn default() -> Self {
        Self {
            editor: Editor::new(),
            tools: ToolBox::new(),
            playback: PlaybackController::new(),
            compositor: Compositor::new(),
            assets: AssetCache::new(),
            canvas_view: None,
        }
    }
}

impl FlipbookApp {
    /// Called once before the first frame. Reloads the previous session's
    /// document when there is one.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::default();
        if let Some(storage) = cc.storage {
            if let Some(file) = eframe::get_value::<DocumentFile>(storage, eframe::APP_KEY) {
                persistence::restore(&mut app.editor, file);
            }
        }
        app
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo, copy, paste, delete, confirm, escape, prev, next) = ctx
            .input_mut(|i| {
                (
                    i.consume_key(Modifiers::COMMAND, Key::Z),
                    i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                        || i.consume_key(Modifiers::COMMAND, Key::Y),
                    i.consume_key(Modifiers::COMMAND, Key::C),
                    i.consume_key(Modifiers::COMMAND, Key::V),
                    i.consume_key(Modifiers::NONE, Key::Delete)
                        || i.consume_key(Modifiers::NONE, Key::Backspace),
                    i.consume_key(Modifiers::NONE, Key::Enter),
                    i.consume_key(Modifiers::NONE, Key::Escape),
                    i.consume_key(Modifiers::NONE, Key::ArrowLeft),
                    i.consume_key(Modifiers::NONE, Key::ArrowRight),
                )
            });

        // No history jumps while a resize gesture is open.
        let resizing = self.tools.resize.is_some();
        if undo && !resizing {
            self.tools.cancel_interactions(&mut self.editor);
            self.editor.undo();
        }
        if redo && !resizing {
            self.tools.cancel_interactions(&mut self.editor);
            self.editor.redo();
        }
        if copy {
            self.editor.copy_selection();
        }
        if paste {
            self.editor.arm_paste();
        }
        if delete {
            self.editor.delete_selection();
        }
        if confirm {
            self.tools.confirm_resize(&mut self.editor);
        }
        if escape {
            if self.tools.resize.is_some() {
                self.tools.cancel_resize(&mut self.editor);
            } else if self.editor.paste_armed() {
                self.editor.cancel_paste();
            } else {
                self.editor.selection.clear();
            }
        }
        if prev {
            self.playback.stop();
            let frame = self.editor.current_frame();
            self.editor.set_frame(frame.saturating_sub(1));
        }
        if next {
            self.playback.stop();
            let frame = self.editor.current_frame();
            self.editor.set_frame(frame + 1);
        }
    }
}

impl eframe::App for FlipbookApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &persistence::capture(&self.editor));
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.assets.drain(ctx) {
            ctx.request_repaint();
        }

        self.handle_shortcuts(ctx);

        if self.playback.is_playing() {
            let now = time::current_time_secs();
            let fps = self.editor.view.fps;
            let frame_count = self.editor.document.timeline().frame_count();
            if let Some(next) = self.playback.tick(
                now,
                fps,
                self.editor.view.loop_playback,
                self.editor.current_frame(),
                frame_count,
            ) {
                self.editor.set_frame(next);
            }
            if self.playback.is_playing() {
                ctx.request_repaint_after(Duration::from_secs_f64(
                    self.playback.time_to_next(now, fps),
                ));
            }
        }

        panels::tools_panel(self, ctx);
        panels::timeline_panel(self, ctx);
        panels::canvas_panel(self, ctx);
    }
}
