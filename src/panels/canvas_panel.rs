use egui::{vec2, Area, CursorIcon, Frame, Id, Key, Order, PointerButton, Sense, Vec2};

use crate::app::FlipbookApp;
use crate::renderer::{CanvasView, Overlays};
use crate::timeline::AssetRef;
use crate::tools::{PointerEvent, ToolKind};

pub fn canvas_panel(app: &mut FlipbookApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let FlipbookApp {
            editor,
            tools,
            compositor,
            assets,
            canvas_view,
            ..
        } = app;

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let view = canvas_view
            .get_or_insert_with(|| CanvasView::fit(editor.document.canvas_size(), response.rect));

        // Scroll pans, pinch or ctrl+scroll zooms around the pointer,
        // middle-drag pans.
        if response.hovered() {
            let zoom_delta = ui.input(|i| i.zoom_delta());
            if zoom_delta != 1.0 {
                if let Some(pointer) = response.hover_pos() {
                    let anchor = view.to_surface(pointer);
                    view.zoom = (view.zoom * zoom_delta).clamp(0.05, 16.0);
                    view.origin = pointer - anchor.to_vec2() * view.zoom;
                }
            }
            let scroll = ui.input(|i| i.smooth_scroll_delta);
            if scroll != Vec2::ZERO {
                view.origin += scroll;
            }
        }
        if response.dragged_by(PointerButton::Middle) {
            view.origin += response.drag_delta();
        }

        // Held space turns the primary button into a pan. The role is
        // latched per drag, so releasing space mid-pan does not hand the
        // tail of the gesture to the active tool.
        let space_pan =
            !ctx.wants_keyboard_input() && ui.input(|i| i.key_down(Key::Space));
        let pan_latch = ui.make_persistent_id("canvas_space_pan");
        if response.drag_started_by(PointerButton::Primary) {
            ui.data_mut(|d| d.insert_temp(pan_latch, space_pan));
        }
        let pan_drag = ui.data(|d| d.get_temp(pan_latch)).unwrap_or(false);

        if pan_drag {
            if response.dragged_by(PointerButton::Primary) {
                view.origin += response.drag_delta();
            }
        } else {
            if response.drag_started_by(PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    tools.route_pointer_event(editor, PointerEvent::Down(view.to_surface(pos)));
                }
            } else if response.dragged_by(PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    tools.route_pointer_event(editor, PointerEvent::Move(view.to_surface(pos)));
                }
            }
            if response.drag_stopped_by(PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    tools.route_pointer_event(editor, PointerEvent::Up(view.to_surface(pos)));
                }
            }
        }
        // A press without movement never enters the drag path; feed it
        // through as a down/up pair so clicks paste and clear too.
        if !space_pan && response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let pos = view.to_surface(pos);
                tools.route_pointer_event(editor, PointerEvent::Down(pos));
                tools.route_pointer_event(editor, PointerEvent::Up(pos));
            }
        }

        let hover_surface = response.hover_pos().map(|p| view.to_surface(p));
        if space_pan && response.hovered() {
            ctx.set_cursor_icon(if response.dragged_by(PointerButton::Primary) {
                CursorIcon::Grabbing
            } else {
                CursorIcon::Grab
            });
        } else if let Some(resize) = &tools.resize {
            if let Some(pos) = hover_surface {
                let icon = match resize.hit_corner(pos, tools.handle_radius) {
                    Some(corner) => corner.cursor_icon(),
                    None if resize.box_rect().contains(pos) => CursorIcon::Move,
                    None => CursorIcon::Default,
                };
                ctx.set_cursor_icon(icon);
            }
        } else if response.hovered()
            && matches!(
                tools.kind,
                ToolKind::Pencil | ToolKind::Brush | ToolKind::Eraser
            )
        {
            ctx.set_cursor_icon(CursorIcon::Crosshair);
        }

        let eraser_cursor = (tools.kind == ToolKind::Eraser)
            .then(|| hover_surface.map(|p| (p, tools.settings.eraser_size)))
            .flatten();
        let selection = (editor.selection.active || !editor.selection.polygon.is_empty())
            .then_some(&editor.selection);
        let paste_ghost = editor
            .paste_armed()
            .then(|| editor.clipboard().zip(hover_surface))
            .flatten();
        let overlays = Overlays {
            live_stroke: tools.live_stroke(),
            eraser_cursor,
            selection,
            paste_ghost,
            resize: tools.resize.as_ref(),
        };
        compositor.render_frame(
            &painter,
            view,
            &editor.document,
            editor.current_frame(),
            &editor.view,
            assets,
            Some(&overlays),
        );

        let show_menu = editor.selection.active
            && !editor.selection.is_empty()
            && tools.resize.is_none()
            && !response.dragged();
        if show_menu {
            if let Some(anchor) = editor.selection.menu_anchor() {
                let menu_pos = view.to_screen(anchor) + vec2(0.0, 12.0);
                Area::new(Id::new("selection_actions"))
                    .order(Order::Foreground)
                    .fixed_pos(menu_pos)
                    .show(ctx, |ui| {
                        Frame::popup(ui.style()).show(ui, |ui| {
                            ui.horizontal(|ui| {
                                if ui.button("Copy").clicked() {
                                    editor.copy_selection();
                                }
                                if ui.button("Delete").clicked() {
                                    editor.delete_selection();
                                }
                                if ui.button("Resize").clicked() {
                                    tools.begin_resize(editor);
                                }
                            });
                        });
                    });
            }
        }

        // Drops on the canvas land at the playhead, on the active row (or
        // the first row before anything is active).
        if let Some((urls, _)) = super::dropped_files(ctx, response.rect) {
            let timeline = editor.document.timeline();
            let row = editor
                .active_folder()
                .and_then(|id| timeline.folder(id))
                .map(|f| f.row)
                .or_else(|| timeline.rows().first().map(|r| r.id));
            if let Some(row) = row {
                let frame = editor.current_frame();
                for (offset, url) in urls.into_iter().enumerate() {
                    editor.drop_asset(row, frame + offset, AssetRef { url, key: None });
                }
            }
        }
    });
}
