use egui::{
    vec2, Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Stroke as EguiStroke, Ui,
};

use crate::app::FlipbookApp;
use crate::editor::Editor;
use crate::playback::PlaybackController;
use crate::timeline::{AssetRef, FolderEdge, FrameFolder, Row, ZShift};
use crate::tools::ToolBox;
use crate::util::time;

const CELL_W: f32 = 26.0;
const CELL_H: f32 = 22.0;
const HEADER_H: f32 = 16.0;
const ROW_LABEL_W: f32 = 96.0;

const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(214, 82, 67);

/// Span tints, picked by folder id so neighbours rarely match.
const FOLDER_TINTS: [Color32; 5] = [
    Color32::from_rgb(171, 200, 231),
    Color32::from_rgb(183, 223, 185),
    Color32::from_rgb(240, 214, 162),
    Color32::from_rgb(219, 190, 227),
    Color32::from_rgb(236, 188, 180),
];

fn folder_tint(folder: &FrameFolder) -> Color32 {
    FOLDER_TINTS[(folder.id.0 % FOLDER_TINTS.len() as u64) as usize]
}

pub fn timeline_panel(app: &mut FlipbookApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("timeline_panel")
        .resizable(true)
        .default_height(190.0)
        .show(ctx, |ui| {
            let FlipbookApp {
                editor,
                tools,
                playback,
                ..
            } = app;

            controls_row(ui, editor, playback);
            ui.separator();
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let frame_count = editor.document.timeline().frame_count();
                    let rows: Vec<Row> = editor.document.timeline().rows().to_vec();
                    header_strip(ui, frame_count, editor.current_frame());
                    for row in &rows {
                        row_strip(ui, editor, playback, tools, row, frame_count);
                    }
                    active_folder_bar(ui, editor);
                });
        });
}

fn controls_row(ui: &mut Ui, editor: &mut Editor, playback: &mut PlaybackController) {
    ui.horizontal(|ui| {
        let label = if playback.is_playing() { "Pause" } else { "Play" };
        if ui.button(label).clicked() {
            playback.toggle(time::current_time_secs());
        }
        ui.add(
            egui::DragValue::new(&mut editor.view.fps)
                .range(1.0..=60.0)
                .speed(0.5)
                .suffix(" fps"),
        );
        ui.checkbox(&mut editor.view.loop_playback, "Loop");
        ui.separator();
        let frame_count = editor.document.timeline().frame_count();
        ui.label(format!("Frame {}/{}", editor.current_frame() + 1, frame_count));
        if ui.button("+ Frame").clicked() {
            editor.add_frame();
        }
        if ui.button("+ Row").clicked() {
            editor.add_row();
        }
    });
}

fn header_strip(ui: &mut Ui, frame_count: usize, current: usize) {
    let width = ROW_LABEL_W + CELL_W * frame_count as f32;
    let (rect, _) = ui.allocate_exact_size(vec2(width, HEADER_H), Sense::hover());
    let painter = ui.painter_at(rect);
    let weak = ui.visuals().weak_text_color();
    for frame in 0..frame_count {
        let is_current = frame == current;
        if !is_current && frame != 0 && (frame + 1) % 5 != 0 {
            continue;
        }
        let x = rect.min.x + ROW_LABEL_W + (frame as f32 + 0.5) * CELL_W;
        painter.text(
            Pos2::new(x, rect.center().y),
            Align2::CENTER_CENTER,
            format!("{}", frame + 1),
            FontId::proportional(10.0),
            if is_current { PLAYHEAD_COLOR } else { weak },
        );
    }
}

fn row_strip(
    ui: &mut Ui,
    editor: &mut Editor,
    playback: &mut PlaybackController,
    tools: &mut ToolBox,
    row: &Row,
    frame_count: usize,
) {
    let folders: Vec<FrameFolder> = editor
        .document
        .timeline()
        .folders()
        .iter()
        .filter(|f| f.row == row.id)
        .cloned()
        .collect();
    let active = editor.active_folder();
    let current = editor.current_frame();

    let width = ROW_LABEL_W + CELL_W * frame_count as f32;
    let (rect, strip_response) =
        ui.allocate_exact_size(vec2(width, CELL_H + 2.0), Sense::click());
    let painter = ui.painter_at(rect.expand(2.0));
    let visuals = ui.visuals().clone();

    let add_rect = Rect::from_min_size(rect.min, vec2(16.0, CELL_H));
    let add_response = ui.interact(
        add_rect,
        ui.id().with((row.id, "add_folder")),
        Sense::click(),
    );
    painter.text(
        add_rect.center(),
        Align2::CENTER_CENTER,
        "+",
        FontId::proportional(13.0),
        if add_response.hovered() {
            visuals.strong_text_color()
        } else {
            visuals.weak_text_color()
        },
    );
    if add_response.clicked() {
        editor.add_folder(row.id);
    }
    painter.text(
        Pos2::new(rect.min.x + 22.0, rect.center().y),
        Align2::LEFT_CENTER,
        &row.name,
        FontId::proportional(11.0),
        visuals.text_color(),
    );

    let cells_left = rect.min.x + ROW_LABEL_W;
    let cell_rect = |frame: usize| {
        Rect::from_min_size(
            Pos2::new(cells_left + frame as f32 * CELL_W, rect.min.y + 1.0),
            vec2(CELL_W, CELL_H),
        )
    };

    for frame in 0..frame_count {
        painter.rect_filled(cell_rect(frame).shrink(1.0), 2.0, visuals.faint_bg_color);
    }

    for folder in &folders {
        let span = Rect::from_min_max(
            cell_rect(folder.frame_index).min,
            cell_rect(folder.end() - 1).max,
        )
        .shrink(1.0);
        painter.rect_filled(span, 3.0, folder_tint(folder));
        if active == Some(folder.id) {
            painter.rect_stroke(span, 3.0, visuals.selection.stroke);
        }
        painter.text(
            span.left_center() + vec2(5.0, 0.0),
            Align2::LEFT_CENTER,
            folder.label(),
            FontId::proportional(10.0),
            Color32::from_gray(60),
        );
        if folder.asset.is_some() {
            painter.circle_filled(
                span.right_center() + vec2(-5.0, 0.0),
                2.0,
                Color32::from_gray(60),
            );
        }

        for edge in [FolderEdge::Left, FolderEdge::Right] {
            let x = match edge {
                FolderEdge::Left => span.min.x,
                FolderEdge::Right => span.max.x,
            };
            let grip = Rect::from_center_size(Pos2::new(x, span.center().y), vec2(7.0, CELL_H));
            let grip_response = ui.interact(
                grip,
                ui.id().with((folder.id, edge == FolderEdge::Left)),
                Sense::drag(),
            );
            if grip_response.hovered() || grip_response.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
            }
            if grip_response.drag_started() {
                editor.begin_edit();
            }
            if grip_response.dragged() {
                if let Some(pos) = grip_response.interact_pointer_pos() {
                    let cell = ((pos.x - cells_left) / CELL_W).floor().max(0.0) as usize;
                    let index = match edge {
                        FolderEdge::Left => cell,
                        FolderEdge::Right => cell + 1,
                    };
                    editor.document.set_folder_edge(folder.id, edge, index);
                }
            }
            if grip_response.drag_stopped() {
                editor.commit_edit();
            }
        }
    }

    painter.rect_stroke(
        cell_rect(current).shrink(0.5),
        2.0,
        EguiStroke::new(1.0, PLAYHEAD_COLOR),
    );

    if strip_response.clicked() {
        if let Some(pos) = strip_response.interact_pointer_pos() {
            if pos.x >= cells_left {
                let frame =
                    (((pos.x - cells_left) / CELL_W) as usize).min(frame_count.saturating_sub(1));
                playback.stop();
                if tools.resize.is_some() {
                    tools.cancel_resize(editor);
                }
                editor.set_frame(frame);
                let folder = editor
                    .document
                    .timeline()
                    .folder_at_cell(row.id, frame)
                    .map(|f| f.id);
                editor.set_active_folder(folder);
            }
        }
    }

    // Raster drops land on the cell under the pointer; a multi-file drop
    // fills consecutive cells.
    let hovering_files = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    if hovering_files {
        if let Some(pos) = ui.ctx().pointer_latest_pos() {
            if rect.contains(pos) && pos.x >= cells_left {
                let frame = (((pos.x - cells_left) / CELL_W) as usize)
                    .min(frame_count.saturating_sub(1));
                painter.rect_stroke(
                    cell_rect(frame),
                    2.0,
                    EguiStroke::new(1.5, visuals.selection.stroke.color),
                );
            }
        }
    }
    if let Some((urls, pos)) = super::dropped_files(ui.ctx(), rect) {
        if pos.x >= cells_left {
            let frame =
                (((pos.x - cells_left) / CELL_W) as usize).min(frame_count.saturating_sub(1));
            for (offset, url) in urls.into_iter().enumerate() {
                editor.drop_asset(row.id, frame + offset, AssetRef { url, key: None });
            }
        }
    }
}

fn active_folder_bar(ui: &mut Ui, editor: &mut Editor) {
    let Some(folder_id) = editor.active_folder() else {
        return;
    };
    let Some(name) = editor
        .document
        .timeline()
        .folder(folder_id)
        .map(|f| f.name.clone())
    else {
        return;
    };

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Folder:");
        let buffer_id = ui.make_persistent_id(("folder_rename", folder_id));
        let mut text = ui
            .data_mut(|d| d.get_temp::<String>(buffer_id))
            .unwrap_or_else(|| name.clone().unwrap_or_default());
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text("name")
                .desired_width(120.0),
        );
        if response.changed() {
            ui.data_mut(|d| d.insert_temp(buffer_id, text.clone()));
        }
        if response.lost_focus() {
            ui.data_mut(|d| d.remove::<String>(buffer_id));
            let new_name = (!text.trim().is_empty()).then(|| text.trim().to_owned());
            if new_name != name {
                editor.rename_folder(folder_id, new_name);
            }
        }
        if ui.button("Backward").clicked() {
            editor.reorder_z(folder_id, ZShift::Backward);
        }
        if ui.button("Forward").clicked() {
            editor.reorder_z(folder_id, ZShift::Forward);
        }
        if ui.button("Delete").clicked() {
            editor.delete_folder(folder_id);
        }
    });
}
