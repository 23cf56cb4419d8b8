use egui::{Button, Slider};

use crate::app::FlipbookApp;
use crate::editor::Editor;
use crate::layer::{LayerId, LayerSlot};
use crate::renderer::OnionSkinMode;
use crate::tools::{EraserMode, ToolBox, ToolKind};

pub fn tools_panel(app: &mut FlipbookApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            let FlipbookApp { editor, tools, .. } = app;

            ui.heading("Tools");
            for kind in ToolKind::ALL {
                if ui
                    .selectable_label(tools.kind == kind, kind.label())
                    .clicked()
                {
                    tools.set_tool(editor, kind);
                }
            }
            ui.separator();

            ui.horizontal(|ui| {
                // Undo would jump over the snapshot an open resize holds.
                let blocked = tools.resize.is_some();
                let can_undo = editor.history.can_undo() && !blocked;
                let can_redo = editor.history.can_redo() && !blocked;
                if ui.add_enabled(can_undo, Button::new("Undo")).clicked() {
                    editor.undo();
                }
                if ui.add_enabled(can_redo, Button::new("Redo")).clicked() {
                    editor.redo();
                }
            });
            ui.separator();

            tool_options(ui, editor, tools);
            ui.separator();

            layers_section(ui, editor);
            ui.separator();

            ui.heading("View");
            ui.checkbox(&mut editor.view.show_grid, "Grid");
            egui::ComboBox::from_id_salt("onion_skin_mode")
                .selected_text(format!("Onion: {}", editor.view.onion_skin.label()))
                .show_ui(ui, |ui| {
                    for mode in OnionSkinMode::ALL {
                        ui.selectable_value(&mut editor.view.onion_skin, mode, mode.label());
                    }
                });
        });
}

fn tool_options(ui: &mut egui::Ui, editor: &mut Editor, tools: &mut ToolBox) {
    match tools.kind {
        ToolKind::Pencil => {
            ui.horizontal(|ui| {
                ui.label("Color");
                ui.color_edit_button_srgba(&mut tools.settings.color);
            });
            ui.add(Slider::new(&mut tools.settings.pencil_width, 0.5..=12.0).text("Width"));
        }
        ToolKind::Brush => {
            ui.horizontal(|ui| {
                ui.label("Color");
                ui.color_edit_button_srgba(&mut tools.settings.color);
            });
            ui.add(Slider::new(&mut tools.settings.brush_width, 1.0..=32.0).text("Width"));
        }
        ToolKind::Eraser => {
            ui.add(Slider::new(&mut tools.settings.eraser_size, 2.0..=64.0).text("Size"));
            ui.horizontal(|ui| {
                for mode in [EraserMode::Whole, EraserMode::Precision] {
                    ui.radio_value(&mut tools.settings.eraser_mode, mode, mode.label());
                }
            });
        }
        ToolKind::Lasso => {
            if tools.resize.is_some() {
                ui.label("Drag the corners, then apply.");
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        tools.confirm_resize(editor);
                    }
                    if ui.button("Cancel").clicked() {
                        tools.cancel_resize(editor);
                    }
                });
            } else {
                ui.label("Drag around strokes to select.");
                let has_selection = editor.selection.active && !editor.selection.is_empty();
                if has_selection {
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
                }
                if editor.clipboard().is_some() && ui.button("Paste").clicked() {
                    editor.arm_paste();
                }
            }
        }
    }
}

fn layers_section(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Layers");
    let Some(folder) = editor.active_folder() else {
        ui.label("Select a frame on the timeline.");
        return;
    };
    // Top of the stack first.
    let order: Vec<LayerId> = editor
        .document
        .timeline()
        .layer_order(folder)
        .iter()
        .rev()
        .copied()
        .collect();
    for layer in order {
        layer_row(ui, editor, layer);
    }
    if ui.button("Add Layer").clicked() {
        if let Some(layer) = editor.add_extra_layer(folder) {
            editor.set_active_layer(layer);
        }
    }
}

fn layer_row(ui: &mut egui::Ui, editor: &mut Editor, layer: LayerId) {
    let attrs = editor.document.layer_attrs(layer);
    ui.horizontal(|ui| {
        let mut visible = attrs.visible;
        if ui.checkbox(&mut visible, "").changed() {
            editor.set_layer_visible(layer, visible);
        }
        let label = match layer.slot {
            LayerSlot::Main => "Main".to_owned(),
            LayerSlot::Extra(n) => format!("Layer {}", n + 1),
        };
        if ui
            .selectable_label(editor.active_layer() == Some(layer), label)
            .clicked()
        {
            editor.set_active_layer(layer);
        }
    });

    // The whole slider drag is one undo step; keyboard nudges commit one
    // step each.
    let mut opacity = attrs.opacity;
    let response = ui.add(Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"));
    if response.drag_started() {
        editor.begin_edit();
    }
    if response.changed() {
        let one_shot = !editor.has_pending_edit();
        if one_shot {
            editor.begin_edit();
        }
        editor.document.set_layer_opacity(layer, opacity);
        if one_shot {
            editor.commit_edit();
        }
    }
    if response.drag_stopped() {
        editor.commit_edit();
    }
}
