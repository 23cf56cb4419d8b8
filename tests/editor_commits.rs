use std::sync::Arc;

use eframe_flipbook::editor::Editor;
use eframe_flipbook::id::StrokeId;
use eframe_flipbook::stroke::{BrushKind, MutableStroke};
use eframe_flipbook::tools::{LassoTool, PointerEvent, ToolBox, ToolKind};
use egui::{Color32, Pos2};

// Helper to create an editor with one folder on the first row, ready to
// draw on its main layer. Setup pushes are cleared so tests count only
// their own undo steps.
fn create_test_editor() -> Editor {
    let mut editor = Editor::new();
    let row = editor.document.timeline().rows()[0].id;
    editor.add_folder(row).unwrap();
    editor.history.clear();
    editor
}

// Helper to commit a two-point stroke and return its id.
fn draw_stroke(editor: &mut Editor, from: Pos2, to: Pos2) -> StrokeId {
    let layer = editor.active_layer().unwrap();
    let mut stroke = MutableStroke::new(Color32::RED, 2.0, BrushKind::Pencil, layer);
    stroke.add_point(from);
    stroke.add_point(to);
    editor.commit_stroke(stroke);
    editor
        .document
        .strokes()
        .layer_strokes(layer)
        .last()
        .unwrap()
        .id()
}

// Helper to mark strokes as the active lasso selection, with a rectangular
// polygon around the given bounds.
fn select_strokes(editor: &mut Editor, ids: &[StrokeId], min: Pos2, max: Pos2) {
    editor.selection.polygon = vec![
        min,
        Pos2::new(max.x, min.y),
        max,
        Pos2::new(min.x, max.y),
    ];
    editor.selection.stroke_ids = ids.iter().copied().collect();
    editor.selection.active = true;
}

#[test]
fn test_commit_stroke_is_one_undo_step() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    let id = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
    assert_eq!(editor.document.strokes().layer_strokes(layer).len(), 1);
    assert_eq!(editor.history.undo_depth(), 1);

    // Undo removes the stroke
    assert!(editor.undo());
    assert!(editor.document.strokes().layer_strokes(layer).is_empty());

    // Redo brings back the same stroke
    assert!(editor.redo());
    let strokes = editor.document.strokes().layer_strokes(layer);
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].id(), id);
}

#[test]
fn test_undo_redo_round_trips_the_document() {
    let mut editor = create_test_editor();
    draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
    let before = editor.document.snapshot();

    draw_stroke(&mut editor, Pos2::new(40.0, 40.0), Pos2::new(60.0, 60.0));
    let after = editor.document.snapshot();
    assert_ne!(before, after);

    assert!(editor.undo());
    assert_eq!(editor.document.snapshot(), before);
    assert!(editor.redo());
    assert_eq!(editor.document.snapshot(), after);
}

#[test]
fn test_single_point_stroke_is_dropped() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    let mut stroke = MutableStroke::new(Color32::RED, 2.0, BrushKind::Pencil, layer);
    stroke.add_point(Pos2::new(10.0, 10.0));
    editor.commit_stroke(stroke);

    // A stray click never reaches the document or the history
    assert!(editor.document.strokes().layer_strokes(layer).is_empty());
    assert_eq!(editor.history.undo_depth(), 0);
}

#[test]
fn test_gesture_commit_skips_unchanged_document() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    // A gesture that never touched the document pushes nothing
    editor.begin_edit();
    assert!(!editor.commit_edit());
    assert_eq!(editor.history.undo_depth(), 0);

    // The same gesture with a real mutation pushes one step
    editor.begin_edit();
    assert!(editor.document.set_layer_opacity(layer, 0.5));
    assert!(editor.commit_edit());
    assert_eq!(editor.history.undo_depth(), 1);
}

#[test]
fn test_copy_paste_places_fresh_strokes() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    let id = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
    select_strokes(&mut editor, &[id], Pos2::new(0.0, 0.0), Pos2::new(40.0, 40.0));

    assert!(editor.copy_selection());
    assert!(editor.arm_paste());
    assert!(editor.paste_at(Pos2::new(120.0, 220.0)));
    assert!(!editor.paste_armed());

    let strokes = editor.document.strokes().layer_strokes(layer);
    assert_eq!(strokes.len(), 2);

    // The pasted copy gets its own id
    let pasted = strokes.last().unwrap();
    assert_ne!(pasted.id(), id);

    // The copied bounds centre (20, 20) lands on the paste position, so
    // every point moved by (100, 200)
    assert!((pasted.points()[0].x - 110.0).abs() < 0.001);
    assert!((pasted.points()[0].y - 210.0).abs() < 0.001);
    assert!((pasted.points()[1].x - 130.0).abs() < 0.001);
    assert!((pasted.points()[1].y - 230.0).abs() < 0.001);

    // Drawing plus paste makes two undo steps
    assert_eq!(editor.history.undo_depth(), 2);
}

#[test]
fn test_paste_needs_clipboard() {
    let mut editor = create_test_editor();

    // Nothing copied yet
    assert!(!editor.arm_paste());
    assert!(!editor.paste_at(Pos2::new(50.0, 50.0)));
    assert_eq!(editor.history.undo_depth(), 0);
}

#[test]
fn test_delete_selection_removes_only_selected() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    let a = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
    let b = draw_stroke(&mut editor, Pos2::new(40.0, 10.0), Pos2::new(50.0, 20.0));
    let c = draw_stroke(&mut editor, Pos2::new(70.0, 10.0), Pos2::new(80.0, 20.0));
    select_strokes(&mut editor, &[a, b], Pos2::new(0.0, 0.0), Pos2::new(60.0, 30.0));

    assert!(editor.delete_selection());

    let strokes = editor.document.strokes().layer_strokes(layer);
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].id(), c);
    assert!(editor.selection.is_empty());

    // Undo restores all three
    assert!(editor.undo());
    assert_eq!(editor.document.strokes().layer_strokes(layer).len(), 3);
}

#[test]
fn test_lasso_drag_moves_selection_in_one_step() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();

    let a = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
    let b = draw_stroke(&mut editor, Pos2::new(30.0, 10.0), Pos2::new(40.0, 20.0));
    let c = draw_stroke(&mut editor, Pos2::new(200.0, 200.0), Pos2::new(210.0, 210.0));
    let untouched = editor.document.strokes().layer_strokes(layer)[2].clone();
    editor.history.clear();

    select_strokes(&mut editor, &[a, b], Pos2::new(0.0, 0.0), Pos2::new(50.0, 30.0));

    // Drag from inside the polygon by (10, 10)
    let mut lasso = LassoTool::default();
    lasso.on_down(&mut editor, Pos2::new(25.0, 15.0));
    lasso.on_move(&mut editor, Pos2::new(30.0, 18.0));
    lasso.on_move(&mut editor, Pos2::new(35.0, 25.0));
    lasso.on_up(&mut editor, Pos2::new(35.0, 25.0));

    // Exactly one undo step for the whole drag
    assert_eq!(editor.history.undo_depth(), 1);

    let strokes = editor.document.strokes().layer_strokes(layer);
    let moved = strokes.iter().find(|s| s.id() == a).unwrap();
    assert!((moved.points()[0].x - 20.0).abs() < 0.001);
    assert!((moved.points()[0].y - 20.0).abs() < 0.001);

    // The selected strokes keep their ids across the move
    assert!(strokes.iter().any(|s| s.id() == b));

    // The unselected stroke was never rebuilt
    let after = strokes.iter().find(|s| s.id() == c).unwrap();
    assert!(Arc::ptr_eq(&untouched, after));

    // The polygon followed the drag
    assert!((editor.selection.polygon[0].x - 10.0).abs() < 0.001);
    assert!((editor.selection.polygon[0].y - 10.0).abs() < 0.001);

    // Undo puts the strokes back
    assert!(editor.undo());
    let strokes = editor.document.strokes().layer_strokes(layer);
    let back = strokes.iter().find(|s| s.id() == a).unwrap();
    assert!((back.points()[0].x - 10.0).abs() < 0.001);
}

#[test]
fn test_lasso_click_inside_polygon_moves_nothing() {
    let mut editor = create_test_editor();
    let id = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
    select_strokes(&mut editor, &[id], Pos2::new(0.0, 0.0), Pos2::new(30.0, 30.0));
    editor.history.clear();

    // Down and up at the same spot
    let mut lasso = LassoTool::default();
    lasso.on_down(&mut editor, Pos2::new(15.0, 15.0));
    lasso.on_up(&mut editor, Pos2::new(15.0, 15.0));

    assert_eq!(editor.history.undo_depth(), 0);
}

#[test]
fn test_marquee_selects_strokes_inside_polygon() {
    let mut editor = create_test_editor();
    let inside = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
    let outside = draw_stroke(&mut editor, Pos2::new(200.0, 200.0), Pos2::new(210.0, 210.0));

    // Trace a marquee around the first stroke
    let mut lasso = LassoTool::default();
    lasso.on_down(&mut editor, Pos2::new(0.0, 0.0));
    lasso.on_move(&mut editor, Pos2::new(40.0, 0.0));
    lasso.on_move(&mut editor, Pos2::new(40.0, 40.0));
    lasso.on_move(&mut editor, Pos2::new(0.0, 40.0));
    lasso.on_up(&mut editor, Pos2::new(0.0, 40.0));

    assert!(editor.selection.active);
    assert!(editor.selection.stroke_ids.contains(&inside));
    assert!(!editor.selection.stroke_ids.contains(&outside));
}

#[test]
fn test_armed_paste_intercepts_pointer_down() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();
    let id = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
    select_strokes(&mut editor, &[id], Pos2::new(0.0, 0.0), Pos2::new(40.0, 40.0));
    editor.copy_selection();
    editor.arm_paste();

    // The pencil is active, but the armed paste takes the click
    let mut tools = ToolBox::new();
    tools.route_pointer_event(&mut editor, PointerEvent::Down(Pos2::new(100.0, 100.0)));

    assert_eq!(editor.document.strokes().layer_strokes(layer).len(), 2);
    assert!(!editor.paste_armed());
    assert!(tools.live_stroke().is_none());
}

#[test]
fn test_switching_tools_drops_selection() {
    let mut editor = create_test_editor();
    let id = draw_stroke(&mut editor, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
    select_strokes(&mut editor, &[id], Pos2::new(0.0, 0.0), Pos2::new(40.0, 40.0));

    let mut tools = ToolBox::new();
    tools.set_tool(&mut editor, ToolKind::Eraser);

    assert!(editor.selection.is_empty());
    assert!(!editor.selection.active);
}

#[test]
fn test_undo_clears_stale_drawing_target() {
    let mut editor = Editor::new();
    let row = editor.document.timeline().rows()[0].id;
    let folder = editor.add_folder(row).unwrap();
    assert_eq!(editor.active_folder(), Some(folder));

    // Undoing the folder creation leaves nothing to point at
    assert!(editor.undo());
    assert!(editor.document.timeline().folder(folder).is_none());
    assert_eq!(editor.active_folder(), None);
    assert_eq!(editor.active_layer(), None);
}

#[test]
fn test_hidden_layer_rejects_drawing() {
    let mut editor = create_test_editor();
    let layer = editor.active_layer().unwrap();
    editor.document.set_layer_visible(layer, false);
    assert!(!editor.can_edit_active_layer());

    // The freehand tool refuses to start on a hidden layer
    let mut tools = ToolBox::new();
    tools.route_pointer_event(&mut editor, PointerEvent::Down(Pos2::new(10.0, 10.0)));
    assert!(tools.live_stroke().is_none());
}
