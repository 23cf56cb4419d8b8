use std::sync::Arc;

use eframe_flipbook::document::Document;
use eframe_flipbook::id::{self, FolderId};
use eframe_flipbook::layer::LayerId;
use eframe_flipbook::stroke::{BrushKind, Stroke};
use eframe_flipbook::timeline::{
    FolderEdge, FrameFolder, Row, RowId, Timeline, ZShift, DEFAULT_FRAME_COUNT,
};
use egui::{Color32, Pos2};

// Helper to read a folder's covered range as (start, exclusive end).
fn folder_range(timeline: &Timeline, id: FolderId) -> (usize, usize) {
    let folder = timeline.folder(id).unwrap();
    (folder.frame_index, folder.end())
}

#[test]
fn test_new_timeline_has_one_row_and_default_frames() {
    let timeline = Timeline::new();
    assert_eq!(timeline.rows().len(), 1);
    assert_eq!(timeline.frame_count(), DEFAULT_FRAME_COUNT);
    assert!(timeline.folders().is_empty());
}

#[test]
fn test_add_folder_takes_first_free_cell() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;

    let first = timeline.add_folder(row).unwrap();
    let second = timeline.add_folder(row).unwrap();
    assert_eq!(folder_range(&timeline, first), (0, 1));
    assert_eq!(folder_range(&timeline, second), (1, 2));

    // Widen the second folder; the next add skips past it
    assert!(timeline.set_folder_edge(second, FolderEdge::Right, 5));
    let third = timeline.add_folder(row).unwrap();
    assert_eq!(folder_range(&timeline, third), (5, 6));
}

#[test]
fn test_add_folder_at_rejects_covered_cells() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;

    let folder = timeline.add_folder_at(row, 3).unwrap();
    assert!(timeline.set_folder_edge(folder, FolderEdge::Right, 6));

    // Frames 3..6 are taken
    assert!(timeline.add_folder_at(row, 3).is_none());
    assert!(timeline.add_folder_at(row, 5).is_none());
    assert!(timeline.add_folder_at(row, 6).is_some());

    // The same frames on another row are free
    let other = timeline.add_row();
    assert!(timeline.add_folder_at(other, 4).is_some());
}

#[test]
fn test_folder_edges_never_overlap_a_neighbour() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;

    let left = timeline.add_folder_at(row, 0).unwrap();
    let right = timeline.add_folder_at(row, 5).unwrap();

    // Growing the left folder stops short of the right one
    assert!(timeline.set_folder_edge(left, FolderEdge::Right, 5));
    assert!(!timeline.set_folder_edge(left, FolderEdge::Right, 6));
    assert_eq!(folder_range(&timeline, left), (0, 5));

    // Moving the right folder's start into the left one fails too
    assert!(!timeline.set_folder_edge(right, FolderEdge::Left, 4));
    assert_eq!(folder_range(&timeline, right), (5, 6));
}

#[test]
fn test_folder_span_keeps_at_least_one_frame() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder_at(row, 2).unwrap();

    // The left edge may not reach or pass the end
    assert!(!timeline.set_folder_edge(folder, FolderEdge::Left, 3));
    assert!(!timeline.set_folder_edge(folder, FolderEdge::Left, 4));

    // The right edge may not reach or pass the start
    assert!(!timeline.set_folder_edge(folder, FolderEdge::Right, 2));
    assert!(!timeline.set_folder_edge(folder, FolderEdge::Right, 1));

    assert_eq!(folder_range(&timeline, folder), (2, 3));
}

#[test]
fn test_right_edge_growth_extends_the_timeline() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder_at(row, 10).unwrap();
    assert_eq!(timeline.frame_count(), DEFAULT_FRAME_COUNT);

    assert!(timeline.set_folder_edge(folder, FolderEdge::Right, 15));
    assert_eq!(timeline.frame_count(), 15);
    assert_eq!(folder_range(&timeline, folder), (10, 15));
}

#[test]
fn test_left_edge_moves_start_keeping_end() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder_at(row, 3).unwrap();
    assert!(timeline.set_folder_edge(folder, FolderEdge::Right, 6));

    assert!(timeline.set_folder_edge(folder, FolderEdge::Left, 1));
    assert_eq!(folder_range(&timeline, folder), (1, 6));

    // Setting an edge to where it already is reports no change
    assert!(!timeline.set_folder_edge(folder, FolderEdge::Left, 1));
}

#[test]
fn test_folder_lookup_by_cell_and_frame() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder_at(row, 2).unwrap();
    assert!(timeline.set_folder_edge(folder, FolderEdge::Right, 5));

    assert!(timeline.folder_at_cell(row, 1).is_none());
    assert_eq!(timeline.folder_at_cell(row, 2).unwrap().id, folder);
    assert_eq!(timeline.folder_at_cell(row, 4).unwrap().id, folder);
    assert!(timeline.folder_at_cell(row, 5).is_none());

    assert_eq!(timeline.folders_at(3).count(), 1);
    assert_eq!(timeline.folders_at(7).count(), 0);
}

#[test]
fn test_reorder_z_swaps_peers_sharing_a_start() {
    let mut timeline = Timeline::new();
    let top_row = timeline.rows()[0].id;
    let bottom_row = timeline.add_row();

    let a = timeline.add_folder_at(top_row, 0).unwrap();
    let b = timeline.add_folder_at(bottom_row, 0).unwrap();
    let c = timeline.add_folder_at(top_row, 4).unwrap();

    let order = |t: &Timeline| -> Vec<_> { t.folders().iter().map(|f| f.id).collect() };
    assert_eq!(order(&timeline), vec![a, b, c]);

    // a and b start on frame 0 and can trade places; c starts elsewhere
    assert!(timeline.reorder_z(a, ZShift::Forward));
    assert_eq!(order(&timeline), vec![b, a, c]);

    assert!(!timeline.reorder_z(a, ZShift::Forward));
    assert!(timeline.reorder_z(a, ZShift::Backward));
    assert_eq!(order(&timeline), vec![a, b, c]);

    assert!(!timeline.reorder_z(a, ZShift::Backward));
    assert!(!timeline.reorder_z(c, ZShift::Forward));
}

#[test]
fn test_rename_folder_trims_and_clears() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder(row).unwrap();

    // Default label falls back to the 1-indexed start frame
    assert_eq!(timeline.folder(folder).unwrap().label(), "Frame 1");

    assert!(timeline.rename_folder(folder, Some("Walk cycle".to_owned())));
    assert_eq!(timeline.folder(folder).unwrap().label(), "Walk cycle");

    // Renaming to the same name is not a change
    assert!(!timeline.rename_folder(folder, Some("Walk cycle".to_owned())));

    // Blank names clear back to the fallback
    assert!(timeline.rename_folder(folder, Some("   ".to_owned())));
    assert_eq!(timeline.folder(folder).unwrap().label(), "Frame 1");
    assert!(!timeline.rename_folder(folder, None));
}

#[test]
fn test_extra_layers_stack_above_main() {
    let mut timeline = Timeline::new();
    let row = timeline.rows()[0].id;
    let folder = timeline.add_folder(row).unwrap();

    assert_eq!(timeline.layer_order(folder), &[LayerId::main(folder)]);

    let first = timeline.add_extra_layer(folder).unwrap();
    let second = timeline.add_extra_layer(folder).unwrap();
    assert_eq!(first, LayerId::extra(folder, 0));
    assert_eq!(second, LayerId::extra(folder, 1));
    assert_eq!(
        timeline.layer_order(folder),
        &[LayerId::main(folder), first, second]
    );
}

#[test]
fn test_delete_folder_cascades_through_the_document() {
    let mut document = Document::new();
    let row = document.timeline().rows()[0].id;
    let folder = document.add_folder(row).unwrap();
    let main = LayerId::main(folder);
    let extra = document.add_extra_layer(folder).unwrap();

    document.append_stroke(Arc::new(Stroke::new(
        id::next_stroke_id(),
        vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0)],
        Color32::RED,
        2.0,
        BrushKind::Pencil,
        main,
    )));
    document.append_stroke(Arc::new(Stroke::new(
        id::next_stroke_id(),
        vec![Pos2::new(5.0, 5.0), Pos2::new(15.0, 15.0)],
        Color32::BLUE,
        2.0,
        BrushKind::Pencil,
        extra,
    )));
    document.set_layer_opacity(extra, 0.4);

    assert!(document.delete_folder(folder));

    // The folder, its strokes and its attributes are all gone
    assert!(document.timeline().folder(folder).is_none());
    assert!(document.strokes().layer_strokes(main).is_empty());
    assert!(document.strokes().layer_strokes(extra).is_empty());
    assert_eq!(document.strokes().stroke_count(), 0);
    assert!((document.layer_attrs(extra).opacity - 1.0).abs() < 0.001);

    // Deleting again reports nothing to do
    assert!(!document.delete_folder(folder));
}

#[test]
fn test_from_parts_prunes_orphans_and_backfills_order() {
    let row = Row {
        id: RowId::new(),
        name: "Row 1".to_owned(),
    };
    let kept = FrameFolder {
        id: id::next_folder_id(),
        row: row.id,
        frame_index: 14,
        span: 2,
        asset: None,
        name: None,
    };
    let orphan = FrameFolder {
        id: id::next_folder_id(),
        row: RowId::new(),
        frame_index: 0,
        span: 1,
        asset: None,
        name: None,
    };

    let timeline = Timeline::from_parts(
        vec![row],
        vec![kept.clone(), orphan.clone()],
        vec![(orphan.id, vec![LayerId::main(orphan.id)])],
        12,
    );

    // The folder on the unknown row is dropped, along with its order entry
    assert!(timeline.folder(kept.id).is_some());
    assert!(timeline.folder(orphan.id).is_none());
    assert_eq!(timeline.layer_order_entries().count(), 1);

    // The kept folder had no order entry saved; it gets the main layer
    assert_eq!(timeline.layer_order(kept.id), &[LayerId::main(kept.id)]);

    // The frame count grows to cover the furthest folder
    assert_eq!(timeline.frame_count(), 16);
}

#[test]
fn test_from_parts_never_leaves_zero_rows() {
    let timeline = Timeline::from_parts(Vec::new(), Vec::new(), Vec::new(), 0);
    assert_eq!(timeline.rows().len(), 1);
    assert!(timeline.frame_count() >= 1);
}
