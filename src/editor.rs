use std::collections::HashSet;

use egui::Pos2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentSnapshot};
use crate::geometry;
use crate::history::History;
use crate::id::{self, FolderId, StrokeId};
use crate::layer::LayerId;
use crate::renderer::OnionSkinMode;
use crate::stroke::{MutableStroke, Stroke};
use crate::timeline::{AssetRef, RowId, ZShift};

/// Presentation settings the panels and the compositor share. Saved with
/// the document so a reload comes back looking the same.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub show_grid: bool,
    pub onion_skin: OnionSkinMode,
    pub fps: f32,
    pub loop_playback: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            onion_skin: OnionSkinMode::Above,
            fps: 12.0,
            loop_playback: true,
        }
    }
}

/// The lasso selection. While the marquee is being drawn `active` is false
/// and `stroke_ids` is empty; once closed, the hit strokes are recorded and
/// the polygon stays up as the draggable outline.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub polygon: Vec<Pos2>,
    pub stroke_ids: HashSet<StrokeId>,
    pub active: bool,
}

impl Selection {
    pub fn clear(&mut self) {
        self.polygon.clear();
        self.stroke_ids.clear();
        self.active = false;
    }

    pub fn is_empty(&self) -> bool {
        self.stroke_ids.is_empty()
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        geometry::polygon_contains(&self.polygon, pos)
    }

    /// Where the selection's action menu hangs: centred below the polygon.
    pub fn menu_anchor(&self) -> Option<Pos2> {
        let bounds = geometry::points_bounds(&self.polygon)?;
        Some(Pos2::new(bounds.center().x, bounds.max.y))
    }
}

/// Deep copies taken by Copy, pasted relative to `anchor`.
#[derive(Debug, Clone)]
pub struct Clipboard {
    strokes: Vec<Stroke>,
    anchor: Pos2,
}

/// Pre-gesture state held while a drag is live. The version lets commit
/// tell a real edit from a gesture that ended where it started.
struct PendingEdit {
    snapshot: DocumentSnapshot,
    version: u64,
}

impl Clipboard {
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn anchor(&self) -> Pos2 {
        self.anchor
    }
}

/// Editing session over a [`Document`]: undo history, the active drawing
/// target, the lasso selection and the clipboard. Every committing edit
/// funnels through here so exactly one undo step lands per user action.
pub struct Editor {
    pub document: Document,
    pub history: History,
    pub selection: Selection,
    pub view: ViewOptions,
    clipboard: Option<Clipboard>,
    paste_armed: bool,
    active_folder: Option<FolderId>,
    active_layer: Option<LayerId>,
    current_frame: usize,
    pending_edit: Option<PendingEdit>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            history: History::default(),
            selection: Selection::default(),
            view: ViewOptions::default(),
            clipboard: None,
            paste_armed: false,
            active_folder: None,
            active_layer: None,
            current_frame: 0,
            pending_edit: None,
        }
    }

    /// Swaps in a freshly loaded document, dropping history and all
    /// transient session state.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.history.clear();
        self.selection.clear();
        self.clipboard = None;
        self.paste_armed = false;
        self.active_folder = None;
        self.active_layer = None;
        self.pending_edit = None;
        self.current_frame = self
            .current_frame
            .min(self.document.timeline().frame_count().saturating_sub(1));
        self.document.mark_modified();
    }

    // Navigation and drawing target.

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn set_frame(&mut self, frame: usize) {
        let last = self.document.timeline().frame_count().saturating_sub(1);
        self.current_frame = frame.min(last);
    }

    pub fn active_folder(&self) -> Option<FolderId> {
        self.active_folder
    }

    pub fn active_layer(&self) -> Option<LayerId> {
        self.active_layer
    }

    /// Picks the folder edits apply to. The main layer becomes the drawing
    /// target and any lasso selection is dropped.
    pub fn set_active_folder(&mut self, folder: Option<FolderId>) {
        self.active_folder = folder.filter(|id| self.document.timeline().folder(*id).is_some());
        self.active_layer = self.active_folder.map(LayerId::main);
        self.selection.clear();
    }

    pub fn set_active_layer(&mut self, layer: LayerId) {
        if Some(layer.folder) != self.active_folder {
            return;
        }
        if self.active_layer != Some(layer) {
            self.active_layer = Some(layer);
            self.selection.clear();
        }
    }

    /// True when the active layer exists and is visible, i.e. drawing and
    /// erasing may touch it.
    pub fn can_edit_active_layer(&self) -> bool {
        match self.active_layer {
            Some(layer) => self.document.layer_attrs(layer).visible,
            None => false,
        }
    }

    // Gesture-scoped edits. A drag captures the pre-gesture snapshot up
    // front, mutates the document live, then either commits the captured
    // snapshot as one undo step or rolls the document back to it.

    pub fn begin_edit(&mut self) {
        if self.pending_edit.is_none() {
            self.pending_edit = Some(PendingEdit {
                snapshot: self.document.snapshot(),
                version: self.document.version(),
            });
        }
    }

    /// Ends the gesture, pushing the captured snapshot as one undo step.
    /// A gesture that never changed the document pushes nothing.
    pub fn commit_edit(&mut self) -> bool {
        match self.pending_edit.take() {
            Some(pending) => {
                if self.document.version() == pending.version {
                    return false;
                }
                self.history.push(pending.snapshot);
                true
            }
            None => false,
        }
    }

    pub fn abort_edit(&mut self) {
        self.pending_edit = None;
    }

    /// Rolls the document back to the pre-gesture snapshot without touching
    /// history. Used by resize cancel.
    pub fn revert_edit(&mut self) -> bool {
        match self.pending_edit.take() {
            Some(pending) => {
                self.document.restore(pending.snapshot);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_edit(&self) -> bool {
        self.pending_edit.is_some()
    }

    /// Runs a single-shot edit: snapshot first, mutate, and keep the
    /// snapshot as an undo step only when the mutation reports a change.
    fn commit_if<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let snapshot = self.document.snapshot();
        let changed = edit(&mut self.document);
        if changed {
            self.history.push(snapshot);
        }
        changed
    }

    // Stroke commits.

    /// Commits a finished freehand stroke onto its layer.
    pub fn commit_stroke(&mut self, stroke: MutableStroke) {
        if !stroke.is_committable() {
            return;
        }
        self.commit_if(|doc| {
            let stroke = stroke.into_stroke_ref();
            debug!("commit stroke {} ({} points)", stroke.id(), stroke.points().len());
            doc.append_stroke(stroke);
            true
        });
    }

    // Undo / redo.

    pub fn undo(&mut self) -> bool {
        let applied = self.history.undo(&mut self.document);
        if applied {
            self.after_history_jump();
        }
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.history.redo(&mut self.document);
        if applied {
            self.after_history_jump();
        }
        applied
    }

    fn after_history_jump(&mut self) {
        // Selected ids and the active target may not exist in the restored
        // state; drop whatever no longer resolves.
        self.selection.clear();
        self.paste_armed = false;
        if let Some(folder) = self.active_folder {
            if self.document.timeline().folder(folder).is_none() {
                self.active_folder = None;
                self.active_layer = None;
            }
        }
        let last = self.document.timeline().frame_count().saturating_sub(1);
        self.current_frame = self.current_frame.min(last);
    }

    // Clipboard.

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn paste_armed(&self) -> bool {
        self.paste_armed
    }

    /// Deep-copies the selected strokes. The paste anchor is the centre of
    /// their combined bounds.
    pub fn copy_selection(&mut self) -> bool {
        let Some(layer) = self.active_layer else {
            return false;
        };
        if !self.selection.active || self.selection.is_empty() {
            return false;
        }
        let strokes: Vec<Stroke> = self
            .document
            .strokes()
            .layer_strokes(layer)
            .iter()
            .filter(|s| self.selection.stroke_ids.contains(&s.id()))
            .map(|s| (**s).clone())
            .collect();
        let bounds = geometry::runs_bounds(strokes.iter().map(|s| s.points()));
        match bounds {
            Some(bounds) => {
                debug!("copy {} strokes", strokes.len());
                self.clipboard = Some(Clipboard {
                    strokes,
                    anchor: bounds.center(),
                });
                true
            }
            None => false,
        }
    }

    /// Arms paste placement; the next canvas click calls [`Self::paste_at`].
    pub fn arm_paste(&mut self) -> bool {
        if self.clipboard.is_some() && self.active_layer.is_some() {
            self.paste_armed = true;
        }
        self.paste_armed
    }

    pub fn cancel_paste(&mut self) {
        self.paste_armed = false;
    }

    /// Places clipboard strokes with their anchor at `pos`, as fresh
    /// strokes on the active layer.
    pub fn paste_at(&mut self, pos: Pos2) -> bool {
        let Some(layer) = self.active_layer else {
            return false;
        };
        let Some(clipboard) = self.clipboard.clone() else {
            return false;
        };
        self.paste_armed = false;
        let delta = pos - clipboard.anchor;
        self.commit_if(|doc| {
            for stroke in clipboard.strokes() {
                let points = stroke.points().iter().map(|p| *p + delta).collect();
                doc.append_stroke(
                    Stroke::new(
                        id::next_stroke_id(),
                        points,
                        stroke.color(),
                        stroke.width(),
                        stroke.brush(),
                        layer,
                    )
                    .into(),
                );
            }
            debug!("paste {} strokes at {:?}", clipboard.strokes().len(), pos);
            !clipboard.strokes().is_empty()
        })
    }

    /// Removes the selected strokes from the active layer.
    pub fn delete_selection(&mut self) -> bool {
        let Some(layer) = self.active_layer else {
            return false;
        };
        if !self.selection.active || self.selection.is_empty() {
            return false;
        }
        let ids = std::mem::take(&mut self.selection.stroke_ids);
        self.selection.clear();
        self.commit_if(|doc| {
            let kept: Vec<_> = doc
                .strokes()
                .layer_strokes(layer)
                .iter()
                .filter(|s| !ids.contains(&s.id()))
                .cloned()
                .collect();
            let changed = kept.len() != doc.strokes().layer_strokes(layer).len();
            if changed {
                debug!("delete {} selected strokes", ids.len());
                doc.replace_layer_strokes(layer, kept);
            }
            changed
        })
    }

    // Timeline edits, each one undo step.

    pub fn add_row(&mut self) -> RowId {
        let snapshot = self.document.snapshot();
        let id = self.document.add_row();
        self.history.push(snapshot);
        id
    }

    pub fn add_frame(&mut self) {
        let snapshot = self.document.snapshot();
        self.document.add_frame();
        self.history.push(snapshot);
    }

    /// Adds a folder to `row` and makes it the active drawing target.
    pub fn add_folder(&mut self, row: RowId) -> Option<FolderId> {
        let snapshot = self.document.snapshot();
        let added = self.document.add_folder(row);
        if added.is_some() {
            self.history.push(snapshot);
            self.set_active_folder(added);
        }
        added
    }

    pub fn delete_folder(&mut self, id: FolderId) -> bool {
        let deleted = self.commit_if(|doc| doc.delete_folder(id));
        if deleted {
            debug!("delete folder {id}");
            if self.active_folder == Some(id) {
                self.active_folder = None;
                self.active_layer = None;
                self.selection.clear();
            }
        }
        deleted
    }

    pub fn reorder_z(&mut self, id: FolderId, shift: ZShift) -> bool {
        self.commit_if(|doc| doc.reorder_z(id, shift))
    }

    pub fn rename_folder(&mut self, id: FolderId, name: Option<String>) -> bool {
        self.commit_if(|doc| doc.rename_folder(id, name))
    }

    pub fn add_extra_layer(&mut self, folder: FolderId) -> Option<LayerId> {
        let snapshot = self.document.snapshot();
        let added = self.document.add_extra_layer(folder);
        if added.is_some() {
            self.history.push(snapshot);
        }
        added
    }

    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) -> bool {
        self.commit_if(|doc| doc.set_layer_visible(layer, visible))
    }

    /// Attaches a raster to the folder covering `(row, frame)`, creating a
    /// folder there first when the cell is empty. One undo step either way.
    pub fn drop_asset(&mut self, row: RowId, frame: usize, asset: AssetRef) -> Option<FolderId> {
        let snapshot = self.document.snapshot();
        let folder = match self.document.timeline().folder_at_cell(row, frame) {
            Some(folder) => Some(folder.id),
            None => self.document.add_folder_at(row, frame),
        };
        let folder = folder?;
        debug!("attach asset {} to {folder}", asset.url);
        if !self.document.attach_asset(folder, asset) {
            return None;
        }
        self.history.push(snapshot);
        self.set_active_folder(Some(folder));
        Some(folder)
    }
}
