use std::collections::HashMap;

use egui::Vec2;

use crate::id::FolderId;
use crate::layer::{LayerAttrs, LayerId, StrokeStore};
use crate::stroke::StrokeRef;
use crate::timeline::{AssetRef, FolderEdge, RowId, Timeline, ZShift};

/// Drawing surface dimensions for a new document, in surface units.
pub const DEFAULT_CANVAS_SIZE: Vec2 = Vec2::new(960.0, 540.0);

/// Everything an undo step restores: stroke lists, the timeline (rows,
/// folders, layer order, frame count) and layer attributes. Stroke bodies
/// are shared with the live document, so a snapshot is cheap to take.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    strokes: StrokeStore,
    timeline: Timeline,
    layer_attrs: HashMap<LayerId, LayerAttrs>,
}

/// The complete drawing document. All mutation goes through methods here so
/// the version counter stays in step with the content; anything observing
/// the document (autosave, texture reuse) compares versions instead of deep
/// state.
#[derive(Debug, Clone)]
pub struct Document {
    strokes: StrokeStore,
    timeline: Timeline,
    layer_attrs: HashMap<LayerId, LayerAttrs>,
    canvas_size: Vec2,
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            strokes: StrokeStore::new(),
            timeline: Timeline::new(),
            layer_attrs: HashMap::new(),
            canvas_size: DEFAULT_CANVAS_SIZE,
            version: 0,
        }
    }

    pub fn from_parts(
        strokes: StrokeStore,
        timeline: Timeline,
        layer_attrs: HashMap<LayerId, LayerAttrs>,
        canvas_size: Vec2,
    ) -> Self {
        Self {
            strokes,
            timeline,
            layer_attrs,
            canvas_size,
            version: 0,
        }
    }

    pub fn strokes(&self) -> &StrokeStore {
        &self.strokes
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        if size.x >= 1.0 && size.y >= 1.0 && size != self.canvas_size {
            self.canvas_size = size;
            self.mark_modified();
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_modified(&mut self) {
        self.version += 1;
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            strokes: self.strokes.clone(),
            timeline: self.timeline.clone(),
            layer_attrs: self.layer_attrs.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.strokes = snapshot.strokes;
        self.timeline = snapshot.timeline;
        self.layer_attrs = snapshot.layer_attrs;
        self.mark_modified();
    }

    // Stroke lists.

    pub fn append_stroke(&mut self, stroke: StrokeRef) {
        self.strokes.append_stroke(stroke.layer(), stroke);
        self.mark_modified();
    }

    pub fn replace_layer_strokes(&mut self, layer: LayerId, strokes: Vec<StrokeRef>) {
        self.strokes.replace_layer_strokes(layer, strokes);
        self.mark_modified();
    }

    // Layer attributes. Reads fall back to the default for layers that were
    // never touched.

    pub fn layer_attrs(&self, layer: LayerId) -> LayerAttrs {
        self.layer_attrs.get(&layer).copied().unwrap_or_default()
    }

    pub fn layer_attrs_entries(&self) -> impl Iterator<Item = (LayerId, LayerAttrs)> + '_ {
        self.layer_attrs.iter().map(|(id, attrs)| (*id, *attrs))
    }

    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) -> bool {
        let attrs = self.layer_attrs.entry(layer).or_default();
        if attrs.visible == visible {
            return false;
        }
        attrs.visible = visible;
        self.mark_modified();
        true
    }

    pub fn set_layer_opacity(&mut self, layer: LayerId, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        let attrs = self.layer_attrs.entry(layer).or_default();
        if attrs.opacity == opacity {
            return false;
        }
        attrs.opacity = opacity;
        self.mark_modified();
        true
    }

    // Timeline edits. Each returns whether the model changed; the version
    // only moves when it did.

    pub fn add_row(&mut self) -> RowId {
        let id = self.timeline.add_row();
        self.mark_modified();
        id
    }

    pub fn add_frame(&mut self) {
        self.timeline.add_frame();
        self.mark_modified();
    }

    pub fn add_folder(&mut self, row: RowId) -> Option<FolderId> {
        let id = self.timeline.add_folder(row);
        if id.is_some() {
            self.mark_modified();
        }
        id
    }

    pub fn add_folder_at(&mut self, row: RowId, frame: usize) -> Option<FolderId> {
        let id = self.timeline.add_folder_at(row, frame);
        if id.is_some() {
            self.mark_modified();
        }
        id
    }

    /// Deletes a folder along with every layer, stroke and attribute that
    /// hangs off it.
    pub fn delete_folder(&mut self, id: FolderId) -> bool {
        if !self.timeline.delete_folder(id) {
            return false;
        }
        self.strokes.remove_folder_layers(id);
        self.layer_attrs.retain(|layer, _| layer.folder != id);
        self.mark_modified();
        true
    }

    pub fn set_folder_edge(&mut self, id: FolderId, edge: FolderEdge, index: usize) -> bool {
        let changed = self.timeline.set_folder_edge(id, edge, index);
        if changed {
            self.mark_modified();
        }
        changed
    }

    pub fn reorder_z(&mut self, id: FolderId, shift: ZShift) -> bool {
        let changed = self.timeline.reorder_z(id, shift);
        if changed {
            self.mark_modified();
        }
        changed
    }

    pub fn rename_folder(&mut self, id: FolderId, name: Option<String>) -> bool {
        let changed = self.timeline.rename_folder(id, name);
        if changed {
            self.mark_modified();
        }
        changed
    }

    pub fn attach_asset(&mut self, id: FolderId, asset: AssetRef) -> bool {
        let changed = self.timeline.attach_asset(id, asset);
        if changed {
            self.mark_modified();
        }
        changed
    }

    pub fn add_extra_layer(&mut self, folder: FolderId) -> Option<LayerId> {
        let layer = self.timeline.add_extra_layer(folder);
        if layer.is_some() {
            self.mark_modified();
        }
        layer
    }
}
