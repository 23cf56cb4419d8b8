use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::{FolderId, StrokeId};
use crate::stroke::{Stroke, StrokeRef};

/// Position of a layer inside its frame folder. Every folder has exactly one
/// main slot (the one that can also carry the folder's raster image); extra
/// vector layers are numbered from 0 in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerSlot {
    Main,
    Extra(u32),
}

/// Typed address of a drawing layer: the owning folder plus the slot within
/// it. Used as the key for stroke lists and layer attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId {
    pub folder: FolderId,
    pub slot: LayerSlot,
}

impl LayerId {
    pub fn main(folder: FolderId) -> Self {
        Self {
            folder,
            slot: LayerSlot::Main,
        }
    }

    pub fn extra(folder: FolderId, index: u32) -> Self {
        Self {
            folder,
            slot: LayerSlot::Extra(index),
        }
    }

    pub fn is_main(&self) -> bool {
        self.slot == LayerSlot::Main
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            LayerSlot::Main => write!(f, "{}-main", self.folder),
            LayerSlot::Extra(n) => write!(f, "{}-extra-{}", self.folder, n),
        }
    }
}

/// Per-layer display attributes. Absent entries read as the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerAttrs {
    pub visible: bool,
    pub opacity: f32,
}

impl Default for LayerAttrs {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
        }
    }
}

/// All committed strokes, keyed by layer. Lists hold shared [`StrokeRef`]s
/// and stroke bodies are immutable, so cloning the store (for an undo
/// snapshot) copies only the map spine and the reference vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeStore {
    layers: HashMap<LayerId, Vec<StrokeRef>>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strokes of one layer in draw order. Missing layers read as empty.
    pub fn layer_strokes(&self, layer: LayerId) -> &[StrokeRef] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn append_stroke(&mut self, layer: LayerId, stroke: StrokeRef) {
        self.layers.entry(layer).or_default().push(stroke);
    }

    /// Swaps in a whole new list for `layer`. An empty list keeps the layer
    /// present (a layer with no strokes is still a layer).
    pub fn replace_layer_strokes(&mut self, layer: LayerId, strokes: Vec<StrokeRef>) {
        self.layers.insert(layer, strokes);
    }

    pub fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    /// Drops every layer belonging to `folder`. Used when a frame folder is
    /// deleted from the timeline.
    pub fn remove_folder_layers(&mut self, folder: FolderId) {
        self.layers.retain(|layer, _| layer.folder != folder);
    }

    pub fn find_stroke(&self, layer: LayerId, id: StrokeId) -> Option<&StrokeRef> {
        self.layers
            .get(&layer)
            .and_then(|list| list.iter().find(|s| s.id() == id))
    }

    /// All layers currently holding a stroke list, in unspecified order.
    /// Callers that need a stable order go through the timeline's layer
    /// order table instead.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &[StrokeRef])> {
        self.layers.iter().map(|(id, list)| (*id, list.as_slice()))
    }

    pub fn stroke_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Rebuilds the store from plain stroke values, wrapping each in a
    /// fresh shared reference. Used on document load.
    pub fn from_plain(layers: impl IntoIterator<Item = (LayerId, Vec<Stroke>)>) -> Self {
        let mut store = Self::new();
        for (layer, strokes) in layers {
            store
                .layers
                .insert(layer, strokes.into_iter().map(Arc::new).collect());
        }
        store
    }
}
