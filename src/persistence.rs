use std::collections::HashMap;

use egui::Vec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{Document, DEFAULT_CANVAS_SIZE};
use crate::editor::{Editor, ViewOptions};
use crate::id::{self, FolderId};
use crate::layer::{LayerAttrs, LayerId, StrokeStore};
use crate::stroke::Stroke;
use crate::timeline::{FrameFolder, Row, Timeline, DEFAULT_FRAME_COUNT};
use crate::util::time;

/// Errors from saving or loading a document snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize document: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write document: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read document file: {0}")]
    ReadError(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Timeline part of the document file: the folder entries in paint order
/// plus each folder's layer render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineFile {
    pub drawing_frames: Vec<FrameFolder>,
    pub layer_order: Vec<(FolderId, Vec<LayerId>)>,
}

/// Layer part of the document file: attributes and plain stroke values
/// per layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersFile {
    pub folder_layers: Vec<(LayerId, LayerAttrs)>,
    pub layer_strokes: Vec<(LayerId, Vec<Stroke>)>,
}

/// Presentation state worth restoring on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiStateFile {
    pub view: ViewOptions,
    pub current_frame: usize,
    pub canvas_size: [f32; 2],
}

impl Default for UiStateFile {
    fn default() -> Self {
        Self {
            view: ViewOptions::default(),
            current_frame: 0,
            canvas_size: [DEFAULT_CANVAS_SIZE.x, DEFAULT_CANVAS_SIZE.y],
        }
    }
}

/// The complete serializable snapshot of a document and its ui state.
/// Every field defaults, so files from older builds (or hand-trimmed ones)
/// still load; anything missing falls back to a fresh document's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFile {
    pub rows: Vec<Row>,
    pub frame_count: usize,
    pub timeline: TimelineFile,
    pub layers: LayersFile,
    pub ui_state: UiStateFile,
    /// Opaque re-resolution keys for attached assets, by folder.
    pub frame_asset_keys: Vec<(FolderId, String)>,
    /// Display names, by folder.
    pub folder_names: Vec<(FolderId, String)>,
    pub saved_at: u64,
    pub app_version: String,
}

impl Default for DocumentFile {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            frame_count: DEFAULT_FRAME_COUNT,
            timeline: TimelineFile::default(),
            layers: LayersFile::default(),
            ui_state: UiStateFile::default(),
            frame_asset_keys: Vec::new(),
            folder_names: Vec::new(),
            saved_at: 0,
            app_version: String::new(),
        }
    }
}

/// Captures the editor's document and view into a file snapshot. Map-like
/// tables are sorted so the output is stable run to run.
pub fn capture(editor: &Editor) -> DocumentFile {
    let document = &editor.document;
    let timeline = document.timeline();

    let mut layer_order: Vec<(FolderId, Vec<LayerId>)> = timeline
        .layer_order_entries()
        .map(|(id, order)| (id, order.to_vec()))
        .collect();
    layer_order.sort_by_key(|(id, _)| *id);

    let mut folder_layers: Vec<(LayerId, LayerAttrs)> =
        document.layer_attrs_entries().collect();
    folder_layers.sort_by_key(|(id, _)| *id);

    let mut layer_strokes: Vec<(LayerId, Vec<Stroke>)> = document
        .strokes()
        .layers()
        .map(|(layer, strokes)| (layer, strokes.iter().map(|s| (**s).clone()).collect()))
        .collect();
    layer_strokes.sort_by_key(|(id, _)| *id);

    let frame_asset_keys = timeline
        .folders()
        .iter()
        .filter_map(|f| {
            let key = f.asset.as_ref()?.key.clone()?;
            Some((f.id, key))
        })
        .collect();
    let folder_names = timeline
        .folders()
        .iter()
        .filter_map(|f| Some((f.id, f.name.clone()?)))
        .collect();

    let canvas = document.canvas_size();
    DocumentFile {
        rows: timeline.rows().to_vec(),
        frame_count: timeline.frame_count(),
        timeline: TimelineFile {
            drawing_frames: timeline.folders().to_vec(),
            layer_order,
        },
        layers: LayersFile {
            folder_layers,
            layer_strokes,
        },
        ui_state: UiStateFile {
            view: editor.view,
            current_frame: editor.current_frame(),
            canvas_size: [canvas.x, canvas.y],
        },
        frame_asset_keys,
        folder_names,
        saved_at: time::timestamp_secs(),
        app_version: env!("CARGO_PKG_VERSION").to_owned(),
    }
}

/// Rebuilds the editor's document from a file snapshot. Entries that no
/// longer resolve (strokes of a dropped folder, order rows for unknown
/// folders) are discarded quietly; the id counter is advanced past every
/// persisted id.
pub fn restore(editor: &mut Editor, file: DocumentFile) {
    if !file.app_version.is_empty() && file.app_version != env!("CARGO_PKG_VERSION") {
        warn!(
            "document was saved by version {}, this is {}",
            file.app_version,
            env!("CARGO_PKG_VERSION")
        );
    }

    let names: HashMap<FolderId, String> = file.folder_names.into_iter().collect();
    let keys: HashMap<FolderId, String> = file.frame_asset_keys.into_iter().collect();
    let mut folders = file.timeline.drawing_frames;
    for folder in &mut folders {
        folder.name = names.get(&folder.id).cloned();
        if let Some(asset) = folder.asset.as_mut() {
            asset.key = keys.get(&folder.id).cloned();
        }
    }

    let max_folder_id = folders.iter().map(|f| f.id.0).max().unwrap_or(0);
    let max_stroke_id = file
        .layers
        .layer_strokes
        .iter()
        .flat_map(|(_, strokes)| strokes.iter().map(|s| s.id().0))
        .max()
        .unwrap_or(0);
    id::ensure_above(max_folder_id.max(max_stroke_id));

    let timeline = Timeline::from_parts(
        file.rows,
        folders,
        file.timeline.layer_order,
        file.frame_count,
    );

    let strokes = StrokeStore::from_plain(
        file.layers
            .layer_strokes
            .into_iter()
            .filter(|(layer, _)| timeline.folder(layer.folder).is_some()),
    );
    let layer_attrs: HashMap<LayerId, LayerAttrs> = file
        .layers
        .folder_layers
        .into_iter()
        .filter(|(layer, _)| timeline.folder(layer.folder).is_some())
        .collect();

    let [w, h] = file.ui_state.canvas_size;
    let canvas = if w >= 1.0 && h >= 1.0 {
        Vec2::new(w, h)
    } else {
        DEFAULT_CANVAS_SIZE
    };

    debug!(
        "restore document: {} rows, {} folders, {} strokes",
        timeline.rows().len(),
        timeline.folders().len(),
        strokes.stroke_count()
    );

    editor.replace_document(Document::from_parts(strokes, timeline, layer_attrs, canvas));
    editor.view = file.ui_state.view;
    editor.set_frame(file.ui_state.current_frame);
}

pub fn to_json(file: &DocumentFile) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(file)?)
}

pub fn from_json(json: &str) -> PersistenceResult<DocumentFile> {
    Ok(serde_json::from_str(json)?)
}

/// Saves the snapshot as pretty JSON, creating parent directories first.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_to_path(path: &std::path::Path, file: &DocumentFile) -> PersistenceResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_json(file)?)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_from_path(path: &std::path::Path) -> PersistenceResult<DocumentFile> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| PersistenceError::ReadError(e.to_string()))?;
    from_json(&json)
}
