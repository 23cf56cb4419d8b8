use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{self, FolderId};
use crate::layer::{LayerId, LayerSlot};

/// Frames a new document starts with.
pub const DEFAULT_FRAME_COUNT: usize = 12;

/// Identifies one timeline row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// A horizontal lane of the timeline grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub name: String,
}

/// Reference to an attached raster. The url is what the asset cache loads;
/// the key is an opaque token kept for re-resolving the url later and is
/// persisted separately from the folder entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub url: String,
    #[serde(skip)]
    pub key: Option<String>,
}

/// One cell group on the timeline: it starts at `frame_index`, covers
/// `span` consecutive frames of its row, and owns the layers drawn while
/// the playhead is inside that range.
///
/// `name` and the asset key are persisted in side tables, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFolder {
    pub id: FolderId,
    pub row: RowId,
    pub frame_index: usize,
    pub span: usize,
    pub asset: Option<AssetRef>,
    #[serde(skip)]
    pub name: Option<String>,
}

impl FrameFolder {
    /// First frame index past the folder (exclusive end).
    pub fn end(&self) -> usize {
        self.frame_index + self.span
    }

    pub fn contains_frame(&self, frame: usize) -> bool {
        frame >= self.frame_index && frame < self.end()
    }

    /// Display name, falling back to the 1-indexed start frame.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Frame {}", self.frame_index + 1))
    }
}

/// Which edge of a folder an extend drag grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderEdge {
    Left,
    Right,
}

/// Direction of a z-order swap among folders sharing a start frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZShift {
    Forward,
    Backward,
}

/// The timeline grid: rows, frame folders and the per-folder layer order.
///
/// `folders` is kept in paint order; the compositor walks it front to back
/// for whichever folders cover the current frame. Folders of the same row
/// never overlap in frame range.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    rows: Vec<Row>,
    folders: Vec<FrameFolder>,
    layer_order: HashMap<FolderId, Vec<LayerId>>,
    frame_count: usize,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        let mut timeline = Self {
            rows: Vec::new(),
            folders: Vec::new(),
            layer_order: HashMap::new(),
            frame_count: DEFAULT_FRAME_COUNT,
        };
        timeline.add_row();
        timeline
    }

    /// Rebuilds a timeline from persisted parts. Unknown folder rows and
    /// order entries for unknown folders are dropped.
    pub fn from_parts(
        rows: Vec<Row>,
        folders: Vec<FrameFolder>,
        layer_order: impl IntoIterator<Item = (FolderId, Vec<LayerId>)>,
        frame_count: usize,
    ) -> Self {
        let mut timeline = Self {
            rows,
            folders,
            layer_order: layer_order.into_iter().collect(),
            frame_count: frame_count.max(1),
        };
        if timeline.rows.is_empty() {
            timeline.add_row();
        }
        let known_rows: Vec<RowId> = timeline.rows.iter().map(|r| r.id).collect();
        timeline.folders.retain(|f| known_rows.contains(&f.row));
        let known_folders: Vec<FolderId> = timeline.folders.iter().map(|f| f.id).collect();
        timeline.layer_order.retain(|id, _| known_folders.contains(id));
        for folder in &timeline.folders {
            timeline
                .layer_order
                .entry(folder.id)
                .or_insert_with(|| vec![LayerId::main(folder.id)]);
        }
        let max_end = timeline.folders.iter().map(FrameFolder::end).max();
        if let Some(end) = max_end {
            timeline.frame_count = timeline.frame_count.max(end);
        }
        timeline
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Folders in paint order.
    pub fn folders(&self) -> &[FrameFolder] {
        &self.folders
    }

    pub fn folder(&self, id: FolderId) -> Option<&FrameFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn folder_mut(&mut self, id: FolderId) -> Option<&mut FrameFolder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Appends one empty frame to the timeline.
    pub fn add_frame(&mut self) {
        self.frame_count += 1;
    }

    fn ensure_frames(&mut self, end: usize) {
        self.frame_count = self.frame_count.max(end);
    }

    pub fn add_row(&mut self) -> RowId {
        let row = Row {
            id: RowId::new(),
            name: format!("Row {}", self.rows.len() + 1),
        };
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// True when `[start, end)` of `row` is clear of every folder except
    /// `ignore`.
    fn range_free(&self, row: RowId, start: usize, end: usize, ignore: Option<FolderId>) -> bool {
        self.folders
            .iter()
            .filter(|f| f.row == row && Some(f.id) != ignore)
            .all(|f| end <= f.frame_index || start >= f.end())
    }

    /// Creates a one-frame folder at the first unoccupied index of `row`,
    /// growing the timeline when the row is full. Returns `None` for an
    /// unknown row.
    pub fn add_folder(&mut self, row: RowId) -> Option<FolderId> {
        self.row(row)?;
        let mut frame = 0;
        while !self.range_free(row, frame, frame + 1, None) {
            frame += 1;
        }
        self.insert_folder(row, frame)
    }

    /// Creates a one-frame folder at exactly `frame`, or returns `None`
    /// when that cell is already covered.
    pub fn add_folder_at(&mut self, row: RowId, frame: usize) -> Option<FolderId> {
        self.row(row)?;
        if !self.range_free(row, frame, frame + 1, None) {
            return None;
        }
        self.insert_folder(row, frame)
    }

    fn insert_folder(&mut self, row: RowId, frame: usize) -> Option<FolderId> {
        let id = id::next_folder_id();
        self.folders.push(FrameFolder {
            id,
            row,
            frame_index: frame,
            span: 1,
            asset: None,
            name: None,
        });
        self.layer_order.insert(id, vec![LayerId::main(id)]);
        self.ensure_frames(frame + 1);
        Some(id)
    }

    /// Removes the folder and its layer order entry. Stroke cleanup is the
    /// document's job. Returns false for an unknown id.
    pub fn delete_folder(&mut self, id: FolderId) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f.id != id);
        self.layer_order.remove(&id);
        self.folders.len() != before
    }

    /// Moves one edge of a folder to a new frame index.
    ///
    /// The left edge moves the start while the end stays fixed; the right
    /// edge moves the exclusive end while the start stays fixed. Either way
    /// the span stays at least one frame and may not run into a neighbour
    /// on the same row. Growing past the last frame lengthens the timeline.
    /// Returns whether anything changed.
    pub fn set_folder_edge(&mut self, id: FolderId, edge: FolderEdge, index: usize) -> bool {
        let Some(folder) = self.folder(id) else {
            return false;
        };
        let row = folder.row;
        let (start, end) = match edge {
            FolderEdge::Left => {
                if index >= folder.end() {
                    return false;
                }
                (index, folder.end())
            }
            FolderEdge::Right => {
                if index <= folder.frame_index {
                    return false;
                }
                (folder.frame_index, index)
            }
        };
        if (start, end) == (folder.frame_index, folder.end()) {
            return false;
        }
        if !self.range_free(row, start, end, Some(id)) {
            return false;
        }
        if let Some(folder) = self.folder_mut(id) {
            folder.frame_index = start;
            folder.span = end - start;
        }
        self.ensure_frames(end);
        true
    }

    /// Swaps the folder with its neighbour in paint order, considering only
    /// folders that share the same starting frame index. Returns whether a
    /// swap happened.
    pub fn reorder_z(&mut self, id: FolderId, shift: ZShift) -> bool {
        let Some(start) = self.folder(id).map(|f| f.frame_index) else {
            return false;
        };
        let peers: Vec<usize> = self
            .folders
            .iter()
            .enumerate()
            .filter(|(_, f)| f.frame_index == start)
            .map(|(i, _)| i)
            .collect();
        let Some(pos) = peers.iter().position(|&i| self.folders[i].id == id) else {
            return false;
        };
        let other = match shift {
            ZShift::Forward => pos.checked_add(1).filter(|&p| p < peers.len()),
            ZShift::Backward => pos.checked_sub(1),
        };
        match other {
            Some(other) => {
                self.folders.swap(peers[pos], peers[other]);
                true
            }
            None => false,
        }
    }

    /// Sets or clears a folder's display name. Blank names clear. Returns
    /// whether the name actually changed.
    pub fn rename_folder(&mut self, id: FolderId, name: Option<String>) -> bool {
        match self.folder_mut(id) {
            Some(folder) => {
                let name = name.filter(|n| !n.trim().is_empty());
                if folder.name == name {
                    return false;
                }
                folder.name = name;
                true
            }
            None => false,
        }
    }

    pub fn attach_asset(&mut self, id: FolderId, asset: AssetRef) -> bool {
        match self.folder_mut(id) {
            Some(folder) => {
                folder.asset = Some(asset);
                true
            }
            None => false,
        }
    }

    /// Folders whose range covers `frame`, in paint order.
    pub fn folders_at(&self, frame: usize) -> impl Iterator<Item = &FrameFolder> {
        self.folders.iter().filter(move |f| f.contains_frame(frame))
    }

    /// The folder covering `frame` on `row`, if any. Rows hold at most one
    /// folder per frame.
    pub fn folder_at_cell(&self, row: RowId, frame: usize) -> Option<&FrameFolder> {
        self.folders
            .iter()
            .find(|f| f.row == row && f.contains_frame(frame))
    }

    /// Render order of a folder's layers, bottom to top.
    pub fn layer_order(&self, folder: FolderId) -> &[LayerId] {
        self.layer_order
            .get(&folder)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn layer_order_entries(&self) -> impl Iterator<Item = (FolderId, &[LayerId])> {
        self.layer_order.iter().map(|(id, v)| (*id, v.as_slice()))
    }

    /// Adds a vector layer on top of the folder's stack and returns its id.
    pub fn add_extra_layer(&mut self, folder: FolderId) -> Option<LayerId> {
        self.folder(folder)?;
        let order = self.layer_order.entry(folder).or_default();
        let next = order
            .iter()
            .filter_map(|l| match l.slot {
                LayerSlot::Extra(n) => Some(n + 1),
                LayerSlot::Main => None,
            })
            .max()
            .unwrap_or(0);
        let layer = LayerId::extra(folder, next);
        order.push(layer);
        Some(layer)
    }
}
