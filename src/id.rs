use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// Global counter shared by every id family. Starting at 1 keeps 0 free as a
// sentinel in debug output.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one frame folder on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(pub u64);

/// Identifies one committed stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrokeId(pub u64);

/// Allocates a fresh folder id.
pub fn next_folder_id() -> FolderId {
    FolderId(NEXT_ID.fetch_add(1, Ordering::SeqCst))
}

/// Allocates a fresh stroke id.
pub fn next_stroke_id() -> StrokeId {
    StrokeId(NEXT_ID.fetch_add(1, Ordering::SeqCst))
}

/// Advances the counter past `seen`. Called after loading a document so ids
/// minted afterwards never collide with persisted ones.
pub fn ensure_above(seen: u64) {
    NEXT_ID.fetch_max(seen + 1, Ordering::SeqCst);
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folder-{}", self.0)
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stroke-{}", self.0)
    }
}
