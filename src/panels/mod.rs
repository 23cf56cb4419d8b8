mod canvas_panel;
mod timeline_panel;
mod tools_panel;

pub use canvas_panel::canvas_panel;
pub use timeline_panel::timeline_panel;
pub use tools_panel::tools_panel;

use egui::{Context, Pos2, Rect};

/// Files dropped this frame inside `within`, as loadable urls, together
/// with the drop point. Files without a filesystem path (browser drops)
/// are skipped.
pub(crate) fn dropped_files(ctx: &Context, within: Rect) -> Option<(Vec<String>, Pos2)> {
    ctx.input(|i| {
        if i.raw.dropped_files.is_empty() {
            return None;
        }
        let pos = i.pointer.latest_pos()?;
        if !within.contains(pos) {
            return None;
        }
        let urls: Vec<String> = i
            .raw
            .dropped_files
            .iter()
            .filter_map(|f| f.path.as_ref().map(|p| p.display().to_string()))
            .collect();
        if urls.len() < i.raw.dropped_files.len() {
            log::warn!("ignoring dropped files without a local path");
        }
        (!urls.is_empty()).then_some((urls, pos))
    })
}
