#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod assets;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod id;
pub mod layer;
pub mod panels;
pub mod persistence;
pub mod playback;
pub mod renderer;
pub mod stroke;
pub mod timeline;
pub mod tools;
pub mod util;

pub use app::FlipbookApp;
pub use document::Document;
pub use editor::Editor;
pub use history::History;
pub use layer::{LayerId, StrokeStore};
pub use renderer::Compositor;
pub use stroke::{Stroke, StrokeRef};
pub use timeline::Timeline;
pub use tools::ToolBox;
