use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke as EguiStroke, Vec2};
use serde::{Deserialize, Serialize};

use crate::assets::AssetCache;
use crate::document::Document;
use crate::editor::{Clipboard, Selection, ViewOptions};
use crate::stroke::MutableStroke;
use crate::tools::{Corner, ResizeState};

/// Where the previous frame's ghost lands relative to the current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnionSkinMode {
    Off,
    Below,
    #[default]
    Above,
}

impl OnionSkinMode {
    pub const ALL: [OnionSkinMode; 3] =
        [OnionSkinMode::Off, OnionSkinMode::Below, OnionSkinMode::Above];

    pub fn label(&self) -> &'static str {
        match self {
            OnionSkinMode::Off => "Off",
            OnionSkinMode::Below => "Below",
            OnionSkinMode::Above => "Above",
        }
    }
}

/// Maps surface coordinates (where strokes live) to screen coordinates
/// (where the painter draws). Pan moves `origin`; zoom scales around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    pub origin: Pos2,
    pub zoom: f32,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            zoom: 1.0,
        }
    }
}

impl CanvasView {
    pub fn new(origin: Pos2, zoom: f32) -> Self {
        Self { origin, zoom }
    }

    /// View that centres `surface` inside `target` as large as it fits.
    /// This is also the export mapping for an offscreen pass at the target
    /// dimensions.
    pub fn fit(surface: Vec2, target: Rect) -> Self {
        let zoom = (target.width() / surface.x)
            .min(target.height() / surface.y)
            .max(f32::EPSILON);
        let origin = target.center() - surface * zoom * 0.5;
        Self { origin, zoom }
    }

    pub fn to_screen(&self, p: Pos2) -> Pos2 {
        self.origin + p.to_vec2() * self.zoom
    }

    pub fn to_surface(&self, p: Pos2) -> Pos2 {
        ((p - self.origin) / self.zoom).to_pos2()
    }

    pub fn scale(&self, v: f32) -> f32 {
        v * self.zoom
    }
}

/// Transient visuals painted over the document content, in the order the
/// fields are listed.
#[derive(Default)]
pub struct Overlays<'a> {
    pub live_stroke: Option<&'a MutableStroke>,
    pub eraser_cursor: Option<(Pos2, f32)>,
    pub selection: Option<&'a Selection>,
    /// Clipboard ghost following the pointer while paste is armed.
    pub paste_ghost: Option<(&'a Clipboard, Pos2)>,
    pub resize: Option<&'a ResizeState>,
}

/// Draws one frame of the document. The pass order is fixed: background,
/// grid, folder content in paint order (with the onion ghost below or
/// above it), then overlays.
pub struct Compositor {
    pub background: Color32,
    pub grid_spacing: f32,
    pub grid_color: Color32,
    pub onion_opacity: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            background: Color32::WHITE,
            grid_spacing: 40.0,
            grid_color: Color32::from_gray(225),
            onion_opacity: 0.3,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &self,
        painter: &Painter,
        view: &CanvasView,
        document: &Document,
        frame: usize,
        options: &ViewOptions,
        assets: &mut AssetCache,
        overlays: Option<&Overlays<'_>>,
    ) {
        let surface = document.canvas_size();
        let canvas_rect =
            Rect::from_min_size(view.to_screen(Pos2::ZERO), surface * view.zoom);
        painter.rect_filled(canvas_rect, 0.0, self.background);

        if options.show_grid {
            self.draw_grid(painter, view, surface);
        }

        let onion = options.onion_skin;
        let previous = frame.checked_sub(1);
        if onion == OnionSkinMode::Below {
            if let Some(previous) = previous {
                self.draw_frame_content(painter, view, document, previous, assets, self.onion_opacity);
            }
        }

        self.draw_frame_content(painter, view, document, frame, assets, 1.0);

        if onion == OnionSkinMode::Above {
            if let Some(previous) = previous {
                self.draw_frame_content(painter, view, document, previous, assets, self.onion_opacity);
            }
        }

        painter.rect_stroke(canvas_rect, 0.0, EguiStroke::new(1.0, Color32::from_gray(180)));

        if let Some(overlays) = overlays {
            self.draw_overlays(painter, view, overlays);
        }
    }

    /// One frame's folder content: every folder covering the frame, in
    /// paint order, each folder bottom layer first. The main layer draws
    /// the folder's raster (when it is decoded) beneath its strokes.
    fn draw_frame_content(
        &self,
        painter: &Painter,
        view: &CanvasView,
        document: &Document,
        frame: usize,
        assets: &mut AssetCache,
        alpha: f32,
    ) {
        let timeline = document.timeline();
        let surface = document.canvas_size();
        for folder in timeline.folders_at(frame) {
            for layer in timeline.layer_order(folder.id) {
                let attrs = document.layer_attrs(*layer);
                if !attrs.visible {
                    continue;
                }
                let opacity = alpha * attrs.opacity;
                if layer.is_main() {
                    if let Some(asset) = &folder.asset {
                        if let Some(texture) = assets.texture(&asset.url) {
                            let rect = fit_rect(texture.size_vec2(), surface);
                            let screen = Rect::from_min_max(
                                view.to_screen(rect.min),
                                view.to_screen(rect.max),
                            );
                            painter.image(
                                texture.id(),
                                screen,
                                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                                Color32::WHITE.gamma_multiply(opacity),
                            );
                        }
                    }
                }
                for stroke in document.strokes().layer_strokes(*layer) {
                    self.draw_points(
                        painter,
                        view,
                        stroke.points(),
                        stroke.color(),
                        stroke.width(),
                        opacity,
                    );
                }
            }
        }
    }

    fn draw_points(
        &self,
        painter: &Painter,
        view: &CanvasView,
        points: &[Pos2],
        color: Color32,
        width: f32,
        alpha: f32,
    ) {
        if points.len() < 2 {
            return;
        }
        let screen: Vec<Pos2> = points.iter().map(|p| view.to_screen(*p)).collect();
        painter.add(Shape::line(
            screen,
            EguiStroke::new(view.scale(width), color.gamma_multiply(alpha)),
        ));
    }

    fn draw_grid(&self, painter: &Painter, view: &CanvasView, surface: Vec2) {
        let stroke = EguiStroke::new(1.0, self.grid_color);
        let mut x = 0.0;
        while x <= surface.x {
            painter.line_segment(
                [
                    view.to_screen(Pos2::new(x, 0.0)),
                    view.to_screen(Pos2::new(x, surface.y)),
                ],
                stroke,
            );
            x += self.grid_spacing;
        }
        let mut y = 0.0;
        while y <= surface.y {
            painter.line_segment(
                [
                    view.to_screen(Pos2::new(0.0, y)),
                    view.to_screen(Pos2::new(surface.x, y)),
                ],
                stroke,
            );
            y += self.grid_spacing;
        }
    }

    fn draw_overlays(&self, painter: &Painter, view: &CanvasView, overlays: &Overlays<'_>) {
        if let Some(stroke) = overlays.live_stroke {
            self.draw_points(
                painter,
                view,
                stroke.points(),
                stroke.color(),
                stroke.width(),
                1.0,
            );
        }

        if let Some((center, radius)) = overlays.eraser_cursor {
            painter.circle_stroke(
                view.to_screen(center),
                view.scale(radius),
                EguiStroke::new(1.0, Color32::DARK_GRAY),
            );
        }

        if let Some(selection) = overlays.selection {
            if selection.polygon.len() >= 2 {
                let screen: Vec<Pos2> = selection
                    .polygon
                    .iter()
                    .map(|p| view.to_screen(*p))
                    .collect();
                // Light-on-dark double stroke stays visible on any content.
                let make = |points: Vec<Pos2>, stroke: EguiStroke| {
                    if selection.active {
                        Shape::closed_line(points, stroke)
                    } else {
                        Shape::line(points, stroke)
                    }
                };
                painter.add(make(
                    screen.clone(),
                    EguiStroke::new(2.5, Color32::from_black_alpha(150)),
                ));
                painter.add(make(screen, EguiStroke::new(1.2, Color32::WHITE)));
            }
        }

        if let Some((clipboard, pointer)) = overlays.paste_ghost {
            let delta = pointer - clipboard.anchor();
            for stroke in clipboard.strokes() {
                let points: Vec<Pos2> = stroke.points().iter().map(|p| *p + delta).collect();
                self.draw_points(painter, view, &points, stroke.color(), stroke.width(), 0.5);
            }
        }

        if let Some(resize) = overlays.resize {
            let rect = resize.box_rect();
            let screen = Rect::from_min_max(view.to_screen(rect.min), view.to_screen(rect.max));
            painter.rect_stroke(screen, 0.0, EguiStroke::new(1.0, Color32::from_rgb(66, 133, 244)));
            for corner in Corner::ALL {
                let center = view.to_screen(corner.pos_in(rect));
                let handle = Rect::from_center_size(center, Vec2::splat(8.0));
                painter.rect_filled(handle, 2.0, Color32::WHITE);
                painter.rect_stroke(handle, 2.0, EguiStroke::new(1.0, Color32::from_rgb(66, 133, 244)));
            }
        }
    }
}

/// Largest aspect-preserving placement of an `image`-sized raster on the
/// drawing surface, centred.
fn fit_rect(image: Vec2, surface: Vec2) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Rect::from_min_size(Pos2::ZERO, Vec2::ZERO);
    }
    let scale = (surface.x / image.x).min(surface.y / image.y);
    let size = image * scale;
    Rect::from_min_size(((surface - size) * 0.5).to_pos2(), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_round_trips_points() {
        let view = CanvasView::new(Pos2::new(100.0, 50.0), 2.0);
        let p = Pos2::new(33.0, 7.5);
        let back = view.to_surface(view.to_screen(p));
        assert!((back.x - p.x).abs() < 0.001);
        assert!((back.y - p.y).abs() < 0.001);
    }

    #[test]
    fn fit_centres_and_preserves_aspect() {
        let view = CanvasView::fit(
            Vec2::new(100.0, 50.0),
            Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 200.0)),
        );
        assert!((view.zoom - 2.0).abs() < 0.001);
        // 100x50 at zoom 2 -> 200x100, centred vertically.
        assert!((view.origin.x - 0.0).abs() < 0.001);
        assert!((view.origin.y - 50.0).abs() < 0.001);
    }

    #[test]
    fn fit_rect_letterboxes_wide_surfaces() {
        let rect = fit_rect(Vec2::new(200.0, 100.0), Vec2::new(960.0, 540.0));
        assert!((rect.width() - 960.0).abs() < 0.001);
        assert!((rect.height() - 480.0).abs() < 0.001);
        assert!((rect.min.y - 30.0).abs() < 0.001);
    }
}
