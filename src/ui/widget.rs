//! egui front end for [`MarkerMapView`]
//!
//! [`MapWidget`] turns egui input into view calls (drag, wheel, click and
//! the zoom buttons) and paints the [`Composition`] the view renders.

use crate::{
    core::{
        bounds::Bounds,
        constants::CLUSTER_ICON_RADIUS,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    input::events::{KeyModifiers, PointerEvent, PointerKind},
    layers::{heatmap::HeatmapGrid, marker::MarkerIcon, tile::TileRequest},
    plugins::heatmap::intensity_to_color,
    prelude::{HashMap, HashSet},
    spatial::clustering::MarkerCluster,
    tiles::cache::TileCache,
    ui::{
        legend::Legend,
        reset_view::ResetViewControl,
        style::MapStyle,
        view::{CanvasFrame, CanvasLayer, Composition, HeatmapFrame, MarkerMapView, ViewElement},
    },
};
use egui::{
    Align2, Color32, ColorImage, Painter, Pos2, Rect, Response, Sense, Shape, Stroke,
    TextureHandle, TextureOptions, Ui, Vec2, Widget,
};

const ZOOM_BUTTON_SIZE: f32 = 30.0;
const CONTROL_MARGIN: f32 = 10.0;
/// egui reports one mouse wheel line as 50 points
const WHEEL_NOTCH: f32 = 50.0;

/// Wheel and trackpad deltas not yet turned into zoom steps
#[derive(Debug, Clone, Copy, Default)]
struct WheelAccumulator {
    pending: f32,
}

impl WheelAccumulator {
    /// Adds a frame's scroll delta; returns whole notches, positive to zoom in
    fn push(&mut self, delta: f32) -> i32 {
        if delta * self.pending < 0.0 {
            self.pending = 0.0;
        }
        self.pending += delta;
        let notches = (self.pending / WHEEL_NOTCH).trunc();
        self.pending -= notches * WHEEL_NOTCH;
        notches as i32
    }
}

/// GPU textures for decoded tiles, kept between frames
#[derive(Default)]
pub struct TileTextures {
    textures: HashMap<TileCoord, TextureHandle>,
}

impl TileTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture for `coord`, uploading it from `cache` the first time
    fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        cache: &TileCache,
        coord: TileCoord,
    ) -> Option<&TextureHandle> {
        if !self.textures.contains_key(&coord) {
            let bytes = cache.get(&coord)?;
            let image = match decode_tile(&bytes) {
                Some(image) => image,
                None => {
                    log::warn!("could not decode tile {:?}", coord);
                    cache.discard(&coord);
                    return None;
                }
            };
            let texture = ctx.load_texture(
                format!("tile_{}_{}_{}", coord.z, coord.x, coord.y),
                image,
                TextureOptions::LINEAR,
            );
            self.textures.insert(coord, texture);
        }
        self.textures.get(&coord)
    }

    /// Drops textures for tiles that left the view
    fn retain_visible(&mut self, tiles: &[TileRequest]) {
        let visible: HashSet<TileCoord> = tiles.iter().map(|tile| tile.coord).collect();
        self.textures.retain(|coord, _| visible.contains(coord));
    }
}

fn decode_tile(bytes: &[u8]) -> Option<ColorImage> {
    let rgba = image::load_from_memory(bytes).ok()?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Interactive map widget.
///
/// ```ignore
/// ui.add(MapWidget::new(&mut view, &mut textures).with_tile_cache(&cache));
/// ```
pub struct MapWidget<'a> {
    view: &'a mut MarkerMapView,
    textures: &'a mut TileTextures,
    tile_cache: Option<&'a TileCache>,
    style: MapStyle,
}

impl<'a> MapWidget<'a> {
    pub fn new(view: &'a mut MarkerMapView, textures: &'a mut TileTextures) -> Self {
        Self {
            view,
            textures,
            tile_cache: None,
            style: MapStyle::default(),
        }
    }

    /// Tile bytes to draw; without a cache only the background is painted
    pub fn with_tile_cache(mut self, cache: &'a TileCache) -> Self {
        self.tile_cache = Some(cache);
        self
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.view.pan_by(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(pos) = response.hover_pos() {
                    let notches = ui.ctx().data_mut(|data| {
                        data.get_temp_mut_or_default::<WheelAccumulator>(response.id)
                            .push(scroll)
                    });
                    for _ in 0..notches.unsigned_abs() {
                        self.view.scroll(notches.signum() as f64, to_point(rect, pos));
                    }
                }
            }
        }

        if !response.clicked() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let local = pos - rect.min;

        let (zoom_in, zoom_out) = zoom_button_rects(Rect::from_min_size(Pos2::ZERO, rect.size()));
        if zoom_in.contains(local.to_pos2()) {
            self.view.zoom_in(None);
            return;
        }
        if zoom_out.contains(local.to_pos2()) {
            self.view.zoom_out(None);
            return;
        }

        let (kind, modifiers) = ui.input(|i| {
            let kind = if i.any_touches() {
                PointerKind::Touch
            } else {
                PointerKind::Mouse
            };
            let modifiers = KeyModifiers {
                shift: i.modifiers.shift,
                ctrl: i.modifiers.ctrl,
                alt: i.modifiers.alt,
                meta: i.modifiers.mac_cmd,
            };
            (kind, modifiers)
        });
        let event = PointerEvent::new(to_point(rect, pos), kind).with_modifiers(modifiers);
        self.view.click(event);
    }
}

impl Widget for MapWidget<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, mut response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.view
            .resize(Point::new(rect.width() as f64, rect.height() as f64));
        self.handle_input(ui, rect, &response);

        let composition = self.view.render();
        let painter = ui.painter_at(rect);
        paint_composition(
            &painter,
            rect,
            &composition,
            self.view.reset_control(),
            &mut *self.textures,
            self.tile_cache,
            &self.style,
        );

        if response.dragged() || response.clicked() {
            response.mark_changed();
        }
        if self
            .tile_cache
            .is_some_and(|cache| self.view.tiles().tiles().iter().any(|t| cache.is_pending(&t.coord)))
        {
            ui.ctx().request_repaint();
        }
        response
    }
}

/// Paints one frame. The legend is drawn last so it stays above the canvas.
pub fn paint_composition(
    painter: &Painter,
    rect: Rect,
    composition: &Composition,
    reset_control: &ResetViewControl,
    textures: &mut TileTextures,
    tile_cache: Option<&TileCache>,
    style: &MapStyle,
) {
    painter.rect_filled(rect, 0.0, style.background_color);

    if let Some(canvas) = composition.canvas() {
        paint_canvas(painter, rect, canvas, reset_control, textures, tile_cache, style);
    }

    for element in &composition.elements {
        if let ViewElement::Legend(legend) = element {
            paint_legend(painter, rect, legend, style);
        }
    }

    painter.rect_stroke(rect, 0.0, style.border_stroke);
}

fn paint_canvas(
    painter: &Painter,
    rect: Rect,
    canvas: &CanvasFrame,
    reset_control: &ResetViewControl,
    textures: &mut TileTextures,
    tile_cache: Option<&TileCache>,
    style: &MapStyle,
) {
    // Children are stacked by pane, not by declaration order
    let mut heatmap = None;
    let mut markers = None;
    let mut reset = None;
    for layer in &canvas.layers {
        match layer {
            CanvasLayer::Tiles(frame) => {
                if let Some(cache) = tile_cache {
                    paint_tiles(painter, rect, &frame.tiles, textures, cache);
                }
            }
            CanvasLayer::Heatmap(frame) => heatmap = Some(frame),
            CanvasLayer::Markers(frame) => markers = Some(&frame.clusters),
            CanvasLayer::ResetView(options) => reset = Some(options),
            CanvasLayer::ViewportListener => {}
        }
    }

    if let Some(frame) = heatmap {
        paint_heatmap(painter, rect, frame);
    }
    if let Some(clusters) = markers {
        paint_clusters(painter, rect, &canvas.viewport, clusters, style);
    }

    paint_zoom_buttons(painter, rect, style);
    if reset.is_some() {
        let bounds = reset_control.button_bounds(canvas.viewport.size);
        paint_button(painter, to_rect(rect, &bounds), "↺", style);
    }
}

fn paint_tiles(
    painter: &Painter,
    rect: Rect,
    tiles: &[TileRequest],
    textures: &mut TileTextures,
    cache: &TileCache,
) {
    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    for tile in tiles {
        let Some(texture) = textures.get_or_load(painter.ctx(), cache, tile.coord) else {
            continue;
        };
        let min = rect.min + Vec2::new(tile.offset.x as f32, tile.offset.y as f32);
        let tile_rect = Rect::from_min_size(min, Vec2::splat(tile.size as f32));
        painter.image(texture.id(), tile_rect, uv, Color32::WHITE);
    }
    textures.retain_visible(tiles);
}

fn paint_heatmap(painter: &Painter, rect: Rect, frame: &HeatmapFrame) {
    let grid: &HeatmapGrid = &frame.grid;
    if grid.is_empty() {
        return;
    }

    let cell = grid.cell_size as f32;
    for row in 0..grid.rows {
        for column in 0..grid.columns {
            let value = grid.value(column, row);
            if value <= 0.0 {
                continue;
            }
            let [r, g, b, a] = intensity_to_color(&frame.config, value, grid.max_value);
            if a == 0 {
                continue;
            }
            let min = rect.min + Vec2::new(column as f32 * cell, row as f32 * cell);
            painter.rect_filled(
                Rect::from_min_size(min, Vec2::splat(cell)),
                0.0,
                Color32::from_rgba_unmultiplied(r, g, b, a),
            );
        }
    }
}

fn paint_clusters(
    painter: &Painter,
    rect: Rect,
    viewport: &Viewport,
    clusters: &[MarkerCluster],
    style: &MapStyle,
) {
    let icon = MarkerIcon::default();
    for cluster in clusters {
        let pixel = viewport.lat_lng_to_pixel(&cluster.center);
        let pos = to_pos(rect, &pixel.add(&cluster.offset));
        if !rect.expand(icon.size.y as f32).contains(pos) {
            continue;
        }

        if cluster.is_single() {
            let anchor = to_pos(rect, &pixel);
            if anchor != pos {
                painter.line_segment(
                    [anchor, pos],
                    Stroke::new(style.markers.border_width, style.markers.border_color),
                );
            }
            paint_pin(painter, pos, &icon, style);
            continue;
        }

        let (outer, inner) = style.clusters.colors(cluster.count());
        let radius = CLUSTER_ICON_RADIUS as f32;
        painter.circle_filled(pos, radius, outer);
        painter.circle_filled(pos, radius - 5.0, inner);
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            cluster.count().to_string(),
            style.clusters.font_id.clone(),
            style.clusters.text_color,
        );
    }
}

/// Teardrop pin whose tip sits on `tip`
fn paint_pin(painter: &Painter, tip: Pos2, icon: &MarkerIcon, style: &MapStyle) {
    let width = icon.size.x as f32;
    let head_radius = width / 2.0;
    let head = Pos2::new(
        tip.x - icon.anchor.x as f32 + head_radius,
        tip.y - icon.anchor.y as f32 + head_radius,
    );
    let stroke = Stroke::new(style.markers.border_width, style.markers.border_color);

    painter.add(Shape::convex_polygon(
        vec![
            Pos2::new(head.x - head_radius * 0.9, head.y + head_radius * 0.4),
            Pos2::new(head.x + head_radius * 0.9, head.y + head_radius * 0.4),
            tip,
        ],
        style.markers.fill_color,
        stroke,
    ));
    painter.circle(head, head_radius, style.markers.fill_color, stroke);
    painter.circle_filled(head, head_radius * 0.4, style.markers.dot_color);
}

fn zoom_button_rects(rect: Rect) -> (Rect, Rect) {
    let zoom_in = Rect::from_min_size(
        rect.min + Vec2::splat(CONTROL_MARGIN),
        Vec2::splat(ZOOM_BUTTON_SIZE),
    );
    let zoom_out = zoom_in.translate(Vec2::new(0.0, ZOOM_BUTTON_SIZE));
    (zoom_in, zoom_out)
}

fn paint_zoom_buttons(painter: &Painter, rect: Rect, style: &MapStyle) {
    let (zoom_in, zoom_out) = zoom_button_rects(rect);
    paint_button(painter, zoom_in, "+", style);
    paint_button(painter, zoom_out, "−", style);
}

fn paint_button(painter: &Painter, button: Rect, label: &str, style: &MapStyle) {
    let controls = &style.controls;
    let hovered = painter
        .ctx()
        .pointer_hover_pos()
        .is_some_and(|pos| button.contains(pos));
    let fill = if hovered {
        controls.hover_color
    } else {
        controls.background_color
    };

    painter.rect_filled(button, controls.rounding, fill);
    painter.rect_stroke(button, controls.rounding, controls.border_stroke);
    painter.text(
        button.center(),
        Align2::CENTER_CENTER,
        label,
        controls.font_id.clone(),
        controls.text_color,
    );
}

fn paint_legend(painter: &Painter, rect: Rect, legend: &Legend, style: &MapStyle) {
    if legend.is_empty() {
        return;
    }
    let legend_style = &style.legend;
    let row_height = legend_style.swatch_size + 4.0;
    let label_width = legend
        .entries
        .iter()
        .map(|entry| entry.label.chars().count())
        .max()
        .unwrap_or(0) as f32
        * legend_style.font_id.size
        * 0.6;
    let size = Point::new(
        (legend_style.padding * 3.0 + legend_style.swatch_size + label_width) as f64,
        (legend_style.padding * 2.0 + row_height * legend.entries.len() as f32) as f64,
    );
    let container = Point::new(rect.width() as f64, rect.height() as f64);
    let bounds = legend.position.place(container, size, legend_style.margin as f64);
    let area = to_rect(rect, &bounds);

    painter.rect_filled(area, 4.0, legend_style.background_color);
    for (i, entry) in legend.entries.iter().enumerate() {
        let top = area.min.y + legend_style.padding + i as f32 * row_height;
        let swatch = Rect::from_min_size(
            Pos2::new(area.min.x + legend_style.padding, top),
            Vec2::splat(legend_style.swatch_size),
        );
        let [r, g, b, a] = entry.color;
        painter.rect_filled(swatch, 2.0, Color32::from_rgba_unmultiplied(r, g, b, a));
        painter.text(
            Pos2::new(swatch.max.x + legend_style.padding, swatch.center().y),
            Align2::LEFT_CENTER,
            &entry.label,
            legend_style.font_id.clone(),
            legend_style.text_color,
        );
    }
}

fn to_point(rect: Rect, pos: Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn to_pos(rect: Rect, point: &Point) -> Pos2 {
    rect.min + Vec2::new(point.x as f32, point.y as f32)
}

fn to_rect(rect: Rect, bounds: &Bounds) -> Rect {
    Rect::from_min_max(to_pos(rect, &bounds.min), to_pos(rect, &bounds.max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_buttons_stack_above_reset() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let (zoom_in, zoom_out) = zoom_button_rects(rect);
        assert_eq!(zoom_in.min, Pos2::new(10.0, 10.0));
        assert_eq!(zoom_out.min, Pos2::new(10.0, 40.0));

        let control = ResetViewControl::new(
            Default::default(),
            crate::core::constants::DEFAULT_CENTER,
            8.0,
        );
        let reset = to_rect(rect, &control.button_bounds(Point::new(800.0, 600.0)));
        assert!(reset.min.y >= zoom_out.max.y);
    }

    #[test]
    fn test_pixel_conversions() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0));
        let point = to_point(rect, Pos2::new(150.0, 60.0));
        assert_eq!(point, Point::new(50.0, 10.0));
        assert_eq!(to_pos(rect, &point), Pos2::new(150.0, 60.0));
    }

    #[test]
    fn test_trackpad_deltas_add_up_to_one_notch() {
        let mut wheel = WheelAccumulator::default();
        let steps: i32 = (0..10).map(|_| wheel.push(4.0)).sum();
        assert_eq!(steps, 0);
        assert_eq!(wheel.push(10.0), 1);

        // A mouse wheel line is one step
        assert_eq!(wheel.push(WHEEL_NOTCH), 1);
        assert_eq!(wheel.push(-2.0 * WHEEL_NOTCH), -2);

        // Changing direction drops what was left over
        wheel.push(-30.0);
        assert_eq!(wheel.push(30.0), 0);
        assert_eq!(wheel.push(20.0), 1);
    }

    #[test]
    fn test_broken_tile_bytes_do_not_decode() {
        assert!(decode_tile(b"not an image").is_none());
    }
}
