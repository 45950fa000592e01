use crate::{
    core::{
        constants::{MAX_ZOOM, TILE_SIZE},
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::{
        cache::TileCache,
        loader::TileLoader,
        source::{TileSource, UrlTemplateSource},
    },
    Result,
};
use std::sync::Arc;

/// A tile the current view needs, positioned in container pixels
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    pub coord: TileCoord,
    pub url: String,
    /// Top-left corner in container pixels
    pub offset: Point,
    /// Edge length on screen; differs from the tile size at fractional zoom
    pub size: f64,
}

/// Base imagery layer
pub struct TileLayer {
    properties: LayerProperties,
    source: Arc<UrlTemplateSource>,
    tile_size: f64,
    max_zoom: u8,
    loader: Option<TileLoader>,
    tiles: Vec<TileRequest>,
}

impl TileLayer {
    pub fn new(template: &str) -> Result<Self> {
        Ok(Self {
            properties: LayerProperties::new(
                "tiles".to_string(),
                "Base tiles".to_string(),
                LayerType::Tile,
            ),
            source: Arc::new(UrlTemplateSource::new(template)?),
            tile_size: TILE_SIZE as f64,
            max_zoom: MAX_ZOOM as u8,
            loader: None,
            tiles: Vec::new(),
        })
    }

    /// Downloads visible tiles into `cache` on every update
    pub fn with_loading(mut self, cache: TileCache) -> Self {
        let source: Arc<dyn TileSource> = self.source.clone();
        self.loader = Some(TileLoader::new(source, cache));
        self
    }

    pub fn template(&self) -> &str {
        self.source.template()
    }

    pub fn loader(&self) -> Option<&TileLoader> {
        self.loader.as_ref()
    }

    /// Tiles covering the view after the last update, nearest to the center first
    pub fn tiles(&self) -> &[TileRequest] {
        &self.tiles
    }

    /// Integer zoom the tiles are fetched at
    pub fn tile_zoom(&self, viewport: &Viewport) -> u8 {
        viewport.zoom.round().clamp(0.0, self.max_zoom as f64) as u8
    }

    fn visible_tiles(&self, viewport: &Viewport) -> Vec<TileRequest> {
        if !viewport.has_size() {
            return Vec::new();
        }

        let zoom = self.tile_zoom(viewport);
        let scale = 2_f64.powf(viewport.zoom - zoom as f64);
        let pixel_center = viewport.project(&viewport.center, Some(zoom as f64));
        let half_size = Point::new(
            viewport.size.x / (scale * 2.0),
            viewport.size.y / (scale * 2.0),
        );
        let min = pixel_center.subtract(&half_size);
        let max = pixel_center.add(&half_size);

        let last = (1i64 << zoom) - 1;
        let x_range = ((min.x / self.tile_size).floor() as i64).max(0)
            ..=((max.x / self.tile_size).floor() as i64).min(last);
        let y_range = ((min.y / self.tile_size).floor() as i64).max(0)
            ..=((max.y / self.tile_size).floor() as i64).min(last);

        let mut tiles = Vec::new();
        for y in y_range {
            for x in x_range.clone() {
                let coord = TileCoord::new(x as u32, y as u32, zoom);
                let origin = Point::new(x as f64 * self.tile_size, y as f64 * self.tile_size);
                tiles.push(TileRequest {
                    coord,
                    url: self.source.url(coord),
                    offset: origin.subtract(&min).multiply(scale),
                    size: self.tile_size * scale,
                });
            }
        }

        let center_tile = pixel_center.multiply(1.0 / self.tile_size);
        tiles.sort_by(|a, b| {
            let da = Point::new(a.coord.x as f64 + 0.5, a.coord.y as f64 + 0.5)
                .distance_to(&center_tile);
            let db = Point::new(b.coord.x as f64 + 0.5, b.coord.y as f64 + 0.5)
                .distance_to(&center_tile);
            da.total_cmp(&db)
        });
        tiles
    }

    fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);
    crate::impl_default_options_serialization!(
        properties,
        "url" => template,
        "tiles" => tile_count,
    );

    fn update(&mut self, viewport: &Viewport) -> Result<()> {
        self.tiles = self.visible_tiles(viewport);
        if let Some(loader) = &self.loader {
            loader.poll();
            for tile in &self.tiles {
                loader.request(tile.coord);
            }
        }
        Ok(())
    }
}
