use crate::{
    core::{
        geo::{LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::heatmap::{HeatmapConfig, HeatmapGrid, WeightedPoint},
    spatial::index::{SpatialIndex, SpatialItem},
    traits::HeatmapRenderer,
};

#[derive(Debug, Clone)]
struct HeatmapCache {
    viewport_bounds: LatLngBounds,
    zoom_level: f64,
    radius: f64,
    grid: HeatmapGrid,
}

/// Density grid with a Gaussian falloff around every point
pub struct GridHeatmapRenderer {
    blur: f64,
    spatial_index: SpatialIndex<f64>,
    cached_heatmap: Option<HeatmapCache>,
}

impl GridHeatmapRenderer {
    pub fn new() -> Self {
        Self::with_blur(HeatmapConfig::default().blur)
    }

    pub fn with_blur(blur: f64) -> Self {
        Self {
            blur: blur.max(f64::EPSILON),
            spatial_index: SpatialIndex::new(),
            cached_heatmap: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.spatial_index.len()
    }

    fn generate(&self, viewport: &Viewport, radius: f64) -> HeatmapGrid {
        let cell_size = (radius / 2.0).max(1.0);
        let columns = (viewport.size.x / cell_size).ceil().max(0.0) as usize;
        let rows = (viewport.size.y / cell_size).ceil().max(0.0) as usize;
        let mut grid = HeatmapGrid::new(cell_size, columns, rows);
        if columns == 0 || rows == 0 {
            return grid;
        }

        // Points just outside the container still bleed into it
        let nw = viewport.pixel_to_lat_lng(&Point::new(-radius, -radius));
        let se = viewport.pixel_to_lat_lng(&Point::new(
            viewport.size.x + radius,
            viewport.size.y + radius,
        ));
        let padded = LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng);

        let reach = (radius / cell_size).ceil() as i64;
        for item in self.spatial_index.query_lat_lng(&padded) {
            let pixel = viewport.lat_lng_to_pixel(&item.lat_lng());
            let home_col = (pixel.x / cell_size).floor() as i64;
            let home_row = (pixel.y / cell_size).floor() as i64;

            for row in (home_row - reach).max(0)..=(home_row + reach).min(rows as i64 - 1) {
                for col in (home_col - reach).max(0)..=(home_col + reach).min(columns as i64 - 1) {
                    let cell_center = Point::new(
                        (col as f64 + 0.5) * cell_size,
                        (row as f64 + 0.5) * cell_size,
                    );
                    let distance = cell_center.distance_to(&pixel);
                    if distance <= radius {
                        let influence =
                            (-distance * distance / (2.0 * self.blur * self.blur)).exp();
                        grid.values[row as usize * columns + col as usize] +=
                            item.data * influence;
                    }
                }
            }
        }

        grid.max_value = grid.values.iter().copied().fold(0.0, f64::max);
        grid
    }
}

impl Default for GridHeatmapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapRenderer for GridHeatmapRenderer {
    fn set_points(&mut self, points: Vec<WeightedPoint>) {
        let items = points
            .into_iter()
            .enumerate()
            .map(|(i, point)| {
                SpatialItem::from_lat_lng(format!("heat_{}", i), point.position, point.intensity)
            })
            .collect();
        self.spatial_index = SpatialIndex::bulk_load(items);
        self.cached_heatmap = None;
    }

    fn render(&mut self, viewport: &Viewport, radius: f64) -> HeatmapGrid {
        let viewport_bounds = viewport.bounds();
        if let Some(ref cache) = self.cached_heatmap {
            if cache.viewport_bounds == viewport_bounds
                && (cache.zoom_level - viewport.zoom).abs() < 0.01
                && cache.radius == radius
            {
                return cache.grid.clone();
            }
        }

        let grid = self.generate(viewport, radius);
        self.cached_heatmap = Some(HeatmapCache {
            viewport_bounds,
            zoom_level: viewport.zoom,
            radius,
            grid: grid.clone(),
        });
        grid
    }
}

/// Maps a cell value to an RGBA color using the configured gradient.
///
/// `max` is the value drawn with the last stop; `config.max_intensity`
/// overrides it when positive.
pub fn intensity_to_color(config: &HeatmapConfig, value: f64, max: f64) -> [u8; 4] {
    let (Some(first), Some(last)) = (config.gradient.first(), config.gradient.last()) else {
        return [0, 0, 0, 0];
    };

    let max = if config.max_intensity > 0.0 {
        config.max_intensity
    } else {
        max
    };
    if max <= 0.0 || value <= 0.0 {
        return first.1;
    }

    let normalized = (value / max).min(1.0);
    let scale_alpha = |color: [u8; 4]| {
        [
            color[0],
            color[1],
            color[2],
            (color[3] as f32 * config.opacity.clamp(0.0, 1.0)) as u8,
        ]
    };

    for pair in config.gradient.windows(2) {
        let (t1, color1) = pair[0];
        let (t2, color2) = pair[1];

        if normalized >= t1 && normalized <= t2 {
            let t = if t2 > t1 { (normalized - t1) / (t2 - t1) } else { 1.0 };
            let mut mixed = [0u8; 4];
            for channel in 0..4 {
                mixed[channel] = (color1[channel] as f64 * (1.0 - t)
                    + color2[channel] as f64 * t)
                    .round() as u8;
            }
            return scale_alpha(mixed);
        }
    }

    scale_alpha(last.1)
}
