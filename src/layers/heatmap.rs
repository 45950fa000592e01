//! Heatmap overlay
//!
//! The layer is generic over its point type and reads each point through
//! three extractor functions, so any `(lat, lng, intensity)` shape can be
//! drawn. Density itself is computed by a [`HeatmapRenderer`].

use crate::{
    core::{
        constants::{DEFAULT_IMPORTANCY, HEATMAP_RADIUS},
        geo::{LatLng, LatLngBounds},
        viewport::Viewport,
    },
    data::projection::{intensity_extractor, latitude_extractor, longitude_extractor, HeatPoint},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    plugins::heatmap::GridHeatmapRenderer,
    traits::HeatmapRenderer,
    Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reads one coordinate or the weight out of a point
pub type Extractor<P> = fn(&P) -> f64;

/// Configuration for the heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Radius of influence of each point, in pixels
    pub radius: f64,
    /// Weight given to every marker when projecting
    pub weight: f64,
    /// Blur factor of the Gaussian falloff
    pub blur: f64,
    /// Intensity drawn with the last gradient stop; 0 uses the densest cell
    pub max_intensity: f64,
    /// Gradient stops from low to high intensity, RGBA
    pub gradient: Vec<(f64, [u8; 4])>,
    pub opacity: f32,
    /// Fit the canvas to the points the first time they arrive
    pub fit_bounds_on_load: bool,
    /// Fit the canvas to the points whenever they change
    pub fit_bounds_on_update: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            radius: HEATMAP_RADIUS,
            weight: DEFAULT_IMPORTANCY,
            blur: 15.0,
            max_intensity: 0.0,
            gradient: vec![
                (0.0, [0, 0, 255, 0]),
                (0.4, [0, 0, 255, 160]),
                (0.6, [0, 255, 255, 180]),
                (0.7, [0, 255, 0, 200]),
                (0.8, [255, 255, 0, 220]),
                (1.0, [255, 0, 0, 255]),
            ],
            opacity: 0.8,
            fit_bounds_on_load: true,
            fit_bounds_on_update: true,
        }
    }
}

/// A point after extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    pub position: LatLng,
    pub intensity: f64,
}

impl WeightedPoint {
    pub fn new(position: LatLng, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// Density sampled on a square grid over the container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapGrid {
    /// Cell edge in container pixels
    pub cell_size: f64,
    pub columns: usize,
    pub rows: usize,
    /// Row-major, `rows * columns` values
    pub values: Vec<f64>,
    pub max_value: f64,
}

impl HeatmapGrid {
    pub fn new(cell_size: f64, columns: usize, rows: usize) -> Self {
        Self {
            cell_size,
            columns,
            rows,
            values: vec![0.0; columns * rows],
            max_value: 0.0,
        }
    }

    pub fn value(&self, column: usize, row: usize) -> f64 {
        if column >= self.columns || row >= self.rows {
            return 0.0;
        }
        self.values[row * self.columns + column]
    }

    pub fn is_empty(&self) -> bool {
        self.max_value <= 0.0
    }
}

pub struct HeatmapLayer<P = HeatPoint> {
    properties: LayerProperties,
    config: HeatmapConfig,
    latitude: Extractor<P>,
    longitude: Extractor<P>,
    intensity: Extractor<P>,
    points: Option<Arc<[P]>>,
    bounds: Option<LatLngBounds>,
    renderer: Box<dyn HeatmapRenderer>,
    grid: HeatmapGrid,
}

impl HeatmapLayer<HeatPoint> {
    /// Heatmap over projected marker points
    pub fn for_heat_points(config: HeatmapConfig) -> Self {
        Self::new(
            config,
            latitude_extractor,
            longitude_extractor,
            intensity_extractor,
        )
    }
}

impl<P: Send + Sync + 'static> HeatmapLayer<P> {
    pub fn new(
        config: HeatmapConfig,
        latitude: Extractor<P>,
        longitude: Extractor<P>,
        intensity: Extractor<P>,
    ) -> Self {
        let renderer = Box::new(GridHeatmapRenderer::with_blur(config.blur));
        Self::with_renderer(config, latitude, longitude, intensity, renderer)
    }

    pub fn with_renderer(
        config: HeatmapConfig,
        latitude: Extractor<P>,
        longitude: Extractor<P>,
        intensity: Extractor<P>,
        renderer: Box<dyn HeatmapRenderer>,
    ) -> Self {
        Self {
            properties: LayerProperties::new(
                "heatmap".to_string(),
                "Heatmap".to_string(),
                LayerType::Heatmap,
            ),
            config,
            latitude,
            longitude,
            intensity,
            points: None,
            bounds: None,
            renderer,
            grid: HeatmapGrid::default(),
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn extractors(&self) -> (Extractor<P>, Extractor<P>, Extractor<P>) {
        (self.latitude, self.longitude, self.intensity)
    }

    pub fn points(&self) -> Option<&Arc<[P]>> {
        self.points.as_ref()
    }

    pub fn point_count(&self) -> usize {
        self.points.as_ref().map_or(0, |points| points.len())
    }

    /// Grid computed by the last [`update`](LayerTrait::update)
    pub fn grid(&self) -> &HeatmapGrid {
        &self.grid
    }

    /// Takes a new point set.
    ///
    /// Returns the bounds the canvas should fit, following
    /// `fit_bounds_on_load` for the first set and `fit_bounds_on_update`
    /// afterwards. The same `Arc` again is not a change; an empty set
    /// never asks for a fit.
    pub fn set_points(&mut self, points: Arc<[P]>) -> Option<LatLngBounds> {
        let first = match &self.points {
            Some(current) if Arc::ptr_eq(current, &points) => return None,
            Some(_) => false,
            None => true,
        };

        let weighted = self.weighted(&points);
        self.bounds = LatLngBounds::from_points(weighted.iter().map(|point| point.position));
        self.renderer.set_points(weighted);
        self.points = Some(points);

        let wants_fit = if first {
            self.config.fit_bounds_on_load
        } else {
            self.config.fit_bounds_on_update
        };
        if !wants_fit {
            return None;
        }
        if self.bounds.is_none() {
            log::warn!("heatmap has no points, skipping fit bounds");
        }
        self.bounds
    }

    /// Swaps the density renderer, handing it the points already shown
    pub fn set_renderer(&mut self, mut renderer: Box<dyn HeatmapRenderer>) {
        if let Some(points) = &self.points {
            renderer.set_points(self.weighted(points));
        }
        self.renderer = renderer;
        self.grid = HeatmapGrid::default();
    }

    fn weighted(&self, points: &[P]) -> Vec<WeightedPoint> {
        points
            .iter()
            .map(|point| {
                WeightedPoint::new(
                    LatLng::new((self.latitude)(point), (self.longitude)(point)),
                    (self.intensity)(point),
                )
            })
            .filter(|point| point.position.is_valid())
            .collect()
    }

    fn radius(&self) -> f64 {
        self.config.radius
    }
}

impl<P: Send + Sync + 'static> LayerTrait for HeatmapLayer<P> {
    crate::impl_layer_trait!(HeatmapLayer<P>, properties);
    crate::impl_default_options_serialization!(
        properties,
        "radius" => radius,
        "points" => point_count,
    );

    fn update(&mut self, viewport: &Viewport) -> Result<()> {
        self.grid = self.renderer.render(viewport, self.config.radius);
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    fn points() -> Arc<[HeatPoint]> {
        vec![[36.2, 36.1, 10.0], [37.0, 37.3, 10.0], [38.3, 38.3, 10.0]].into()
    }

    #[test]
    fn test_default_config() {
        let config = HeatmapConfig::default();
        assert_eq!(config.radius, 15.0);
        assert_eq!(config.weight, 10.0);
        assert!(config.fit_bounds_on_load);
        assert!(config.fit_bounds_on_update);
    }

    #[test]
    fn test_fit_on_load_and_update() {
        let mut layer = HeatmapLayer::for_heat_points(HeatmapConfig::default());
        let first = points();

        let bounds = layer.set_points(Arc::clone(&first)).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(36.2, 36.1));
        assert_eq!(bounds.north_east, LatLng::new(38.3, 38.3));

        // Same snapshot: nothing to do
        assert!(layer.set_points(first).is_none());

        let moved: Arc<[HeatPoint]> = vec![[37.0, 37.0, 10.0]].into();
        assert_eq!(
            layer.set_points(moved),
            Some(LatLngBounds::from_coords(37.0, 37.0, 37.0, 37.0))
        );
    }

    #[test]
    fn test_fit_flags_are_respected() {
        let config = HeatmapConfig {
            fit_bounds_on_load: false,
            fit_bounds_on_update: true,
            ..Default::default()
        };
        let mut layer = HeatmapLayer::for_heat_points(config);
        assert!(layer.set_points(points()).is_none());
        assert!(layer.set_points(points()).is_some());
    }

    #[test]
    fn test_empty_points_never_fit() {
        let mut layer = HeatmapLayer::for_heat_points(HeatmapConfig::default());
        assert!(layer.set_points(Vec::new().into()).is_none());
        assert!(layer.bounds().is_none());
    }

    #[test]
    fn test_custom_point_shape() {
        struct Sample {
            y: f64,
            x: f64,
        }
        fn lat(sample: &Sample) -> f64 {
            sample.y
        }
        fn lng(sample: &Sample) -> f64 {
            sample.x
        }
        fn one(_: &Sample) -> f64 {
            1.0
        }

        let mut layer = HeatmapLayer::new(HeatmapConfig::default(), lat, lng, one);
        let bounds = layer
            .set_points(vec![Sample { y: 37.0, x: 36.0 }, Sample { y: 38.0, x: 35.0 }].into())
            .unwrap();
        assert_eq!(bounds, LatLngBounds::from_coords(37.0, 35.0, 38.0, 36.0));
    }

    /// Records what it is given and paints one hot cell
    struct OneCell(Arc<std::sync::Mutex<Vec<WeightedPoint>>>);

    impl HeatmapRenderer for OneCell {
        fn set_points(&mut self, points: Vec<WeightedPoint>) {
            *self.0.lock().unwrap() = points;
        }

        fn render(&mut self, _viewport: &Viewport, radius: f64) -> HeatmapGrid {
            let mut grid = HeatmapGrid::new(radius, 1, 1);
            grid.values[0] = 1.0;
            grid.max_value = 1.0;
            grid
        }
    }

    #[test]
    fn test_swapped_renderer_gets_current_points() {
        let mut layer = HeatmapLayer::for_heat_points(HeatmapConfig::default());
        layer.set_points(points());

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        layer.set_renderer(Box::new(OneCell(Arc::clone(&seen))));
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert_eq!(seen.lock().unwrap()[0], WeightedPoint::new(LatLng::new(36.2, 36.1), 10.0));
        assert!(layer.grid().is_empty());

        let view = Viewport::new(LatLng::new(37.0, 37.3), 8.0, Point::new(400.0, 300.0));
        layer.update(&view).unwrap();
        assert_eq!(layer.grid().columns, 1);
        assert_eq!(layer.grid().value(0, 0), 1.0);
    }

    #[test]
    fn test_update_renders_density() {
        let mut layer = HeatmapLayer::for_heat_points(HeatmapConfig::default());
        layer.set_points(points());

        let view = Viewport::new(LatLng::new(37.0, 37.3), 8.0, Point::new(400.0, 300.0));
        layer.update(&view).unwrap();
        assert!(!layer.grid().is_empty());
        assert_eq!(layer.options()["points"], 3);
    }
}
