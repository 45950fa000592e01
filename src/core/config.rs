//! Configuration of the relief map view
//!
//! Every field has a default taken from [`crate::core::constants`], and
//! the whole structure can be loaded from (partial) JSON so deployments can
//! move the pan boundary or swap the imagery without recompiling.

use crate::{
    core::{
        constants::*,
        device::{DeviceClass, ZoomDefaults},
        geo::{LatLng, LatLngBounds},
    },
    layers::heatmap::HeatmapConfig,
    spatial::clustering::ClusteringConfig,
    ui::{legend::LegendEntry, reset_view::ResetViewOptions},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    /// Initial center of the canvas
    pub center: LatLng,
    /// Initial zoom and min zoom on desktop clients
    pub desktop: ZoomDefaults,
    /// Initial zoom and min zoom on every other client
    pub mobile: ZoomDefaults,
    pub max_zoom: f64,
    /// Step for zoom controls and wheel notches; zoom levels snap to it
    pub zoom_delta: f64,
    /// Draw markers on one canvas instead of one element each
    pub prefer_canvas: bool,
    /// Area the visible bounds may never leave
    pub max_bounds: LatLngBounds,
    /// 0.0 lets drags overshoot freely, 1.0 makes the boundary absolute
    pub max_bounds_viscosity: f64,
    pub heatmap: HeatmapConfig,
    pub tile_url_template: String,
    pub reset_view: ResetViewOptions,
    pub clustering: ClusteringConfig,
    pub legend: Vec<LegendEntry>,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            desktop: ZoomDefaults::new(DEFAULT_ZOOM, DEFAULT_MIN_ZOOM_DESKTOP),
            mobile: ZoomDefaults::new(DEFAULT_ZOOM_MOBILE, DEFAULT_MIN_ZOOM_MOBILE),
            max_zoom: MAX_ZOOM,
            zoom_delta: ZOOM_DELTA,
            prefer_canvas: true,
            max_bounds: MAX_BOUNDS,
            max_bounds_viscosity: MAX_BOUNDS_VISCOSITY,
            heatmap: HeatmapConfig::default(),
            tile_url_template: TILE_URL_TEMPLATE.to_string(),
            reset_view: ResetViewOptions::default(),
            clustering: ClusteringConfig::default(),
            legend: LegendEntry::defaults(),
        }
    }
}

impl MapViewConfig {
    /// Zoom defaults for a device class
    pub fn zoom_defaults(&self, device: DeviceClass) -> ZoomDefaults {
        if device.is_desktop() {
            self.desktop
        } else {
            self.mobile
        }
    }

    /// Parses and validates a configuration; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapViewConfig = serde_json::from_str(json).map_err(MapError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(MapError::from)?;
        log::info!("loading map view config from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center {:?} is not a valid coordinate",
                self.center
            ))
            .into());
        }
        if !self.max_bounds.is_valid() {
            return Err(MapError::Config(format!(
                "max bounds {:?} are not ordered south-west / north-east",
                self.max_bounds
            ))
            .into());
        }
        for (name, defaults) in [("desktop", &self.desktop), ("mobile", &self.mobile)] {
            if defaults.min_zoom > self.max_zoom {
                return Err(MapError::Config(format!(
                    "{} min zoom {} exceeds max zoom {}",
                    name, defaults.min_zoom, self.max_zoom
                ))
                .into());
            }
        }
        if self.zoom_delta.is_nan() || self.zoom_delta <= 0.0 {
            return Err(
                MapError::Config(format!("zoom delta must be positive, got {}", self.zoom_delta))
                    .into(),
            );
        }
        if !(0.0..=1.0).contains(&self.max_bounds_viscosity) {
            return Err(MapError::Config(format!(
                "viscosity must be within 0..=1, got {}",
                self.max_bounds_viscosity
            ))
            .into());
        }
        if self.heatmap.radius <= 0.0 {
            return Err(MapError::Config(format!(
                "heatmap radius must be positive, got {}",
                self.heatmap.radius
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MapViewConfig::default();
        assert_eq!(config.center, DEFAULT_CENTER);
        assert_eq!(config.zoom_delta, 0.5);
        assert!(config.prefer_canvas);
        assert_eq!(config.max_bounds_viscosity, 1.0);
        assert_eq!(config.max_bounds.south_west, LatLng::new(33.9825, 25.20902));
        assert_eq!(config.max_bounds.north_east, LatLng::new(43.32683, 46.7742));
        assert_eq!(config.heatmap.radius, 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zoom_defaults_by_device() {
        let config = MapViewConfig::default();
        assert_eq!(
            config.zoom_defaults(DeviceClass::Desktop),
            ZoomDefaults::new(DEFAULT_ZOOM, DEFAULT_MIN_ZOOM_DESKTOP)
        );
        assert_eq!(
            config.zoom_defaults(DeviceClass::Mobile),
            ZoomDefaults::new(DEFAULT_ZOOM_MOBILE, DEFAULT_MIN_ZOOM_MOBILE)
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MapViewConfig::from_json_str(
            r#"{ "zoom_delta": 1.0, "heatmap": { "radius": 20.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.zoom_delta, 1.0);
        assert_eq!(config.heatmap.radius, 20.0);
        assert!(config.heatmap.fit_bounds_on_load);
        assert_eq!(config.tile_url_template, TILE_URL_TEMPLATE);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(MapViewConfig::from_json_str("not json").is_err());
        assert!(MapViewConfig::from_json_str(r#"{ "zoom_delta": 0.0 }"#).is_err());
        assert!(MapViewConfig::from_json_str(r#"{ "max_bounds_viscosity": 2.0 }"#).is_err());
        assert!(MapViewConfig::from_json_str(
            r#"{ "max_bounds": { "south_west": { "lat": 40.0, "lng": 30.0 },
                                 "north_east": { "lat": 35.0, "lng": 40.0 } } }"#
        )
        .is_err());
        assert!(MapViewConfig::from_json_str(
            r#"{ "max_zoom": 5.0 }"#
        )
        .is_err());
    }
}
