use crate::core::{
    constants::TILE_SIZE,
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Manages the current view of the map: center, zoom, and screen dimensions
///
/// World pixel coordinates are Web Mercator pixels at the current zoom
/// (`256 * 2^zoom` wide). The view center always sits in the middle of the
/// container, so the visible world rectangle is `project(center) ± size / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Zoom levels are rounded to multiples of this (0 disables snapping)
    zoom_snap: f64,
    /// Maximum bounds for the map
    max_bounds: Option<LatLngBounds>,
    /// Viscosity for bounds enforcement (0.0 = loose, 1.0 = solid)
    max_bounds_viscosity: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 18.0),
            size,
            min_zoom: 0.0,
            max_zoom: 18.0,
            zoom_snap: 0.0,
            max_bounds: None,
            max_bounds_viscosity: 0.0,
        }
    }

    /// Sets the maximum bounds for the map and pulls the view back inside them
    pub fn set_max_bounds(&mut self, bounds: Option<LatLngBounds>, viscosity: Option<f64>) {
        self.max_bounds = bounds;
        self.max_bounds_viscosity = viscosity.unwrap_or(0.0).clamp(0.0, 1.0);
        self.settle();
    }

    /// Get the maximum bounds for the map if set
    pub fn max_bounds(&self) -> Option<&LatLngBounds> {
        self.max_bounds.as_ref()
    }

    pub fn max_bounds_viscosity(&self) -> f64 {
        self.max_bounds_viscosity
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.limit_zoom(self.zoom);
        self.settle();
    }

    pub fn set_zoom_snap(&mut self, zoom_snap: f64) {
        self.zoom_snap = zoom_snap.max(0.0);
        self.zoom = self.limit_zoom(self.zoom);
        self.settle();
    }

    pub fn zoom_snap(&self) -> f64 {
        self.zoom_snap
    }

    /// Sets the center of the viewport, keeping the visible area inside the max bounds
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
        self.settle();
    }

    /// Sets the zoom level, clamping to the valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.limit_zoom(zoom);
        self.settle();
    }

    /// Sets center and zoom in one step
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = self.limit_zoom(zoom);
        self.settle();
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.zoom = self.limit_zoom(self.zoom);
        self.settle();
    }

    /// Whether the container has a drawable area yet
    pub fn has_size(&self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let world_size = TILE_SIZE as f64 * 2_f64.powf(zoom.unwrap_or(self.zoom));
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        let x = (lat_lng.lng + 180.0) / 360.0 * world_size;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world_size;

        Point::new(x, y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let world_size = TILE_SIZE as f64 * 2_f64.powf(zoom.unwrap_or(self.zoom));

        let lng = pixel.x / world_size * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * pixel.y / world_size))
            .sinh()
            .atan()
            .to_degrees();

        LatLng::new(lat, lng)
    }

    /// World pixel position of the container's top-left corner
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center, None)
            .subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.unproject(&pixel.add(&self.pixel_origin()), None)
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Rounds a zoom level to the configured snap
    pub fn snap_zoom(&self, zoom: f64) -> f64 {
        if self.zoom_snap > 0.0 {
            (zoom / self.zoom_snap).round() * self.zoom_snap
        } else {
            zoom
        }
    }

    /// Lowest zoom at which the whole container still fits inside the max bounds
    pub fn effective_min_zoom(&self) -> f64 {
        let mut min_zoom = self.min_zoom;
        if let Some(bounds) = self.max_bounds {
            if self.has_size() {
                min_zoom = min_zoom.max(self.bounds_zoom(&bounds, true, 0.0));
            }
        }
        min_zoom.min(self.max_zoom)
    }

    /// Snaps and clamps a zoom level to what this viewport allows
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        self.snap_zoom(zoom)
            .clamp(self.effective_min_zoom(), self.max_zoom)
    }

    /// Zoom at which `bounds` fills the container.
    ///
    /// With `inside` the container fits inside the bounds (rounded up to the
    /// snap); otherwise the bounds fit inside the container (rounded down).
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, inside: bool, padding: f64) -> f64 {
        let nw = self.project(&bounds.north_west(), Some(0.0));
        let se = self.project(&bounds.south_east(), Some(0.0));
        let bounds_size = Point::new((se.x - nw.x).abs(), (se.y - nw.y).abs());
        let available = Point::new(
            (self.size.x - 2.0 * padding).max(1.0),
            (self.size.y - 2.0 * padding).max(1.0),
        );

        if bounds_size.x <= 0.0 && bounds_size.y <= 0.0 {
            return self.max_zoom;
        }

        let scale_x = if bounds_size.x > 0.0 {
            available.x / bounds_size.x
        } else {
            f64::INFINITY
        };
        let scale_y = if bounds_size.y > 0.0 {
            available.y / bounds_size.y
        } else {
            f64::INFINITY
        };

        let scale = if inside {
            if scale_x.is_finite() && scale_y.is_finite() {
                scale_x.max(scale_y)
            } else {
                scale_x.min(scale_y)
            }
        } else {
            scale_x.min(scale_y)
        };
        let zoom = scale.log2();

        if self.zoom_snap > 0.0 {
            // Tolerate float noise so exact fits are not pushed a whole step
            let steps = zoom / self.zoom_snap;
            if inside {
                (steps - 1e-9).ceil() * self.zoom_snap
            } else {
                (steps + 1e-9).floor() * self.zoom_snap
            }
        } else {
            zoom
        }
    }

    /// Pans the view by a drag offset in pixels.
    ///
    /// Overshooting the max bounds is damped by the viscosity; at 1.0 the
    /// view cannot leave them at all. Returns the offset actually applied.
    pub fn pan(&mut self, delta: Point) -> Point {
        let current = self.project(&self.center, None);
        let mut target = current.subtract(&delta);

        if self.max_bounds_viscosity > 0.0 {
            if let Some((min, max)) = self.center_pixel_range() {
                target.x = self.viscous_limit(target.x, min.x, max.x);
                target.y = self.viscous_limit(target.y, min.y, max.y);
            }
        }

        self.center = self.unproject(&target, None);
        if self.max_bounds_viscosity >= 1.0 {
            self.settle();
        }

        current.subtract(&self.project(&self.center, None))
    }

    /// Applies viscous resistance to boundary violations
    fn viscous_limit(&self, value: f64, min: f64, max: f64) -> f64 {
        if value < min {
            value - (value - min) * self.max_bounds_viscosity
        } else if value > max {
            value - (value - max) * self.max_bounds_viscosity
        } else {
            value
        }
    }

    /// Zooms to a level, keeping the geographic point under `focus_point` fixed on screen
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = self.limit_zoom(zoom);

        if let Some(focus_screen) = focus_point {
            let focus_lat_lng = self.pixel_to_lat_lng(&focus_screen);
            let focus_world = self.project(&focus_lat_lng, Some(new_zoom));
            let from_center = focus_screen.subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0));
            let center_world = focus_world.subtract(&from_center);

            self.zoom = new_zoom;
            self.center = self.unproject(&center_world, None);
        } else {
            self.zoom = new_zoom;
        }

        self.settle();
    }

    /// Fits the viewport to contain the given bounds
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) {
        let padding = padding.unwrap_or(0.0);
        let zoom = self.limit_zoom(self.bounds_zoom(bounds, false, padding));

        let nw = self.project(&bounds.north_west(), Some(zoom));
        let se = self.project(&bounds.south_east(), Some(zoom));
        let center_world = Point::new((nw.x + se.x) / 2.0, (nw.y + se.y) / 2.0);

        self.zoom = zoom;
        self.center = self.unproject(&center_world, Some(zoom));
        self.settle();
    }

    /// Range the center's world pixel may occupy so the container stays inside the max bounds
    fn center_pixel_range(&self) -> Option<(Point, Point)> {
        let bounds = self.max_bounds?;
        let nw = self.project(&bounds.north_west(), None);
        let se = self.project(&bounds.south_east(), None);
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);

        let axis = |lo: f64, hi: f64, half: f64| {
            let (min, max) = (lo + half, hi - half);
            if min <= max {
                (min, max)
            } else {
                let mid = (lo + hi) / 2.0;
                (mid, mid)
            }
        };

        let (min_x, max_x) = axis(nw.x, se.x, half.x);
        let (min_y, max_y) = axis(nw.y, se.y, half.y);
        Some((Point::new(min_x, min_y), Point::new(max_x, max_y)))
    }

    /// Pulls the center back so the visible area lies inside the max bounds
    pub fn settle(&mut self) {
        if let Some((min, max)) = self.center_pixel_range() {
            let world = self.project(&self.center, None);
            let clamped = Point::new(world.x.clamp(min.x, max.x), world.y.clamp(min.y, max.y));
            if clamped != world {
                self.center = self.unproject(&clamped, None);
            }
        } else {
            self.center = LatLng::new(
                LatLng::clamp_lat(self.center.lat),
                self.center.lng.clamp(-180.0, 180.0),
            );
        }
    }

    /// Whether the visible area lies inside the max bounds, within `epsilon` degrees
    pub fn is_within_max_bounds(&self, epsilon: f64) -> bool {
        match &self.max_bounds {
            Some(bounds) => bounds.contains_bounds(&self.bounds(), epsilon),
            None => true,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MAX_BOUNDS;

    fn bounded_viewport() -> Viewport {
        let mut viewport = Viewport::new(LatLng::new(37.0, 37.0), 8.0, Point::new(800.0, 600.0));
        viewport.set_zoom_snap(0.5);
        viewport.set_zoom_limits(6.0, 18.0);
        viewport.set_max_bounds(Some(MAX_BOUNDS), Some(1.0));
        viewport
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(37.0, 37.0), 10.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 37.0);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center_lat_lng = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));
        assert!(center_lat_lng.lat.abs() < 1e-9);
        assert!(center_lat_lng.lng.abs() < 1e-9);

        let target = LatLng::new(37.5, 36.9);
        let pixel = viewport.lat_lng_to_pixel(&target);
        let back = viewport.pixel_to_lat_lng(&pixel);
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits_and_snap() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);
        viewport.set_zoom_snap(0.5);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);

        viewport.set_zoom(7.3);
        assert_eq!(viewport.zoom, 7.5);
    }

    #[test]
    fn test_effective_min_zoom_keeps_container_inside_bounds() {
        let viewport = bounded_viewport();
        let min = viewport.effective_min_zoom();
        assert!(min >= 6.0);

        let mut zoomed_out = viewport.clone();
        zoomed_out.set_zoom(0.0);
        assert_eq!(zoomed_out.zoom, min);
        assert!(zoomed_out.is_within_max_bounds(1e-6));
    }

    #[test]
    fn test_pan_stops_at_bounds() {
        let mut viewport = bounded_viewport();
        for _ in 0..50 {
            viewport.pan(Point::new(400.0, 0.0));
        }
        assert!(viewport.is_within_max_bounds(1e-6));
        let bounds = viewport.bounds();
        assert!((bounds.south_west.lng - MAX_BOUNDS.south_west.lng).abs() < 1e-6);
    }

    #[test]
    fn test_loose_pan_moves_freely() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(512.0, 512.0));
        let start_center = viewport.center;
        let applied = viewport.pan(Point::new(10.0, 10.0));

        assert_ne!(viewport.center, start_center);
        assert!((applied.x - 10.0).abs() < 1e-6);
        assert!((applied.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_to_keeps_focus_fixed() {
        let mut viewport = Viewport::new(LatLng::new(37.0, 37.0), 8.0, Point::new(800.0, 600.0));
        let focus = Point::new(600.0, 200.0);
        let before = viewport.pixel_to_lat_lng(&focus);

        viewport.zoom_to(10.0, Some(focus));
        let after = viewport.lat_lng_to_pixel(&before);

        assert_eq!(viewport.zoom, 10.0);
        assert!(after.distance_to(&focus) < 1e-6);
    }

    #[test]
    fn test_fit_bounds_contains_target() {
        let mut viewport = bounded_viewport();
        let target = LatLngBounds::from_coords(36.5, 36.0, 37.5, 38.0);
        viewport.fit_bounds(&target, None);

        let visible = viewport.bounds();
        assert!(visible.contains_bounds(&target, 1e-6));
        assert!(viewport.is_within_max_bounds(1e-6));
        assert_eq!(viewport.zoom % 0.5, 0.0);
    }
}
