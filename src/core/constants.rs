//! Fixed configuration of the relief map view.
//! Everything here is the default behind [`MapViewConfig`](crate::core::config::MapViewConfig).

use crate::core::geo::{LatLng, LatLngBounds};

/// Initial map center, over the affected region.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 37.0,
    lng: 37.0,
};

/// Initial zoom on desktop clients.
pub const DEFAULT_ZOOM: f64 = 8.0;

/// Initial zoom on every non-desktop client.
pub const DEFAULT_ZOOM_MOBILE: f64 = 7.0;

/// Lowest zoom a desktop client may reach.
pub const DEFAULT_MIN_ZOOM_DESKTOP: f64 = 7.0;

/// Lowest zoom a non-desktop client may reach.
pub const DEFAULT_MIN_ZOOM_MOBILE: f64 = 6.0;

/// Highest zoom the canvas allows.
pub const MAX_ZOOM: f64 = 18.0;

/// Fixed weight of every heatmap point.
pub const DEFAULT_IMPORTANCY: f64 = 10.0;

/// Zoom step for +/- controls and wheel notches; also the zoom snap.
pub const ZOOM_DELTA: f64 = 0.5;

/// Heatmap point radius in pixels.
pub const HEATMAP_RADIUS: f64 = 15.0;

/// 1.0 makes the pan boundary absolute.
pub const MAX_BOUNDS_VISCOSITY: f64 = 1.0;

/// South-west corner of the pannable area.
pub const MAX_BOUNDS_SOUTH_WEST: LatLng = LatLng {
    lat: 33.9825,
    lng: 25.20902,
};

/// North-east corner of the pannable area.
pub const MAX_BOUNDS_NORTH_EAST: LatLng = LatLng {
    lat: 43.32683,
    lng: 46.7742,
};

/// The pannable area as bounds.
pub const MAX_BOUNDS: LatLngBounds = LatLngBounds {
    south_west: MAX_BOUNDS_SOUTH_WEST,
    north_east: MAX_BOUNDS_NORTH_EAST,
};

/// Base imagery tile source.
pub const TILE_URL_TEMPLATE: &str = "https://mt0.google.com/vt/lyrs=m&hl=en&x={x}&y={y}&z={z}&apistyle=s.e%3Al.i%7Cp.v%3Aoff%2Cs.t%3A3%7Cs.e%3Ag%7C";

/// Label of the reset-view control.
pub const RESET_VIEW_TITLE: &str = "Sıfırla";

/// Icon of the reset-view control.
pub const RESET_VIEW_ICON: &str = "url(/icons/circular.png)";

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (12, 41);

/// Hit radius of a cluster bubble in pixels.
pub const CLUSTER_ICON_RADIUS: f64 = 20.0;

/// Grid cell size used when grouping markers into clusters, in pixels.
pub const CLUSTER_GRID_SIZE: f64 = 80.0;

/// From this zoom on every marker is drawn on its own.
pub const DISABLE_CLUSTERING_AT_ZOOM: f64 = 17.0;

/// Spacing between markers fanned out of a stack, in pixels.
pub const SPREAD_FOOT_SEPARATION: f64 = 25.0;

/// Angle of the first fanned-out marker, in radians.
pub const SPREAD_START_ANGLE: f64 = std::f64::consts::PI / 6.0;
