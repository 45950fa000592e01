//! # reliefmap
//!
//! An interactive map view for point-of-interest data: clustered markers,
//! a density heatmap, a legend and a reset control over a bounded,
//! zoom-constrained slippy map.
//!
//! The view owns none of its data. Marker records, the device class, the
//! click-handling strategy and the viewport/selection store are injected as
//! collaborators (see [`traits`]), and [`ui::view::MarkerMapView`] only
//! composes them.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod spatial;
pub mod tiles;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::MapViewConfig,
    device::DeviceClass,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    viewport::Viewport,
};

pub use data::{
    marker::{MarkerRecord, StaticMarkerSource},
    projection::{HeatPoint, PointProjector},
};

pub use input::{
    events::{MapEvent, PointerEvent, PointerKind},
    listener::ViewportEventListener,
};

pub use layers::{
    cluster::MarkerClusterGroup, heatmap::HeatmapLayer, marker::Marker, tile::TileLayer,
};

pub use spatial::{clustering::GridClusterRenderer, index::SpatialIndex};

pub use traits::{
    ClickHandler, ClusterRenderer, DeviceClassifier, HeatmapRenderer, MarkerDataSource,
    ViewportStore, ViewportSubscriber,
};

pub use ui::view::{Composition, MapCollaborators, MarkerMapView};

/// Logs through `env_logger`, configured by `RUST_LOG`.
/// Calling it again is a no-op.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tile error: {0}")]
    Tile(String),
}

/// Error type alias for convenience
pub type Error = MapError;
