#[macro_use]
pub mod macros;

pub mod base;
pub mod cluster;
pub mod heatmap;
pub mod marker;
pub mod tile;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use cluster::{ClusterHit, MarkerClusterGroup};
pub use heatmap::{HeatmapConfig, HeatmapGrid, HeatmapLayer, WeightedPoint};
pub use marker::{Marker, MarkerIcon};
pub use tile::{TileLayer, TileRequest};
