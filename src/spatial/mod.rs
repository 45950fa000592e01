pub mod clustering;
pub mod index;

pub use clustering::{ClusteringConfig, GridClusterRenderer, MarkerCluster};
pub use index::{SpatialIndex, SpatialItem};
