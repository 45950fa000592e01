//! Prelude module for common reliefmap types and traits
//!
//! Re-exports the types most hosts need, for `use reliefmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::MapViewConfig,
    device::{DeviceClass, ZoomDefaults},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    viewport::Viewport,
};

pub use crate::data::{
    marker::{MarkerRecord, StaticMarkerSource},
    projection::{HeatPoint, PointProjector},
};

pub use crate::input::{
    dispatch::EventManager,
    events::{ClusterClickEvent, MapEvent, PointerEvent, PointerKind},
    listener::ViewportEventListener,
};

pub use crate::layers::{
    base::LayerTrait, cluster::MarkerClusterGroup, heatmap::HeatmapLayer, marker::Marker,
    tile::TileLayer,
};

pub use crate::plugins::heatmap::GridHeatmapRenderer;

pub use crate::spatial::{
    clustering::{ClusteringConfig, GridClusterRenderer, MarkerCluster},
    index::{SpatialIndex, SpatialItem},
};

pub use crate::tiles::{cache::TileCache, loader::TileLoader, source::TileSource};

pub use crate::traits::{
    ClickHandler, ClusterRenderer, DeviceClassifier, HeatmapRenderer, MarkerDataSource,
    ViewportStore, ViewportSubscriber,
};

pub use crate::ui::{
    legend::{Legend, LegendEntry},
    reset_view::{ResetViewControl, ResetViewOptions},
    view::{Composition, MapCollaborators, MarkerMapView},
};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapWidget, TileTextures};

pub use crate::{Error as MapError, Result};

pub use std::{collections::VecDeque, sync::Arc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
