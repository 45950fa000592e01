//! Collaborator and capability traits
//!
//! The map view reads its inputs and reports its outputs only through
//! these seams. Hosts implement the collaborator traits
//! ([`MarkerDataSource`], [`DeviceClassifier`], [`ClickHandler`],
//! [`ViewportStore`]); the capability traits ([`ClusterRenderer`],
//! [`HeatmapRenderer`]) have default implementations in
//! [`crate::spatial::clustering`] and [`crate::plugins::heatmap`].

use crate::{
    core::{
        device::DeviceClass,
        geo::LatLngBounds,
        viewport::Viewport,
    },
    data::marker::MarkerRecord,
    input::events::{ClusterClickEvent, PointerEvent},
    layers::heatmap::{HeatmapGrid, WeightedPoint},
    spatial::clustering::MarkerCluster,
};
use std::sync::Arc;

/// Supplies the ordered marker sequence.
///
/// Returning the same `Arc` while the data is unchanged lets the view skip
/// rebuilding its marker layer and heatmap projection.
pub trait MarkerDataSource: Send + Sync {
    fn markers(&self) -> Arc<[MarkerRecord]>;
}

/// Reports the client's device class
pub trait DeviceClassifier: Send + Sync {
    /// Raw label, e.g. `"desktop"`; `None` when unknown
    fn device_label(&self) -> Option<String>;

    /// Anything but `"desktop"`, including no label, is mobile
    fn device_class(&self) -> DeviceClass {
        DeviceClass::from(self.device_label().as_deref())
    }
}

/// Application response to marker and cluster clicks
pub trait ClickHandler: Send {
    fn on_cluster_click(&mut self, event: &ClusterClickEvent);
    fn on_marker_click(&mut self, event: &PointerEvent, marker: &MarkerRecord);
}

/// Receives viewport and selection changes
pub trait ViewportStore: Send {
    fn set_coordinates(&mut self, bounds: LatLngBounds);
    fn set_popup_data(&mut self, data: Option<MarkerRecord>);
}

/// Subscription to the canvas' move and zoom lifecycle
pub trait ViewportSubscriber: Send {
    /// A pan or zoom finished; `bounds` is the new visible area
    fn on_viewport_settled(&mut self, bounds: LatLngBounds);
    /// A zoom is about to change the level away from `level`
    fn on_zoom_gesture_start(&mut self, level: f64);
    /// A zoom finished at `level`
    fn on_zoom_gesture_end(&mut self, level: f64, bounds: LatLngBounds);
}

/// Groups markers for display at the current zoom
pub trait ClusterRenderer: Send {
    fn set_markers(&mut self, markers: &[MarkerRecord]);
    fn clusters(&mut self, viewport: &Viewport) -> Vec<MarkerCluster>;
}

/// Turns weighted points into a density grid for the current view
pub trait HeatmapRenderer: Send {
    fn set_points(&mut self, points: Vec<WeightedPoint>);
    fn render(&mut self, viewport: &Viewport, radius: f64) -> HeatmapGrid;
}
