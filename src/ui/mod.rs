pub mod controls;
pub mod legend;
pub mod reset_view;
pub mod view;

#[cfg(feature = "egui")]
pub mod style;
#[cfg(feature = "egui")]
pub mod widget;

pub use controls::ControlPosition;
pub use legend::{Legend, LegendEntry};
pub use reset_view::{ResetViewControl, ResetViewOptions};
pub use view::{
    CanvasFrame, CanvasLayer, CanvasOptions, ClusterFrame, Composition, HeatmapFrame,
    MapCollaborators, MarkerMapView, TileFrame, ViewElement,
};

#[cfg(feature = "egui")]
pub use style::{ClusterStyle, ControlStyle, LegendStyle, MapStyle, MarkerStyle};
#[cfg(feature = "egui")]
pub use widget::{paint_composition, MapWidget, TileTextures};
