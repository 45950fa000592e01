use crate::{
    core::{geo::LatLngBounds, viewport::Viewport},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Heatmap,
    Marker,
    Cluster,
}

impl LayerType {
    /// Stacking order of the pane the layer lives in
    pub fn default_z_index(&self) -> i32 {
        match self {
            LayerType::Tile => 200,
            LayerType::Heatmap => 400,
            LayerType::Marker | LayerType::Cluster => 600,
        }
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Heatmap => write!(f, "heatmap"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::Cluster => write!(f, "cluster"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
    pub interactive: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: layer_type.default_z_index(),
            opacity: 1.0,
            visible: true,
            interactive: !matches!(layer_type, LayerType::Tile | LayerType::Heatmap),
        }
    }
}

/// Common surface of everything drawn on the canvas
pub trait LayerTrait: Send {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn layer_type(&self) -> LayerType;
    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn is_interactive(&self) -> bool;

    /// Recomputes whatever depends on the current view
    fn update(&mut self, viewport: &Viewport) -> Result<()>;

    /// Geographic extent of the layer's content, if it has one
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    fn options(&self) -> serde_json::Value;

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
