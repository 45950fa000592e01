use crate::{
    core::geo::{LatLng, LatLngBounds, Point},
    spatial::clustering::MarkerCluster,
};
use serde::{Deserialize, Serialize};

/// Device that produced a pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A click or tap on the canvas, forwarded to click handlers untouched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Container pixel position
    pub position: Point,
    pub kind: PointerKind,
    pub button: MouseButton,
    pub modifiers: KeyModifiers,
}

impl PointerEvent {
    pub fn new(position: Point, kind: PointerKind) -> Self {
        Self {
            position,
            kind,
            button: MouseButton::Left,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn mouse(position: Point) -> Self {
        Self::new(position, PointerKind::Mouse)
    }

    pub fn touch(position: Point) -> Self {
        Self::new(position, PointerKind::Touch)
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_touch(&self) -> bool {
        self.kind == PointerKind::Touch
    }
}

/// Payload handed to [`ClickHandler::on_cluster_click`](crate::traits::ClickHandler::on_cluster_click)
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterClickEvent {
    /// The originating pointer event
    pub pointer: PointerEvent,
    /// Geographic position under the pointer
    pub lat_lng: LatLng,
    pub cluster: MarkerCluster,
}

/// Map event types that can be emitted by the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Pan started
    MoveStart { center: LatLng },
    /// Pan or zoom ended
    MoveEnd { center: LatLng, bounds: LatLngBounds },
    /// Zoom about to leave `zoom`
    ZoomStart { zoom: f64 },
    /// Zoom ended at `zoom`
    ZoomEnd { zoom: f64, bounds: LatLngBounds },
    /// Click on the canvas that hit no marker
    Click { lat_lng: LatLng, pixel: Point },
    /// Click on a single marker
    MarkerClick { marker_id: String },
    /// Click on a cluster of several markers
    ClusterClick { cluster_id: String, count: usize },
    /// The marker snapshot changed
    DataChanged { count: usize },
    /// The view was reset to its initial center and zoom
    ViewReset,
}

impl MapEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::MoveStart { .. } => "movestart",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::ZoomStart { .. } => "zoomstart",
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::Click { .. } => "click",
            MapEvent::MarkerClick { .. } => "markerclick",
            MapEvent::ClusterClick { .. } => "clusterclick",
            MapEvent::DataChanged { .. } => "datachanged",
            MapEvent::ViewReset => "viewreset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_constructors() {
        let click = PointerEvent::mouse(Point::new(100.0, 200.0));
        assert_eq!(click.position, Point::new(100.0, 200.0));
        assert_eq!(click.kind, PointerKind::Mouse);
        assert_eq!(click.button, MouseButton::Left);
        assert!(!click.is_touch());

        let tap = PointerEvent::touch(Point::new(5.0, 5.0)).with_modifiers(KeyModifiers {
            shift: true,
            ..Default::default()
        });
        assert!(tap.is_touch());
        assert!(tap.modifiers.shift);

        let right = PointerEvent::mouse(Point::new(1.0, 1.0)).with_button(MouseButton::Right);
        assert_eq!(right.button, MouseButton::Right);
        assert_eq!(right.kind, PointerKind::Mouse);
    }

    #[test]
    fn test_event_types() {
        assert_eq!(MapEvent::ZoomStart { zoom: 8.0 }.event_type(), "zoomstart");
        assert_eq!(MapEvent::ViewReset.event_type(), "viewreset");
        assert_eq!(
            MapEvent::MoveStart {
                center: LatLng::default()
            }
            .event_type(),
            "movestart"
        );
    }
}
