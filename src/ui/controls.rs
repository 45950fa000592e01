use crate::core::{bounds::Bounds, geo::Point};
use serde::{Deserialize, Serialize};

/// Corner of the container a control is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ControlPosition {
    /// Rectangle of a `size` control inside a `container` sized area
    pub fn place(&self, container: Point, size: Point, margin: f64) -> Bounds {
        let x = match self {
            ControlPosition::TopLeft | ControlPosition::BottomLeft => margin,
            ControlPosition::TopRight | ControlPosition::BottomRight => {
                container.x - margin - size.x
            }
        };
        let y = match self {
            ControlPosition::TopLeft | ControlPosition::TopRight => margin,
            ControlPosition::BottomLeft | ControlPosition::BottomRight => {
                container.y - margin - size.y
            }
        };
        let min = Point::new(x, y);
        Bounds::new(min, min.add(&size))
    }
}
