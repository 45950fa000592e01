use crate::{
    core::{
        bounds::Bounds,
        constants::{RESET_VIEW_ICON, RESET_VIEW_TITLE},
        geo::{LatLng, Point},
    },
    ui::controls::ControlPosition,
};
use serde::{Deserialize, Serialize};

const BUTTON_SIZE: f64 = 30.0;
/// Leaves room for the zoom buttons above it
const BUTTON_OFFSET: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetViewOptions {
    /// Tooltip of the button
    pub title: String,
    /// CSS background of the button
    pub icon: String,
    pub position: ControlPosition,
}

impl Default for ResetViewOptions {
    fn default() -> Self {
        Self {
            title: RESET_VIEW_TITLE.to_string(),
            icon: RESET_VIEW_ICON.to_string(),
            position: ControlPosition::TopLeft,
        }
    }
}

/// Button that returns the canvas to the view it was mounted with
#[derive(Debug, Clone, PartialEq)]
pub struct ResetViewControl {
    options: ResetViewOptions,
    center: LatLng,
    zoom: f64,
}

impl ResetViewControl {
    pub fn new(options: ResetViewOptions, center: LatLng, zoom: f64) -> Self {
        Self {
            options,
            center,
            zoom,
        }
    }

    pub fn options(&self) -> &ResetViewOptions {
        &self.options
    }

    /// Center and zoom a reset goes back to
    pub fn target(&self) -> (LatLng, f64) {
        (self.center, self.zoom)
    }

    /// Button rectangle in container pixels
    pub fn button_bounds(&self, container: Point) -> Bounds {
        let mut bounds = self.options.position.place(
            container,
            Point::new(BUTTON_SIZE, BUTTON_SIZE),
            10.0,
        );
        let shift = match self.options.position {
            ControlPosition::TopLeft | ControlPosition::TopRight => BUTTON_OFFSET,
            ControlPosition::BottomLeft | ControlPosition::BottomRight => -BUTTON_OFFSET,
        };
        bounds.min.y += shift;
        bounds.max.y += shift;
        bounds
    }

    pub fn hit_test(&self, container: Point, pixel: &Point) -> bool {
        self.button_bounds(container).contains(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ResetViewOptions::default();
        assert_eq!(options.title, "Sıfırla");
        assert_eq!(options.icon, "url(/icons/circular.png)");
    }

    #[test]
    fn test_button_sits_below_zoom_buttons() {
        let control = ResetViewControl::new(ResetViewOptions::default(), LatLng::new(37.0, 37.0), 8.0);
        let container = Point::new(800.0, 600.0);
        let bounds = control.button_bounds(container);

        assert_eq!(bounds.min, Point::new(10.0, 90.0));
        assert!(control.hit_test(container, &Point::new(25.0, 105.0)));
        assert!(!control.hit_test(container, &Point::new(25.0, 25.0)));
        assert_eq!(control.target(), (LatLng::new(37.0, 37.0), 8.0));
    }
}
