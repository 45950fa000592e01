use crate::{
    core::{
        bounds::Bounds,
        constants::{MARKER_ICON_ANCHOR, MARKER_ICON_SIZE},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::marker::MarkerRecord,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    Result,
};

/// Pin icon geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    pub size: Point,
    /// Point of the icon that sits on the marker's position
    pub anchor: Point,
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            size: Point::new(MARKER_ICON_SIZE.0 as f64, MARKER_ICON_SIZE.1 as f64),
            anchor: Point::new(MARKER_ICON_ANCHOR.0 as f64, MARKER_ICON_ANCHOR.1 as f64),
        }
    }
}

/// One pin, bound to a marker record by identifier
pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    icon: MarkerIcon,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        let properties = LayerProperties::new(id, "Marker".to_string(), LayerType::Marker);
        Self {
            properties,
            position,
            icon: MarkerIcon::default(),
        }
    }

    pub fn from_record(record: &MarkerRecord) -> Self {
        Self::new(record.id.clone(), record.location())
    }

    /// Identifier of the record this marker stands for
    pub fn record_id(&self) -> &str {
        &self.properties.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn icon(&self) -> MarkerIcon {
        self.icon
    }

    /// Icon rectangle in container pixels
    pub fn icon_bounds(&self, viewport: &Viewport) -> Bounds {
        let tip = viewport.lat_lng_to_pixel(&self.position);
        let min = tip.subtract(&self.icon.anchor);
        Bounds::new(min, min.add(&self.icon.size))
    }

    pub fn hit_test(&self, viewport: &Viewport, pixel: &Point) -> bool {
        self.properties.visible && self.icon_bounds(viewport).contains(pixel)
    }

    fn position_json(&self) -> serde_json::Value {
        serde_json::json!({ "lat": self.position.lat, "lng": self.position.lng })
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);
    crate::impl_default_options_serialization!(properties, "position" => position_json);

    fn update(&mut self, _viewport: &Viewport) -> Result<()> {
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(37.0, 37.0), 8.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_marker_from_record() {
        let record = MarkerRecord::new("place-1", LatLng::new(37.2, 36.9));
        let marker = Marker::from_record(&record);
        assert_eq!(marker.record_id(), "place-1");
        assert_eq!(marker.position(), record.location());
        assert_eq!(marker.layer_type(), LayerType::Marker);
        assert_eq!(marker.options()["position"]["lat"], 37.2);
    }

    #[test]
    fn test_icon_sits_above_its_tip() {
        let view = viewport();
        let marker = Marker::new("center".into(), LatLng::new(37.0, 37.0));
        let bounds = marker.icon_bounds(&view);

        // Tip of the pin is the container center
        assert!((bounds.max.y - 300.0).abs() < 1e-6);
        assert!((bounds.min.x - (400.0 - 12.0)).abs() < 1e-6);
        assert!((bounds.width() - 25.0).abs() < 1e-9);
        assert!((bounds.height() - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test() {
        let view = viewport();
        let mut marker = Marker::new("center".into(), LatLng::new(37.0, 37.0));

        assert!(marker.hit_test(&view, &Point::new(400.0, 280.0)));
        assert!(!marker.hit_test(&view, &Point::new(400.0, 320.0)));

        marker.set_visible(false);
        assert!(!marker.hit_test(&view, &Point::new(400.0, 280.0)));
    }
}
