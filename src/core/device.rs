use serde::{Deserialize, Serialize};

/// Client class used to pick initial zoom limits.
///
/// Only `"desktop"` is recognized; every other label, and no label at all,
/// resolves to [`DeviceClass::Mobile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    #[default]
    Mobile,
}

impl DeviceClass {
    pub fn from_label(label: &str) -> Self {
        if label == "desktop" {
            DeviceClass::Desktop
        } else {
            DeviceClass::Mobile
        }
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, DeviceClass::Desktop)
    }
}

impl From<Option<&str>> for DeviceClass {
    fn from(label: Option<&str>) -> Self {
        label.map(DeviceClass::from_label).unwrap_or_default()
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Desktop => write!(f, "desktop"),
            DeviceClass::Mobile => write!(f, "mobile"),
        }
    }
}

/// Initial zoom and minimum zoom for one device class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomDefaults {
    pub zoom: f64,
    pub min_zoom: f64,
}

impl ZoomDefaults {
    pub fn new(zoom: f64, min_zoom: f64) -> Self {
        Self { zoom, min_zoom }
    }
}
