//! Map legend
//!
//! Explains the heatmap colors. It does not depend on the canvas, so the
//! view shows it before the map has a size.

use crate::ui::controls::ControlPosition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    /// RGBA swatch
    pub color: [u8; 4],
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }

    /// Low, medium and high density, matching the default heatmap gradient
    pub fn defaults() -> Vec<LegendEntry> {
        vec![
            LegendEntry::new("Düşük", [0, 0, 255, 160]),
            LegendEntry::new("Orta", [0, 255, 0, 200]),
            LegendEntry::new("Yüksek", [255, 0, 0, 255]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub position: ControlPosition,
}

impl Legend {
    pub fn new(entries: Vec<LegendEntry>) -> Self {
        Self {
            entries,
            position: ControlPosition::BottomLeft,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new(LegendEntry::defaults())
    }
}
