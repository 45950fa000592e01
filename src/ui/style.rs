use egui::{Color32, FontId, Stroke};

/// Colors and sizes used by the egui painter
#[derive(Debug, Clone)]
pub struct MapStyle {
    /// Background color when no tiles are loaded
    pub background_color: Color32,
    pub border_stroke: Stroke,
    pub controls: ControlStyle,
    pub markers: MarkerStyle,
    pub clusters: ClusterStyle,
    pub legend: LegendStyle,
}

/// Style for the reset button
#[derive(Debug, Clone)]
pub struct ControlStyle {
    pub background_color: Color32,
    pub hover_color: Color32,
    pub text_color: Color32,
    pub border_stroke: Stroke,
    pub rounding: f32,
    pub font_id: FontId,
}

/// Style for single marker pins
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub fill_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    /// Color of the dot inside the pin head
    pub dot_color: Color32,
}

/// Cluster bubbles, colored by member count
#[derive(Debug, Clone)]
pub struct ClusterStyle {
    /// Fewer than 10 markers
    pub small: (Color32, Color32),
    /// Fewer than 100 markers
    pub medium: (Color32, Color32),
    pub large: (Color32, Color32),
    pub text_color: Color32,
    pub font_id: FontId,
}

#[derive(Debug, Clone)]
pub struct LegendStyle {
    pub background_color: Color32,
    pub text_color: Color32,
    pub font_id: FontId,
    pub swatch_size: f32,
    pub padding: f32,
    pub margin: f32,
}

impl ClusterStyle {
    /// Outer halo and inner fill for a cluster of `count` markers
    pub fn colors(&self, count: usize) -> (Color32, Color32) {
        match count {
            0..=9 => self.small,
            10..=99 => self.medium,
            _ => self.large,
        }
    }
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(221, 221, 221),
            border_stroke: Stroke::new(1.0, Color32::GRAY),
            controls: ControlStyle::default(),
            markers: MarkerStyle::default(),
            clusters: ClusterStyle::default(),
            legend: LegendStyle::default(),
        }
    }
}

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            hover_color: Color32::from_rgb(244, 244, 244),
            text_color: Color32::BLACK,
            border_stroke: Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 80)),
            rounding: 4.0,
            font_id: FontId::proportional(18.0),
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill_color: Color32::from_rgb(42, 129, 203),
            border_color: Color32::from_rgb(49, 104, 150),
            border_width: 1.0,
            dot_color: Color32::WHITE,
        }
    }
}

impl Default for ClusterStyle {
    fn default() -> Self {
        Self {
            small: (
                Color32::from_rgba_unmultiplied(181, 226, 140, 153),
                Color32::from_rgba_unmultiplied(110, 204, 57, 153),
            ),
            medium: (
                Color32::from_rgba_unmultiplied(241, 211, 87, 153),
                Color32::from_rgba_unmultiplied(240, 194, 12, 153),
            ),
            large: (
                Color32::from_rgba_unmultiplied(253, 156, 115, 153),
                Color32::from_rgba_unmultiplied(241, 128, 23, 153),
            ),
            text_color: Color32::BLACK,
            font_id: FontId::proportional(12.0),
        }
    }
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgba_unmultiplied(255, 255, 255, 220),
            text_color: Color32::from_rgb(51, 51, 51),
            font_id: FontId::proportional(12.0),
            swatch_size: 14.0,
            padding: 6.0,
            margin: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_colors_by_count() {
        let style = ClusterStyle::default();
        assert_eq!(style.colors(2), style.small);
        assert_eq!(style.colors(10), style.medium);
        assert_eq!(style.colors(250), style.large);
    }
}
