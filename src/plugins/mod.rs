pub mod heatmap;

pub use heatmap::{intensity_to_color, GridHeatmapRenderer};
