pub mod marker;
pub mod projection;

pub use marker::{parse_markers, MarkerRecord, StaticMarkerSource};
pub use projection::{
    intensity_extractor, latitude_extractor, longitude_extractor, project_points, HeatPoint,
    PointProjector,
};
