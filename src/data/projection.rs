//! Heatmap point projection
//!
//! Marker records become `(lat, lng, weight)` triples for the heatmap
//! overlay. The projection is pure; [`PointProjector`] only memoizes it on
//! the identity of the marker snapshot.

use crate::data::marker::MarkerRecord;
use std::sync::Arc;

/// `[latitude, longitude, weight]`
pub type HeatPoint = [f64; 3];

pub fn project_point(marker: &MarkerRecord, weight: f64) -> HeatPoint {
    [marker.lat(), marker.lng(), weight]
}

/// One point per marker, same order
pub fn project_points(markers: &[MarkerRecord], weight: f64) -> Vec<HeatPoint> {
    markers
        .iter()
        .map(|marker| project_point(marker, weight))
        .collect()
}

pub fn latitude_extractor(point: &HeatPoint) -> f64 {
    point[0]
}

pub fn longitude_extractor(point: &HeatPoint) -> f64 {
    point[1]
}

pub fn intensity_extractor(point: &HeatPoint) -> f64 {
    point[2]
}

/// Memoized [`project_points`], keyed on the snapshot `Arc`
#[derive(Debug)]
pub struct PointProjector {
    weight: f64,
    source: Option<Arc<[MarkerRecord]>>,
    points: Arc<[HeatPoint]>,
    recomputations: usize,
}

impl PointProjector {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            source: None,
            points: Arc::from(Vec::new()),
            recomputations: 0,
        }
    }

    /// Returns the previous result while `markers` is the same allocation as last time
    pub fn project(&mut self, markers: &Arc<[MarkerRecord]>) -> Arc<[HeatPoint]> {
        let unchanged = self
            .source
            .as_ref()
            .is_some_and(|source| Arc::ptr_eq(source, markers));

        if !unchanged {
            self.points = project_points(markers, self.weight).into();
            self.source = Some(Arc::clone(markers));
            self.recomputations += 1;
            log::debug!("projected {} heatmap points", self.points.len());
        }

        Arc::clone(&self.points)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// How many times the projection actually ran
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{constants::DEFAULT_IMPORTANCY, geo::LatLng};

    fn markers() -> Vec<MarkerRecord> {
        vec![
            MarkerRecord::new("a", LatLng::new(36.2021, 36.1606)),
            MarkerRecord::new("b", LatLng::new(37.0662, 37.3833)),
            MarkerRecord::new("c", LatLng::new(37.5858, 36.9371)),
        ]
    }

    #[test]
    fn test_projection_keeps_length_and_order() {
        let markers = markers();
        let points = project_points(&markers, DEFAULT_IMPORTANCY);

        assert_eq!(points.len(), markers.len());
        for (marker, point) in markers.iter().zip(&points) {
            assert_eq!(*point, [marker.lat(), marker.lng(), DEFAULT_IMPORTANCY]);
        }
        assert!(project_points(&[], DEFAULT_IMPORTANCY).is_empty());
    }

    #[test]
    fn test_extractors() {
        let point: HeatPoint = [36.5, 37.5, 10.0];
        assert_eq!(latitude_extractor(&point), 36.5);
        assert_eq!(longitude_extractor(&point), 37.5);
        assert_eq!(intensity_extractor(&point), 10.0);
    }

    #[test]
    fn test_projector_reuses_result_for_same_snapshot() {
        let snapshot: Arc<[MarkerRecord]> = markers().into();
        let mut projector = PointProjector::new(DEFAULT_IMPORTANCY);

        let first = projector.project(&snapshot);
        let second = projector.project(&Arc::clone(&snapshot));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(projector.recomputations(), 1);
    }

    #[test]
    fn test_projector_recomputes_for_new_snapshot() {
        let mut projector = PointProjector::new(DEFAULT_IMPORTANCY);
        let first = projector.project(&markers().into());

        // Equal content in a new allocation still counts as new data
        let second = projector.project(&markers().into());
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(projector.recomputations(), 2);
    }
}
