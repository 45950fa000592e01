use crate::prelude::HashMap;
use crate::{
    core::{
        constants::{
            CLUSTER_GRID_SIZE, DISABLE_CLUSTERING_AT_ZOOM, SPREAD_FOOT_SEPARATION,
            SPREAD_START_ANGLE,
        },
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::marker::MarkerRecord,
    spatial::index::{SpatialIndex, SpatialItem},
    traits::ClusterRenderer,
};
use serde::{Deserialize, Serialize};

/// Markers drawn as one symbol at the current zoom
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCluster {
    pub id: String,
    /// Mean position of the members
    pub center: LatLng,
    pub bounds: LatLngBounds,
    /// Member identifiers, in data-source order
    pub marker_ids: Vec<String>,
    /// Where the symbol is drawn relative to `center`, in container pixels.
    /// Non-zero only for markers fanned out of a stack at one position.
    pub offset: Point,
}

impl MarkerCluster {
    fn from_members(id: String, members: &[&SpatialItem<usize>]) -> Self {
        let positions: Vec<LatLng> = members.iter().map(|item| item.lat_lng()).collect();
        let count = positions.len().max(1) as f64;
        let center = LatLng::new(
            positions.iter().map(|p| p.lat).sum::<f64>() / count,
            positions.iter().map(|p| p.lng).sum::<f64>() / count,
        );
        let bounds = LatLngBounds::from_points(positions.iter().copied())
            .unwrap_or_else(|| LatLngBounds::new(center, center));

        Self {
            id,
            center,
            bounds,
            marker_ids: members.iter().map(|item| item.id.clone()).collect(),
            offset: Point::new(0.0, 0.0),
        }
    }

    fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// Get the number of markers in the cluster
    pub fn count(&self) -> usize {
        self.marker_ids.len()
    }

    /// A lone marker, drawn and clicked as a marker
    pub fn is_single(&self) -> bool {
        self.marker_ids.len() == 1
    }

    pub fn contains(&self, marker_id: &str) -> bool {
        self.marker_ids.iter().any(|id| id == marker_id)
    }
}

/// Pixel offsets that fan `count` markers out on a circle around their
/// shared position, at least [`SPREAD_FOOT_SEPARATION`] apart
pub fn spread_offsets(count: usize) -> Vec<Point> {
    if count < 2 {
        return vec![Point::new(0.0, 0.0); count];
    }
    let circumference = SPREAD_FOOT_SEPARATION * (2.0 + count as f64);
    let radius = circumference / std::f64::consts::TAU;
    let step = std::f64::consts::TAU / count as f64;
    (0..count)
        .map(|i| {
            let angle = SPREAD_START_ANGLE + i as f64 * step;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Configuration for clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Grid cell size in pixels
    pub grid_size: f64,
    /// From this zoom on every marker stands alone
    pub disable_clustering_at_zoom: f64,
    /// Zoom to a cluster's bounds after reporting its click
    pub zoom_to_bounds_on_click: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            grid_size: CLUSTER_GRID_SIZE,
            disable_clustering_at_zoom: DISABLE_CLUSTERING_AT_ZOOM,
            zoom_to_bounds_on_click: true,
        }
    }
}

/// Grid clustering in projected pixel space.
///
/// Markers whose world pixels at the current zoom fall into the same
/// `grid_size` cell form one cluster. Results are cached per zoom and
/// visible bounds.
pub struct GridClusterRenderer {
    config: ClusteringConfig,
    spatial_index: SpatialIndex<usize>,
    cached: Vec<MarkerCluster>,
    last_bounds: Option<LatLngBounds>,
    last_zoom: Option<f64>,
}

impl GridClusterRenderer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            spatial_index: SpatialIndex::new(),
            cached: Vec::new(),
            last_bounds: None,
            last_zoom: None,
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClusteringConfig) {
        self.config = config;
        self.invalidate_cache();
    }

    pub fn len(&self) -> usize {
        self.spatial_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spatial_index.is_empty()
    }

    fn invalidate_cache(&mut self) {
        self.cached.clear();
        self.last_bounds = None;
        self.last_zoom = None;
    }

    fn grid_cluster(&self, items: Vec<&SpatialItem<usize>>, viewport: &Viewport) -> Vec<MarkerCluster> {
        let grid_size = self.config.grid_size.max(1.0);
        let mut cells: HashMap<(i64, i64), Vec<&SpatialItem<usize>>> = HashMap::default();

        for item in items {
            let pixel = viewport.project(&item.lat_lng(), None);
            let cell = (
                (pixel.x / grid_size).floor() as i64,
                (pixel.y / grid_size).floor() as i64,
            );
            cells.entry(cell).or_default().push(item);
        }

        let mut cells: Vec<_> = cells.into_iter().collect();
        cells.sort_by_key(|(cell, _)| *cell);

        cells
            .into_iter()
            .map(|((x, y), mut members)| {
                members.sort_by_key(|item| item.data);
                let id = if members.len() == 1 {
                    members[0].id.clone()
                } else {
                    format!("cluster_{}_{}_{}", viewport.zoom, x, y)
                };
                MarkerCluster::from_members(id, &members)
            })
            .collect()
    }
}

impl GridClusterRenderer {
    /// One entry per marker. Markers on the same pixel are fanned out so
    /// each stays clickable.
    fn unclustered(
        mut items: Vec<&SpatialItem<usize>>,
        viewport: &Viewport,
    ) -> Vec<MarkerCluster> {
        items.sort_by_key(|item| item.data);

        let mut stacks: HashMap<(i64, i64), Vec<usize>> = HashMap::default();
        for (slot, item) in items.iter().enumerate() {
            let pixel = viewport.project(&item.lat_lng(), None);
            stacks
                .entry((pixel.x.round() as i64, pixel.y.round() as i64))
                .or_default()
                .push(slot);
        }

        let mut offsets = vec![Point::new(0.0, 0.0); items.len()];
        for stack in stacks.values().filter(|stack| stack.len() > 1) {
            for (slot, offset) in stack.iter().zip(spread_offsets(stack.len())) {
                offsets[*slot] = offset;
            }
        }

        items
            .into_iter()
            .zip(offsets)
            .map(|(item, offset)| {
                MarkerCluster::from_members(item.id.clone(), &[item]).with_offset(offset)
            })
            .collect()
    }
}

impl Default for GridClusterRenderer {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

impl ClusterRenderer for GridClusterRenderer {
    fn set_markers(&mut self, markers: &[MarkerRecord]) {
        let items = markers
            .iter()
            .enumerate()
            .map(|(order, marker)| SpatialItem::from_lat_lng(marker.id.clone(), marker.location(), order))
            .collect();
        self.spatial_index = SpatialIndex::bulk_load(items);
        self.invalidate_cache();
        log::debug!("indexed {} markers for clustering", markers.len());
    }

    fn clusters(&mut self, viewport: &Viewport) -> Vec<MarkerCluster> {
        let visible = viewport.bounds();
        if self.last_bounds == Some(visible)
            && self.last_zoom.is_some_and(|zoom| (zoom - viewport.zoom).abs() < 0.01)
        {
            return self.cached.clone();
        }

        let items = self.spatial_index.query_lat_lng(&visible);
        // No zoom left to split a cluster: every marker stands alone
        let clusters = if viewport.zoom >= self.config.disable_clustering_at_zoom
            || viewport.zoom >= viewport.max_zoom
        {
            Self::unclustered(items, viewport)
        } else {
            self.grid_cluster(items, viewport)
        };

        self.cached = clusters.clone();
        self.last_bounds = Some(visible);
        self.last_zoom = Some(viewport.zoom);
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<MarkerRecord> {
        vec![
            MarkerRecord::new("a", LatLng::new(37.0000, 37.0000)),
            MarkerRecord::new("b", LatLng::new(37.0010, 37.0010)),
            MarkerRecord::new("c", LatLng::new(38.0, 38.5)),
            // Outside the visible area
            MarkerRecord::new("far", LatLng::new(10.0, 10.0)),
        ]
    }

    fn viewport(zoom: f64) -> Viewport {
        Viewport::new(LatLng::new(37.5, 37.5), zoom, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_nearby_markers_share_a_cluster() {
        let mut renderer = GridClusterRenderer::default();
        renderer.set_markers(&markers());
        assert_eq!(renderer.len(), 4);

        let clusters = renderer.clusters(&viewport(8.0));
        let total: usize = clusters.iter().map(MarkerCluster::count).sum();
        assert_eq!(total, 3);

        let pair = clusters.iter().find(|c| c.contains("a")).unwrap();
        assert!(pair.contains("b"));
        assert!(!pair.is_single());
        assert!(pair.bounds.contains(&pair.center));

        let single = clusters.iter().find(|c| c.contains("c")).unwrap();
        assert!(single.is_single());
        assert_eq!(single.id, "c");
    }

    #[test]
    fn test_clustering_disabled_at_high_zoom() {
        let mut renderer = GridClusterRenderer::default();
        renderer.set_markers(&markers());

        let mut view = viewport(DISABLE_CLUSTERING_AT_ZOOM);
        view.set_center(LatLng::new(37.0005, 37.0005));
        let clusters = renderer.clusters(&view);
        assert!(clusters.iter().all(MarkerCluster::is_single));
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_stacked_markers_fan_out() {
        let mut renderer = GridClusterRenderer::default();
        let spot = LatLng::new(37.0, 37.0);
        renderer.set_markers(&[
            MarkerRecord::new("first", spot),
            MarkerRecord::new("second", spot),
            MarkerRecord::new("near", LatLng::new(37.001, 37.001)),
        ]);

        // Grouped while there is zoom left to split them
        let mut view = viewport(10.0);
        view.set_center(spot);
        let grouped = renderer.clusters(&view);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].count(), 3);

        let mut view = viewport(DISABLE_CLUSTERING_AT_ZOOM);
        view.set_center(spot);
        let clusters = renderer.clusters(&view);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(MarkerCluster::is_single));

        let first = clusters.iter().find(|c| c.id == "first").unwrap();
        let second = clusters.iter().find(|c| c.id == "second").unwrap();
        let near = clusters.iter().find(|c| c.id == "near").unwrap();
        assert_eq!(first.center, second.center);
        assert!(first.offset.distance_to(&second.offset) >= SPREAD_FOOT_SEPARATION);
        assert_eq!(near.offset, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_max_zoom_never_clusters() {
        let config = ClusteringConfig {
            disable_clustering_at_zoom: 30.0,
            ..Default::default()
        };
        let mut renderer = GridClusterRenderer::new(config.clone());
        renderer.set_markers(&markers());
        let mut view = viewport(18.0);
        view.set_center(LatLng::new(37.0005, 37.0005));
        assert!(renderer.clusters(&view).iter().all(MarkerCluster::is_single));

        // Regrouped after a config change
        renderer.set_config(ClusteringConfig {
            grid_size: 100_000.0,
            ..config
        });
        assert_eq!(renderer.config().grid_size, 100_000.0);
        let grouped = renderer.clusters(&viewport(8.0));
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].count(), 3);
    }

    #[test]
    fn test_spread_offsets_keep_markers_apart() {
        assert!(spread_offsets(0).is_empty());
        assert_eq!(spread_offsets(1), vec![Point::new(0.0, 0.0)]);
        for count in 2..12 {
            let offsets = spread_offsets(count);
            assert_eq!(offsets.len(), count);
            for (i, a) in offsets.iter().enumerate() {
                for b in &offsets[i + 1..] {
                    assert!(a.distance_to(b) >= SPREAD_FOOT_SEPARATION - 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_new_markers_invalidate_cache() {
        let mut renderer = GridClusterRenderer::default();
        renderer.set_markers(&markers());
        let view = viewport(8.0);
        assert_eq!(renderer.clusters(&view), renderer.clusters(&view));

        renderer.set_markers(&[]);
        assert!(renderer.clusters(&view).is_empty());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: ClusteringConfig = serde_json::from_str(r#"{ "grid_size": 40.0 }"#).unwrap();
        assert_eq!(config.grid_size, 40.0);
        assert_eq!(config.disable_clustering_at_zoom, DISABLE_CLUSTERING_AT_ZOOM);
        assert!(config.zoom_to_bounds_on_click);
    }
}
