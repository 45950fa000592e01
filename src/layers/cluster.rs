//! Clustered marker layer
//!
//! Holds one [`Marker`] per record and asks a [`ClusterRenderer`] how to
//! group them for the current view. Clicks are resolved here and handed
//! back to the view as a [`ClusterHit`].

use crate::{
    core::{
        constants::CLUSTER_ICON_RADIUS,
        geo::{LatLngBounds, Point},
        viewport::Viewport,
    },
    data::marker::MarkerRecord,
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        marker::Marker,
    },
    prelude::HashMap,
    spatial::clustering::{ClusteringConfig, GridClusterRenderer, MarkerCluster},
    traits::ClusterRenderer,
    Result,
};
use std::sync::Arc;

/// What a pointer position landed on
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterHit {
    Marker(MarkerRecord),
    Cluster(MarkerCluster),
}

pub struct MarkerClusterGroup {
    properties: LayerProperties,
    config: ClusteringConfig,
    renderer: Box<dyn ClusterRenderer>,
    records: Arc<[MarkerRecord]>,
    markers: Vec<Marker>,
    /// Record position by identifier
    lookup: HashMap<String, usize>,
    clusters: Vec<MarkerCluster>,
}

impl MarkerClusterGroup {
    pub fn new(config: ClusteringConfig) -> Self {
        let renderer = Box::new(GridClusterRenderer::new(config.clone()));
        Self::with_renderer(config, renderer)
    }

    pub fn with_renderer(config: ClusteringConfig, renderer: Box<dyn ClusterRenderer>) -> Self {
        Self {
            properties: LayerProperties::new(
                "markers".to_string(),
                "Markers".to_string(),
                LayerType::Cluster,
            ),
            config,
            renderer,
            records: Arc::from(Vec::new()),
            markers: Vec::new(),
            lookup: HashMap::default(),
            clusters: Vec::new(),
        }
    }

    /// Replaces the marker set; returns `false` when `records` is the snapshot already shown
    pub fn set_markers(&mut self, records: Arc<[MarkerRecord]>) -> bool {
        if Arc::ptr_eq(&self.records, &records) {
            return false;
        }

        self.markers = records.iter().map(Marker::from_record).collect();
        self.lookup = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.id.clone(), index))
            .collect();
        self.renderer.set_markers(&records);
        self.records = records;
        self.clusters.clear();
        log::info!("marker layer rebuilt with {} markers", self.markers.len());
        true
    }

    /// Swaps the grouping strategy, handing it the markers already shown
    pub fn set_renderer(&mut self, mut renderer: Box<dyn ClusterRenderer>) {
        renderer.set_markers(&self.records);
        self.renderer = renderer;
        self.clusters.clear();
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn records(&self) -> &Arc<[MarkerRecord]> {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&MarkerRecord> {
        self.lookup.get(id).and_then(|index| self.records.get(*index))
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.lookup.get(id).and_then(|index| self.markers.get(*index))
    }

    /// Clusters computed by the last [`update`](LayerTrait::update)
    pub fn clusters(&self) -> &[MarkerCluster] {
        &self.clusters
    }

    /// Resolves a container pixel to a marker or cluster, topmost first
    pub fn hit_test(&self, viewport: &Viewport, pixel: &Point) -> Option<ClusterHit> {
        if !self.properties.visible {
            return None;
        }

        self.clusters.iter().rev().find_map(|cluster| {
            if cluster.is_single() {
                let id = cluster.marker_ids.first()?;
                let marker = self.marker(id)?;
                if marker.hit_test(viewport, &pixel.subtract(&cluster.offset)) {
                    return self.record(id).cloned().map(ClusterHit::Marker);
                }
                None
            } else {
                let center = viewport.lat_lng_to_pixel(&cluster.center);
                (center.distance_to(pixel) <= CLUSTER_ICON_RADIUS)
                    .then(|| ClusterHit::Cluster(cluster.clone()))
            }
        })
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl LayerTrait for MarkerClusterGroup {
    crate::impl_layer_trait!(MarkerClusterGroup, properties);
    crate::impl_default_options_serialization!(properties, "markers" => marker_count);

    fn update(&mut self, viewport: &Viewport) -> Result<()> {
        self.clusters = self.renderer.clusters(viewport);
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.records.iter().map(MarkerRecord::location))
    }
}
