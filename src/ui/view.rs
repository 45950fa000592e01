//! The composed marker map view
//!
//! [`MarkerMapView`] wires the injected collaborators to the canvas: it
//! reads marker snapshots and the device class, keeps the heatmap, tile and
//! cluster layers in sync with the viewport, routes clicks to the
//! [`ClickHandler`] and reports viewport changes through a
//! [`ViewportEventListener`].
//!
//! The view is driven by its host. Interaction calls (`pan_by`, `zoom_in`,
//! `click`, ...) change the viewport and deliver the resulting events before
//! they return; [`MarkerMapView::render`] produces a [`Composition`]
//! snapshot for whatever draws it.

use crate::{
    core::{
        config::MapViewConfig,
        device::{DeviceClass, ZoomDefaults},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::projection::{HeatPoint, PointProjector},
    input::{
        dispatch::EventManager,
        events::{ClusterClickEvent, MapEvent, PointerEvent},
        listener::ViewportEventListener,
    },
    layers::{
        base::LayerTrait,
        cluster::{ClusterHit, MarkerClusterGroup},
        heatmap::{Extractor, HeatmapConfig, HeatmapGrid, HeatmapLayer},
        tile::{TileLayer, TileRequest},
    },
    spatial::clustering::MarkerCluster,
    tiles::cache::TileCache,
    traits::{
        ClickHandler, ClusterRenderer, DeviceClassifier, HeatmapRenderer, MarkerDataSource,
        ViewportStore, ViewportSubscriber,
    },
    ui::{
        legend::Legend,
        reset_view::{ResetViewControl, ResetViewOptions},
    },
    Result,
};
use serde::Serialize;
use std::sync::Arc;

/// Everything the view reads from or reports to its host
pub struct MapCollaborators {
    pub data: Arc<dyn MarkerDataSource>,
    pub device: Arc<dyn DeviceClassifier>,
    pub clicks: Box<dyn ClickHandler>,
    pub store: Box<dyn ViewportStore>,
}

impl MapCollaborators {
    pub fn new(
        data: Arc<dyn MarkerDataSource>,
        device: Arc<dyn DeviceClassifier>,
        clicks: Box<dyn ClickHandler>,
        store: Box<dyn ViewportStore>,
    ) -> Self {
        Self {
            data,
            device,
            clicks,
            store,
        }
    }
}

/// Initial configuration handed to the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_delta: f64,
    pub prefer_canvas: bool,
    pub max_bounds: LatLngBounds,
    pub max_bounds_viscosity: f64,
}

/// Heatmap overlay as configured and rendered for this frame
#[derive(Debug, Clone)]
pub struct HeatmapFrame {
    pub radius: f64,
    pub fit_bounds_on_load: bool,
    pub fit_bounds_on_update: bool,
    pub points: Arc<[HeatPoint]>,
    pub latitude: Extractor<HeatPoint>,
    pub longitude: Extractor<HeatPoint>,
    pub intensity: Extractor<HeatPoint>,
    pub grid: HeatmapGrid,
    pub config: HeatmapConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileFrame {
    pub url_template: String,
    pub tiles: Vec<TileRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFrame {
    /// One marker per record
    pub marker_count: usize,
    pub clusters: Vec<MarkerCluster>,
}

/// Children of the canvas, in composition order
#[derive(Debug, Clone)]
pub enum CanvasLayer {
    ResetView(ResetViewOptions),
    /// The viewport event listener; draws nothing
    ViewportListener,
    Heatmap(HeatmapFrame),
    Tiles(TileFrame),
    Markers(ClusterFrame),
}

#[derive(Debug, Clone)]
pub struct CanvasFrame {
    pub options: CanvasOptions,
    pub viewport: Viewport,
    pub layers: Vec<CanvasLayer>,
}

#[derive(Debug, Clone)]
pub enum ViewElement {
    Legend(Legend),
    Canvas(CanvasFrame),
}

/// One rendered frame of the view
#[derive(Debug, Clone)]
pub struct Composition {
    pub elements: Vec<ViewElement>,
}

impl Composition {
    pub fn legend(&self) -> Option<&Legend> {
        self.elements.iter().find_map(|element| match element {
            ViewElement::Legend(legend) => Some(legend),
            _ => None,
        })
    }

    /// `None` until the canvas has a size
    pub fn canvas(&self) -> Option<&CanvasFrame> {
        self.elements.iter().find_map(|element| match element {
            ViewElement::Canvas(canvas) => Some(canvas),
            _ => None,
        })
    }
}

pub struct MarkerMapView {
    config: MapViewConfig,
    data: Arc<dyn MarkerDataSource>,
    device: DeviceClass,
    zoom_defaults: ZoomDefaults,
    clicks: Box<dyn ClickHandler>,
    events: EventManager,
    viewport: Viewport,
    projector: PointProjector,
    legend: Legend,
    reset_view: ResetViewControl,
    heatmap: HeatmapLayer<HeatPoint>,
    tiles: TileLayer,
    markers: MarkerClusterGroup,
    /// Fit requested before the canvas had a size
    pending_fit: Option<LatLngBounds>,
}

impl MarkerMapView {
    pub fn new(collaborators: MapCollaborators) -> Result<Self> {
        Self::with_config(MapViewConfig::default(), collaborators)
    }

    /// Mounts the view. The device class is read once, here.
    pub fn with_config(config: MapViewConfig, collaborators: MapCollaborators) -> Result<Self> {
        config.validate()?;

        let MapCollaborators {
            data,
            device,
            clicks,
            store,
        } = collaborators;

        let device = device.device_class();
        let zoom_defaults = config.zoom_defaults(device);

        let mut viewport = Viewport::new(config.center, zoom_defaults.zoom, Point::new(0.0, 0.0));
        viewport.set_zoom_limits(zoom_defaults.min_zoom, config.max_zoom);
        viewport.set_zoom_snap(config.zoom_delta);
        viewport.set_max_bounds(Some(config.max_bounds), Some(config.max_bounds_viscosity));
        viewport.set_view(config.center, zoom_defaults.zoom);

        let mut events = EventManager::new();
        events.subscribe(Box::new(ViewportEventListener::new(store)));

        let heatmap = HeatmapLayer::for_heat_points(config.heatmap.clone());
        let markers = MarkerClusterGroup::new(config.clustering.clone());
        let tiles = TileLayer::new(&config.tile_url_template)?;
        let reset_view = ResetViewControl::new(
            config.reset_view.clone(),
            config.center,
            zoom_defaults.zoom,
        );

        log::info!(
            "mounting map view for {} client at zoom {} (min {})",
            device,
            zoom_defaults.zoom,
            zoom_defaults.min_zoom
        );

        Ok(Self {
            projector: PointProjector::new(config.heatmap.weight),
            legend: Legend::new(config.legend.clone()),
            config,
            data,
            device,
            zoom_defaults,
            clicks,
            events,
            viewport,
            reset_view,
            heatmap,
            tiles,
            markers,
            pending_fit: None,
        })
    }

    /// Replaces the default grid clustering
    pub fn with_cluster_renderer(mut self, renderer: Box<dyn ClusterRenderer>) -> Self {
        self.markers.set_renderer(renderer);
        self
    }

    /// Replaces the default density grid
    pub fn with_heatmap_renderer(mut self, renderer: Box<dyn HeatmapRenderer>) -> Self {
        self.heatmap.set_renderer(renderer);
        self
    }

    /// Downloads visible tiles into `cache` as the view moves
    pub fn with_tile_loading(mut self, cache: TileCache) -> Self {
        self.tiles = self.tiles.with_loading(cache);
        self
    }

    /// Registers a callback for one event type (`"moveend"`, `"zoomstart"`, ...)
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    /// Adds another move/zoom lifecycle subscriber next to the viewport listener
    pub fn subscribe(&mut self, subscriber: Box<dyn ViewportSubscriber>) {
        self.events.subscribe(subscriber);
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn projector(&self) -> &PointProjector {
        &self.projector
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn heatmap(&self) -> &HeatmapLayer<HeatPoint> {
        &self.heatmap
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn markers(&self) -> &MarkerClusterGroup {
        &self.markers
    }

    pub fn reset_control(&self) -> &ResetViewControl {
        &self.reset_view
    }

    /// Options the canvas was mounted with
    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            center: self.config.center,
            zoom: self.zoom_defaults.zoom,
            min_zoom: self.zoom_defaults.min_zoom,
            max_zoom: self.config.max_zoom,
            zoom_delta: self.config.zoom_delta,
            prefer_canvas: self.config.prefer_canvas,
            max_bounds: self.config.max_bounds,
            max_bounds_viscosity: self.config.max_bounds_viscosity,
        }
    }

    /// Pulls the current marker snapshot and builds the frame.
    ///
    /// The legend is always present; the canvas only once it has a size.
    pub fn render(&mut self) -> Composition {
        self.sync_data();

        let mut elements = vec![ViewElement::Legend(self.legend.clone())];
        if !self.viewport.has_size() {
            return Composition { elements };
        }

        self.update_layers();

        let heatmap = &self.heatmap;
        let (latitude, longitude, intensity) = heatmap.extractors();
        let layers = vec![
            CanvasLayer::ResetView(self.reset_view.options().clone()),
            CanvasLayer::ViewportListener,
            CanvasLayer::Heatmap(HeatmapFrame {
                radius: heatmap.config().radius,
                fit_bounds_on_load: heatmap.config().fit_bounds_on_load,
                fit_bounds_on_update: heatmap.config().fit_bounds_on_update,
                points: heatmap
                    .points()
                    .cloned()
                    .unwrap_or_else(|| Arc::from(Vec::new())),
                latitude,
                longitude,
                intensity,
                grid: heatmap.grid().clone(),
                config: heatmap.config().clone(),
            }),
            CanvasLayer::Tiles(TileFrame {
                url_template: self.tiles.template().to_string(),
                tiles: self.tiles.tiles().to_vec(),
            }),
            CanvasLayer::Markers(ClusterFrame {
                marker_count: self.markers.markers().len(),
                clusters: self.markers.clusters().to_vec(),
            }),
        ];

        elements.push(ViewElement::Canvas(CanvasFrame {
            options: self.canvas_options(),
            viewport: self.viewport.clone(),
            layers,
        }));
        Composition { elements }
    }

    /// Sets the container size. The first non-zero size makes the canvas appear.
    pub fn resize(&mut self, size: Point) {
        if size == self.viewport.size {
            return;
        }

        let before_center = self.viewport.center;
        let before_zoom = self.viewport.zoom;
        self.viewport.set_size(size);
        if !self.viewport.has_size() {
            return;
        }

        if let Some(bounds) = self.pending_fit.take() {
            self.viewport.fit_bounds(&bounds, None);
        }
        self.emit_view_change(before_center, before_zoom, true);
    }

    /// Drags the map by a pixel offset
    pub fn pan_by(&mut self, delta: Point) {
        self.apply(|viewport| {
            viewport.pan(delta);
        });
    }

    /// One zoom step in, keeping `focus` fixed when given
    pub fn zoom_in(&mut self, focus: Option<Point>) {
        let target = self.viewport.zoom + self.config.zoom_delta;
        self.zoom_to(target, focus);
    }

    /// One zoom step out, keeping `focus` fixed when given
    pub fn zoom_out(&mut self, focus: Option<Point>) {
        let target = self.viewport.zoom - self.config.zoom_delta;
        self.zoom_to(target, focus);
    }

    /// Mouse wheel: one zoom step per notch direction around `position`
    pub fn scroll(&mut self, delta: f64, position: Point) {
        if delta > 0.0 {
            self.zoom_in(Some(position));
        } else if delta < 0.0 {
            self.zoom_out(Some(position));
        }
    }

    pub fn zoom_to(&mut self, level: f64, focus: Option<Point>) {
        self.apply(|viewport| viewport.zoom_to(level, focus));
    }

    pub fn fit_bounds(&mut self, bounds: LatLngBounds) {
        if !self.viewport.has_size() {
            self.pending_fit = Some(bounds);
            return;
        }
        self.apply(|viewport| viewport.fit_bounds(&bounds, None));
    }

    /// Back to the center and zoom the view was mounted with
    pub fn reset_view(&mut self) {
        let (center, zoom) = self.reset_view.target();
        self.events.emit(MapEvent::ViewReset);
        self.apply(|viewport| viewport.set_view(center, zoom));
    }

    /// Routes a click or tap on the canvas.
    ///
    /// The reset button wins over the layers below it. A cluster of several
    /// markers is reported to the click handler and then zoomed into; a
    /// lone marker is reported once with its record.
    pub fn click(&mut self, event: PointerEvent) -> Option<ClusterHit> {
        if !self.viewport.has_size() {
            return None;
        }

        if self
            .reset_view
            .hit_test(self.viewport.size, &event.position)
        {
            self.reset_view();
            return None;
        }

        self.sync_data();
        if let Err(e) = self.markers.update(&self.viewport) {
            log::warn!("failed to update clusters before click: {}", e);
        }

        let hit = self.markers.hit_test(&self.viewport, &event.position);
        match &hit {
            Some(ClusterHit::Marker(record)) => {
                log::debug!("marker {} clicked ({:?})", record.id, event.kind);
                self.events.emit(MapEvent::MarkerClick {
                    marker_id: record.id.clone(),
                });
                self.events.process_events();
                self.clicks.on_marker_click(&event, record);
            }
            Some(ClusterHit::Cluster(cluster)) => {
                log::debug!("cluster {} of {} clicked", cluster.id, cluster.count());
                self.events.emit(MapEvent::ClusterClick {
                    cluster_id: cluster.id.clone(),
                    count: cluster.count(),
                });
                self.events.process_events();
                self.clicks.on_cluster_click(&ClusterClickEvent {
                    pointer: event,
                    lat_lng: self.viewport.pixel_to_lat_lng(&event.position),
                    cluster: cluster.clone(),
                });
                if self.config.clustering.zoom_to_bounds_on_click {
                    let bounds = cluster.bounds;
                    self.apply(|viewport| viewport.fit_bounds(&bounds, None));
                }
            }
            None => {
                self.events.emit(MapEvent::Click {
                    lat_lng: self.viewport.pixel_to_lat_lng(&event.position),
                    pixel: event.position,
                });
                self.events.process_events();
            }
        }
        hit
    }

    /// Picks up a new marker snapshot, if the source has one
    fn sync_data(&mut self) {
        let markers = self.data.markers();
        if !self.markers.set_markers(Arc::clone(&markers)) {
            return;
        }

        self.events.emit(MapEvent::DataChanged {
            count: markers.len(),
        });
        let points = self.projector.project(&markers);
        if let Some(bounds) = self.heatmap.set_points(points) {
            self.fit_bounds(bounds);
        }
        self.events.process_events();
    }

    fn update_layers(&mut self) {
        let layers: [&mut dyn LayerTrait; 3] =
            [&mut self.heatmap, &mut self.tiles, &mut self.markers];
        for layer in layers {
            if !layer.is_visible() {
                continue;
            }
            if let Err(e) = layer.update(&self.viewport) {
                log::warn!("layer {} failed to update: {}", layer.id(), e);
            }
        }
    }

    /// Runs a viewport change and emits the matching move/zoom events
    fn apply<F>(&mut self, change: F)
    where
        F: FnOnce(&mut Viewport),
    {
        let before_center = self.viewport.center;
        let before_zoom = self.viewport.zoom;
        change(&mut self.viewport);
        self.emit_view_change(before_center, before_zoom, false);
    }

    fn emit_view_change(&mut self, before_center: LatLng, before_zoom: f64, resized: bool) {
        let zoom_changed = (self.viewport.zoom - before_zoom).abs() > f64::EPSILON;
        let moved = self.viewport.center != before_center;

        if zoom_changed || moved || resized {
            let bounds = self.viewport.bounds();
            if zoom_changed {
                self.events.emit(MapEvent::ZoomStart { zoom: before_zoom });
                self.events.emit(MapEvent::ZoomEnd {
                    zoom: self.viewport.zoom,
                    bounds,
                });
            } else if moved {
                self.events.emit(MapEvent::MoveStart {
                    center: before_center,
                });
            }
            self.events.emit(MapEvent::MoveEnd {
                center: self.viewport.center,
                bounds,
            });
        }

        self.events.process_events();
    }
}
