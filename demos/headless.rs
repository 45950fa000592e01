use reliefmap::{
    input::events::{ClusterClickEvent, PointerEvent},
    layers::cluster::ClusterHit,
    ui::view::{CanvasLayer, ViewElement},
    ClickHandler, DeviceClassifier, LatLng, LatLngBounds, MapCollaborators, MarkerMapView,
    MarkerRecord, Point, StaticMarkerSource, ViewportStore,
};
use std::sync::Arc;

struct Desktop;

impl DeviceClassifier for Desktop {
    fn device_label(&self) -> Option<String> {
        Some("desktop".to_string())
    }
}

struct PrintClicks;

impl ClickHandler for PrintClicks {
    fn on_cluster_click(&mut self, event: &ClusterClickEvent) {
        println!(
            "   cluster {} ({} places) clicked",
            event.cluster.id,
            event.cluster.count()
        );
    }

    fn on_marker_click(&mut self, event: &PointerEvent, marker: &MarkerRecord) {
        println!("   place {} clicked with {:?}", marker.id, event.kind);
    }
}

struct PrintStore;

impl ViewportStore for PrintStore {
    fn set_coordinates(&mut self, bounds: LatLngBounds) {
        println!(
            "   store: visible {:.3},{:.3} .. {:.3},{:.3}",
            bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
        );
    }

    fn set_popup_data(&mut self, data: Option<MarkerRecord>) {
        println!("   store: popup = {:?}", data.map(|record| record.id));
    }
}

/// Drives a map view without any UI
fn main() -> reliefmap::Result<()> {
    reliefmap::init_logging();

    let data = Arc::new(StaticMarkerSource::new(vec![
        MarkerRecord::new("antakya-1", LatLng::new(36.2021, 36.1606)),
        MarkerRecord::new("antakya-2", LatLng::new(36.2065, 36.1572)),
        MarkerRecord::new("gaziantep", LatLng::new(37.0662, 37.3833)),
        MarkerRecord::new("malatya", LatLng::new(38.3552, 38.3095)),
    ]));
    let mut view = MarkerMapView::new(MapCollaborators::new(
        data,
        Arc::new(Desktop),
        Box::new(PrintClicks),
        Box::new(PrintStore),
    ))?;

    println!("Before layout:");
    let frame = view.render();
    println!("   {} element(s), canvas: {}", frame.elements.len(), frame.canvas().is_some());

    println!("Layout 1024x768:");
    view.resize(Point::new(1024.0, 768.0));
    let frame = view.render();
    for element in &frame.elements {
        match element {
            ViewElement::Legend(legend) => println!("   legend with {} entries", legend.entries.len()),
            ViewElement::Canvas(canvas) => {
                println!(
                    "   canvas at zoom {} with {} children",
                    canvas.viewport.zoom,
                    canvas.layers.len()
                );
                for layer in &canvas.layers {
                    match layer {
                        CanvasLayer::Heatmap(heatmap) => {
                            println!("      heatmap: {} points", heatmap.points.len())
                        }
                        CanvasLayer::Tiles(tiles) => println!("      tiles: {}", tiles.tiles.len()),
                        CanvasLayer::Markers(markers) => {
                            println!("      clusters: {}", markers.clusters.len())
                        }
                        CanvasLayer::ResetView(options) => {
                            println!("      reset control \"{}\"", options.title)
                        }
                        CanvasLayer::ViewportListener => println!("      viewport listener"),
                    }
                }
            }
        }
    }

    println!("Clicking the first cluster:");
    if let Some(cluster) = view.markers().clusters().first().cloned() {
        let pixel = view.viewport().lat_lng_to_pixel(&cluster.center);
        match view.click(PointerEvent::mouse(pixel)) {
            Some(ClusterHit::Cluster(hit)) => println!("   zoomed into {}", hit.id),
            Some(ClusterHit::Marker(record)) => println!("   opened {}", record.id),
            None => println!("   nothing there"),
        }
    }

    println!("Zooming out:");
    view.zoom_out(None);
    println!("   zoom is now {}", view.viewport().zoom);

    println!("Reset:");
    view.reset_view();
    println!("   zoom is now {}", view.viewport().zoom);

    Ok(())
}
