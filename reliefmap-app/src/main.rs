use reliefmap::{
    core::geo::LatLngBounds,
    input::events::{ClusterClickEvent, PointerEvent},
    tiles::cache::TileCache,
    ui::widget::{MapWidget, TileTextures},
    ClickHandler, DeviceClassifier, LatLng, MapCollaborators, MarkerMapView, MarkerRecord,
    StaticMarkerSource, ViewportStore,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Standalone viewer: `reliefmap-app [places.json]`
///
/// `RELIEFMAP_DEVICE` overrides the device label (default `desktop`).
fn main() -> Result<(), Box<dyn std::error::Error>> {
    reliefmap::init_logging();

    let data = match std::env::args().nth(1) {
        Some(path) => StaticMarkerSource::from_json_file(path).map_err(widen)?,
        None => StaticMarkerSource::new(sample_places()),
    };
    let device = EnvDevice(std::env::var("RELIEFMAP_DEVICE").ok());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Reliefmap"),
        ..Default::default()
    };

    let app = ReliefApp::new(Arc::new(data), Arc::new(device)).map_err(widen)?;
    eframe::run_native("reliefmap-app", options, Box::new(|_cc| Box::new(app)))?;

    Ok(())
}

fn widen(error: Box<dyn std::error::Error + Send + Sync>) -> Box<dyn std::error::Error> {
    error
}

fn sample_places() -> Vec<MarkerRecord> {
    [
        ("antakya-1", 36.2021, 36.1606, "Antakya"),
        ("antakya-2", 36.2065, 36.1572, "Antakya"),
        ("antakya-3", 36.1987, 36.1644, "Antakya"),
        ("iskenderun", 36.5872, 36.1735, "İskenderun"),
        ("gaziantep", 37.0662, 37.3833, "Gaziantep"),
        ("kahramanmaras-1", 37.5858, 36.9371, "Kahramanmaraş"),
        ("kahramanmaras-2", 37.5753, 36.9228, "Kahramanmaraş"),
        ("adiyaman", 37.7648, 38.2786, "Adıyaman"),
        ("malatya", 38.3552, 38.3095, "Malatya"),
        ("osmaniye", 37.0742, 36.2478, "Osmaniye"),
    ]
    .into_iter()
    .map(|(id, lat, lng, city)| {
        MarkerRecord::new(id, LatLng::new(lat, lng))
            .with_field("formatted_address", serde_json::Value::from(city))
    })
    .collect()
}

struct EnvDevice(Option<String>);

impl DeviceClassifier for EnvDevice {
    fn device_label(&self) -> Option<String> {
        Some(self.0.clone().unwrap_or_else(|| "desktop".to_string()))
    }
}

/// What the side panel shows
#[derive(Default)]
struct Selection {
    bounds: Option<LatLngBounds>,
    popup: Option<MarkerRecord>,
    last_cluster: Option<(String, usize)>,
}

type SharedSelection = Arc<Mutex<Selection>>;

fn lock(selection: &SharedSelection) -> MutexGuard<'_, Selection> {
    selection
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct PopupOnClick(SharedSelection);

impl ClickHandler for PopupOnClick {
    fn on_cluster_click(&mut self, event: &ClusterClickEvent) {
        log::info!(
            "cluster {} with {} places at {:?}",
            event.cluster.id,
            event.cluster.count(),
            event.lat_lng
        );
        lock(&self.0).last_cluster = Some((event.cluster.id.clone(), event.cluster.count()));
    }

    fn on_marker_click(&mut self, event: &PointerEvent, marker: &MarkerRecord) {
        log::info!("place {} selected by {:?}", marker.id, event.kind);
        lock(&self.0).popup = Some(marker.clone());
    }
}

struct SelectionStore(SharedSelection);

impl ViewportStore for SelectionStore {
    fn set_coordinates(&mut self, bounds: LatLngBounds) {
        lock(&self.0).bounds = Some(bounds);
    }

    fn set_popup_data(&mut self, data: Option<MarkerRecord>) {
        lock(&self.0).popup = data;
    }
}

struct ReliefApp {
    view: MarkerMapView,
    textures: TileTextures,
    tile_cache: TileCache,
    selection: SharedSelection,
}

impl ReliefApp {
    fn new(
        data: Arc<StaticMarkerSource>,
        device: Arc<EnvDevice>,
    ) -> reliefmap::Result<Self> {
        let selection = SharedSelection::default();
        let tile_cache = TileCache::default();

        let collaborators = MapCollaborators::new(
            data,
            device,
            Box::new(PopupOnClick(Arc::clone(&selection))),
            Box::new(SelectionStore(Arc::clone(&selection))),
        );
        let view = MarkerMapView::new(collaborators)?.with_tile_loading(tile_cache.clone());

        Ok(Self {
            view,
            textures: TileTextures::new(),
            tile_cache,
            selection,
        })
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        let mut selection = lock(&self.selection);

        ui.heading("Seçili yer");
        ui.separator();
        let mut close = false;
        match &selection.popup {
            Some(record) => {
                ui.label(&record.id);
                ui.label(format!("{:.5}, {:.5}", record.lat(), record.lng()));
                for (key, value) in &record.extra {
                    ui.label(format!("{}: {}", key, value));
                }
                close = ui.button("Kapat").clicked();
            }
            None => {
                ui.label("Seçim yok");
            }
        }
        if close {
            selection.popup = None;
        }

        ui.separator();
        if let Some((id, count)) = &selection.last_cluster {
            ui.label(format!("Last cluster: {} ({} places)", id, count));
        }
        if let Some(bounds) = &selection.bounds {
            ui.label(format!(
                "Visible: {:.3},{:.3} – {:.3},{:.3}",
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng
            ));
        }
    }
}

impl eframe::App for ReliefApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            let viewport = self.view.viewport();
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} | center {:.4}, {:.4} | zoom {:.1} | {} places | {} tiles cached",
                    self.view.device(),
                    viewport.center.lat,
                    viewport.center.lng,
                    viewport.zoom,
                    self.view.markers().records().len(),
                    self.tile_cache.len()
                ));
            });
        });

        egui::SidePanel::right("selection")
            .resizable(true)
            .show(ctx, |ui| self.side_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.add(
                    MapWidget::new(&mut self.view, &mut self.textures)
                        .with_tile_cache(&self.tile_cache),
                );
            });
    }
}
