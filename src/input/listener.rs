//! Viewport event listener
//!
//! Bridges the canvas' move and zoom lifecycle to the host's
//! [`ViewportStore`]. It renders nothing.

use crate::{
    core::geo::LatLngBounds,
    traits::{ViewportStore, ViewportSubscriber},
};

/// Reports visible bounds to the store and clears the selection on zoom-out.
///
/// The level seen at the last zoom start is kept between events; it starts
/// at `0.0`, so a zoom end without a preceding start never counts as a
/// zoom-out.
pub struct ViewportEventListener {
    store: Box<dyn ViewportStore>,
    zoom_start_level: f64,
}

impl ViewportEventListener {
    pub fn new(store: Box<dyn ViewportStore>) -> Self {
        Self {
            store,
            zoom_start_level: 0.0,
        }
    }

    /// Level recorded at the most recent zoom start
    pub fn zoom_start_level(&self) -> f64 {
        self.zoom_start_level
    }
}

impl ViewportSubscriber for ViewportEventListener {
    fn on_viewport_settled(&mut self, bounds: LatLngBounds) {
        self.store.set_coordinates(bounds);
    }

    fn on_zoom_gesture_start(&mut self, level: f64) {
        self.zoom_start_level = level;
    }

    fn on_zoom_gesture_end(&mut self, level: f64, bounds: LatLngBounds) {
        self.store.set_coordinates(bounds);
        if self.zoom_start_level > level {
            log::debug!(
                "zoomed out {} -> {}, clearing popup",
                self.zoom_start_level,
                level
            );
            self.store.set_popup_data(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::marker::MarkerRecord;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Coordinates(LatLngBounds),
        Popup(Option<MarkerRecord>),
    }

    struct RecordingStore(Arc<Mutex<Vec<Call>>>);

    impl ViewportStore for RecordingStore {
        fn set_coordinates(&mut self, bounds: LatLngBounds) {
            self.0.lock().unwrap().push(Call::Coordinates(bounds));
        }

        fn set_popup_data(&mut self, data: Option<MarkerRecord>) {
            self.0.lock().unwrap().push(Call::Popup(data));
        }
    }

    fn listener() -> (ViewportEventListener, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let listener = ViewportEventListener::new(Box::new(RecordingStore(Arc::clone(&calls))));
        (listener, calls)
    }

    fn bounds() -> LatLngBounds {
        LatLngBounds::from_coords(36.0, 35.0, 38.0, 39.0)
    }

    #[test]
    fn test_settle_reports_bounds() {
        let (mut listener, calls) = listener();
        listener.on_viewport_settled(bounds());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Coordinates(bounds())]);
    }

    #[test]
    fn test_zoom_out_clears_popup() {
        let (mut listener, calls) = listener();
        listener.on_zoom_gesture_start(10.0);
        listener.on_zoom_gesture_end(8.0, bounds());

        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Coordinates(bounds()), Call::Popup(None)]
        );
    }

    #[test]
    fn test_zoom_in_keeps_popup() {
        let (mut listener, calls) = listener();
        listener.on_zoom_gesture_start(8.0);
        listener.on_zoom_gesture_end(10.0, bounds());

        assert_eq!(*calls.lock().unwrap(), vec![Call::Coordinates(bounds())]);
    }

    #[test]
    fn test_same_level_keeps_popup() {
        let (mut listener, calls) = listener();
        listener.on_zoom_gesture_start(9.0);
        listener.on_zoom_gesture_end(9.0, bounds());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_end_without_start_is_not_a_zoom_out() {
        let (mut listener, calls) = listener();
        assert_eq!(listener.zoom_start_level(), 0.0);
        listener.on_zoom_gesture_end(6.0, bounds());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Coordinates(bounds())]);
    }
}
