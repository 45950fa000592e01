use crate::{
    input::events::MapEvent,
    prelude::{HashMap, VecDeque},
    traits::ViewportSubscriber,
};

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queues canvas events and fans them out to callbacks and viewport subscribers
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    subscribers: Vec<Box<dyn ViewportSubscriber>>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Register a move/zoom lifecycle subscriber
    pub fn subscribe(&mut self, subscriber: Box<dyn ViewportSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Deliver all queued events in emission order and return them
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            log::trace!("dispatching {}", event.event_type());

            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }

            for subscriber in &mut self.subscribers {
                match event {
                    MapEvent::MoveEnd { bounds, .. } => subscriber.on_viewport_settled(*bounds),
                    MapEvent::ZoomStart { zoom } => subscriber.on_zoom_gesture_start(*zoom),
                    MapEvent::ZoomEnd { zoom, bounds } => {
                        subscriber.on_zoom_gesture_end(*zoom, *bounds)
                    }
                    _ => {}
                }
            }
        }

        events
    }

    /// Clear all events from the queue
    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, LatLngBounds};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ViewportSubscriber for Recorder {
        fn on_viewport_settled(&mut self, _bounds: LatLngBounds) {
            self.calls.lock().unwrap().push("settled".to_string());
        }

        fn on_zoom_gesture_start(&mut self, level: f64) {
            self.calls.lock().unwrap().push(format!("start {}", level));
        }

        fn on_zoom_gesture_end(&mut self, level: f64, _bounds: LatLngBounds) {
            self.calls.lock().unwrap().push(format!("end {}", level));
        }
    }

    fn bounds() -> LatLngBounds {
        LatLngBounds::from_coords(36.0, 36.0, 38.0, 38.0)
    }

    #[test]
    fn test_callbacks_by_type() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let mut manager = EventManager::new();
        manager.on("zoomend", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit(MapEvent::ZoomStart { zoom: 8.0 });
        manager.emit(MapEvent::ZoomEnd {
            zoom: 9.0,
            bounds: bounds(),
        });
        assert_eq!(manager.pending_events(), 2);

        let processed = manager.process_events();
        assert_eq!(processed.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending_events(), 0);
    }

    #[test]
    fn test_subscribers_see_lifecycle_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut manager = EventManager::new();
        manager.subscribe(Box::new(Recorder {
            calls: Arc::clone(&calls),
        }));
        assert_eq!(manager.subscriber_count(), 1);

        manager.emit(MapEvent::MoveStart {
            center: LatLng::new(37.0, 37.0),
        });
        manager.emit(MapEvent::ZoomStart { zoom: 8.0 });
        manager.emit(MapEvent::ZoomEnd {
            zoom: 8.5,
            bounds: bounds(),
        });
        manager.emit(MapEvent::MoveEnd {
            center: LatLng::new(37.0, 37.0),
            bounds: bounds(),
        });
        manager.process_events();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["start 8", "end 8.5", "settled"]
        );
    }

    #[test]
    fn test_clear_events() {
        let mut manager = EventManager::new();
        manager.emit(MapEvent::ViewReset);
        manager.clear_events();
        assert!(manager.process_events().is_empty());
    }
}
