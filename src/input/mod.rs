pub mod dispatch;
pub mod events;
pub mod listener;

// Re-export the essential types
pub use dispatch::{EventCallback, EventManager};
pub use events::{ClusterClickEvent, KeyModifiers, MapEvent, MouseButton, PointerEvent, PointerKind};
pub use listener::ViewportEventListener;
