//! Macros to reduce boilerplate in layer implementations

/// Implements the [`LayerTrait`](crate::layers::base::LayerTrait) accessors
/// backed by a `LayerProperties` field.
///
/// Usage:
/// ```ignore
/// impl LayerTrait for MyLayer {
///     reliefmap::impl_layer_trait!(MyLayer, properties);
///     // update(), options()
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($layer_type:ty, $properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn name(&self) -> &str {
            &self.$properties_field.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$properties_field.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$properties_field.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$properties_field.z_index = z_index;
        }

        fn opacity(&self) -> f32 {
            self.$properties_field.opacity
        }

        fn set_opacity(&mut self, opacity: f32) {
            self.$properties_field.opacity = opacity.clamp(0.0, 1.0);
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties_field.visible = visible;
        }

        fn is_interactive(&self) -> bool {
            self.$properties_field.interactive
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

/// Implements `options()` as the common properties plus one entry per
/// `"key" => method` pair, each filled from `self.method()`
#[macro_export]
macro_rules! impl_default_options_serialization {
    ($properties_field:ident $(, $key:literal => $method:ident)* $(,)?) => {
        fn options(&self) -> serde_json::Value {
            #[allow(unused_mut)]
            let mut options = serde_json::json!({
                "id": self.$properties_field.id,
                "name": self.$properties_field.name,
                "layer_type": self.$properties_field.layer_type.to_string(),
                "z_index": self.$properties_field.z_index,
                "opacity": self.$properties_field.opacity,
                "visible": self.$properties_field.visible,
                "interactive": self.$properties_field.interactive
            });
            $(
                options[$key] = serde_json::json!(self.$method());
            )*
            options
        }
    };
}
