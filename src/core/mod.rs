pub mod bounds;
pub mod config;
pub mod constants;
pub mod device;
pub mod geo;
pub mod viewport;
