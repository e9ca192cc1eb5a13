pub mod annotate;
pub mod camera;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod shapes;
pub mod transport;
