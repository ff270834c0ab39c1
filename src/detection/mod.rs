//! Detection - actors that see through cloaks

pub mod grid;
pub mod registry;

pub use grid::DetectorGrid;
pub use registry::{DetectionRegistry, DetectorUnit};
