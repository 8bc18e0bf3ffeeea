//! View fitting for a loaded vehicle: root normalization and camera framing.

mod camera;
pub mod normalize;

pub use camera::{fit_distance, CameraFlyIn, CameraPlacement};
pub use normalize::{normalize, prepare_meshes, Framing};
