//! Core of a 3D vehicle configurator: finds the recolorable regions of a
//! loaded vehicle scene and rewrites their materials on demand.

pub mod app;
pub mod catalog;
pub mod material;
pub mod mutate;
pub mod region;
pub mod render;
pub mod resolve;
pub mod scene;
pub mod snapshot;

#[cfg(test)]
mod test_support;
