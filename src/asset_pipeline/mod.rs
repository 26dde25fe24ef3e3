pub mod asset_graph;
pub mod gltf_import;
pub mod materials;
pub mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use asset_graph::{AssetGraph, AssetNode};
pub use gltf_import::import_gltf;
pub use materials::MaterialLibrary;
pub use source::{AssetSource, DefaultSource};
