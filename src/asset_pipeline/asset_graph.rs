use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::scene_graph::mesh::Mesh;

/// A parsed asset, detached from any scene. Built on the loader thread and
/// spawned into the scene on the session's thread.
#[derive(Debug, Clone)]
pub struct AssetGraph {
    pub name: String,
    pub roots: Vec<AssetNode>,
}

#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mesh: Option<Arc<Mesh>>,
    pub children: Vec<AssetNode>,
}

impl AssetGraph {
    pub fn node_count(&self) -> usize {
        fn count(node: &AssetNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }

        self.roots.iter().map(count).sum()
    }

    pub fn meshes(&self) -> Vec<&Arc<Mesh>> {
        fn collect<'a>(node: &'a AssetNode, out: &mut Vec<&'a Arc<Mesh>>) {
            out.extend(node.mesh.iter());
            for child in &node.children {
                collect(child, out);
            }
        }

        let mut meshes = Vec::new();
        for root in &self.roots {
            collect(root, &mut meshes);
        }
        meshes
    }
}
