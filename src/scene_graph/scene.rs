use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::asset_pipeline::asset_graph::{AssetGraph, AssetNode};
use crate::math::AABB;
use crate::scene_graph::mesh::Mesh;
use crate::scene_graph::object3d::{NodeKind, Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

/// Arena-backed scene graph rooted at a "Scene" group.
///
/// Removed nodes stay in the arena as tombstones so their ids never come
/// back to life. A tombstone keeps only its transform; mesh, light, name and
/// child list are released on removal. The arena therefore grows by one
/// small shell per removed node across load/clear cycles; see
/// [`Scene::tombstone_count`].
pub struct Scene {
    objects: Arena<Object3D>,
    root: ObjectId,
}

impl Scene {
    pub fn new() -> Self {
        let mut objects = Arena::new();
        let root = objects.alloc(Object3D::new("Scene", NodeKind::Group));

        Self { objects, root }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Adds `object` as a child of `parent`, or of the scene root.
    pub fn add_object(&mut self, object: Object3D, parent: Option<ObjectId>) -> ObjectId {
        let object_id = self.objects.alloc(object);
        self.set_object_parent(object_id, Some(parent.unwrap_or(self.root)));
        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id).filter(|object| !object.removed)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id).filter(|object| !object.removed)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter_objects()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get_object(id).is_some()
    }

    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectId, &Object3D)> {
        self.objects.iter().filter(|(_, object)| !object.removed)
    }

    /// Live nodes that carry a mesh, paired with it.
    pub fn mesh_objects(&self) -> impl Iterator<Item = (ObjectId, &Object3D, &Mesh)> {
        self.iter_objects()
            .filter_map(|(id, object)| object.mesh.as_deref().map(|mesh| (id, object, mesh)))
    }

    /// Direct children of the scene root.
    pub fn root_children(&self) -> Vec<ObjectId> {
        self.get_object(self.root)
            .map(|root| root.child_ids.clone())
            .unwrap_or_default()
    }

    /// Spawns a parsed asset graph under a new `Asset` group attached to the root.
    pub fn spawn_asset(&mut self, graph: AssetGraph) -> ObjectId {
        let AssetGraph { name, roots } = graph;
        let asset_id = self.add_object(Object3D::new(name, NodeKind::Asset), None);

        for node in roots {
            self.spawn_asset_node(node, asset_id);
        }

        asset_id
    }

    fn spawn_asset_node(&mut self, node: AssetNode, parent: ObjectId) -> ObjectId {
        let AssetNode {
            name,
            translation,
            rotation,
            scale,
            mesh,
            children,
        } = node;

        let kind = if mesh.is_some() {
            NodeKind::Mesh
        } else {
            NodeKind::Group
        };

        let mut object = Object3D::new(name, kind)
            .with_transform(Transform::from_parts(translation, rotation, scale));
        object.mesh = mesh;

        let object_id = self.add_object(object, Some(parent));

        for child in children {
            self.spawn_asset_node(child, object_id);
        }

        object_id
    }

    /// Removes a node and its whole subtree. Ids of removed nodes stay dead.
    pub fn remove_object(&mut self, object_id: ObjectId) {
        if object_id == self.root {
            return;
        }

        self.set_object_parent(object_id, None);
        self.mark_removed_recursive(object_id);
    }

    fn mark_removed_recursive(&mut self, object_id: ObjectId) {
        // TODO: reuse tombstoned slots once id-arena is replaced by a generational arena
        let child_ids = match self.objects.get_mut(object_id) {
            Some(object) => {
                object.removed = true;
                object.mesh = None;
                object.light = None;
                object.name = String::new();
                std::mem::take(&mut object.child_ids)
            }
            None => return,
        };

        for child_id in child_ids {
            self.mark_removed_recursive(child_id);
        }
    }

    /// Number of removed nodes still occupying arena slots.
    pub fn tombstone_count(&self) -> usize {
        self.objects.iter().filter(|(_, object)| object.removed).count()
    }

    /// Updates all object transforms in hierarchical order
    pub fn update_transforms(&self) {
        self.update_object_transform_recursive(self.root, Mat4::IDENTITY, false);
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.get_object(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();

            if changed {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.get_object(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        // Remove from old parent's children list
        if let Some(old_parent_id) = self.get_object(child_id).and_then(|child| child.parent_id) {
            if let Some(old_parent) = self.get_object_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        // Set new parent and add to new parent's children list
        if let Some(child) = self.get_object_mut(child_id) {
            child.parent_id = new_parent_id;
        }

        if let Some(new_parent_id) = new_parent_id {
            if let Some(new_parent) = self.get_object_mut(new_parent_id) {
                new_parent.child_ids.push(child_id);
            }
        }

        // Invalidate world transforms for the moved object and its descendants
        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn translate_object(&mut self, object_id: ObjectId, delta: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.translate(delta);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn clear_object_yaw(&mut self, object_id: ObjectId) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.clear_yaw();
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.get_object(object_id).map(|object| &object.transform)
    }

    /// World-space bounds of every mesh in the subtree rooted at `object_id`.
    pub fn world_bounds(&self, object_id: ObjectId) -> AABB {
        self.update_transforms();
        self.world_bounds_recursive(object_id)
    }

    fn world_bounds_recursive(&self, object_id: ObjectId) -> AABB {
        let Some(object) = self.get_object(object_id) else {
            return AABB::EMPTY;
        };

        let own = object
            .mesh
            .as_deref()
            .map(|mesh| mesh.bounds().transformed(&object.transform.get_world_matrix()))
            .unwrap_or(AABB::EMPTY);

        object
            .child_ids
            .iter()
            .fold(own, |aabb, &child_id| {
                aabb.union(&self.world_bounds_recursive(child_id))
            })
    }

    pub fn early_update(&mut self) {
        for (_, object) in self.iter_objects() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene_graph::mesh::{Primitive, Vertex};

    fn unit_mesh() -> Arc<Mesh> {
        let vertices = [Vec3::ZERO, Vec3::ONE]
            .into_iter()
            .map(|position| Vertex {
                position,
                normal: Vec3::Y,
            })
            .collect();

        Arc::new(Mesh {
            name: "Unit".to_string(),
            primitives: vec![Primitive::new(vertices, vec![], None)],
        })
    }

    #[test]
    fn tombstones_release_meshes() {
        let mut scene = Scene::new();
        let mesh = unit_mesh();

        for _ in 0..3 {
            let group = scene.add_object(Object3D::new("Asset", NodeKind::Asset), None);
            scene.add_object(
                Object3D::new("Mesh", NodeKind::Mesh).with_mesh(mesh.clone()),
                Some(group),
            );
            assert_eq!(Arc::strong_count(&mesh), 2);

            scene.remove_object(group);
            assert_eq!(Arc::strong_count(&mesh), 1);
        }

        assert_eq!(scene.tombstone_count(), 6);
        assert_eq!(scene.iter_objects().count(), 1);
        assert!(scene
            .objects
            .iter()
            .filter(|(_, object)| object.removed)
            .all(|(_, object)| object.name.is_empty() && object.child_ids.is_empty()));
    }

    #[test]
    fn remove_object_drops_whole_subtree() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::new("Group", NodeKind::Asset), None);
        let child = scene.add_object(Object3D::new("Child", NodeKind::Mesh), Some(group));
        let light = scene.add_object(Object3D::new("Light", NodeKind::Light), None);

        scene.remove_object(group);

        assert!(!scene.contains(group));
        assert!(!scene.contains(child));
        assert!(scene.contains(light));
        assert_eq!(scene.root_children(), vec![light]);
    }

    #[test]
    fn world_bounds_follow_parent_translation() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::new("Group", NodeKind::Asset), None);
        let child = scene.add_object(
            Object3D::new("Child", NodeKind::Mesh).with_mesh(unit_mesh()),
            Some(group),
        );

        scene.set_object_translation(group, Vec3::new(10.0, 0.0, 0.0));
        let bounds = scene.world_bounds(group);

        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
        assert_eq!(scene.world_bounds(child), bounds);
    }

    #[test]
    fn object_parent_links_both_ways() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::new("Group", NodeKind::Group), None);
        let child = scene.add_object(Object3D::new("Child", NodeKind::Group), Some(group));

        let child_object = scene.get_object(child).unwrap();
        assert_eq!(child_object.parent(&scene).map(|p| p.name.as_str()), Some("Group"));

        let names: Vec<_> = scene
            .get_object(group)
            .unwrap()
            .children(&scene)
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["Child".to_string()]);
        assert_eq!(scene.get_object_by_name("Child"), Some(child));
    }
}
