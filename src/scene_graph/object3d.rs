use std::sync::Arc;

use id_arena::Id;

use crate::lighting::Light;
use crate::scene_graph::mesh::Mesh;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

/// Type tag of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root group of a loaded asset. Only these are removed by a scene clear.
    Asset,
    Group,
    Mesh,
    Camera,
    Light,
}

pub struct Object3D {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
    pub light: Option<Light>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
    pub(crate) removed: bool,
}

impl Object3D {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: Arc<Mesh>) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn parent<'a>(&self, scene: &'a Scene) -> Option<&'a Object3D> {
        self.parent_id.and_then(|id| scene.get_object(id))
    }

    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: NodeKind::Group,
            transform: Transform::default(),
            mesh: None,
            light: None,
            parent_id: None,
            child_ids: Vec::new(),
            removed: false,
        }
    }
}
