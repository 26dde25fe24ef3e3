pub mod mesh;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use mesh::{Material, Mesh, Primitive, Vertex};
pub use object3d::{NodeKind, Object3D, ObjectId};
pub use scene::Scene;
pub use transform::Transform;
