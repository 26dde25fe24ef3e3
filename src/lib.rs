//! Embeddable 3D object viewer.
//!
//! A [`Session`] owns a scene bound to a host [`Container`]: a camera, a
//! three-light rig, orbit controls and a background asset loader. The
//! session is host-independent; the `viewer` feature adds a wgpu renderer
//! and a winit window that drive it.

pub mod asset_pipeline;
pub mod camera;
pub mod camera_fit;
pub mod config;
pub mod controls;
pub mod error;
pub mod events;
pub mod host;
pub mod lighting;
pub mod loader;
pub mod math;
pub mod render_loop;
pub mod scene_graph;
pub mod session;

#[cfg(feature = "viewer")]
pub mod rendering;
#[cfg(feature = "viewer")]
pub mod window;

pub use config::ViewerConfig;
pub use error::LoadError;
pub use events::{callback, LoadCallback, LoadOutcome, LoadProgress, LogListener, ViewerListener};
pub use host::{Container, FullscreenApi, ResizeHub, ResizeSubscription, Viewport};
pub use loader::LoadHandle;
pub use render_loop::RenderLoopHandle;
pub use scene_graph::{NodeKind, ObjectId, Scene};
pub use session::Session;
