use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use web_time::Instant;

use crate::asset_pipeline::{AssetGraph, AssetSource, DefaultSource};
use crate::camera::Camera;
use crate::camera_fit::{fit_camera_to_object, CameraFit};
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::error::LoadResult;
use crate::events::{LoadCallback, ViewerListener};
use crate::host::{self, Container, ResizeSubscription, Viewport};
use crate::lighting::LightRig;
use crate::loader::{AssetLoader, LoadHandle, LoadRequest, LoaderMessage, PendingLoad};
use crate::render_loop::{RenderLoop, RenderLoopHandle};
use crate::scene_graph::{Material, NodeKind, Object3D, ObjectId, Scene, Transform};

struct InFlightLoad {
    pending: PendingLoad,
    callback: Option<LoadCallback>,
}

/// One viewer: a scene bound to a container, with its camera, light rig,
/// orbit controls and at most one asset load in flight.
///
/// Everything here runs on the thread that owns the session; the host
/// drives it by calling [`Session::frame`] once per frame.
pub struct Session<C: Container> {
    container: C,
    config: ViewerConfig,

    scene: Scene,
    camera: Camera,
    camera_node: ObjectId,
    viewport: Viewport,
    lights: LightRig,
    controls: OrbitControls,

    loader: AssetLoader,
    in_flight: Option<InFlightLoad>,
    locked: bool,
    listeners: Vec<Box<dyn ViewerListener>>,

    resize_pending: Rc<Cell<bool>>,
    resize_recheck_at: Option<Instant>,
    _resize_subscription: ResizeSubscription,
    render_loop: RenderLoop,
}

impl<C: Container> Session<C> {
    /// Builds the scene, camera, lights and controls for `container`,
    /// subscribes to its resize notifications and starts the render loop.
    pub fn prepare(container: C, config: ViewerConfig) -> Self {
        Self::prepare_with_source(container, config, Arc::new(DefaultSource))
    }

    pub fn prepare_with_source(
        container: C,
        config: ViewerConfig,
        source: Arc<dyn AssetSource>,
    ) -> Self {
        let (width, height) = container.size();
        let camera = Camera::new(&config.camera, width, height);

        let mut scene = Scene::new();
        let camera_node = scene.add_object(
            Object3D::new("Camera", NodeKind::Camera)
                .with_transform(Transform::from_translation(camera.eye)),
            None,
        );
        let lights = LightRig::spawn(&mut scene, &config.lights);
        let controls = OrbitControls::new(&config.controls, &camera);

        let resize_pending = Rc::new(Cell::new(false));
        let flag = Rc::downgrade(&resize_pending);
        let resize_subscription = container.resize_hub().subscribe(move || {
            if let Some(flag) = flag.upgrade() {
                flag.set(true);
            }
        });

        let viewport = Viewport {
            width,
            height,
            pixel_ratio: container.device_pixel_ratio(),
        };

        let mut session = Self {
            container,
            config,
            scene,
            camera,
            camera_node,
            viewport,
            lights,
            controls,
            loader: AssetLoader::new(source),
            in_flight: None,
            locked: false,
            listeners: Vec::new(),
            resize_pending,
            resize_recheck_at: None,
            _resize_subscription: resize_subscription,
            render_loop: RenderLoop::start(),
        };

        session.handle_resize();
        log::info!(
            "Prepared scene for {}x{} container",
            session.viewport.width,
            session.viewport.height
        );

        session
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn add_listener(&mut self, listener: impl ViewerListener + 'static) {
        self.add_boxed_listener(Box::new(listener));
    }

    pub fn add_boxed_listener(&mut self, listener: Box<dyn ViewerListener>) {
        self.listeners.push(listener);
    }

    pub fn render_loop(&self) -> RenderLoopHandle {
        self.render_loop.handle()
    }

    /// Starts loading `mesh_url`, optionally with a material library from
    /// `material_url`. The callback and listeners are notified from
    /// [`Session::frame`] once the load settles.
    ///
    /// Returns `None` without side effects while another load is in flight.
    pub fn load_object(
        &mut self,
        mesh_url: impl Into<String>,
        material_url: Option<&str>,
        callback: Option<LoadCallback>,
    ) -> Option<LoadHandle> {
        let mesh_url = mesh_url.into();

        if self.locked {
            log::warn!("Rejected load of {}: another load is in flight", mesh_url);
            return None;
        }
        self.locked = true;

        let pending = self.loader.spawn(LoadRequest {
            mesh_url,
            material_url: material_url.map(String::from),
            fallback: Material::fallback(self.config.loader.fallback_color),
        });
        let handle = pending.handle.clone();

        self.in_flight = Some(InFlightLoad { pending, callback });
        Some(handle)
    }

    /// Removes every loaded asset group from the scene. Camera and lights stay.
    pub fn clear_scene(&mut self) {
        let assets: Vec<ObjectId> = self
            .scene
            .root_children()
            .into_iter()
            .filter(|&id| {
                self.scene
                    .get_object(id)
                    .is_some_and(|object| object.kind == NodeKind::Asset)
            })
            .collect();

        for &id in &assets {
            self.scene.remove_object(id);
        }

        log::info!("Cleared {} asset(s) from the scene", assets.len());
    }

    /// Pans the camera by a secondary-drag delta in logical pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.controls
            .pan(delta, self.viewport.height, &self.camera);
    }

    pub fn reset_camera(&mut self) {
        self.controls.reset(&mut self.camera);
        self.sync_camera_node();
    }

    /// Fullscreens the bound container. See [`host::go_fullscreen`].
    pub fn go_fullscreen(&mut self) -> bool {
        if !host::go_fullscreen(&self.container) {
            return false;
        }

        self.resize_pending.set(false);
        self.handle_resize();
        self.schedule_resize_recheck(Instant::now());
        true
    }

    /// Recomputes camera aspect and viewport from the window while
    /// fullscreen, from the container otherwise.
    pub fn handle_resize(&mut self) {
        let (width, height) = if self.container.is_fullscreen() {
            self.container.window_size()
        } else {
            self.container.size()
        };

        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }

        self.camera.set_viewport_size(width, height);
        self.viewport = Viewport {
            width,
            height,
            pixel_ratio: self.container.device_pixel_ratio(),
        };

        log::debug!(
            "Resized to {}x{} @{}x",
            width,
            height,
            self.viewport.pixel_ratio
        );
    }

    fn schedule_resize_recheck(&mut self, now: Instant) {
        self.resize_recheck_at = Some(now + self.config.loader.resize_recheck_delay);
    }

    fn poll_resize(&mut self, now: Instant) {
        if self.resize_pending.replace(false) {
            self.handle_resize();
            self.schedule_resize_recheck(now);
        }

        if self.resize_recheck_at.is_some_and(|at| now >= at) {
            self.resize_recheck_at = None;
            self.handle_resize();
        }
    }

    /// One render-loop tick: applies resizes, drains loader messages and
    /// advances the controls. Returns `false` once the loop was stopped,
    /// in which case nothing is updated and the host should stop rendering.
    pub fn frame(&mut self, now: Instant) -> bool {
        if !self.render_loop.is_running() {
            return false;
        }

        let dt = self.render_loop.tick(now);

        self.scene.early_update();
        self.poll_resize(now);
        self.poll_load();

        if self.controls.update(&mut self.camera, dt) {
            self.sync_camera_node();
        }

        self.scene.late_update();
        true
    }

    /// Blocks until the in-flight load settles and applies it. Meant for
    /// headless use and tests; interactive hosts rely on [`Session::frame`].
    pub fn finish_load_blocking(&mut self) {
        while let Some(in_flight) = self.in_flight.as_mut() {
            match in_flight.pending.next_blocking() {
                LoaderMessage::Progress(progress) => {
                    for listener in &mut self.listeners {
                        listener.on_loading(progress);
                    }
                }
                LoaderMessage::Finished(result) => self.complete_load(result),
            }
        }
        self.scene.update_transforms();
    }

    fn poll_load(&mut self) {
        while let Some(in_flight) = self.in_flight.as_mut() {
            match in_flight.pending.try_next() {
                Some(LoaderMessage::Progress(progress)) => {
                    for listener in &mut self.listeners {
                        listener.on_loading(progress);
                    }
                }
                Some(LoaderMessage::Finished(result)) => self.complete_load(result),
                None => return,
            }
        }
    }

    fn complete_load(&mut self, result: LoadResult<AssetGraph>) {
        let callback = self
            .in_flight
            .take()
            .and_then(|in_flight| in_flight.callback);
        self.locked = false;

        match result {
            Ok(graph) => {
                let name = graph.name.clone();
                let object = self.scene.spawn_asset(graph);
                self.fit_camera(object);
                log::info!("Loaded {}", name);

                if let Some(callback) = callback {
                    callback(Ok(object));
                }
                for listener in &mut self.listeners {
                    listener.on_loaded(object);
                }
            }
            Err(error) => {
                log::error!("Failed to load asset: {}", error);

                if let Some(callback) = callback {
                    callback(Err(&error));
                }
                for listener in &mut self.listeners {
                    listener.on_error(&error);
                }
            }
        }
    }

    fn fit_camera(&mut self, object: ObjectId) -> Option<CameraFit> {
        let fit = fit_camera_to_object(
            &mut self.scene,
            &mut self.camera,
            &mut self.controls,
            &self.lights,
            object,
        );
        self.sync_camera_node();
        fit
    }

    fn sync_camera_node(&mut self) {
        self.scene
            .set_object_translation(self.camera_node, self.camera.eye);
    }
}

impl<C: Container> Drop for Session<C> {
    fn drop(&mut self) {
        self.render_loop.stop();
        log::debug!("Session dropped, render loop stopped");
    }
}
