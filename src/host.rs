//! The host a session is embedded in: a container surface with a size,
//! an optional fullscreen API and a source of resize notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The two fullscreen entry points a host may offer, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenApi {
    Standard,
    /// Vendor-prefixed fallback.
    Prefixed,
}

impl FullscreenApi {
    pub const PREFERENCE: [FullscreenApi; 2] = [FullscreenApi::Standard, FullscreenApi::Prefixed];
}

pub trait Container {
    /// Logical size of the container element.
    fn size(&self) -> (u32, u32);

    /// Logical size of the whole window, used while fullscreen.
    fn window_size(&self) -> (u32, u32);

    fn device_pixel_ratio(&self) -> f64;

    fn is_fullscreen(&self) -> bool;

    fn supports_fullscreen(&self, api: FullscreenApi) -> bool;

    /// Only called with an API for which [`Container::supports_fullscreen`] returned true.
    fn request_fullscreen(&self, api: FullscreenApi);

    fn resize_hub(&self) -> &ResizeHub;
}

/// Requests fullscreen on `container` through the first API it supports and
/// then dispatches a synthetic resize so sessions recompute their aspect.
///
/// Returns `false`, touching nothing, when no fullscreen API is available.
pub fn go_fullscreen(container: &dyn Container) -> bool {
    let Some(api) = FullscreenApi::PREFERENCE
        .into_iter()
        .find(|&api| container.supports_fullscreen(api))
    else {
        log::warn!("No fullscreen API available");
        return false;
    };

    log::debug!("Requesting fullscreen via {:?} API", api);
    container.request_fullscreen(api);
    container.resize_hub().dispatch();
    true
}

/// Target size of the renderer in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64) * self.pixel_ratio).round().max(1.0) as u32;
        (scale(self.width), scale(self.height))
    }
}

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    dispatching: bool,
    /// Unsubscribed while their listener list was taken out for dispatch.
    removed: Vec<u64>,
}

/// Window-level resize notifications. Each subscriber holds a
/// [`ResizeSubscription`] and is unsubscribed when it is dropped.
#[derive(Default, Clone)]
pub struct ResizeHub {
    inner: Rc<RefCell<HubInner>>,
}

impl ResizeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> ResizeSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));

        ResizeSubscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Notifies every subscriber. Listeners may subscribe or drop
    /// subscriptions (their own included) from inside the callback; new
    /// subscribers are first notified on the next dispatch. Nested
    /// dispatches are ignored.
    pub fn dispatch(&self) {
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
            std::mem::take(&mut inner.listeners)
        };

        for (id, listener) in listeners.iter_mut() {
            if self.inner.borrow().removed.contains(id) {
                continue;
            }
            listener();
        }

        let mut inner = self.inner.borrow_mut();
        let removed = std::mem::take(&mut inner.removed);
        listeners.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::replace(&mut inner.listeners, listeners);
        inner.listeners.extend(added);
        inner.dispatching = false;
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct ResizeSubscription {
    hub: Weak<RefCell<HubInner>>,
    id: u64,
}

impl ResizeSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            let mut inner = hub.borrow_mut();
            inner.listeners.retain(|(id, _)| *id != self.id);
            if inner.dispatching {
                inner.removed.push(self.id);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// In-memory container with switchable fullscreen support.
    pub struct TestContainer {
        pub size: Cell<(u32, u32)>,
        pub window_size: Cell<(u32, u32)>,
        pub pixel_ratio: f64,
        pub fullscreen: Cell<bool>,
        pub apis: Vec<FullscreenApi>,
        pub requests: RefCell<Vec<FullscreenApi>>,
        pub hub: ResizeHub,
    }

    impl TestContainer {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                size: Cell::new((width, height)),
                window_size: Cell::new((width * 2, height * 2)),
                pixel_ratio: 1.0,
                fullscreen: Cell::new(false),
                apis: FullscreenApi::PREFERENCE.to_vec(),
                requests: RefCell::new(Vec::new()),
                hub: ResizeHub::new(),
            }
        }

        pub fn without_fullscreen(mut self) -> Self {
            self.apis.clear();
            self
        }
    }

    impl Container for TestContainer {
        fn size(&self) -> (u32, u32) {
            self.size.get()
        }

        fn window_size(&self) -> (u32, u32) {
            self.window_size.get()
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.pixel_ratio
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen.get()
        }

        fn supports_fullscreen(&self, api: FullscreenApi) -> bool {
            self.apis.contains(&api)
        }

        fn request_fullscreen(&self, api: FullscreenApi) {
            self.requests.borrow_mut().push(api);
            self.fullscreen.set(true);
        }

        fn resize_hub(&self) -> &ResizeHub {
            &self.hub
        }
    }
}
