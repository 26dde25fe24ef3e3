use std::cell::Cell;
use std::rc::Rc;

use web_time::Instant;

/// Longest frame step fed to the controls, so a stall does not spin the camera.
const MAX_FRAME_DELTA: f32 = 0.1;

/// Cloneable stop switch for a session's render loop.
#[derive(Debug, Clone)]
pub struct RenderLoopHandle {
    running: Rc<Cell<bool>>,
}

impl RenderLoopHandle {
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

/// Per-frame task state: the running flag is checked every frame.
#[derive(Debug)]
pub struct RenderLoop {
    running: Rc<Cell<bool>>,
    last_frame: Option<Instant>,
}

impl RenderLoop {
    pub fn start() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
            last_frame: None,
        }
    }

    pub fn handle(&self) -> RenderLoopHandle {
        RenderLoopHandle {
            running: self.running.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Seconds since the previous tick, zero on the first one.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        dt.min(MAX_FRAME_DELTA)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn handle_stops_loop() {
        let render_loop = RenderLoop::start();
        let handle = render_loop.handle();
        assert!(render_loop.is_running());

        handle.stop();
        assert!(!render_loop.is_running());
        assert!(!handle.is_running());
    }

    #[test]
    fn tick_measures_and_clamps_frame_time() {
        let mut render_loop = RenderLoop::start();
        let start = Instant::now();

        assert_eq!(render_loop.tick(start), 0.0);
        let dt = render_loop.tick(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(render_loop.tick(start + Duration::from_secs(5)), MAX_FRAME_DELTA);
    }
}
