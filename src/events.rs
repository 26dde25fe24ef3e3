use crate::error::LoadError;
use crate::scene_graph::ObjectId;

/// Byte progress of an in-flight load. A transport that cannot tell the
/// total size reports `{ loaded: 0, total: 100 }` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl LoadProgress {
    pub const INDETERMINATE: LoadProgress = LoadProgress {
        loaded: 0,
        total: 100,
    };

    pub fn new(loaded: u64, total: u64) -> Self {
        if total == 0 {
            Self::INDETERMINATE
        } else {
            Self { loaded, total }
        }
    }

    pub fn fraction(&self) -> f32 {
        (self.loaded as f64 / self.total as f64).clamp(0.0, 1.0) as f32
    }
}

/// Result handed to a load's completion callback.
pub type LoadOutcome<'a> = Result<ObjectId, &'a LoadError>;

pub type LoadCallback = Box<dyn FnOnce(LoadOutcome<'_>)>;

/// Boxes a closure as a [`LoadCallback`], pinning down its higher-ranked signature.
pub fn callback(f: impl FnOnce(LoadOutcome<'_>) + 'static) -> LoadCallback {
    Box::new(f)
}

/// Observer for a session's load lifecycle. For each load, zero or more
/// `on_loading` calls precede exactly one `on_loaded` or `on_error`.
pub trait ViewerListener {
    fn on_loading(&mut self, _progress: LoadProgress) {}

    fn on_loaded(&mut self, _object: ObjectId) {}

    fn on_error(&mut self, _error: &LoadError) {}
}

/// Logs the lifecycle; the binary installs one of these.
pub struct LogListener;

impl ViewerListener for LogListener {
    fn on_loading(&mut self, progress: LoadProgress) {
        log::debug!(
            "Loading: {}/{} bytes ({:.0}%)",
            progress.loaded,
            progress.total,
            progress.fraction() * 100.0
        );
    }

    fn on_loaded(&mut self, object: ObjectId) {
        log::info!("Loaded object {}", object.index());
    }

    fn on_error(&mut self, error: &LoadError) {
        log::error!("Load failed: {}", error);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_total_becomes_placeholder() {
        assert_eq!(LoadProgress::new(4096, 0), LoadProgress::INDETERMINATE);
        assert_eq!(LoadProgress::new(10, 40).fraction(), 0.25);
    }
}
