use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::asset_pipeline::{import_gltf, AssetGraph, AssetSource, MaterialLibrary};
use crate::error::{LoadError, LoadResult};
use crate::events::LoadProgress;
use crate::scene_graph::Material;

pub(crate) enum LoaderMessage {
    Progress(LoadProgress),
    Finished(LoadResult<AssetGraph>),
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub mesh_url: String,
    pub material_url: Option<String>,
    pub fallback: Material,
}

/// Identifies an accepted load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadHandle {
    pub id: u64,
    pub mesh_url: String,
}

/// Fetches and parses assets off the session thread. Each request runs on
/// its own worker thread and reports back through a channel.
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    next_id: u64,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source, next_id: 0 }
    }

    pub(crate) fn spawn(&mut self, request: LoadRequest) -> PendingLoad {
        let id = self.next_id;
        self.next_id += 1;

        let handle = LoadHandle {
            id,
            mesh_url: request.mesh_url.clone(),
        };

        let (sender, receiver) = mpsc::channel();
        let source = self.source.clone();

        // A failed spawn drops the sender, which the session reports as Interrupted.
        let thread = std::thread::Builder::new()
            .name(format!("asset-loader-{}", id))
            .spawn(move || {
                let result = run_load(source.as_ref(), &request, &sender);
                let _ = sender.send(LoaderMessage::Finished(result));
            })
            .map_err(|e| log::error!("Failed to spawn asset loader thread: {}", e))
            .ok();

        PendingLoad {
            handle,
            receiver,
            thread,
        }
    }
}

fn run_load(
    source: &dyn AssetSource,
    request: &LoadRequest,
    sender: &Sender<LoaderMessage>,
) -> LoadResult<AssetGraph> {
    let mut report = |loaded, total| {
        let _ = sender.send(LoaderMessage::Progress(LoadProgress::new(loaded, total)));
    };

    let library = match &request.material_url {
        Some(url) => {
            log::info!("Loading material library {}", url);
            let bytes = source.fetch(url, &mut report)?;
            Some(MaterialLibrary::from_slice(url, &bytes)?)
        }
        None => None,
    };

    log::info!("Loading mesh {}", request.mesh_url);
    let bytes = source.fetch(&request.mesh_url, &mut report)?;
    let base = source.base_dir(&request.mesh_url);

    import_gltf(
        &request.mesh_url,
        &bytes,
        base.as_deref(),
        library.as_ref(),
        &request.fallback,
    )
}

pub(crate) struct PendingLoad {
    pub handle: LoadHandle,
    receiver: Receiver<LoaderMessage>,
    thread: Option<JoinHandle<()>>,
}

impl PendingLoad {
    /// Next message if one is ready. A worker that hung up without a
    /// terminal message yields `Finished(Err(Interrupted))`.
    pub fn try_next(&mut self) -> Option<LoaderMessage> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(LoaderMessage::Finished(Err(LoadError::Interrupted)))
            }
        }
    }

    /// Blocks until the next message.
    pub fn next_blocking(&mut self) -> LoaderMessage {
        self.receiver
            .recv()
            .unwrap_or(LoaderMessage::Finished(Err(LoadError::Interrupted)))
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                let _ = thread.join();
            }
        }
    }
}
