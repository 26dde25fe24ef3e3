use thiserror::Error;

/// Errors reported for a failed asset load.
///
/// These never escape the session as panics or `Err` returns: they are
/// delivered to the load callback and to [`crate::events::ViewerListener::on_error`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("failed to parse glTF {url}: {source}")]
    Gltf {
        url: String,
        #[source]
        source: gltf::Error,
    },

    #[error("failed to parse material library {url}: {source}")]
    MaterialLibrary {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported primitive mode {mode:?} in mesh {mesh}")]
    UnsupportedPrimitive { mesh: String, mode: gltf::mesh::Mode },

    #[error("primitive {index} of mesh {mesh} has no positions")]
    MissingPositions { mesh: String, index: usize },

    #[error("asset {0} contains no scenes")]
    EmptyAsset(String),

    #[error("loader worker stopped before finishing")]
    Interrupted,
}

pub type LoadResult<T> = Result<T, LoadError>;
