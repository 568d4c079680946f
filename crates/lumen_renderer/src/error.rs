//! Errors raised while rendering.

use thiserror::Error;

/// Errors that can occur while running a render.
///
/// None of these leave a partial image behind.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to spawn render worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Render worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
