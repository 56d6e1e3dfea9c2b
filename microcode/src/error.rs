use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::writer::Half;

#[derive(Debug, Error)]
pub(crate) enum ImageError {
    #[error("File error creating '{}': {}", .path.display(), .source)]
    Create { path: PathBuf, source: io::Error },

    #[error("Write error to file '{}': {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },

    #[error("Write error on {half} byte image: {source}")]
    Stream { half: Half, source: io::Error },

    #[error("Image incomplete: {written} of {expected} words written")]
    Incomplete { written: usize, expected: usize },
}

impl ImageError {
    pub(crate) fn stream(half: Half) -> impl FnOnce(io::Error) -> Self {
        move |source| ImageError::Stream { half, source }
    }

    /// Attaches the file name to a stream error
    pub(crate) fn with_paths(self, low: &Path, high: &Path) -> Self {
        match self {
            ImageError::Stream { half, source } => ImageError::Write {
                path: match half {
                    Half::Low => low.to_path_buf(),
                    Half::High => high.to_path_buf(),
                },
                source,
            },
            other => other,
        }
    }
}
