use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Failed to prepare image directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
