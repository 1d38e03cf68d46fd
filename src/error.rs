use std::path::PathBuf;
use thiserror::Error;

/// The main error type for raspberryset operations.
#[derive(Debug, Error)]
pub enum RaspberrySetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Failed to extract archive {path}: {source}")]
    ArchiveExtract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read class catalog {path}: {source}")]
    ClassCatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid class catalog {path}: {message}")]
    ClassCatalogInvalid { path: PathBuf, message: String },

    #[error("Failed while scanning dataset directory {path}: {message}")]
    DatasetScan { path: PathBuf, message: String },

    #[error("Failed to read label file {path}: {source}")]
    LabelFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Sample index {index} is out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
