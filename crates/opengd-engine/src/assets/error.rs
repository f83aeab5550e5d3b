use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("image {path} has no pixels")]
    EmptyImage { path: PathBuf },
    #[error("failed to decode audio {path}: {message}")]
    Audio { path: PathBuf, message: String },
    #[error("failed to import model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}
