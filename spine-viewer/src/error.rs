use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read import candidate '{name}': {source}")]
    CandidateRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing file in storage: {name}")]
    MissingFile { name: String },

    #[error(transparent)]
    Spine(#[from] spine2d::Error),

    #[error("failed to decode image '{name}': {source}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("skeleton file '{name}' is not valid UTF-8 JSON text")]
    NotUtf8 { name: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
