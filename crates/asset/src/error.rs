use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShaderStage;

/// Everything an asset loader can fail with.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{label}: {message}")]
    Format { label: String, message: String },

    #[error("failed to decode image {label}: {source}")]
    Image {
        label: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{stage:?} shader '{label}' failed to compile:\n{log}")]
    Compile {
        stage: ShaderStage,
        label: String,
        log: String,
    },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            label: label.into(),
            message: message.into(),
        }
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
