use crate::lbrn::XmlError;
use crate::raster::RenderFailure;
use crate::thumbnail::ThumbnailError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
    /// Parse failure of in-memory XML that has no file path
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("{}: no recognizable shapes and no thumbnail found", .path.display())]
    NoContent { path: PathBuf },
    #[error("no working rasterizer: {}", summarize(.failures))]
    RenderUnavailable { failures: Vec<RenderFailure> },
    #[error("{}: cannot decode thumbnail: {source}", .path.display())]
    ThumbnailDecode {
        path: PathBuf,
        #[source]
        source: ThumbnailError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn summarize(failures: &[RenderFailure]) -> String {
    if failures.is_empty() {
        return "no renderer configured".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Process exit code for the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Parse { .. } | Error::Xml(_) | Error::Io { .. } => 1,
            Error::RenderUnavailable { .. } => 2,
            Error::NoContent { .. } => 3,
            Error::ThumbnailDecode { .. } => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
