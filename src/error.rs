use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("block store is missing an article for id {0}")]
    MissingId(u32),

    #[error("corrupt block store: {0}")]
    Corrupt(String),

    #[error("cannot rank an empty graph")]
    EmptyGraph,

    #[error("ranks failed to converge within {0} iterations")]
    Divergence(usize),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> RankError {
        RankError::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
