use thiserror::Error;

use crate::domain::PostId;
use crate::http::{ApiError, ErrorKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("comment text is empty")]
    EmptyComment,

    #[error("invalid post: {}", .0.join(", "))]
    InvalidPost(Vec<&'static str>),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("session storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// Failures that never reached the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn | Self::EmptyComment | Self::InvalidPost(_)
        )
    }

    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(err) => Some(err.kind()),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
