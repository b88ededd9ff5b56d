use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use medley_core::CollectionError;
use medley_library::{AuthError, PlaylistError, SearchError, StorageError, UploadError};

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    /// The mutation went through in memory but could not be made durable
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::UnknownSession => Self::InvalidCredentials,
            AuthError::Storage(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            StorageError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            StorageError::WriteFailed(message) => Self::SaveFailed(message),
        }
    }
}

impl From<PlaylistError> for ServerError {
    fn from(value: PlaylistError) -> Self {
        match value {
            PlaylistError::Collection(CollectionError::EmptyName) => {
                Self::Validation(CollectionError::EmptyName.to_string())
            }
            PlaylistError::Collection(CollectionError::DuplicateName(name)) => Self::Conflict {
                resource: "playlist",
                field: "name",
                value: name,
            },
            PlaylistError::Storage(e) => e.into(),
        }
    }
}

impl From<SearchError> for ServerError {
    fn from(value: SearchError) -> Self {
        match value {
            SearchError::EmptyQuery | SearchError::MissingApiKey | SearchError::Invalid(_) => {
                Self::Validation(value.to_string())
            }
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<UploadError> for ServerError {
    fn from(value: UploadError) -> Self {
        match value {
            UploadError::Empty => Self::Validation(value.to_string()),
            UploadError::WriteFailed(message) => Self::SaveFailed(message),
        }
    }
}
