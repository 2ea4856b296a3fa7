use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("paste has expired")]
    Expired,
    #[error("password required")]
    PasswordRequired,
    #[error("incorrect password")]
    WrongPassword,
    #[error("paste is not burn-after-reading")]
    NotBurnable,
    #[error("invalid paste: {0}")]
    Validation(String),
    #[error("missing delete key")]
    MissingDeleteKey,
    #[error("wrong delete key")]
    WrongDeleteKey,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
    #[error("database error")]
    Database { source: sqlx::Error },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Expired => StatusCode::GONE,
            ApiError::PasswordRequired => StatusCode::UNAUTHORIZED,
            ApiError::WrongPassword => StatusCode::FORBIDDEN,
            ApiError::NotBurnable => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingDeleteKey => StatusCode::BAD_REQUEST,
            ApiError::WrongDeleteKey => StatusCode::FORBIDDEN,
            ApiError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CorruptRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(error = ?self, "request failed");
        }

        (status_code, format!("{self}")).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Database { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_have_distinct_statuses() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Expired.status_code(), StatusCode::GONE);
        assert_eq!(
            ApiError::PasswordRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::WrongPassword.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            ApiError::from(sqlx::Error::RowNotFound),
            ApiError::NotFound
        ));
    }

    #[test]
    fn validation_message_is_displayed() {
        let err = ApiError::Validation("content must not be empty".into());
        assert_eq!(err.to_string(), "invalid paste: content must not be empty");
    }
}
