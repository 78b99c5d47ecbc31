use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tandem_common::{ErrorBody, FriendRequestId, UserId};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("friend request {0} not found")]
    RequestNotFound(FriendRequestId),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("malformed record: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<StoreError>() {
            return match err {
                StoreError::UserNotFound(_) | StoreError::RequestNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
                StoreError::Storage(_) | StoreError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if self.0.downcast_ref::<AuthError>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("request failed: {:#}", self.0);
            String::from("Internal Server Error")
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
    where
        E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::UserNotFound(UserId::new()), StatusCode::NOT_FOUND),
            (StoreError::RequestNotFound(FriendRequestId::new()), StatusCode::NOT_FOUND),
            (StoreError::Forbidden("nope"), StatusCode::FORBIDDEN),
            (StoreError::Conflict("again"), StatusCode::CONFLICT),
            (StoreError::Invalid(String::from("blank")), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        assert_eq!(AppError::from(AuthError::MissingIdentity).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn anything_else_is_internal() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
