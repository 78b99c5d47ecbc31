//! Caller identity.
//!
//! Sessions are handled outside this service. The authentication layer in
//! front of it resolves the session and forwards the user id in the
//! [`CALLER_HEADER`] header; [`Caller`] turns that into a checked [`UserId`]
//! for every request that asks for one.
use anyhow::anyhow;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Extension;
use tandem_common::{UserId, CALLER_HEADER};
use thiserror::Error;

use crate::error::{AppError, StoreError};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized - no caller identity provided")]
    MissingIdentity,

    #[error("Unauthorized - malformed caller identity")]
    MalformedIdentity,

    #[error("Unauthorized - user not found")]
    UnknownUser,
}

/// The authenticated user making the request.
#[derive(Clone, Copy, Debug)]
pub struct Caller(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
    where
        S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or(AuthError::MissingIdentity)?;
        let id: UserId = header
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .ok_or(AuthError::MalformedIdentity)?;

        let Extension(store) = Extension::<Store>::from_request_parts(parts, state)
            .await
            .map_err(|err| anyhow!("store unavailable: {err}"))?;
        match store.user(&id) {
            Ok(_) => Ok(Caller(id)),
            Err(StoreError::UserNotFound(_)) => Err(AuthError::UnknownUser.into()),
            Err(err) => Err(err.into()),
        }
    }
}
