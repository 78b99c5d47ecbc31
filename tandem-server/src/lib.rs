//! Friend request service for a language exchange app.
//!
//! Users send, accept, decline and cancel friend requests and list their
//! friends, requests and recommended partners. Records live in an embedded
//! [`sled`] database ([`store::Store`]); the HTTP surface is an [`axum`]
//! router ([`app`]) that trusts an upstream authentication layer to forward
//! the caller's id (see [`auth`]).
use std::time::Duration;

use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::Method;
use axum::{Extension, Router};
use tandem_common::CALLER_HEADER;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod friend_requests;
pub mod routes;
pub mod store;
pub mod users;

pub use error::{AppError, StoreError};
pub use store::Store;

pub fn app(store: Store) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(CALLER_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(store))
}
