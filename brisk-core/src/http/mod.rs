//! HTTP types re-exported from Axum.
//!
//! Everything the pipeline and the registry need from the HTTP engine goes
//! through this module, so downstream crates never name `axum` directly.

pub mod header;

pub mod routing {
    pub use axum::routing::{get, on, post, MethodFilter, MethodRouter, Route};
}

pub use axum::body::{to_bytes, Body, Bytes};
pub use axum::extract::{FromRequestParts, RawPathParams, Request};
pub use axum::response::{Html, IntoResponse, Response};
pub use axum::routing::{on, MethodFilter, MethodRouter};
pub use axum::{serve, Json, Router};

pub use self::header::{
    HeaderMap, HeaderName, HeaderValue, Method, Parts, StatusCode, Uri,
    // Common header constants
    CONTENT_TYPE, ETAG, IF_NONE_MATCH,
};
