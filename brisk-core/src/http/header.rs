pub use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
pub use axum::http::request::Parts;
pub use axum::http::{HeaderMap, Method, StatusCode, Uri};
