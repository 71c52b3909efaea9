mod config;
pub mod document;
mod ext;
pub mod generator;
mod handlers;
pub mod schema;

pub use config::OpenApiConfig;
pub use document::{Info, OpenApiDocument, Operation, Parameter, ParameterLocation, Tag};
pub use ext::OpenApiPlugin;
pub use generator::OpenApiGenerator;
pub use handlers::{etag_for, etag_matches, openapi_routes};
pub use schema::{SchemaKind, SchemaMapper, SchemaNode};
