pub mod app;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod guards;
pub mod http;
pub mod layers;
pub mod pipeline;
pub mod plugin;
pub mod prelude;
pub mod shape;
pub mod validation;

pub use app::{join_paths, App, Controller, Group, RegisteredRoute, RegistrationError};
pub use config::{BriskConfig, ConfigError, ConfigValue, FromConfigValue, ServerSettings};
pub use context::Context;
pub use endpoint::{endpoint, Endpoint, Handler, In, Out, Route};
pub use error::{Error, HttpError, Result};
pub use guards::{middleware, Guard, Middleware};
pub use layers::{catch_panic_layer, default_cors, default_trace, init_tracing};
pub use pipeline::{Pipeline, DEFAULT_BODY_LIMIT};
pub use plugin::Plugin;
pub use shape::{Contract, Describe, EnumShape, FieldShape, RecordShape, TypeShape};
pub use validation::{
    FieldError, GardeValidator, Validatable, ValidationErrorResponse, ValidationFailure, Validator,
};

/// `#[derive(Describe)]`: shares its name with the trait, like serde's derives.
pub use brisk_macros::Describe;

pub use garde;
pub use schemars;

#[doc(hidden)]
pub mod __private {
    pub use garde;
pub use schemars;
}
