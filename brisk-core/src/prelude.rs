//! Everything a typical app needs with a single `use`.
//!
//! ```ignore
//! use brisk_core::prelude::*;
//!
//! #[derive(Deserialize, Describe, JsonSchema, Validate)]
//! struct Greet {
//!     #[garde(required)]
//!     name: Option<String>,
//! }
//!
//! let route = endpoint::<Greet, Out>()
//!     .path("/greeting")
//!     .handle(|_ctx, input: Greet| async move { Ok(format!("Hello, {}!", input.name.unwrap_or_default())) });
//! ```

pub use crate::app::{App, Controller, Group};
pub use crate::context::Context;
pub use crate::endpoint::{endpoint, Endpoint, In, Out, Route};
pub use crate::error::{Error, HttpError, Result};
pub use crate::guards::{middleware, Guard, Middleware};
pub use crate::http::{Method, StatusCode};
pub use crate::plugin::Plugin;
pub use crate::shape::Describe;
pub use brisk_macros::Describe;

pub use garde::Validate;
pub use schemars::JsonSchema;
pub use serde::{Deserialize, Serialize};
