//! Brisk: typed endpoints over Axum.
//!
//! Each route declares one input type and one output type. The same
//! declarations drive decoding, validation, serialization and the generated
//! OpenAPI document.
//!
//! ```ignore
//! use brisk::prelude::*;
//!
//! #[derive(Deserialize, Describe, JsonSchema, Validate)]
//! struct GreetingQuery {
//!     #[garde(required, length(min = 1))]
//!     name: Option<String>,
//! }
//!
//! #[derive(Serialize, Describe, JsonSchema, Validate)]
//! struct Greeting {
//!     #[garde(skip)]
//!     message: String,
//! }
//!
//! let greet = endpoint::<GreetingQuery, Greeting>()
//!     .path("/greeting")
//!     .handle(|_ctx, q| async move {
//!         Ok(Greeting { message: format!("Hello, {}!", q.name.unwrap_or_default()) })
//!     });
//!
//! let mut app = App::new();
//! app.must_register("/", &greet, [])
//!     .with(OpenApiPlugin::new(OpenApiConfig::new("Greeter", "1.0.0")));
//! app.serve("0.0.0.0:3000").await?;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate           |
//! |-----------|---------|-----------------|
//! | `openapi` | **yes** | `brisk-openapi` |

// Generated code names `::brisk::...` when users depend on the facade, so
// every core item must be reachable from the crate root.
pub extern crate brisk_core;
pub extern crate brisk_macros;

pub use brisk_core::*;

#[cfg(feature = "openapi")]
pub use brisk_openapi;

pub mod prelude {
    pub use brisk_core::prelude::*;

    #[cfg(feature = "openapi")]
    pub use brisk_openapi::{OpenApiConfig, OpenApiPlugin};
}
