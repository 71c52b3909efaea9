//! Plugins are reusable bundles of app configuration installed with
//! [`App::with`](crate::App::with).
//!
//! A plugin typically adds a layer, merges extra routes, or registers a
//! meta consumer that reads the route table at build time (this is how the
//! OpenAPI document is fed).

use crate::app::App;

/// A composable unit of functionality installed into an [`App`].
///
/// # Example
///
/// ```ignore
/// use brisk_core::{App, Plugin};
/// use brisk_core::http::{Router, routing::get};
///
/// pub struct Health;
///
/// impl Plugin for Health {
///     fn install(self, app: &mut App) {
///         app.with_router(Router::new().route("/health", get(|| async { "OK" })));
///     }
/// }
/// ```
pub trait Plugin: Send + 'static {
    fn install(self, app: &mut App);

    /// The name of this plugin (for diagnostics).
    fn name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}
