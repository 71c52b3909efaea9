use crate::generator::OpenApiGenerator;
use crate::{openapi_routes, OpenApiConfig};
use brisk_core::http::Method;
use brisk_core::{App, Plugin, RegistrationError};
use std::sync::Arc;

/// Plugin that documents every registered route and serves the result.
///
/// # Example
///
/// ```ignore
/// use brisk_openapi::{OpenApiConfig, OpenApiPlugin};
///
/// let mut app = App::new();
/// app.must_register("/api", &PetController, [])
///     .with(OpenApiPlugin::new(OpenApiConfig::new("Pet Store", "1.0.0")));
/// ```
pub struct OpenApiPlugin {
    config: OpenApiConfig,
}

impl OpenApiPlugin {
    pub fn new(config: OpenApiConfig) -> Self {
        Self { config }
    }

    /// Install into `app`, reserving the document and UI routes.
    ///
    /// Fails when one of them is already registered; app routes registered
    /// later on those paths are rejected the same way.
    pub fn try_install(self, app: &mut App) -> Result<(), RegistrationError> {
        let config = self.config;
        let mut paths = vec![config.json_path.as_str()];
        if config.docs_ui {
            paths.push(config.ui_path.as_str());
        }
        // Check first so a clash leaves nothing reserved.
        if let Some(taken) = paths.iter().find(|p| app.has_route(&Method::GET, p)) {
            return Err(RegistrationError::DuplicateRoute {
                method: Method::GET,
                path: brisk_core::join_paths([*taken]),
            });
        }
        for path in paths {
            app.try_reserve_route(Method::GET, path)?;
        }

        app.with_meta_consumer(move |routes| {
            let mut generator = OpenApiGenerator::new(config.info());
            for registered in routes {
                generator.register(&registered.path, &registered.route);
            }
            tracing::info!(
                routes = generator.len(),
                json = %config.json_path,
                ui = config.docs_ui,
                "OpenAPI documentation enabled"
            );
            openapi_routes(&config, Arc::new(generator))
        });
        Ok(())
    }
}

impl Plugin for OpenApiPlugin {
    /// # Panics
    ///
    /// If a documentation route clashes with a registered route; use
    /// [`try_install`](OpenApiPlugin::try_install) to handle that instead.
    fn install(self, app: &mut App) {
        if let Err(err) = self.try_install(app) {
            panic!("failed to install OpenAPI routes: {err}");
        }
    }
}
