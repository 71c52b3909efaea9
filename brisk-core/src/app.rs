//! Route registry.
//!
//! [`App`] collects routes from [`Controller`]s under composed paths and
//! middleware chains, then binds them to an Axum [`Router`] in
//! [`App::build`]. [`Group`] scopes a path prefix and guards over several
//! registrations; groups nest.

use crate::config::ServerSettings;
use crate::endpoint::Route;
use crate::guards::Middleware;
use crate::http::routing::{MethodFilter, MethodRouter, Route as RouterRoute};
use crate::http::{IntoResponse, Method, Request, Router};
use crate::pipeline::{Pipeline, DEFAULT_BODY_LIMIT};
use crate::plugin::Plugin;
use crate::validation::{GardeValidator, Validator};
use std::collections::{BTreeMap, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A value exposing a set of routes.
pub trait Controller {
    fn routes(&self) -> Vec<Route>;
}

impl Controller for Vec<Route> {
    fn routes(&self) -> Vec<Route> {
        self.clone()
    }
}

impl Controller for Route {
    fn routes(&self) -> Vec<Route> {
        vec![self.clone()]
    }
}

/// A route as bound by the registry: full path and complete guard chain.
#[derive(Clone)]
pub struct RegisteredRoute {
    pub path: String,
    pub route: Route,
    /// Group guards (outer to inner), then registration guards, then the
    /// route's own.
    pub middlewares: Vec<Middleware>,
    filter: MethodFilter,
}

impl RegisteredRoute {
    pub fn method(&self) -> &Method {
        self.route.method()
    }
}

impl fmt::Debug for RegisteredRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRoute")
            .field("method", self.method())
            .field("path", &self.path)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Why a route could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Query and body decoding need named fields; the input is something else.
    NotARecord {
        method: Method,
        path: String,
        found: &'static str,
    },
    /// A path segment uses `:name`/`*name`, has unbalanced braces or contains whitespace.
    InvalidPath { path: String, segment: String },
    DuplicateRoute { method: Method, path: String },
    /// The HTTP engine cannot route this method.
    UnsupportedMethod { method: Method, path: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::NotARecord {
                method,
                path,
                found,
            } => write!(
                f,
                "route {method} {path}: input type must be a struct with named fields, found {found}"
            ),
            RegistrationError::InvalidPath { path, segment } => write!(
                f,
                "route path {path}: invalid segment `{segment}` (use `{{name}}` for parameters)"
            ),
            RegistrationError::DuplicateRoute { method, path } => {
                write!(f, "route {method} {path} is already registered")
            }
            RegistrationError::UnsupportedMethod { method, path } => {
                write!(f, "route {method} {path}: method is not supported")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Join path pieces: split on `/`, drop empty segments, root at `/`.
pub fn join_paths<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let segments: Vec<&str> = parts
        .into_iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

fn check_path(path: &str) -> Result<(), RegistrationError> {
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let braced = segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2;
        let stray_brace = !braced && (segment.contains('{') || segment.contains('}'));
        let bad = segment.starts_with(':')
            || segment.starts_with('*')
            || segment.chars().any(char::is_whitespace)
            || stray_brace;
        if bad {
            return Err(RegistrationError::InvalidPath {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

type MetaConsumer = Box<dyn FnOnce(&[RegisteredRoute]) -> Router + Send>;
type LayerFn = Box<dyn FnOnce(Router) -> Router + Send>;

/// The application: route table, validation engine and router assembly.
pub struct App {
    base: Router,
    routes: Vec<RegisteredRoute>,
    seen: HashSet<(Method, String)>,
    validator: Arc<dyn Validator>,
    body_limit: usize,
    meta_consumers: Vec<MetaConsumer>,
    layers: Vec<LayerFn>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.routes)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            base: Router::new(),
            routes: Vec::new(),
            seen: HashSet::new(),
            validator: Arc::new(GardeValidator),
            body_limit: DEFAULT_BODY_LIMIT,
            meta_consumers: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Register every route of `controller` under `prefix`.
    ///
    /// Either all routes are registered or none are.
    pub fn try_register<C: Controller + ?Sized>(
        &mut self,
        prefix: &str,
        controller: &C,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_scoped("/", &[], prefix, controller, middlewares)?;
        Ok(self)
    }

    /// Like [`try_register`](Self::try_register), panicking on a registration fault.
    ///
    /// # Panics
    ///
    /// If any route fails to register. Registration happens at startup, where
    /// a broken route table is fatal.
    pub fn must_register<C: Controller + ?Sized>(
        &mut self,
        prefix: &str,
        controller: &C,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> &mut Self {
        if let Err(err) = self.try_register(prefix, controller, middlewares) {
            panic!("failed to register routes: {err}");
        }
        self
    }

    /// Open a group: a path prefix and guards shared by its registrations.
    pub fn group(
        &mut self,
        prefix: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Group<'_> {
        Group {
            app: self,
            prefix: join_paths([prefix]),
            middlewares: middlewares.into_iter().collect(),
        }
    }

    fn register_scoped<C: Controller + ?Sized>(
        &mut self,
        scope: &str,
        outer: &[Middleware],
        prefix: &str,
        controller: &C,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Result<(), RegistrationError> {
        let call: Vec<Middleware> = middlewares.into_iter().collect();
        let mut batch = Vec::new();
        let mut batch_keys = HashSet::new();

        for route in controller.routes() {
            let path = join_paths([scope, prefix, route.path()]);
            let method = route.method().clone();

            check_path(&path)?;

            let input = route.input_shape();
            if !input.is_record() {
                return Err(RegistrationError::NotARecord {
                    method,
                    path,
                    found: input.kind(),
                });
            }

            let filter = MethodFilter::try_from(method.clone()).map_err(|_| {
                RegistrationError::UnsupportedMethod {
                    method: method.clone(),
                    path: path.clone(),
                }
            })?;

            let key = (method.clone(), path.clone());
            if self.seen.contains(&key) || !batch_keys.insert(key) {
                return Err(RegistrationError::DuplicateRoute { method, path });
            }

            let chain: Vec<Middleware> = outer
                .iter()
                .chain(call.iter())
                .chain(route.middlewares().iter())
                .cloned()
                .collect();

            batch.push(RegisteredRoute {
                path,
                route,
                middlewares: chain,
                filter,
            });
        }

        for registered in batch {
            info!(
                method = %registered.method(),
                path = %registered.path,
                middlewares = registered.middlewares.len(),
                "Registered route"
            );
            self.seen
                .insert((registered.method().clone(), registered.path.clone()));
            self.routes.push(registered);
        }
        Ok(())
    }

    /// Claim `method path` for a route served outside the route table, such
    /// as a plugin's documentation endpoint.
    ///
    /// Fails with [`RegistrationError::DuplicateRoute`] when the route is
    /// already registered or reserved; registering it afterwards fails the
    /// same way.
    pub fn try_reserve_route(
        &mut self,
        method: Method,
        path: &str,
    ) -> Result<&mut Self, RegistrationError> {
        let path = join_paths([path]);
        if !self.seen.insert((method.clone(), path.clone())) {
            return Err(RegistrationError::DuplicateRoute { method, path });
        }
        debug!(%method, %path, "Reserved route");
        Ok(self)
    }

    /// Whether `method path` is registered or reserved.
    pub fn has_route(&self, method: &Method, path: &str) -> bool {
        self.seen.contains(&(method.clone(), join_paths([path])))
    }

    /// Every route registered so far, in registration order.
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    /// Install a [`Plugin`].
    pub fn with<P: Plugin>(&mut self, plugin: P) -> &mut Self {
        debug!(plugin = P::name(), "Installing plugin");
        plugin.install(self);
        self
    }

    /// Register a consumer of the final route table.
    ///
    /// Called once during [`build`](Self::build) with every registered route;
    /// the returned router is merged into the app.
    pub fn with_meta_consumer<F>(&mut self, consumer: F) -> &mut Self
    where
        F: FnOnce(&[RegisteredRoute]) -> Router + Send + 'static,
    {
        self.meta_consumers.push(Box::new(consumer));
        self
    }

    /// Replace the validation engine used by every route.
    pub fn with_validator(&mut self, validator: impl Validator) -> &mut Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Maximum accepted request body size in bytes.
    pub fn with_body_limit(&mut self, bytes: usize) -> &mut Self {
        self.body_limit = bytes;
        self
    }

    /// Apply server settings loaded from configuration.
    pub fn with_settings(&mut self, settings: &ServerSettings) -> &mut Self {
        self.with_body_limit(settings.body_limit)
    }

    /// Wrap the whole app in a tower layer (CORS, tracing, panic catching...).
    ///
    /// Layers are applied in the order added, so the last one is outermost.
    pub fn with_layer<L>(&mut self, layer: L) -> &mut Self
    where
        L: tower::Layer<RouterRoute> + Clone + Send + Sync + 'static,
        L::Service: tower::Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as tower::Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as tower::Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as tower::Service<Request>>::Future: Send + 'static,
    {
        self.layers.push(Box::new(move |router| router.layer(layer)));
        self
    }

    /// Apply an arbitrary router transformation at build time.
    pub fn with_layer_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Router) -> Router + Send + 'static,
    {
        self.layers.push(Box::new(f));
        self
    }

    /// Merge a pre-configured router; registered routes are added to it.
    ///
    /// # Panics
    ///
    /// [`build`](Self::build) panics when a registered route repeats a
    /// method and path of `router`: merged routers are opaque, so the clash
    /// cannot be caught at registration. Plugins that serve their own routes
    /// should [reserve](Self::try_reserve_route) them instead.
    pub fn with_router(&mut self, router: Router) -> &mut Self {
        let base = std::mem::take(&mut self.base);
        self.base = base.merge(router);
        self
    }

    /// Bind every registered route and return the finished router.
    pub fn build(self) -> Router {
        let App {
            base,
            routes,
            validator,
            body_limit,
            meta_consumers,
            layers,
            ..
        } = self;

        let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();
        for registered in &routes {
            let pipeline = Arc::new(Pipeline::new(
                registered.route.clone(),
                registered.middlewares.clone(),
                validator.clone(),
                body_limit,
            ));
            let handler = move |req: Request| {
                let pipeline = pipeline.clone();
                async move { pipeline.run(req).await }
            };

            let method_router = by_path
                .remove(&registered.path)
                .unwrap_or_else(MethodRouter::new);
            by_path.insert(
                registered.path.clone(),
                method_router.on(registered.filter, handler),
            );
        }

        let mut router = base;
        for (path, method_router) in by_path {
            router = router.route(&path, method_router);
        }

        for consumer in meta_consumers {
            router = router.merge(consumer(&routes));
        }

        for layer in layers {
            router = layer(router);
        }

        router
    }

    /// Build the app and serve it on `addr` until Ctrl-C or SIGTERM.
    pub async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        for registered in &self.routes {
            info!(method = %registered.method(), path = %registered.path, "Route");
        }

        let router = self.build();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Brisk server listening");

        crate::http::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Brisk server stopped");
        Ok(())
    }
}

/// A scoped view of an [`App`]: registrations inherit its prefix and guards.
pub struct Group<'a> {
    app: &'a mut App,
    prefix: String,
    middlewares: Vec<Middleware>,
}

impl Group<'_> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn try_register<C: Controller + ?Sized>(
        &mut self,
        prefix: &str,
        controller: &C,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RegistrationError> {
        self.app.register_scoped(
            &self.prefix,
            &self.middlewares,
            prefix,
            controller,
            middlewares,
        )?;
        Ok(self)
    }

    /// # Panics
    ///
    /// If any route fails to register.
    pub fn must_register<C: Controller + ?Sized>(
        &mut self,
        prefix: &str,
        controller: &C,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> &mut Self {
        if let Err(err) = self.try_register(prefix, controller, middlewares) {
            panic!("failed to register routes: {err}");
        }
        self
    }

    /// Nest a group: prefixes join, guard chains concatenate (outer first).
    pub fn group(
        &mut self,
        prefix: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Group<'_> {
        let mut chain = self.middlewares.clone();
        chain.extend(middlewares);
        Group {
            prefix: join_paths([self.prefix.as_str(), prefix]),
            middlewares: chain,
            app: &mut *self.app,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
