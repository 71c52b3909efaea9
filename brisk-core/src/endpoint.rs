//! Typed route contracts.
//!
//! An [`Endpoint<I, O>`] fixes the input and output types of a route at
//! compile time. Calling [`Endpoint::handle`] consumes the builder and
//! returns a [`Route`]: an immutable, type-erased descriptor that the
//! registry binds to the router and the schema generator introspects.

use crate::context::Context;
use crate::error::Result;
use crate::guards::Middleware;
use crate::http::{Method, Response};
use crate::pipeline;
use crate::shape::{Describe, RecordShape, TypeShape};
use crate::validation::{Validatable, Validator};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Placeholder input for routes that take no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct In {}

impl Describe for In {
    fn shape() -> TypeShape {
        TypeShape::Record(RecordShape::anonymous(Vec::new()))
    }
}

impl Validatable for In {
    fn check(&self) -> std::result::Result<(), garde::Report> {
        Ok(())
    }
}

/// Placeholder output for routes that answer with a bare string.
pub type Out = String;

/// Builder for a typed route.
pub struct Endpoint<I, O> {
    path: String,
    method: Method,
    middlewares: Vec<Middleware>,
    _marker: PhantomData<fn(I) -> O>,
}

/// Start a new endpoint: `GET /` until told otherwise.
pub fn endpoint<I, O>() -> Endpoint<I, O> {
    Endpoint::new()
}

impl<I, O> Default for Endpoint<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> Endpoint<I, O> {
    pub fn new() -> Self {
        Self {
            path: "/".to_string(),
            method: Method::GET,
            middlewares: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Path relative to the registration prefix. Parameters use `{name}`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append guards that run after every group and registration guard.
    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }
}

impl<I, O> Endpoint<I, O>
where
    I: DeserializeOwned + Describe + Validatable + 'static,
    O: Serialize + Describe + Validatable + 'static,
{
    /// Bind the handler and freeze the route.
    pub fn handle<F, Fut>(self, handler: F) -> Route
    where
        F: Fn(Context, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        Route::new(TypedHandler {
            path: self.path,
            method: self.method,
            middlewares: self.middlewares,
            handler,
            _marker: PhantomData::<fn(I) -> O>,
        })
    }
}

/// The capability behind a [`Route`].
///
/// Implemented by every `Endpoint::handle` result; the registry and the
/// schema generator only ever see this trait.
pub trait Handler: Send + Sync + 'static {
    fn path(&self) -> &str;

    fn method(&self) -> &Method;

    /// Guards declared on the endpoint itself.
    fn middlewares(&self) -> &[Middleware];

    fn input_shape(&self) -> TypeShape;

    fn output_shape(&self) -> TypeShape;

    /// Decode, validate, run the handler and serialize its output.
    fn invoke<'a>(&'a self, ctx: Context, validator: &'a dyn Validator) -> BoxFuture<'a, Response>;
}

struct TypedHandler<I, O, F> {
    path: String,
    method: Method,
    middlewares: Vec<Middleware>,
    handler: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, F, Fut> Handler for TypedHandler<I, O, F>
where
    I: DeserializeOwned + Describe + Validatable + 'static,
    O: Serialize + Describe + Validatable + 'static,
    F: Fn(Context, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O>> + Send + 'static,
{
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    fn input_shape(&self) -> TypeShape {
        I::shape()
    }

    fn output_shape(&self) -> TypeShape {
        O::shape()
    }

    fn invoke<'a>(&'a self, ctx: Context, validator: &'a dyn Validator) -> BoxFuture<'a, Response> {
        Box::pin(pipeline::invoke_typed::<I, O, F, Fut>(&self.handler, ctx, validator))
    }
}

/// An immutable route descriptor. Cloning shares the same handler.
#[derive(Clone)]
pub struct Route(Arc<dyn Handler>);

impl Route {
    pub fn new(handler: impl Handler) -> Self {
        Self(Arc::new(handler))
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn method(&self) -> &Method {
        self.0.method()
    }

    pub fn middlewares(&self) -> &[Middleware] {
        self.0.middlewares()
    }

    pub fn input_shape(&self) -> TypeShape {
        self.0.input_shape()
    }

    pub fn output_shape(&self) -> TypeShape {
        self.0.output_shape()
    }

    pub fn invoke<'a>(&'a self, ctx: Context, validator: &'a dyn Validator) -> BoxFuture<'a, Response> {
        self.0.invoke(ctx, validator)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", self.method())
            .field("path", &self.path())
            .field("middlewares", &self.middlewares().len())
            .finish()
    }
}
