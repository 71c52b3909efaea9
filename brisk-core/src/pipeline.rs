//! The per-request pipeline shared by every route.
//!
//! Order of operations:
//!
//! 1. build the [`Context`] from the request head and run the guard chain
//! 2. read the body (bounded); guards never see it
//! 3. decode the input from the body, or from the query string when the
//!    body is empty (repeated keys fill sequences)
//! 4. validate the input (422 on failure)
//! 5. run the handler (opaque 500 on failure)
//! 6. validate record outputs (500 on failure)
//! 7. serialize the output as JSON
//!
//! Response headers set on the context are applied to every outcome.

use crate::context::Context;
use crate::endpoint::Route;
use crate::error::{Error, Result};
use crate::guards::Middleware;
use crate::http::{
    to_bytes, FromRequestParts, IntoResponse, Json, RawPathParams, Request, Response, StatusCode,
    CONTENT_TYPE,
};
use crate::shape::Describe;
use crate::validation::{Validatable, ValidationErrorResponse, Validator};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

/// Default cap on request body size: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A route bound to its full guard chain, ready to serve requests.
pub struct Pipeline {
    route: Route,
    middlewares: Vec<Middleware>,
    validator: Arc<dyn Validator>,
    body_limit: usize,
}

impl Pipeline {
    pub fn new(
        route: Route,
        middlewares: Vec<Middleware>,
        validator: Arc<dyn Validator>,
        body_limit: usize,
    ) -> Self {
        Self {
            route,
            middlewares,
            validator,
            body_limit,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Serve one request. Never fails: every error becomes a response.
    pub async fn run(&self, req: Request) -> Response {
        let (mut parts, body) = req.into_parts();

        let params: Vec<(String, String)> =
            match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(raw) => raw
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
                Err(_) => Vec::new(),
            };

        let ctx = Context::new(parts.method, parts.uri, parts.headers).with_params(params);

        if let Some(rejection) = self.run_guards(&ctx).await {
            return ctx.apply_response_headers(rejection);
        }

        let body = match to_bytes(body, self.body_limit).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(method = %ctx.method(), path = %ctx.path(), error = %err, "Failed to read request body");
                return ctx.apply_response_headers(StatusCode::BAD_REQUEST.into_response());
            }
        };

        let ctx = ctx.with_body(body);
        let response = self.route.invoke(ctx.clone(), self.validator.as_ref()).await;
        ctx.apply_response_headers(response)
    }

    /// The response of the first guard that rejects, if any.
    async fn run_guards(&self, ctx: &Context) -> Option<Response> {
        for guard in &self.middlewares {
            if let Err(err) = guard.check(ctx).await {
                return Some(match err.as_http() {
                    Some(http) => http.clone().into_response(),
                    None => {
                        error!(method = %ctx.method(), path = %ctx.path(), error = %err, "Middleware failed");
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    }
                });
            }
        }
        None
    }
}

/// Steps 3 to 7 for a concrete input/output pair.
pub(crate) async fn invoke_typed<I, O, F, Fut>(
    handler: &F,
    ctx: Context,
    validator: &dyn Validator,
) -> Response
where
    I: DeserializeOwned + Describe + Validatable,
    O: Serialize + Describe + Validatable,
    F: Fn(Context, I) -> Fut,
    Fut: Future<Output = Result<O>>,
{
    let input = match decode_input::<I>(&ctx) {
        Ok(input) => input,
        Err(err) => {
            debug!(method = %ctx.method(), path = %ctx.path(), error = %err, "Failed to decode request input");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let input_shape = I::shape();
    if let Err(failure) = validator.validate(&input, &input_shape) {
        debug!(method = %ctx.method(), path = %ctx.path(), error = %failure, "Request input rejected");
        return ValidationErrorResponse {
            errors: validator.translate(&failure),
        }
        .into_response_with(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let method = ctx.method().clone();
    let path = ctx.path().to_owned();

    let output = match handler(ctx, input).await {
        Ok(output) => output,
        Err(err) => {
            error!(%method, %path, error = %err, "Handler failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let output_shape = O::shape();
    if output_shape.is_record() {
        if let Err(failure) = validator.validate(&output, &output_shape) {
            let failure = failure.into_output();
            error!(%method, %path, error = %failure, "Handler output failed validation");
            return ValidationErrorResponse {
                errors: validator.translate(&failure),
            }
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    Json(output).into_response()
}

/// Decode the input from the body (JSON or form) or, when the body is
/// empty, from the query string.
fn decode_input<I: DeserializeOwned>(ctx: &Context) -> Result<I> {
    let body = ctx.body();
    if body.is_empty() {
        return serde_html_form::from_str(ctx.query_string()).map_err(Error::from);
    }

    if is_form(ctx) {
        serde_html_form::from_bytes(body).map_err(Error::from)
    } else {
        serde_json::from_slice(body).map_err(Error::from)
    }
}

fn is_form(ctx: &Context) -> bool {
    ctx.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
