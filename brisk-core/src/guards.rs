use crate::context::Context;
use crate::error::Error;
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// A check that runs before a route's input is decoded.
///
/// Returning `Err` stops the request. An [`HttpError`](crate::HttpError)
/// becomes the response as-is (status plus plain-text message); any other
/// error is logged and answered with an empty 500.
///
/// Plain closures taking `&Context` are guards:
///
/// ```ignore
/// let api_key = middleware(|ctx: &Context| -> Result<(), Error> {
///     match ctx.header("x-api-key") {
///         Some("secret") => Ok(()),
///         _ => Err(HttpError::unauthorized("invalid API key").into()),
///     }
/// });
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a guard",
    label = "expected a guard",
    note = "implement `Guard`, or pass a closure `Fn(&Context) -> Result<(), Error>`"
)]
pub trait Guard: Send + Sync + 'static {
    fn check<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>>;
}

impl<F> Guard for F
where
    F: Fn(&Context) -> Result<(), Error> + Send + Sync + 'static,
{
    fn check<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        let result = self(ctx);
        Box::pin(std::future::ready(result))
    }
}

/// A shared guard, as stored in route and group chains.
pub type Middleware = Arc<dyn Guard>;

/// Wrap a guard for use in a middleware chain.
pub fn middleware(guard: impl Guard) -> Middleware {
    Arc::new(guard)
}
