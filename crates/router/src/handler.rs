use crate::context::Context;
use crate::error::HandlerError;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Outcome of one link in the handler chain.
pub type HandlerResult = Result<(), HandlerError>;

/// A link in the per-request handler chain: either a middleware or a route handler.
///
/// A middleware usually does some work, calls [`Context::next`] to run the rest of the
/// chain, and then does more work once the call returns. A route handler just writes
/// the response.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut Context) -> HandlerResult;
}

/// a closure holder which represents an async handler function
pub struct FnHandler<F> {
    f: F,
}

/// Turns a closure into a [`Handler`].
///
/// The closure borrows the context for the lifetime of the returned future, so it boxes
/// an `async move` block:
///
/// ```
/// use http::StatusCode;
/// use micro_router::handler_fn;
///
/// let hello = handler_fn(|ctx| {
///     Box::pin(async move {
///         let name = ctx.query("name").unwrap_or_default();
///         ctx.string(StatusCode::OK, format!("hello {name}\n"));
///         Ok(())
///     })
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'c> Fn(&'c mut Context) -> BoxFuture<'c, HandlerResult> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: for<'c> Fn(&'c mut Context) -> BoxFuture<'c, HandlerResult> + Send + Sync,
{
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        (self.f)(ctx).await
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use crate::handler::{handler_fn, Handler};
    use crate::{Context, HandlerError};
    use bytes::Bytes;
    use http::{Request, StatusCode};

    fn assert_is_handler<T: Handler>(_handler: &T) {
        // no op
    }

    #[test]
    fn assert_closure_is_handler() {
        let handler = handler_fn(|ctx| {
            Box::pin(async move {
                ctx.string(StatusCode::OK, "ok");
                Ok(())
            })
        });
        assert_is_handler(&handler);
    }

    #[tokio::test]
    async fn test_fn_handler_writes_response() {
        let handler = handler_fn(|ctx| {
            Box::pin(async move {
                let path = ctx.path().to_owned();
                ctx.string(StatusCode::CREATED, path);
                Ok(())
            })
        });

        let mut ctx = Context::new(Request::post("/items").body(Bytes::new()).unwrap(), Vec::new());
        handler.call(&mut ctx).await.unwrap();

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_fn_handler_error_is_returned() {
        let handler = handler_fn(|_ctx| Box::pin(async move { Err(HandlerError::msg("boom")) }));

        let mut ctx = Context::new(Request::get("/").body(Bytes::new()).unwrap(), Vec::new());
        let error = handler.call(&mut ctx).await.unwrap_err();
        assert_eq!(error.to_string(), "boom");
    }
}
