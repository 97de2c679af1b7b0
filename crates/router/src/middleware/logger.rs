use crate::handler::{Handler, HandlerResult};
use crate::Context;
use async_trait::async_trait;
use http::StatusCode;
use std::time::Instant;
use tracing::info;

/// Logs method, uri, final status and latency of every request passing through it.
///
/// When the chain fails the logged status is `500`, the status an enclosing
/// [`Recovery`](super::Recovery) or the engine answers with, not whatever the failing
/// handler had written before.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

pub fn logger() -> Logger {
    Logger
}

#[async_trait]
impl Handler for Logger {
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        let start = Instant::now();
        let result = ctx.next().await;
        info!(
            status = reported_status(ctx, &result).as_u16(),
            method = %ctx.method(),
            uri = %ctx.uri(),
            elapsed = ?start.elapsed(),
            failed = result.is_err(),
            "request finished"
        );
        result
    }
}

fn reported_status(ctx: &Context, result: &HandlerResult) -> StatusCode {
    if result.is_err() { StatusCode::INTERNAL_SERVER_ERROR } else { ctx.status_code() }
}

#[cfg(test)]
mod tests {
    use super::{logger, reported_status};
    use crate::handler::{handler_fn, Handler};
    use crate::{Context, HandlerError};
    use bytes::Bytes;
    use http::{Request, StatusCode};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_logger_is_transparent() {
        let teapot: Arc<dyn Handler> = Arc::new(handler_fn(|ctx| {
            Box::pin(async move {
                ctx.string(StatusCode::IM_A_TEAPOT, "short and stout");
                Ok(())
            })
        }));
        let request = Request::get("/tea?sugar=no").body(Bytes::new()).unwrap();
        let mut ctx = Context::new(request, vec![Arc::new(logger()), teapot]);

        ctx.next().await.unwrap();

        assert_eq!(ctx.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(reported_status(&ctx, &Ok(())), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_failed_chain_reports_500() {
        let half_written: Arc<dyn Handler> = Arc::new(handler_fn(|ctx| {
            Box::pin(async move {
                ctx.string(StatusCode::OK, "half written");
                Err(HandlerError::msg("backend went away"))
            })
        }));
        let request = Request::get("/orders").body(Bytes::new()).unwrap();
        let mut ctx = Context::new(request, vec![Arc::new(logger()), half_written]);

        let result = ctx.next().await;

        assert!(result.is_err());
        assert_eq!(ctx.status_code(), StatusCode::OK);
        assert_eq!(reported_status(&ctx, &result), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
