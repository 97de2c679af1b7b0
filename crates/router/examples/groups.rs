use http::StatusCode;
use micro_router::{handler_fn, Engine, HandlerError, Server};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::with_defaults();

    {
        let mut v1 = engine.group("/v1");
        v1.get(
            "/hello/:name",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let name = ctx.param("name").unwrap_or_default().to_owned();
                    ctx.string(StatusCode::OK, format!("hello {name}, you're at {}\n", ctx.path()));
                    Ok(())
                })
            }),
        )?
        .post(
            "/login",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let username = ctx.post_form("username").unwrap_or_default();
                    let password = ctx.post_form("password").unwrap_or_default();
                    ctx.json(StatusCode::OK, &serde_json::json!({ "username": username, "password": password }));
                    Ok(())
                })
            }),
        )?;
    }

    {
        let mut v2 = engine.group("/v2");
        v2.use_middleware(handler_fn(|ctx| {
            Box::pin(async move {
                if ctx.headers().get("x-token").is_none() {
                    ctx.fail(StatusCode::UNAUTHORIZED, "x-token header required");
                    return Ok(());
                }
                ctx.next().await
            })
        }));
        v2.get(
            "/reports/:year",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let year = ctx.param("year").unwrap_or_default().parse::<u16>().map_err(HandlerError::new)?;
                    ctx.json(StatusCode::OK, &serde_json::json!({ "year": year, "reports": [] }));
                    Ok(())
                })
            }),
        )?;
    }

    Server::builder().engine(engine).address("127.0.0.1:8080").max_log_level(Level::DEBUG).build()?.start().await;
    Ok(())
}
