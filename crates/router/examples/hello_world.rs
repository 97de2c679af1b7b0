use http::StatusCode;
use micro_router::{handler_fn, Engine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::with_defaults();

    engine
        .get(
            "/",
            handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.html(StatusCode::OK, "<h1>Hello micro-router</h1>");
                    Ok(())
                })
            }),
        )?
        .get(
            "/hello",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let name = ctx.query("name").unwrap_or_else(|| "stranger".to_owned());
                    ctx.string(StatusCode::OK, format!("hello {name}, you're at {}\n", ctx.path()));
                    Ok(())
                })
            }),
        )?
        .get(
            "/assets/*filepath",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let filepath = ctx.param("filepath").unwrap_or_default().to_owned();
                    ctx.json(StatusCode::OK, &serde_json::json!({ "filepath": filepath }));
                    Ok(())
                })
            }),
        )?
        .get(
            "/panic",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let names = ["alice"];
                    let index = ctx.query("index").and_then(|index| index.parse::<usize>().ok()).unwrap_or(100);
                    ctx.string(StatusCode::OK, names[index]);
                    Ok(())
                })
            }),
        )?;

    engine.run("127.0.0.1:8080").await?;
    Ok(())
}
