//! Fezz Invoke - command-line function invoker
//!
//! Invokes a function on the gateway configured through the environment:
//!
//! ```text
//! FUNCTIONS_URL=http://localhost:54321 FUNCTIONS_API_KEY=anon \
//!     fezz-invoke hello '{"name":"Fezz"}'
//! ```
//!
//! Bodies that parse as JSON are sent as `application/json`, anything else as
//! text. Set `FUNCTIONS_REGION` to pin a region and `FUNCTIONS_STREAM=1` to
//! print the body as it streams in.

use fezz_functions::prelude::*;
use futures_util::StreamExt;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let name = args
        .next()
        .ok_or("usage: fezz-invoke <function> [body]")?;

    let mut options = InvokeOptions::new();
    if let Some(body) = args.next() {
        options = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => options.body(value),
            Err(_) => options.body(body),
        };
    }
    if let Ok(region) = std::env::var("FUNCTIONS_REGION") {
        options = options.region(region.parse()?);
    }

    let functions = Functions::with_hyper(Credentials::from_env()?);
    tracing::info!("Invoking '{}' at {}", name, functions.credentials().base_url());

    if std::env::var("FUNCTIONS_STREAM").is_ok_and(|v| v == "1") {
        let status = functions
            .invoke_streaming(
                &name,
                options,
                |status: StatusCode, _headers: Headers, mut chunks: ChunkStream| async move {
                    let mut stdout = std::io::stdout();
                    while let Some(chunk) = chunks.next().await {
                        let chunk = chunk?;
                        // Broken pipe just ends the output.
                        if stdout.write_all(&chunk).and_then(|_| stdout.flush()).is_err() {
                            break;
                        }
                    }
                    Ok::<_, FunctionsError>(status)
                },
            )
            .await?;
        tracing::info!("Stream finished with status {}", status);
        return Ok(());
    }

    let response = functions.invoke(&name, options).await?;
    tracing::info!("Function '{}' returned {}", name, response.status);

    match &response.body {
        ResponseBody::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
        ResponseBody::Raw(bytes) => std::io::stdout().write_all(bytes)?,
    }

    Ok(())
}
