//! Locale-prefixed HTTP server.
//!
//! Reads `shelf.toml` from the working directory when present.
//!
//! ```text
//! cargo run --example locale_server --features http
//! curl -i -H 'Accept-Language: en-US,en;q=0.9' http://127.0.0.1:3000/zustand
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::extract::Path as UrlPath;
use axum::routing::get;
use axum::Router;
use shelf::routing::http::with_locale_routing;
use shelf::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    shelf::logging::init_with_default("shelf=debug,info");

    let config = AppConfig::load_or_default(Path::new("shelf.toml"));
    let routing = Arc::new(config.routing()?);

    let app = Router::new()
        .route(
            "/:lang",
            get(|UrlPath(lang): UrlPath<String>| async move { format!("home ({lang})") }),
        )
        .route(
            "/:lang/zustand",
            get(|UrlPath(lang): UrlPath<String>| async move { format!("todos ({lang})") }),
        )
        .route("/api/health", get(|| async { "ok" }));
    let app = with_locale_routing(app, routing);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
