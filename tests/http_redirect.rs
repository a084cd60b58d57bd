//! HTTP locale routing integration tests.
//!
//! Starts an axum server and exercises it with reqwest (redirects disabled).

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use shelf::config::AppConfig;
use shelf::routing::http::with_locale_routing;
use shelf::LocaleRouting;

/// Bind to port 0 and return the actual address.
async fn start_server(routing: LocaleRouting) -> String {
    let app = Router::new()
        .route("/:lang/zustand", get(|| async { "page" }))
        .route("/:lang", get(|| async { "home" }))
        .route("/api/todos", get(|| async { "[]" }));
    let app = with_locale_routing(app, Arc::new(routing));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn unprefixed_path_redirects_to_negotiated_locale() {
    let base = start_server(LocaleRouting::default()).await;

    let resp = client()
        .get(format!("{base}/zustand"))
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/en/zustand");
}

#[tokio::test]
async fn missing_header_uses_fallback() {
    let base = start_server(LocaleRouting::default()).await;

    let resp = client().get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 307);
    assert_eq!(location(&resp), "/zh_CN");
}

#[tokio::test]
async fn query_string_is_preserved() {
    let base = start_server(LocaleRouting::default()).await;

    let resp = client()
        .get(format!("{base}/zustand?tab=todos"))
        .header("Accept-Language", "en")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/en/zustand?tab=todos");
}

#[tokio::test]
async fn prefixed_path_passes_through() {
    let base = start_server(LocaleRouting::default()).await;

    let resp = client()
        .get(format!("{base}/en/zustand"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "page");
}

#[tokio::test]
async fn api_route_bypasses() {
    let base = start_server(LocaleRouting::default()).await;

    let resp = client()
        .get(format!("{base}/api/todos"))
        .header("Accept-Language", "en")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn configured_locales_apply() {
    let config = AppConfig::from_toml_str(
        r#"
        [locales]
        supported = ["en", "de"]
        default = "en"
        "#,
    )
    .unwrap();
    let base = start_server(config.routing().unwrap()).await;

    let resp = client()
        .get(format!("{base}/zustand"))
        .header("Accept-Language", "de-AT, en;q=0.5")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/de/zustand");
}
