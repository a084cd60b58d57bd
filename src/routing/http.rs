//! HTTP transport for locale routing: applies the rewrite decision as an
//! axum middleware.
//!
//! Requires the `http` feature.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use shelf::routing::{http, LocaleRouting};
//!
//! let app = Router::new().route("/:lang/zustand", get(|| async { "ok" }));
//! let app = http::with_locale_routing(app, Arc::new(LocaleRouting::default()));
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;

use super::rewrite::{LocaleRouting, RewriteDecision};

/// Wrap every route of `router` in the locale redirect middleware.
pub fn with_locale_routing(router: Router, routing: Arc<LocaleRouting>) -> Router {
    router.layer(middleware::from_fn_with_state(routing, locale_redirect))
}

/// Redirect (307) unprefixed paths under the negotiated locale, keeping the
/// query string; pass everything else to the inner service.
pub async fn locale_redirect(
    State(routing): State<Arc<LocaleRouting>>,
    request: Request,
    next: Next,
) -> Response {
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let decision = routing.decide(request.uri().path(), accept_language);

    match decision {
        RewriteDecision::Passthrough => next.run(request).await,
        RewriteDecision::Redirect { to } => {
            let location = match request.uri().query() {
                Some(query) => format!("{to}?{query}"),
                None => to,
            };
            Redirect::temporary(&location).into_response()
        }
    }
}
