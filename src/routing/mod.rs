//! Locale-prefix routing.
//!
//! Decides per request whether the path already names a locale or must be
//! redirected under the negotiated one. The router itself lives elsewhere;
//! with the `http` feature an axum middleware applies the decision.

mod bypass;
#[cfg(feature = "http")]
pub mod http;
mod rewrite;

pub use bypass::{BypassSet, DEFAULT_BYPASS};
pub use rewrite::{decide, locale_of, prefix_path, switch_locale, LocaleRouting, RewriteDecision};
