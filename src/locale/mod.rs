//! Locale negotiation.
//!
//! Turns a client's weighted language preferences into one of a fixed set of
//! supported locales. Nothing here fails: unusable input falls back.

mod accept;
mod error;
mod negotiate;
pub mod tag;

pub use accept::{parse_accept_language, LanguageRange};
pub use error::LocaleError;
pub use negotiate::{negotiate, LocaleSet};
