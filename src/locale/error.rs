use thiserror::Error;

/// Invalid supported-locale configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("the supported locale set is empty")]
    EmptySet,

    #[error("fallback locale {0:?} is not in the supported set")]
    FallbackNotSupported(String),

    #[error("malformed locale tag {0:?}")]
    InvalidTag(String),
}
