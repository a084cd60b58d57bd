use super::bypass::BypassSet;
use crate::locale::LocaleSet;

/// What to do with an incoming request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteDecision {
    /// Continue the request unchanged.
    Passthrough,
    /// End the request with a redirect to `to`.
    Redirect { to: String },
}

fn has_locale_prefix(pathname: &str, locale: &str) -> bool {
    pathname
        .strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(locale))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The supported locale a path is already prefixed with, if any.
pub fn locale_of<'a, T>(pathname: &str, supported: &'a [T]) -> Option<&'a str>
where
    T: AsRef<str>,
{
    supported
        .iter()
        .map(|locale| locale.as_ref())
        .find(|locale| has_locale_prefix(pathname, locale))
}

/// `"/" + locale + pathname`, without doubling or dropping the slash.
pub fn prefix_path(locale: &str, pathname: &str) -> String {
    match pathname {
        "" | "/" => format!("/{locale}"),
        p if p.starts_with('/') => format!("/{locale}{p}"),
        p => format!("/{locale}/{p}"),
    }
}

/// Decide whether a request needs a locale-prefix redirect.
///
/// Rules, in order: bypassed paths pass through; paths already carrying a
/// supported locale pass through; anything else redirects to the same path
/// under the negotiated locale. `negotiate` runs only in the last case.
pub fn decide<T, F, L>(
    pathname: &str,
    supported: &[T],
    bypass: &BypassSet,
    negotiate: F,
) -> RewriteDecision
where
    T: AsRef<str>,
    F: FnOnce() -> L,
    L: AsRef<str>,
{
    if bypass.is_bypassed(pathname) || locale_of(pathname, supported).is_some() {
        return RewriteDecision::Passthrough;
    }
    RewriteDecision::Redirect {
        to: prefix_path(negotiate().as_ref(), pathname),
    }
}

/// Path of the same page under another locale.
///
/// `/en/zustand` becomes `/zh_CN/zustand`; an unprefixed path simply gains
/// the target prefix.
pub fn switch_locale<T>(pathname: &str, target: &str, supported: &[T]) -> String
where
    T: AsRef<str>,
{
    let rest = match locale_of(pathname, supported) {
        Some(current) => &pathname[current.len() + 1..],
        None => pathname,
    };
    prefix_path(target, rest)
}

/// Per-request locale routing: the configured locales plus bypass patterns.
#[derive(Clone, Debug, Default)]
pub struct LocaleRouting {
    locales: LocaleSet,
    bypass: BypassSet,
}

impl LocaleRouting {
    /// Routing over `locales`, skipping paths matched by `bypass`.
    pub fn new(locales: LocaleSet, bypass: BypassSet) -> Self {
        Self { locales, bypass }
    }

    /// The configured locales.
    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    /// The configured bypass patterns.
    pub fn bypass(&self) -> &BypassSet {
        &self.bypass
    }

    /// Make the one-shot rewrite decision for a request.
    pub fn decide(&self, pathname: &str, accept_language: Option<&str>) -> RewriteDecision {
        let decision = decide(pathname, self.locales.supported(), &self.bypass, || {
            self.locales.negotiate(accept_language)
        });
        if let RewriteDecision::Redirect { to } = &decision {
            tracing::debug!(pathname, ?accept_language, to = %to, "locale redirect");
        }
        decision
    }

    /// [`switch_locale`] against the configured locales.
    pub fn switch_locale(&self, pathname: &str, target: &str) -> String {
        switch_locale(pathname, target, self.locales.supported())
    }

    /// [`locale_of`] against the configured locales.
    pub fn locale_of<'a>(&'a self, pathname: &str) -> Option<&'a str> {
        locale_of(pathname, self.locales.supported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [&str; 2] = ["zh_CN", "en"];

    fn redirect(to: &str) -> RewriteDecision {
        RewriteDecision::Redirect { to: to.to_string() }
    }

    fn decide_en(pathname: &str) -> RewriteDecision {
        decide(pathname, &SUPPORTED, &BypassSet::default(), || "en")
    }

    #[test]
    fn unprefixed_path_redirects() {
        assert_eq!(decide_en("/zustand"), redirect("/en/zustand"));
        assert_eq!(decide_en("/a/b/c"), redirect("/en/a/b/c"));
    }

    #[test]
    fn root_redirects_without_trailing_slash() {
        assert_eq!(decide_en("/"), redirect("/en"));
    }

    #[test]
    fn prefixed_path_passes() {
        assert_eq!(decide_en("/zh_CN/zustand"), RewriteDecision::Passthrough);
        assert_eq!(decide_en("/en"), RewriteDecision::Passthrough);
        assert_eq!(decide_en("/en/"), RewriteDecision::Passthrough);
    }

    #[test]
    fn lookalike_prefix_redirects() {
        assert_eq!(decide_en("/english"), redirect("/en/english"));
        assert_eq!(decide_en("/zh_CNx/page"), redirect("/en/zh_CNx/page"));
    }

    #[test]
    fn bypass_passes_without_negotiating() {
        let decision = decide("/api/todos", &SUPPORTED, &BypassSet::default(), || -> &str {
            panic!("negotiated for a bypassed path")
        });
        assert_eq!(decision, RewriteDecision::Passthrough);
    }

    #[test]
    fn prefix_path_shapes() {
        assert_eq!(prefix_path("en", ""), "/en");
        assert_eq!(prefix_path("en", "page"), "/en/page");
        assert_eq!(prefix_path("en", "/page?"), "/en/page?");
    }

    #[test]
    fn locale_of_paths() {
        assert_eq!(locale_of("/en/zustand", &SUPPORTED), Some("en"));
        assert_eq!(locale_of("/zh_CN", &SUPPORTED), Some("zh_CN"));
        assert_eq!(locale_of("/fr/zustand", &SUPPORTED), None);
    }

    #[test]
    fn switching_locale() {
        assert_eq!(switch_locale("/en/zustand", "zh_CN", &SUPPORTED), "/zh_CN/zustand");
        assert_eq!(switch_locale("/en", "zh_CN", &SUPPORTED), "/zh_CN");
        assert_eq!(switch_locale("/zustand", "en", &SUPPORTED), "/en/zustand");
    }

    #[test]
    fn routing_negotiates_from_header() {
        let routing = LocaleRouting::default();
        assert_eq!(
            routing.decide("/zustand", Some("en-US,en;q=0.9")),
            redirect("/en/zustand")
        );
        assert_eq!(routing.decide("/zustand", None), redirect("/zh_CN/zustand"));
        assert_eq!(routing.decide("/_next/static/a.js", None), RewriteDecision::Passthrough);
        assert_eq!(routing.locale_of("/en/x"), Some("en"));
    }
}
