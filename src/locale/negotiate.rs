use super::accept::parse_accept_language;
use super::error::LocaleError;
use super::tag::{is_well_formed, same_language, tags_match};

/// Pick the supported locale that best serves a language preference header.
///
/// Candidates are tried by descending weight. For each one an exact match
/// anywhere in `supported` wins, otherwise the first supported locale with
/// the same primary language is taken. A missing or unusable header, or one
/// with no matching candidate, yields `fallback`.
pub fn negotiate<'a, T>(header: Option<&str>, supported: &'a [T], fallback: &'a str) -> &'a str
where
    T: AsRef<str>,
{
    let Some(header) = header else {
        return fallback;
    };

    for range in parse_accept_language(header) {
        let exact = supported
            .iter()
            .map(|locale| locale.as_ref())
            .find(|locale| tags_match(locale, &range.tag));
        let found = exact.or_else(|| {
            supported
                .iter()
                .map(|locale| locale.as_ref())
                .find(|locale| same_language(locale, &range.tag))
        });
        if let Some(locale) = found {
            return locale;
        }
    }
    fallback
}

/// The fixed, ordered set of locales an application serves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleSet {
    supported: Vec<String>,
    fallback: String,
}

impl LocaleSet {
    /// Validate and build a locale set. `fallback` must be a member.
    pub fn new<I, T>(supported: I, fallback: impl Into<String>) -> Result<Self, LocaleError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let supported: Vec<String> = supported.into_iter().map(Into::into).collect();
        let fallback = fallback.into();

        if supported.is_empty() {
            return Err(LocaleError::EmptySet);
        }
        if let Some(bad) = supported.iter().find(|tag| !is_well_formed(tag)) {
            return Err(LocaleError::InvalidTag(bad.clone()));
        }
        if !supported.contains(&fallback) {
            return Err(LocaleError::FallbackNotSupported(fallback));
        }

        Ok(Self {
            supported,
            fallback,
        })
    }

    /// Supported tags in configured order.
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// The tag used when nothing in a header matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Whether `locale` is one of the supported tags, compared exactly.
    pub fn contains(&self, locale: &str) -> bool {
        self.supported.iter().any(|tag| tag == locale)
    }

    /// [`negotiate`] against this set.
    pub fn negotiate(&self, header: Option<&str>) -> &str {
        negotiate(header, &self.supported, &self.fallback)
    }
}

impl Default for LocaleSet {
    /// `zh_CN` and `en`, falling back to `zh_CN`.
    fn default() -> Self {
        Self {
            supported: vec!["zh_CN".to_string(), "en".to_string()],
            fallback: "zh_CN".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [&str; 2] = ["zh_CN", "en"];

    #[test]
    fn highest_weight_wins() {
        assert_eq!(
            negotiate(Some("en;q=0.5,zh-CN;q=0.9"), &SUPPORTED, "zh_CN"),
            "zh_CN"
        );
    }

    #[test]
    fn missing_header_falls_back() {
        assert_eq!(negotiate(None, &SUPPORTED, "zh_CN"), "zh_CN");
    }

    #[test]
    fn unsupported_language_falls_back() {
        assert_eq!(negotiate(Some("fr"), &SUPPORTED, "en"), "en");
    }

    #[test]
    fn primary_subtag_matches() {
        assert_eq!(negotiate(Some("en-GB,zh;q=0.1"), &SUPPORTED, "zh_CN"), "en");
        assert_eq!(negotiate(Some("zh-TW"), &SUPPORTED, "en"), "zh_CN");
    }

    #[test]
    fn exact_match_beats_earlier_primary_match() {
        let supported = ["en-US", "en-GB"];
        assert_eq!(negotiate(Some("en-GB"), &supported, "en-US"), "en-GB");
        assert_eq!(negotiate(Some("en-AU"), &supported, "en-GB"), "en-US");
    }

    #[test]
    fn garbage_header_falls_back() {
        assert_eq!(negotiate(Some(";;;==,,"), &SUPPORTED, "en"), "en");
        assert_eq!(negotiate(Some(""), &SUPPORTED, "en"), "en");
    }

    #[test]
    fn skips_unmatched_candidates() {
        assert_eq!(negotiate(Some("fr, de;q=0.9, en;q=0.1"), &SUPPORTED, "zh_CN"), "en");
    }

    #[test]
    fn locale_set_validation() {
        assert_eq!(
            LocaleSet::new(Vec::<String>::new(), "en"),
            Err(LocaleError::EmptySet)
        );
        assert_eq!(
            LocaleSet::new(["en"], "fr"),
            Err(LocaleError::FallbackNotSupported("fr".to_string()))
        );
        assert_eq!(
            LocaleSet::new(["en", "not a tag"], "en"),
            Err(LocaleError::InvalidTag("not a tag".to_string()))
        );

        let set = LocaleSet::new(["zh_CN", "en"], "zh_CN").unwrap();
        assert_eq!(set, LocaleSet::default());
        assert!(set.contains("en"));
        assert!(!set.contains("EN"));
        assert_eq!(set.negotiate(Some("en-US")), "en");
    }
}
