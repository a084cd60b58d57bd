use regex::RegexSet;

/// Paths that are never locale-prefixed: framework assets and API routes.
pub const DEFAULT_BYPASS: &[&str] = &[r"^/_next(/|$)", r"^/api(/|$)"];

/// Compiled bypass patterns, checked before any locale work.
#[derive(Clone, Debug)]
pub struct BypassSet {
    patterns: RegexSet,
}

impl BypassSet {
    /// Compile `patterns` into one set. Fails on the first invalid regex.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// A set that bypasses nothing.
    pub fn empty() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }

    /// Whether any pattern matches `pathname`.
    pub fn is_bypassed(&self, pathname: &str) -> bool {
        self.patterns.is_match(pathname)
    }

    /// Source patterns, as configured.
    pub fn patterns(&self) -> &[String] {
        self.patterns.patterns()
    }
}

impl Default for BypassSet {
    fn default() -> Self {
        Self::new(DEFAULT_BYPASS).unwrap_or_else(|_| Self::empty())
    }
}
