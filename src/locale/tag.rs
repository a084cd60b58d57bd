//! Language tag comparison.
//!
//! Tags are compared case-insensitively and `_` is treated like `-`, so the
//! header form `zh-CN` and the route form `zh_CN` name the same locale.

fn subtags(tag: &str) -> impl Iterator<Item = &str> {
    tag.split(['-', '_'])
}

/// Whether `tag` looks like a language tag: alphanumeric subtags of 1 to 8
/// characters, the first one alphabetic.
pub fn is_well_formed(tag: &str) -> bool {
    let mut parts = subtags(tag);
    let Some(primary) = parts.next() else {
        return false;
    };
    let valid_len = |s: &str| (1..=8).contains(&s.len());
    valid_len(primary)
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|s| valid_len(s) && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// The primary language subtag (`zh` for `zh-CN`).
pub fn primary_subtag(tag: &str) -> &str {
    subtags(tag).next().unwrap_or(tag)
}

/// Exact tag equality modulo case and separator.
pub fn tags_match(a: &str, b: &str) -> bool {
    let mut left = subtags(a);
    let mut right = subtags(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) if l.eq_ignore_ascii_case(r) => {}
            _ => return false,
        }
    }
}

/// Whether both tags share a primary language subtag.
pub fn same_language(a: &str, b: &str) -> bool {
    primary_subtag(a).eq_ignore_ascii_case(primary_subtag(b))
}
