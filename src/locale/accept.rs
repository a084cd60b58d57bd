use super::tag::is_well_formed;

/// One entry of a weighted language preference list.
#[derive(Clone, Debug, PartialEq)]
pub struct LanguageRange {
    pub tag: String,
    pub quality: f32,
}

/// Parse an `Accept-Language` style list such as `"en;q=0.5, zh-CN;q=0.9"`.
///
/// The result is ordered by descending quality; entries with equal quality
/// keep the order they were given in. Malformed entries, entries with
/// `q=0` and the `*` wildcard are dropped. A malformed header therefore yields
/// an empty list rather than an error.
pub fn parse_accept_language(header: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = header.split(',').filter_map(parse_range).collect();
    // Stable sort keeps given order among equal weights.
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

fn parse_range(entry: &str) -> Option<LanguageRange> {
    let mut parts = entry.split(';');
    let tag = parts.next()?.trim();
    if tag == "*" || !is_well_formed(tag) {
        return None;
    }

    let mut quality = 1.0;
    for param in parts {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("q") {
            quality = parse_quality(value.trim())?;
        }
    }

    (quality > 0.0).then(|| LanguageRange {
        tag: tag.to_string(),
        quality,
    })
}

fn parse_quality(value: &str) -> Option<f32> {
    let quality: f32 = value.parse().ok()?;
    (quality.is_finite() && (0.0..=1.0).contains(&quality)).then_some(quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(header: &str) -> Vec<String> {
        parse_accept_language(header)
            .into_iter()
            .map(|range| range.tag)
            .collect()
    }

    #[test]
    fn orders_by_weight() {
        assert_eq!(tags("en;q=0.5,zh-CN;q=0.9"), vec!["zh-CN", "en"]);
    }

    #[test]
    fn default_weight_is_one() {
        let ranges = parse_accept_language("fr, de;q=0.8");
        assert_eq!(ranges[0].quality, 1.0);
        assert_eq!(ranges[0].tag, "fr");
    }

    #[test]
    fn equal_weights_keep_given_order() {
        assert_eq!(tags("de, fr;q=0.7, en, it;q=0.7"), vec!["de", "en", "fr", "it"]);
    }

    #[test]
    fn drops_malformed_entries() {
        assert_eq!(
            tags("en;q=abc, ;;, *, fr;q=0, de;q=2, it ; Q=0.4, es;level"),
            vec!["it"]
        );
    }

    #[test]
    fn empty_header_is_empty() {
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language("   ").is_empty());
    }
}
