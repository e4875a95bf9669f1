//! Version token recognition

use once_cell::sync::Lazy;
use regex::Regex;

/// Labelled version (`version: 1.4.2`, `Version = "v2.0.0"`) or a
/// calendar-style token with a four-digit major (`2026.2.1`, `v2026.2.1`)
static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bversion\s*[:=]\s*["']?v?(\d+\.\d+\.\d+)|\b[a-z]?(\d{4}\.\d+\.\d+)\b"#,
    )
    .expect("version pattern is valid")
});

/// First version token in a single text
#[must_use]
pub fn version_in(text: &str) -> Option<String> {
    let captures = VERSION_TOKEN.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

/// First version token across `texts`, in scan order
#[must_use]
pub fn find_version<I, S>(texts: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts.into_iter().find_map(|text| version_in(text.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_tokens() {
        assert_eq!(version_in("Released 2026.2.1 today").as_deref(), Some("2026.2.1"));
        assert_eq!(version_in("see v2026.10.3 notes").as_deref(), Some("2026.10.3"));
    }

    #[test]
    fn labelled_tokens() {
        assert_eq!(version_in("Version: 1.4.2").as_deref(), Some("1.4.2"));
        assert_eq!(version_in(r#"version = "v0.9.12""#).as_deref(), Some("0.9.12"));
    }

    #[test]
    fn short_majors_need_a_label() {
        assert_eq!(version_in("upgrade to 1.2.3"), None);
        assert_eq!(version_in("no version here"), None);
    }

    #[test]
    fn first_text_with_a_match_wins() {
        let texts = ["nothing", "changelog 2026.1.0", "version: 2026.3.0"];
        assert_eq!(find_version(texts).as_deref(), Some("2026.1.0"));
        assert_eq!(find_version(Vec::<String>::new()), None);
    }
}
