//! URL helpers shared by the link and image renderers.

use std::sync::OnceLock;

use regex::Regex;

/// Scheme rejected by [`sanitize_url`], compared after decoding and stripping.
const UNSAFE_SCHEME: &str = "javascript:";

/// Returns `url` unchanged unless it would execute script.
///
/// The check percent-decodes the URL, keeps only `[A-Za-z0-9/:]`, lowercases
/// what is left and rejects anything starting with `javascript:`. Malformed
/// percent-encoding (a bad escape or bytes that are not UTF-8) is rejected too.
pub fn sanitize_url(url: &str) -> Option<String> {
    let decoded = percent_decode(url)?;
    let protocol: String = decoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase();

    if protocol.starts_with(UNSAFE_SCHEME) {
        return None;
    }
    Some(url.to_string())
}

/// Removes a backslash preceding any character that is not alphanumeric or whitespace.
pub fn unescape_url(raw: &str) -> String {
    static UNESCAPE_URL: OnceLock<Regex> = OnceLock::new();
    let unescape = UNESCAPE_URL
        .get_or_init(|| Regex::new(r"\\([^0-9A-Za-z\s])").expect("Invalid unescape regex"));
    unescape.replace_all(raw, "$1").into_owned()
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape.
fn percent_decode(url: &str) -> Option<String> {
    let bytes = url.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    urlencoding::decode(url).ok().map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://x.com", Some("http://x.com"))]
    #[case("/relative/path?q=1", Some("/relative/path?q=1"))]
    #[case("mailto:someone@example.com", Some("mailto:someone@example.com"))]
    #[case("javascript:alert(1)", None)]
    #[case("JavaScript:alert(1)", None)]
    #[case(" java\nscript:alert(1)", None)]
    #[case("javascript%3Aalert(1)", None)]
    #[case("%6Aavascript:alert(1)", None)]
    #[case("%AF", None)]
    #[case("a%AFc", None)]
    #[case("100%", None)]
    #[case("%zz", None)]
    #[case("caf%C3%A9", Some("caf%C3%A9"))]
    fn test_sanitizes(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(sanitize_url(input).as_deref(), expected);
    }

    #[rstest]
    #[case(r"http://a.com/\(x\)", "http://a.com/(x)")]
    #[case(r"\a\1", r"\a\1")]
    #[case(r"a\ b", r"a\ b")]
    #[case(r"\\", r"\")]
    #[case("plain", "plain")]
    fn test_unescapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape_url(input), expected);
    }
}
