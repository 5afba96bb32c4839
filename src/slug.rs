//! Heading slugs and URL fragment handling.
//!
//! A slug is both the `id` given to a second-level heading and the fragment
//! a table-of-contents link points at, so the algorithm here must stay
//! byte-for-byte stable: changing it breaks every deep link already shared.

/// Characters `encodeURIComponent` leaves alone that `urlencoding` escapes.
const URI_COMPONENT_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%2A", "*"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
];

/// Percent-encode `text` the way a browser's `encodeURIComponent` does.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) and the marks
/// `! * ' ( )` pass through; everything else is UTF-8 percent-encoded with
/// uppercase hex digits.
pub fn encode_uri_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escaped, mark) in URI_COMPONENT_MARKS {
        // A literal "%21" in the input is encoded as "%2521", so this only
        // ever matches an escaped mark.
        encoded = encoded.replace(escaped, mark);
    }
    encoded
}

/// Convert heading text to its anchor slug.
///
/// Algorithm:
/// 1. percent-encode (`encodeURIComponent` semantics);
/// 2. lowercase;
/// 3. replace each literal space and each `%20` with `-`;
/// 4. drop every character outside `[a-z0-9!%-]`;
/// 5. remove every `%26` (encoded `&`).
///
/// Non-ASCII text such as emoji survives as lowercase percent escapes, so
/// `"🚀 Launch"` becomes `"%f0%9f%9a%80-launch"`.
pub fn to_anchor(text: &str) -> String {
    let encoded = encode_uri_component(text).to_lowercase();
    let hyphenated = encoded.replace("%20", "-").replace(' ', "-");
    let kept: String = hyphenated
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '!' | '%'))
        .collect();
    kept.replace("%26", "")
}

/// Bytes a rendered `href` attribute carries percent-encoded.
fn needs_href_escape(b: u8) -> bool {
    !b.is_ascii()
        || b.is_ascii_control()
        || matches!(b, b' ' | b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}')
}

/// Percent-encode a link destination the way it appears in the rendered
/// `href` attribute. Existing `%XX` escapes are left untouched.
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for &b in url.as_bytes() {
        if needs_href_escape(b) {
            out.push_str(&format!("%{b:02X}"));
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Heading id a table-of-contents link targets.
///
/// Only fragment links (`#...`) have a target; the fragment is taken as it
/// appears in the rendered `href` and lowercased. Returns `None` for links
/// that point anywhere else.
pub fn fragment_target(href: &str) -> Option<String> {
    let fragment = href.strip_prefix('#')?;
    Some(escape_href(fragment).to_lowercase())
}

/// Decode a `location.hash` value (with or without the leading `#`).
///
/// Uses `decodeURIComponent` semantics; a malformed escape sequence yields
/// the raw fragment instead of failing.
pub fn decode_fragment(hash: &str) -> String {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}
