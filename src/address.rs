use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"));

/// Returns the trimmed address if `text` is `0x` followed by exactly 40 hex chars.
///
/// Case is preserved so checksummed addresses reach the analyzer untouched.
pub fn parse_address(text: &str) -> Option<String> {
    let text = text.trim();
    ADDRESS_RE.is_match(text).then(|| text.to_string())
}
