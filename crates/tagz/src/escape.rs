//! HTML escaping for text content and attribute values.

use std::borrow::Cow;

/// Escape text placed between tags.
///
/// Replaces `&`, `<`, `>` and `'`. Double quotes are left alone since they
/// carry no meaning outside attribute values.
#[must_use]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| matches!(c, '&' | '<' | '>' | '\''))
}

/// Escape a value placed inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| matches!(c, '&' | '<' | '>' | '"' | '\''))
}

fn escape_with(s: &str, needs_escape: impl Fn(char) -> bool) -> Cow<'_, str> {
    let Some(first) = s.find(&needs_escape) else {
        return Cow::Borrowed(s);
    };

    let mut result = String::with_capacity(s.len() + 16);
    result.push_str(&s[..first]);
    for c in s[first..].chars() {
        if !needs_escape(c) {
            result.push(c);
            continue;
        }
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
