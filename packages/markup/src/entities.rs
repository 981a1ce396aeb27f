//! Character reference decoding and markup escaping.

use std::borrow::Cow;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("middot", '\u{b7}'),
    ("bull", '\u{2022}'),
];

/// Longest reference body we try to interpret (`#x10FFFF` fits).
const MAX_REFERENCE_LEN: usize = 10;

/// Decode character references. Unknown references are kept verbatim.
pub fn decode(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_REFERENCE_LEN)
            .and_then(|end| reference(&after[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

fn reference(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, c)| *c)
}

pub fn escape_text(input: &str) -> Cow<'_, str> {
    escape(input, false)
}

pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    escape(input, true)
}

fn escape(input: &str, attribute: bool) -> Cow<'_, str> {
    let needs = input.chars().any(|c| match c {
        '&' | '\u{a0}' => true,
        '<' | '>' => !attribute,
        '"' => attribute,
        _ => false,
    });
    if !needs {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode("Tom &amp; Jerry&#33; &#x263A;"), "Tom & Jerry! \u{263a}");
        assert_eq!(decode("a&nbsp;b"), "a\u{a0}b");
    }

    #[test]
    fn test_unknown_references_are_kept() {
        assert_eq!(decode("AT&T; &bogus; & alone"), "AT&T; &bogus; & alone");
    }

    #[test]
    fn test_escape_is_context_sensitive() {
        assert_eq!(escape_text(r#"1 < 2 & "q""#), r#"1 &lt; 2 &amp; "q""#);
        assert_eq!(escape_attribute(r#"say "hi" <b>"#), "say &quot;hi&quot; <b>");
    }
}
