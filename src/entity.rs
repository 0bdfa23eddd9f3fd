//! HTML character references.

use std::char;
use std::cmp::min;

include!(concat!(env!("OUT_DIR"), "/entitynames.rs"));

use entitynames::NAMED_ENTITIES;

// "CounterClockwiseContourIntegral" is the longest name in the table.
const MAX_NAME_LENGTH: usize = 32;
const MAX_DIGITS: usize = 8;

fn lookup(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|ix| NAMED_ENTITIES[ix].1)
}

/// Decode the reference at the start of `text` (just after the `&`).
///
/// Returns the decoded characters and how many bytes of `text` the reference
/// used, including the closing `;`.
fn decode(text: &str) -> Option<(String, usize)> {
    let bytes = text.as_bytes();

    if bytes.first() == Some(&b'#') {
        let (radix, start) = match bytes.get(1) {
            Some(b'x') | Some(b'X') => (16, 2),
            _ => (10, 1),
        };
        let digits = bytes[start..]
            .iter()
            .take_while(|b| (**b as char).is_digit(radix))
            .count();
        if digits == 0 || digits > MAX_DIGITS || bytes.get(start + digits) != Some(&b';') {
            return None;
        }
        let codepoint = u32::from_str_radix(&text[start..start + digits], radix).ok()?;
        let c = match codepoint {
            0 | 0xD800..=0xDFFF => '\u{FFFD}',
            cp => char::from_u32(cp).unwrap_or('\u{FFFD}'),
        };
        return Some((c.to_string(), start + digits + 1));
    }

    let end = min(text.len(), MAX_NAME_LENGTH + 1);
    let semi = bytes[..end].iter().position(|&b| b == b';')?;
    if semi == 0 || !bytes[..semi].iter().all(u8::is_ascii_alphanumeric) {
        return None;
    }
    lookup(&text[..semi]).map(|chars| (chars.to_string(), semi + 1))
}

/// If `text` starts with a well-formed character reference (`&amp;`,
/// `&#38;`, `&#x26;`), its length in bytes.
pub fn reference_len(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('&')?;
    decode(rest).map(|(_, len)| len + 1)
}

/// Replace every well-formed character reference in `text` with the
/// characters it stands for.  Malformed references are left as written.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        match decode(rest) {
            Some((chars, len)) => {
                out.push_str(&chars);
                rest = &rest[len..];
            }
            None => out.push('&'),
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_references() {
        assert_eq!(reference_len("&amp; more"), Some(5));
        assert_eq!(reference_len("&#38;"), Some(5));
        assert_eq!(reference_len("&#x26;x"), Some(6));
        assert_eq!(reference_len("&bogus;"), None);
        assert_eq!(reference_len("& amp;"), None);
        assert_eq!(reference_len("&#;"), None);
        assert_eq!(reference_len("amp;"), None);
    }

    #[test]
    fn unescapes() {
        assert_eq!(unescape_html("a &lt;b&gt; &#106;s &zork; &"), "a <b> js &zork; &");
    }
}
