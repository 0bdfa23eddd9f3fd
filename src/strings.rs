use unicode_categories::UnicodeCategories;

use crate::entity;

/// Characters kept by [`clean_link`] besides letters and digits.
const PUNCTUATION_CHARS_ALLOWED: &str = " ()&+,-=._$";

/// Characters kept by [`wikify`] besides letters and digits.
const WIKIFY_CHARS_ALLOWED: &str = "._";

/// Escape `<`, `>` and `&` for inclusion in markup.
///
/// With `keep_references`, an `&` that already starts a well-formed character
/// reference is left alone.
pub fn escape_html(text: &str, keep_references: bool) -> String {
    let matcher = jetscii::bytes!(b'<', b'>', b'&');
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut ix = 0;

    while let Some(offset) = matcher.find(&bytes[ix..]) {
        let at = ix + offset;
        out.push_str(&text[ix..at]);
        match bytes[at] {
            b'<' => out.push_str("&lt;"),
            b'>' => out.push_str("&gt;"),
            _ if keep_references && entity::reference_len(&text[at..]).is_some() => out.push('&'),
            _ => out.push_str("&amp;"),
        }
        ix = at + 1;
    }
    out.push_str(&text[ix..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_letter() || c.is_number()
}

fn clean(link: &str, allowed: &str) -> String {
    let mut out = String::with_capacity(link.len());
    let mut word_start = true;
    let mut was_space = false;

    for c in link.trim().chars() {
        if c.is_whitespace() {
            if was_space {
                continue;
            }
            was_space = true;
        } else {
            was_space = false;
        }

        if is_word_char(c) || allowed.contains(c) {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            word_start = false;
        } else {
            word_start = true;
        }
    }
    out
}

/// Normalise a page link: trim, collapse whitespace, drop characters other
/// than letters, digits and ` ()&+,-=._$`, and capitalise the first
/// character and any character following a dropped one.
///
/// ```
/// # use wikitree::strings::clean_link;
/// assert_eq!(clean_link("  main   page "), "Main page");
/// assert_eq!(clean_link("what?now"), "WhatNow");
/// ```
pub fn clean_link(link: &str) -> String {
    clean(link, PUNCTUATION_CHARS_ALLOWED)
}

/// Turn free text into a WikiName: every run of characters other than
/// letters, digits, `.` and `_` becomes a word boundary, and each word is
/// capitalised.
///
/// ```
/// # use wikitree::strings::wikify;
/// assert_eq!(wikify("my first heading!"), "MyFirstHeading");
/// ```
pub fn wikify(text: &str) -> String {
    clean(text, WIKIFY_CHARS_ALLOWED)
}

/// Whether `s` is a non-empty run of ASCII digits.
pub fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Whether the CSS `style` tries to smuggle in script.  References are
/// decoded, whitespace ignored and case folded before checking.
pub fn contains_javascript(style: &str) -> bool {
    let decoded = entity::unescape_html(style);
    let squeezed: String = decoded.chars().filter(|c| !c.is_whitespace()).collect();
    caseless::default_case_fold_str(&squeezed).contains("javascript:")
}
