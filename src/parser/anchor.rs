//! Section ids and heading anchors.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rustc_hash::FxHashMap;

use crate::strings::wikify;

/// Characters escaped when a name becomes part of an anchor.
const NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Percent-encode a page or section name.
pub fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, NAME).to_string()
}

/// Anchor ids may not carry `%` or `/`.
fn sanitize(anchor: String) -> String {
    anchor.replace(['%', '/'], "_")
}

/// Hands out section ids, suffixing repeats with `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct SectionCounter {
    seen: FxHashMap<String, usize>,
}

impl SectionCounter {
    /// The section id for a heading whose clean title is `title`.
    pub fn section_id(&mut self, title: &str) -> String {
        let base = encode_name(&wikify(title));
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => base,
            n => format!("{}-{}", base, n),
        }
    }
}

/// The document-unique `id` of a heading.
pub fn heading_anchor(page: &str, section_id: &str) -> String {
    sanitize(format!("section-{}-{}", encode_name(page), section_id))
}

/// The fragment a `[Page#Section]` link points at.
pub fn section_fragment(page: &str, section: &str) -> String {
    sanitize(format!(
        "section-{}",
        encode_name(&format!("{}-{}", page, wikify(section)))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_titles_get_suffixes() {
        let mut counter = SectionCounter::default();
        assert_eq!(counter.section_id("Intro"), "Intro");
        assert_eq!(counter.section_id("intro"), "Intro-2");
        assert_eq!(counter.section_id("Other things"), "OtherThings");
        assert_eq!(counter.section_id("Intro"), "Intro-3");
    }

    #[test]
    fn anchors_drop_escapes() {
        assert_eq!(heading_anchor("Main Page", "Intro"), "section-Main_20Page-Intro");
        assert_eq!(heading_anchor("Dir/Sub", "Ä"), "section-Dir_2FSub-Ä");
        assert_eq!(section_fragment("FrontPage", "my title"), "section-FrontPage-MyTitle");
        assert_eq!(section_fragment("Fö", "x"), "section-F_C3_B6-X");
    }
}
