use std::io::Cursor;

use super::*;
use pretty_assertions::assert_eq;
use crate::{markup_to_text, parse_reader, ParseError, Parser};

#[test]
fn parse_from_a_reader() {
    let wiki = FakeWiki::new();
    let doc = parse_reader(
        "Main",
        Cursor::new("__x__\n[FrontPage]"),
        &Options::default(),
        &wiki.adapters(),
    )
    .unwrap();
    assert_eq!(doc.page_name(), "Main");
    assert_eq!(doc.source(), "__x__\n[FrontPage]");
    assert_eq!(doc.text_content(), "x\nFrontPage");
    assert_eq!(doc.elements("b").len(), 1);
}

#[test]
fn parser_is_single_use() {
    let options = Options::default();
    let parser = Parser::new(
        "Main",
        Cursor::new("''a''"),
        &options,
        Adapters::default(),
    );
    let doc = parser.parse().unwrap();
    assert_eq!(sexpr::to_compact_string(&doc), r#"(domroot (i "a"))"#);
}

#[test]
fn invalid_utf8_is_fatal() {
    let err = parse_reader(
        "Main",
        &b"ok\n\xff\xfe"[..],
        &Options::default(),
        &Adapters::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::Io(_)), "{:?}", err);
}

#[test]
fn pushback_overflow_is_fatal() {
    let mut options = Options::default();
    options.parse.pushback_limit = 16;
    let input = format!("!{}", "x".repeat(100));
    let err = parse_document("Main", &input, &options, &Adapters::default()).unwrap_err();
    assert!(matches!(err, ParseError::PushbackOverflow { limit: 16 }), "{:?}", err);
}

#[test]
fn long_lines_within_the_limit_parse() {
    let input = format!("!{}", "x".repeat(5_000));
    let doc = parse_with(&input, &Options::default());
    assert_eq!(doc.elements("h4").len(), 1);
}

#[test]
fn source_lines_are_recorded() {
    let doc = parse_with("a\n\n__b__\n\n!!c", &Options::default());
    let line_of = |tag: &str| doc.elements(tag)[0].data(doc.arena()).line;
    assert_eq!(line_of("p"), 3);
    assert_eq!(line_of("b"), 3);
    assert_eq!(line_of("h3"), 5);
}

#[test]
fn plain_text() {
    let text = markup_to_text(
        "Main",
        "!!Title\n* __one__\n* ''two''",
        &Options::default(),
        &Adapters::default(),
    )
    .unwrap();
    assert_eq!(text, "Title#\none\ntwo");
}

#[test]
fn options_from_properties_drive_the_parser() {
    let options = Options::from_properties(concat!(
        "markup.camelCaseLinks = true\n",
        "markup.useOutlinkImage = false\n",
        "markup.inlinePattern.1 = *.bmp\n",
    ))
    .unwrap();
    compare_opts(
        "FrontPage [http://x.org/a.png] [http://x.org/b.bmp]",
        concat!(
            r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "FrontPage") " " "#,
            r#"(a class="external" href="http://x.org/a.png" "http://x.org/a.png") " " "#,
            r#"(img class="inline" src="http://x.org/b.bmp" alt="http://x.org/b.bmp"))"#,
        ),
        &options,
    );
}

#[test]
#[cfg(feature = "bon")]
fn builders() {
    let options = Options {
        extension: crate::Extension::builder().camel_case_links(true).build(),
        parse: crate::Parse::builder().use_outlink_image(false).build(),
        ..Options::default()
    };
    assert!(options.extension.camel_case_links);
    assert!(options.extension.inline_images);
    assert_eq!(options.extension.inline_image_patterns.len(), 6);
    assert!(!options.parse.use_outlink_image);
    assert_eq!(options.parse.pushback_limit, 10 * 1024);
}

#[test]
fn documents_are_independent() {
    let options = Options::default();
    let first = parse_with("__open", &options);
    let second = parse_with("plain", &options);
    assert_eq!(sexpr::to_compact_string(&first), r#"(domroot (b "open"))"#);
    assert_eq!(sexpr::to_compact_string(&second), r#"(domroot "plain")"#);
}
