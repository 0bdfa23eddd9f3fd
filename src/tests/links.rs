use std::sync::Arc;

use super::*;
use pretty_assertions::assert_eq;
use crate::options::LinkMutator;

const OUTLINK: &str = r#"(img class="outlink" src="images/out.png" alt="")"#;

#[test]
fn existing_and_missing_pages() {
    compare(
        "[FrontPage]",
        r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "FrontPage"))"#,
    );
    compare(
        "[NoSuchPage]",
        concat!(
            r#"(domroot (a class="createpage" href="Edit.jsp?page=NoSuchPage" "#,
            r#"title="Create 'NoSuchPage'" "NoSuchPage"))"#,
        ),
    );
}

#[test]
fn link_text_and_target() {
    compare(
        "[the front|FrontPage]",
        r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "the front"))"#,
    );
}

#[test]
fn page_names_are_cleaned() {
    compare(
        "[recent changes|recentChanges]",
        r#"(domroot (a class="wikipage" href="Wiki.jsp?page=RecentChanges" "recent changes"))"#,
    );
}

#[test]
fn external_links() {
    compare(
        "[Acme|http://example.com/]",
        &format!(
            r#"(domroot (a class="external" href="http://example.com/" "Acme") {})"#,
            OUTLINK
        ),
    );

    let mut options = Options::default();
    options.parse.use_outlink_image = false;
    options.parse.use_rel_nofollow = true;
    compare_opts(
        "[Acme|http://example.com/]",
        r#"(domroot (a class="external" href="http://example.com/" rel="nofollow" "Acme"))"#,
        &options,
    );
}

#[test]
fn interwiki_links() {
    compare(
        "[Label|Wiki:RemotePage]",
        &format!(
            r#"(domroot (a class="interwiki" href="http://remote/RemotePage" "Label") {})"#,
            OUTLINK
        ),
    );
    compare(
        "[Here:FrontPage]",
        r#"(domroot (a class="interwiki" href="Wiki.jsp?page=FrontPage" "Here:FrontPage"))"#,
    );
}

#[test]
fn unknown_interwiki_prefix() {
    compare(
        "[Nowhere:Page]",
        r#"(domroot (span class="error" "No InterWiki reference defined for \"Nowhere\""))"#,
    );
}

#[test]
fn footnotes() {
    compare(
        "[#1]",
        r#"(domroot (a class="footnote" name="ref-Main-1" "[#1]"))"#,
    );
    compare(
        "see[1]",
        r##"(domroot "see" (a class="footnoteref" href="#ref-Main-1" "[1]"))"##,
    );
}

#[test]
fn attachments() {
    compare(
        "[report.pdf]",
        concat!(
            r#"(domroot (a class="attachment" href="attach/Main/report.pdf" "report.pdf") "#,
            r#"(a class="infolink" href="PageInfo.jsp?page=Main/report.pdf" "#,
            r#"(img src="images/attachment_small.png" alt="(info)")))"#,
        ),
    );
}

#[test]
fn inline_images() {
    compare(
        "[photo.png]",
        r#"(domroot (img class="inline" src="attach/Main/photo.png" alt="photo.png"))"#,
    );
    compare(
        "[http://x.org/a.PNG]",
        r#"(domroot (img class="inline" src="http://x.org/a.PNG" alt="http://x.org/a.PNG"))"#,
    );
}

#[test]
fn images_linking_elsewhere() {
    compare(
        "[http://x.org/|http://x.org/a.png]",
        concat!(
            r#"(domroot (a class="external" href="http://x.org/" "#,
            r#"(img class="inline" src="http://x.org/a.png" alt="http://x.org/")))"#,
        ),
    );
    compare(
        "[FrontPage|photo.png]",
        concat!(
            r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "#,
            r#"(img class="inline" src="attach/Main/photo.png" alt="FrontPage")))"#,
        ),
    );
}

#[test]
fn inline_images_can_be_disabled() {
    let mut options = Options::default();
    options.extension.inline_images = false;
    compare_opts(
        "[http://x.org/a.png]",
        &format!(
            r#"(domroot (a class="external" href="http://x.org/a.png" "http://x.org/a.png") {})"#,
            OUTLINK
        ),
        &options,
    );
}

#[test]
fn section_links() {
    compare(
        "[FrontPage#Some heading]",
        concat!(
            r#"(domroot (a class="wikipage" "#,
            r#"href="Wiki.jsp?page=FrontPage#section-FrontPage-SomeHeading" "#,
            r#""FrontPage#Some heading"))"#,
        ),
    );
    compare(
        "[Missing#Part]",
        concat!(
            r#"(domroot (a class="createpage" href="Edit.jsp?page=Missing" "#,
            r#"title="Create 'Missing'" "Missing#Part"))"#,
        ),
    );
}

#[test]
fn link_attributes() {
    compare(
        "[Home|FrontPage|title='Go home' class=\"big\" onclick='x()']",
        concat!(
            r#"(domroot (a class="big" href="Wiki.jsp?page=FrontPage" title="Go home" "#,
            r#""Home"))"#,
        ),
    );
}

#[test]
fn malformed_link_attributes() {
    compare(
        "[Home|FrontPage|title]",
        r#"(domroot (span class="error" "Parser failure: expected '=' after attribute \"title\""))"#,
    );
}

#[test]
fn unterminated_link_is_literal() {
    compare("[Foo bar", r#"(domroot "[Foo bar")"#);
    compare("a <[b", r#"(domroot "a &lt;[b")"#);
}

#[test]
fn empty_link_target() {
    compare("[]", r#"(domroot (u ""))"#);
}

#[test]
fn link_text_is_escaped() {
    compare(
        "[<b>|FrontPage]",
        r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "&lt;b&gt;"))"#,
    );
}

#[test]
fn camel_case_links() {
    sexpr_opts!(
        [extension.camel_case_links],
        "See FrontPage and NewPage.",
        concat!(
            r#"(domroot "See " (a class="wikipage" href="Wiki.jsp?page=FrontPage" "FrontPage") "#,
            r#"" and " (a class="createpage" href="Edit.jsp?page=NewPage" "#,
            r#"title="Create 'NewPage'" "NewPage") ".")"#,
        )
    );
    compare("See FrontPage.", r#"(domroot "See FrontPage.")"#);
}

#[test]
fn plain_uris() {
    sexpr_opts!(
        [extension.plain_uris],
        "Go http://example.com/x. Done",
        &format!(
            concat!(
                r#"(domroot "Go " (a class="external" href="http://example.com/x" "#,
                r#""http://example.com/x") {} ". Done")"#,
            ),
            OUTLINK
        )
    );
    sexpr_opts!(
        [extension.plain_uris],
        "pic http://x.org/a.gif",
        r#"(domroot "pic " (img class="inline" src="http://x.org/a.gif" alt="http://x.org/a.gif"))"#
    );
}

#[test]
fn mutator_chains() {
    let mut options = Options::default();
    options
        .hooks
        .local_link
        .push(Arc::new(|s: &str| match s {
            "Alias" => "FrontPage".to_string(),
            _ => s.to_string(),
        }) as Arc<dyn LinkMutator>);
    options
        .hooks
        .link_text
        .push(Arc::new(|s: &str| s.to_uppercase()) as Arc<dyn LinkMutator>);
    options
        .hooks
        .external_link
        .push(Arc::new(|s: &str| s.replace("http:", "https:")) as Arc<dyn LinkMutator>);

    compare_opts(
        "[Alias] [x|http://a.org/]",
        &format!(
            concat!(
                r#"(domroot (a class="wikipage" href="Wiki.jsp?page=FrontPage" "ALIAS") " " "#,
                r#"(a class="external" href="https://a.org/" "X") {})"#,
            ),
            OUTLINK
        ),
        &options,
    );
}

#[test]
fn links_accessor() {
    let doc = parse_with(
        "[FrontPage] [x|http://a.org/] [Nope]",
        &Options::default(),
    );
    assert_eq!(
        doc.links(),
        [
            "Wiki.jsp?page=FrontPage",
            "http://a.org/",
            "Edit.jsp?page=Nope"
        ]
    );
}
