use super::*;

#[test]
fn preformatted_block() {
    compare(
        "{{{\n<b>&x __not bold__\n}}}",
        r#"(domroot (pre "\n&lt;b&gt;&amp;x __not bold__\n"))"#,
    );
}

#[test]
fn preformatted_escapes_even_with_raw_html() {
    sexpr_opts!(
        [parse.allow_raw_html],
        "{{{<i>}}}",
        r#"(domroot (pre "&lt;i&gt;"))"#
    );
}

#[test]
fn preformatted_closes_paragraph() {
    compare(
        "a\n\nb\n{{{x}}}",
        r#"(domroot "a\n" (p "b\n") "\n" (pre "x"))"#,
    );
}

#[test]
fn inline_code() {
    compare(
        "a {{{[NotALink]}}} b",
        r#"(domroot "a " (span class="inline-code" "[NotALink]") " b")"#,
    );
}

#[test]
fn preformatted_is_not_scanned_for_links() {
    sexpr_opts!(
        [extension.camel_case_links, extension.plain_uris],
        "{{{FrontPage http://example.com/}}}",
        r#"(domroot (pre "FrontPage http://example.com/"))"#
    );
}

#[test]
fn escaped_close_inside_preformatted() {
    compare("{{{a ~}}} b}}}", r#"(domroot (pre "a }}} b"))"#);
    compare("{{{a ~} b}}}", r#"(domroot (pre "a ~} b"))"#);
    compare("{{{a } b}} c}}}", r#"(domroot (pre "a } b}} c"))"#);
}

#[test]
fn stray_close_is_literal() {
    compare("a }}} b", r#"(domroot "a }}} b")"#);
    compare("a } b", r#"(domroot "a } b")"#);
}

#[test]
fn unterminated_preformatted_runs_to_the_end() {
    compare("{{{\n__x", r#"(domroot (pre "\n__x"))"#);
}
