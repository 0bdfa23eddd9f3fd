use super::*;
use pretty_assertions::assert_eq;
use crate::nodes::NodeValue;

#[test]
fn plugin_invocations_become_leaves() {
    compare("[{Counter}] x", r#"(domroot (plugin "{Counter}") " x")"#);
}

#[test]
fn plugin_content_is_deferred() {
    let wiki = FakeWiki::new();
    let doc = parse_document("Main", "[{Counter}]", &Options::default(), &wiki.adapters())
        .unwrap();
    let node = doc.root().first_child(doc.arena()).unwrap();
    match doc.value(node) {
        NodeValue::Plugin(p) => {
            assert_eq!(p.invocation, "{Counter}");
            assert_eq!(p.content.evaluate(), "<div>Counter</div>");
        }
        other => panic!("expected a plugin, got {:?}", other),
    }
}

#[test]
fn nested_plugin_brackets() {
    compare(
        "[{Outer body='[{Inner}]'}] after",
        r#"(domroot (plugin "{Outer body='[{Inner}]'}") " after")"#,
    );
}

#[test]
fn failing_plugin() {
    compare(
        "[{Broken}]",
        r#"(domroot (span class="error" "Plugin insertion failed: no such plugin Broken"))"#,
    );
}

#[test]
fn plugins_without_an_executor() {
    let doc = parse_document("Main", "[{Counter}]", &Options::default(), &Adapters::default())
        .unwrap();
    assert_eq!(
        sexpr::to_compact_string(&doc),
        r#"(domroot (span class="error" "Plugin insertion failed: no plugin executor configured"))"#
    );
}

#[test]
fn variables() {
    compare(
        "Page: [{$pagename}]",
        r#"(domroot "Page: " (variable "{$pagename}"))"#,
    );
}

#[test]
fn metadata() {
    let doc = parse_with(
        "[{SET alias='Other Page'}][{SET title=\"On {$pagename}\"}][{SET empty=''}]x",
        &Options::default(),
    );
    assert_eq!(sexpr::to_compact_string(&doc), r#"(domroot "x")"#);
    assert_eq!(
        doc.metadata().iter().collect::<Vec<_>>(),
        [
            (&"alias".to_string(), &"Other Page".to_string()),
            (&"title".to_string(), &"On Main".to_string()),
        ]
    );
}

#[test]
fn invalid_metadata() {
    compare(
        "[{SET broken}]",
        r#"(domroot (span class="error" "Invalid SET: {SET broken}"))"#,
    );
}

#[test]
fn metadata_can_be_disabled() {
    let mut options = Options::default();
    options.extension.metadata = false;
    let doc = parse_with("[{SET a=b}]x", &options);
    assert_eq!(sexpr::to_compact_string(&doc), r#"(domroot "x")"#);
    assert!(doc.metadata().is_empty());
}

#[test]
fn access_rules() {
    let wiki = FakeWiki::new();
    let doc = parse_document(
        "Main",
        "[{ALLOW view Admin}][{DENY edit Guest}]x",
        &Options::default(),
        &wiki.adapters(),
    )
    .unwrap();
    assert_eq!(sexpr::to_compact_string(&doc), r#"(domroot "x")"#);
    assert_eq!(*wiki.rules.borrow(), ["ALLOW view Admin", "DENY edit Guest"]);
}

#[test]
fn invalid_access_rule() {
    compare(
        "[{DENY bogus}]",
        r#"(domroot (span class="error" "Access rule parsing failed: unknown permission bogus"))"#,
    );
}

#[test]
fn access_rules_can_be_disabled() {
    let wiki = FakeWiki::new();
    let mut options = Options::default();
    options.extension.access_rules = false;
    let doc = parse_document("Main", "[{ALLOW view Admin}]", &options, &wiki.adapters()).unwrap();
    assert_eq!(sexpr::to_compact_string(&doc), "(domroot)");
    assert!(wiki.rules.borrow().is_empty());
}

#[test]
fn rules_in_heading_titles_apply_once() {
    let wiki = FakeWiki::new();
    parse_document(
        "Main",
        "!Title [{ALLOW view Admin}]",
        &Options::default(),
        &wiki.adapters(),
    )
    .unwrap();
    assert_eq!(*wiki.rules.borrow(), ["ALLOW view Admin"]);
}
