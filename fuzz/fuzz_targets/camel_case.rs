#![no_main]
use libfuzzer_sys::fuzz_target;
use wikitree::{parse_document, Adapters, Options};

fuzz_target!(|s: &str| {
    let mut options = Options::default();
    options.extension.camel_case_links = true;
    options.extension.plain_uris = true;
    options.parse.allow_raw_html = true;
    let _ = parse_document("Main", s, &options, &Adapters::default());
});
