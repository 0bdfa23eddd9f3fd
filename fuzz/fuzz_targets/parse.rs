#![no_main]
use libfuzzer_sys::fuzz_target;
use wikitree::{parse_document, Adapters, Options};

fuzz_target!(|s: &str| {
    let _ = parse_document("Main", s, &Options::default(), &Adapters::default());
});
