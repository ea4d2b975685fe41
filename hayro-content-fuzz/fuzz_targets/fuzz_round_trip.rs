#![no_main]

use hayro_content::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let document = Document::new(data);
    assert_eq!(document.serialize(), data);
});
