#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use talkify::extractor::{ContentExtractor, ReadabilityExtractor, detect_language};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let base_url = Url::parse("https://example.com/article").unwrap();

    // Must never panic regardless of input
    if let Some(article) = ReadabilityExtractor.extract(&html, &base_url) {
        let _ = article.char_count();
        let _ = detect_language(&article.text);
    }
});
