use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageResponse},
};
use chrono::Utc;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use url::Url;

/// Only the head of a document is scanned for `<meta>` charset declarations.
const META_SCAN_BYTES: usize = 4096;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Turn a raw successful response into a decoded `PageResponse`.
pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: &[u8],
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let charset = detect_charset(content_type, body_bytes);
    let body_utf8 = decode_to_utf8(body_bytes, charset)?;

    Ok(PageResponse {
        url_final,
        status,
        content_type: content_type.to_string(),
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}

/// Header declaration wins, then `<meta charset>`, then the http-equiv form,
/// then a chardetng guess over the document head.
fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    if let Some(charset) = charset_from(&CHARSET_REGEX, content_type) {
        return charset;
    }

    let head = &body_bytes[..body_bytes.len().min(META_SCAN_BYTES)];
    let head_str = String::from_utf8_lossy(head);

    for regex in [&*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(charset) = charset_from(regex, &head_str) {
            return charset;
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, head.len() == body_bytes.len());
    Charset::from_encoding(detector.guess(None, true))
}

fn charset_from(regex: &Regex, haystack: &str) -> Option<Charset> {
    regex
        .captures(haystack)
        .and_then(|captures| captures.get(1))
        .and_then(|label| Charset::from_label(label.as_str()))
}

fn decode_to_utf8(body_bytes: &[u8], charset: Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "failed to decode content as {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_charset_from_content_type() {
        let body = b"<html><head><title>Test</title></head></html>";
        let charset = detect_charset("text/html; charset=utf-8", body);
        assert_eq!(charset.encoding(), encoding_rs::UTF_8);
    }

    #[test]
    fn test_detect_charset_from_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";
        let charset = detect_charset("text/html", body);
        // WHATWG maps ISO-8859-1 onto its superset windows-1252
        assert_eq!(charset.encoding(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_detect_charset_from_meta_http_equiv() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"><title>Test</title></head></html>";
        let charset = detect_charset("text/html", body);
        assert_eq!(charset.encoding(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_decode_latin1_body() {
        let body = b"caf\xe9";
        let decoded = decode_to_utf8(body, Charset::from_encoding(encoding_rs::WINDOWS_1252)).unwrap();
        assert_eq!(decoded, "café");
    }

    #[test]
    fn test_invalid_utf8_is_a_charset_error() {
        let body = b"abc \xff def";
        let result = decode_to_utf8(body, Charset::default());
        assert!(matches!(result, Err(FetchError::Charset(_))));
    }

    #[test]
    fn test_process_response_keeps_final_url() {
        let url = Url::parse("https://example.com/final").unwrap();
        let page = process_response(
            url.clone(),
            StatusCode::OK,
            "Hello, 世界!".as_bytes(),
            "text/html; charset=utf-8",
        )
        .unwrap();
        assert_eq!(page.url_final, url);
        assert_eq!(page.body_utf8, "Hello, 世界!");
        assert_eq!(page.charset.name(), "UTF-8");
    }
}
