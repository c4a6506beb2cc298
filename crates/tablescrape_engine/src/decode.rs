use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// How far into the document `<meta>` charset declarations are honoured.
const META_PRESCAN_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> meta charset -> chardetng.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    if let Some(enc) = meta_charset(bytes) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Value of a `charset=` parameter, case-insensitive, quotes stripped.
fn charset_param(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let (key, val) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| val.trim().trim_matches(['"', '\'']).to_string())
    })
}

/// Looks for `<meta charset=..>` or `<meta http-equiv content="..; charset=..">`
/// near the start of the document.
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let end = tag.find('>').unwrap_or(tag.len());
        let tag_body = &tag[..end];
        if let Some(label) = meta_attr(tag_body, "charset")
            .or_else(|| meta_attr(tag_body, "content").and_then(|c| charset_param(&c)))
        {
            if let Some(enc) = Encoding::for_label(label.as_bytes()) {
                // A UTF-16 declaration in an ASCII-compatible prefix is a lie.
                if enc == encoding_rs::UTF_16LE || enc == encoding_rs::UTF_16BE {
                    return Some(encoding_rs::UTF_8);
                }
                return Some(enc);
            }
        }
        rest = &tag[end..];
    }
    None
}

fn meta_attr(tag: &str, name: &str) -> Option<String> {
    let mut search = tag;
    while let Some(pos) = search.find(name) {
        let before_ok = search[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_whitespace() || c == '"' || c == '\'');
        let after = search[pos + name.len()..].trim_start();
        if before_ok {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start();
                let parsed = match value.chars().next() {
                    Some(q @ ('"' | '\'')) => value[1..].split(q).next(),
                    _ => value
                        .split(|c: char| {
                            c.is_ascii_whitespace() || matches!(c, '/' | ';' | '"' | '\'')
                        })
                        .next(),
                };
                return parsed.map(str::to_string).filter(|v| !v.is_empty());
            }
        }
        search = &search[pos + name.len()..];
    }
    None
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, actual, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: actual.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: actual.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_param, meta_charset};

    #[test]
    fn charset_param_is_case_insensitive_and_unquoted() {
        assert_eq!(
            charset_param("text/html; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(charset_param("text/html"), None);
    }

    #[test]
    fn meta_charset_forms_are_recognised() {
        let short = b"<html><head><meta charset=\"windows-1251\"></head>";
        assert_eq!(meta_charset(short).map(|e| e.name()), Some("windows-1251"));

        let http_equiv =
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=shift_jis\">";
        assert_eq!(meta_charset(http_equiv).map(|e| e.name()), Some("Shift_JIS"));

        assert!(meta_charset(b"<meta name=\"viewport\" content=\"width=device-width\">").is_none());
    }
}
