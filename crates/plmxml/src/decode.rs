// Turns raw file bytes into text, honouring the encoding declared in the
// XML prolog. roxmltree only accepts `&str`, so non UTF-8 documents are
// transcoded up front.

use std::borrow::Cow;

use quick_xml::events::BytesDecl;

use crate::ParseError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

pub fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let (body, bom_label) = if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        (rest, Some("utf-8"))
    } else if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        (rest, Some("utf-16le"))
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        (rest, Some("utf-16be"))
    } else {
        (bytes, None)
    };

    if body.iter().all(|b| b.is_ascii_whitespace() || *b == 0) {
        return Err(ParseError::EmptyDocument);
    }

    // A byte order mark beats whatever the declaration claims
    let label = match bom_label {
        Some(label) => Some(label.to_string()),
        None => declared_encoding(body),
    };

    match label {
        None => utf8(body),
        Some(label) if is_utf8_label(&label) => utf8(body),
        Some(label) => {
            let decl = BytesDecl::new("1.0", Some(label.as_str()), None);
            let encoding = decl
                .encoder()
                .ok_or_else(|| ParseError::Encoding(format!("unsupported encoding '{label}'")))?;
            quick_xml::encoding::decode(body, encoding)
                .map_err(|err| ParseError::Encoding(format!("cannot decode as {label}: {err}")))
        }
    }
}

fn utf8(body: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    std::str::from_utf8(body)
        .map(Cow::Borrowed)
        .map_err(|err| ParseError::Encoding(format!("invalid UTF-8: {err}")))
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

/// Read `encoding="..."` from the XML declaration, if there is one
///
/// The declaration is ASCII in every ASCII-compatible encoding, which is
/// all that can be declared without a byte order mark in practice.
fn declared_encoding(body: &[u8]) -> Option<String> {
    let start = body.iter().position(|b| !b.is_ascii_whitespace())?;
    let body = &body[start..];
    if !body.starts_with(b"<?xml") {
        return None;
    }
    let end = body.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&body[..end]).ok()?;

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let close = value.find(quote)?;
    Some(value[..close].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_is_borrowed() {
        let xml = br#"<?xml version="1.0"?><PLMXML/>"#;
        let text = decode_document(xml).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, r#"<?xml version="1.0"?><PLMXML/>"#);
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<PLMXML/>");
        assert_eq!(decode_document(&bytes).unwrap(), "<PLMXML/>");
    }

    #[test]
    fn honours_declared_latin1() {
        let mut bytes =
            br#"<?xml version="1.0" encoding="ISO-8859-1"?><PLMXML author=""#.to_vec();
        bytes.push(0xE9); // e acute
        bytes.extend_from_slice(br#""/>"#);
        let text = decode_document(&bytes).unwrap();
        assert!(text.contains("author=\"\u{e9}\""));
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let mut bytes = UTF16_LE_BOM.to_vec();
        for unit in "<PLMXML/>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_document(&bytes).unwrap(), "<PLMXML/>");
    }

    #[test]
    fn rejects_unknown_label() {
        let xml = br#"<?xml version="1.0" encoding="x-klingon"?><PLMXML/>"#;
        assert!(matches!(
            decode_document(xml),
            Err(ParseError::Encoding(_))
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let xml = b"<PLMXML name=\"\xFF\"/>";
        assert!(matches!(
            decode_document(xml),
            Err(ParseError::Encoding(_))
        ));
    }

    #[test]
    fn empty_and_blank_documents() {
        assert!(matches!(decode_document(b""), Err(ParseError::EmptyDocument)));
        assert!(matches!(
            decode_document(b"  \n\t "),
            Err(ParseError::EmptyDocument)
        ));
    }

    #[test]
    fn reads_single_quoted_label() {
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding='windows-1252'?><a/>"),
            Some("windows-1252".to_string())
        );
        assert_eq!(declared_encoding(b"<a/>"), None);
    }
}
