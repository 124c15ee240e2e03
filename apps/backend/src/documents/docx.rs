use std::io::{Cursor, Read};

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part of a DOCX container and flattens it to text.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Unreadable(format!("not a DOCX container: {e}")))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| DocumentError::Unreadable(format!("missing {DOCUMENT_PART}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    Ok(document_xml_to_text(&xml))
}

/// Collects `<w:t>` runs. Paragraph ends and breaks become newlines, tabs stay tabs.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    let mut rest = xml;
    let mut in_text = false;

    while let Some(start) = rest.find('<') {
        if in_text {
            out.push_str(&unescape(&rest[..start]));
        }
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start + 1..start + len];
        rest = &rest[start + len + 1..];

        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");

        match (closing, name) {
            (false, "w:t") => in_text = !self_closing,
            (true, "w:t") => in_text = false,
            (true, "w:p") => out.push('\n'),
            (false, "w:tab") => out.push('\t'),
            (false, "w:br") | (false, "w:cr") => out.push('\n'),
            _ => {}
        }
    }

    out
}

/// Decodes the five predefined XML entities and numeric character references.
/// Anything else is kept literally.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest
            .find(';')
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let hex = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"));
            let code = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
