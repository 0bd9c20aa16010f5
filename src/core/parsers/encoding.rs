//! Source decoding, honouring PEP 263 coding declarations.

use std::{borrow::Cow, sync::LazyLock};

use encoding_rs::Encoding;
use regex::bytes::Regex;

use super::python::{SourcePosition, position_at};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

static CODING_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^[ \t\x0c]*#.*?coding[:=][ \t]*([-\w.]+)").unwrap());

/// A first line that lets the declaration move to the second line.
static BLANK_OR_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^[ \t\x0c]*(?:[#\r]|$)").unwrap());

/// Why raw file content is not Python source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub position: SourcePosition,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CodingDeclaration {
    name: String,
    line: usize,
}

/// Decode raw file content the way the interpreter does.
///
/// A leading UTF-8 BOM is stripped. A coding declaration on the first or second
/// line selects the codec; without one the content must be UTF-8.
pub fn decode_python_source(bytes: &[u8]) -> Result<Cow<'_, str>, DecodeError> {
    let (has_bom, body) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (true, rest),
        None => (false, bytes),
    };

    let Some(declaration) = find_coding_declaration(body) else {
        return decode_utf8(body).map(Cow::Borrowed);
    };
    let at_declaration = SourcePosition {
        line: declaration.line,
        col: 1,
    };

    match normalize_codec_name(&declaration.name).as_str() {
        "utf-8" => decode_utf8(body).map(Cow::Borrowed),
        name if has_bom => Err(DecodeError {
            position: at_declaration,
            message: format!("encoding problem: {} with BOM", name),
        }),
        "iso-8859-1" => Ok(Cow::Owned(body.iter().map(|&b| char::from(b)).collect())),
        "ascii" | "us-ascii" => decode_ascii(body).map(Cow::Borrowed),
        name => {
            let encoding = Encoding::for_label(name.as_bytes()).ok_or_else(|| DecodeError {
                position: at_declaration,
                message: format!("unknown encoding: {}", declaration.name),
            })?;
            encoding
                .decode_without_bom_handling_and_without_replacement(body)
                .ok_or_else(|| DecodeError {
                    position: at_declaration,
                    message: format!(
                        "(unicode error) '{}' codec can't decode the source",
                        declaration.name
                    ),
                })
        }
    }
}

fn find_coding_declaration(body: &[u8]) -> Option<CodingDeclaration> {
    let mut lines = body.split(|&b| b == b'\n');

    let first = lines.next()?;
    if let Some(name) = coding_name(first) {
        return Some(CodingDeclaration { name, line: 1 });
    }
    if !BLANK_OR_COMMENT.is_match(first) {
        return None;
    }

    coding_name(lines.next()?).map(|name| CodingDeclaration { name, line: 2 })
}

fn coding_name(line: &[u8]) -> Option<String> {
    let captures = CODING_DECLARATION.captures(line)?;
    Some(String::from_utf8_lossy(&captures[1]).into_owned())
}

/// Fold the spellings the interpreter treats as UTF-8 or Latin-1.
fn normalize_codec_name(name: &str) -> String {
    let name = name.to_ascii_lowercase().replace('_', "-");
    let is = |codec: &str| name == codec || name.starts_with(&format!("{}-", codec));

    if is("utf-8") || name == "utf8" {
        "utf-8".to_string()
    } else if is("latin-1") || is("iso-8859-1") || is("iso-latin-1") || name == "latin1" {
        "iso-8859-1".to_string()
    } else {
        name
    }
}

fn decode_utf8(body: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(body).map_err(|e| codec_error("utf-8", body, e.valid_up_to()))
}

fn decode_ascii(body: &[u8]) -> Result<&str, DecodeError> {
    match body.iter().position(|b| !b.is_ascii()) {
        Some(offset) => Err(codec_error("ascii", body, offset)),
        None => decode_utf8(body),
    }
}

/// Error at the first byte the codec rejects.
fn codec_error(codec: &str, body: &[u8], offset: usize) -> DecodeError {
    let prefix = String::from_utf8_lossy(&body[..offset]);
    DecodeError {
        position: position_at(&prefix, prefix.len()),
        message: format!(
            "(unicode error) '{}' codec can't decode byte 0x{:02x} in position {}",
            codec, body[offset], offset
        ),
    }
}
