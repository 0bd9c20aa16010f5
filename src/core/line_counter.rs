use std::{fs, path::Path};

use tracing::debug;

/// Count the lines of a file.
///
/// Best effort: a file that cannot be read counts as 0 lines and never aborts
/// the scan.
pub fn count_lines(path: &Path) -> usize {
    match fs::read(path) {
        Ok(bytes) => count_line_records(&bytes),
        Err(e) => {
            debug!("Cannot read {} for line counting: {}", path.display(), e);
            0
        }
    }
}

/// Count newline-delimited records in raw file content.
///
/// Invalid UTF-8 sequences are dropped before counting. `\n`, `\r\n` and a lone
/// `\r` each end one record, and trailing text without a terminator is a record
/// of its own.
pub fn count_line_records(bytes: &[u8]) -> usize {
    let text = decode_lossy(bytes);

    let mut count = 0;
    let mut chars = text.chars().peekable();
    let mut pending = false;

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                count += 1;
                pending = false;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                count += 1;
                pending = false;
            }
            _ => pending = true,
        }
    }

    if pending { count + 1 } else { count }
}

/// Decode UTF-8, silently dropping invalid byte sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
