use rustpython_parser::{Mode, Tok, ast, lexer::lex, parse};

/// 1-based position in a source file. `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub col: usize,
}

/// First syntax error reported by the Python front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonParseError {
    pub position: SourcePosition,
    pub message: String,
}

/// Parse Python source into the statement list of a module.
///
/// On failure only the first error is returned. When a bracket that opens before
/// the parser's error is still open at the end of the token stream, the error
/// points at that bracket: the parser's own error is then a consequence of the
/// missing closer.
pub fn parse_python_source(
    source: &str,
    file_path: &str,
) -> Result<ast::Suite, PythonParseError> {
    match parse(source, Mode::Module, file_path) {
        Ok(ast::Mod::Module(module)) => Ok(module.body),
        Ok(_) => Ok(Vec::new()),
        Err(err) => {
            let offset = usize::from(err.offset);
            if let Some((bracket, bracket_offset)) =
                innermost_unclosed_bracket(source).filter(|&(_, start)| start < offset)
            {
                return Err(PythonParseError {
                    position: position_at(source, bracket_offset),
                    message: format!("'{}' was never closed", bracket),
                });
            }

            Err(PythonParseError {
                position: position_at(source, offset),
                message: err.error.to_string(),
            })
        }
    }
}

/// Map a byte offset to a line/column pair.
///
/// Offsets past the end, or inside a multi-byte character, are clamped to the
/// nearest valid position before them.
pub fn position_at(source: &str, offset: usize) -> SourcePosition {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = source[line_start..offset].chars().count() + 1;

    SourcePosition { line, col }
}

/// Text of the given 1-based line, without its terminator.
pub fn source_line(source: &str, line: usize) -> Option<String> {
    source
        .lines()
        .nth(line.checked_sub(1)?)
        .map(|text| text.trim_end_matches('\r').to_string())
}

/// Find the innermost bracket still open when the token stream ends.
///
/// A lexical error before the end of the file means the token stream is not
/// trustworthy, and no bracket is reported.
fn innermost_unclosed_bracket(source: &str) -> Option<(char, usize)> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let content_end = source.trim_end().len();

    for result in lex(source, Mode::Module) {
        let (tok, range) = match result {
            Ok(spanned) => spanned,
            Err(err) if usize::from(err.location) >= content_end => break,
            Err(_) => return None,
        };
        let start = usize::from(range.start());
        match tok {
            Tok::Lpar => stack.push(('(', start)),
            Tok::Lsqb => stack.push(('[', start)),
            Tok::Lbrace => stack.push(('{', start)),
            Tok::Rpar | Tok::Rsqb | Tok::Rbrace => {
                stack.pop();
            }
            _ => {}
        }
    }

    stack.pop()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_valid_module() {
        let suite = parse_python_source("import os\nprint(os.name)\n", "app.py").unwrap();
        assert_eq!(suite.len(), 2);
    }

    #[test]
    fn test_parse_empty_module() {
        let suite = parse_python_source("", "empty.py").unwrap();
        assert!(suite.is_empty());
    }

    #[test]
    fn test_unclosed_bracket_points_at_bracket() {
        let source = "x = 1\nprint(x\ny = 2\n";
        let err = parse_python_source(source, "broken.py").unwrap_err();

        assert_eq!(err.position, SourcePosition { line: 2, col: 6 });
        assert_eq!(err.message, "'(' was never closed");
    }

    #[test]
    fn test_innermost_bracket_is_reported() {
        let source = "data = {\n    'a': [1, 2,\n";
        let err = parse_python_source(source, "broken.py").unwrap_err();

        assert_eq!(err.position.line, 2);
        assert_eq!(err.message, "'[' was never closed");
    }

    #[test]
    fn test_earlier_error_wins_over_unclosed_bracket() {
        let source = "x = = 1\nprint(\n";
        let err = parse_python_source(source, "broken.py").unwrap_err();

        assert_eq!(err.position.line, 1);
        assert_ne!(err.message, "'(' was never closed");
    }

    #[test]
    fn test_error_line_for_invalid_statement() {
        let source = "a = 1\nb = 2\nc = = 3\nd = 4\n";
        let err = parse_python_source(source, "broken.py").unwrap_err();

        assert_eq!(err.position.line, 3);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_position_at() {
        let source = "ab\ncdé\nf";
        assert_eq!(position_at(source, 0), SourcePosition { line: 1, col: 1 });
        assert_eq!(position_at(source, 4), SourcePosition { line: 2, col: 2 });
        // Byte 6 is the second byte of 'é': clamped back to its start.
        assert_eq!(position_at(source, 6), SourcePosition { line: 2, col: 3 });
        assert_eq!(position_at(source, 7), SourcePosition { line: 2, col: 4 });
        assert_eq!(position_at(source, 100), SourcePosition { line: 3, col: 2 });
    }

    #[test]
    fn test_position_after_trailing_newline() {
        assert_eq!(position_at("a\n", 2), SourcePosition { line: 2, col: 1 });
        assert_eq!(position_at("", 0), SourcePosition { line: 1, col: 1 });
    }

    #[test]
    fn test_source_line() {
        let source = "first\r\nsecond\n";
        assert_eq!(source_line(source, 1), Some("first".to_string()));
        assert_eq!(source_line(source, 2), Some("second".to_string()));
        assert_eq!(source_line(source, 3), None);
        assert_eq!(source_line(source, 0), None);
    }
}
