//! Interactive project path input.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};

const PROMPT: &str = "Enter project folder path: ";

/// Clean up a path typed or pasted by the user.
///
/// Surrounding whitespace and one pair of enclosing double quotes are removed,
/// and Windows separators become `/`.
pub fn normalize_path_input(input: &str) -> String {
    let trimmed = input.trim();
    let unquoted = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unquoted.replace('\\', "/")
}

/// Ask for the project path on stdin.
pub fn prompt_for_path() -> Result<String> {
    prompt_for_path_from(&mut io::stdin().lock(), &mut io::stderr())
}

pub fn prompt_for_path_from<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<String> {
    write!(writer, "{}", PROMPT)?;
    writer.flush()?;

    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read project path")?;
    if read == 0 {
        bail!("No project path given");
    }

    let path = normalize_path_input(&line);
    if path.is_empty() {
        bail!("No project path given");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize_plain_path() {
        assert_eq!(normalize_path_input("  ./project \n"), "./project");
    }

    #[test]
    fn test_normalize_strips_quotes() {
        assert_eq!(
            normalize_path_input("\"C:\\Users\\me\\My Project\""),
            "C:/Users/me/My Project"
        );
    }

    #[test]
    fn test_normalize_keeps_unbalanced_quote() {
        assert_eq!(normalize_path_input("\"project"), "\"project");
        assert_eq!(normalize_path_input("\""), "\"");
    }

    #[test]
    fn test_prompt_reads_one_line() {
        let mut input = Cursor::new("\"src\\app\"\nignored\n");
        let mut output = Vec::new();

        let path = prompt_for_path_from(&mut input, &mut output).unwrap();

        assert_eq!(path, "src/app");
        assert_eq!(String::from_utf8(output).unwrap(), PROMPT);
    }

    #[test]
    fn test_prompt_without_input_fails() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        assert!(prompt_for_path_from(&mut input, &mut output).is_err());
    }
}
