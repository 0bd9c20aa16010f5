use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, stderr_of, stdout_of};

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::with_file(
        "app/main.py",
        r#"import sys

def main():
    print(len(sys.argv))

main()
"#,
    )?;

    let output = test.check_command().output()?;
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    assert!(stdout.contains("Python files: 1"));
    assert!(stdout.contains("Total lines:  6"));
    assert!(stdout.contains("Issues found: 0"));
    assert!(stdout.contains("Checked 1 file - no syntax or name errors found"));

    Ok(())
}

#[test]
fn test_syntax_error() -> Result<()> {
    let test = CliTest::with_file("broken.py", "x = 1\nprint(x\ny = 2\n")?;

    let output = test.check_command().output()?;
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("error: '(' was never closed  syntax-error"));
    assert!(stdout.contains("--> ./broken.py:2:6"));
    assert!(stdout.contains("2 | print(x"));
    assert!(stdout.contains("Issues found: 1"));

    Ok(())
}

#[test]
fn test_undefined_names() -> Result<()> {
    let test = CliTest::with_file(
        "typo.py",
        r#"def greet(name):
    pritn("hello", name)

greet(datta)
"#,
    )?;

    let output = test.check_command().output()?;
    let stdout = stdout_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Undefined names: datta, name, pritn"));
    assert!(stdout.contains("--> ./typo.py:?"));

    Ok(())
}

#[test]
fn test_one_diagnostic_per_file_in_discovery_order() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("a.py", "def f(:\n    pass\n")?;
    test.write_file("b/c.py", "missing()\n")?;
    test.write_file("b/d.py", "import os\nos.getcwd()\n")?;

    let output = test.check_command().output()?;
    let stdout = stdout_of(&output);

    assert!(stdout.contains("Python files: 3"));
    assert!(stdout.contains("Total lines:  5"));
    assert!(stdout.contains("Issues found: 2"));
    let a_pos = stdout.find("./a.py").unwrap();
    let c_pos = stdout.find("./b/c.py").unwrap();
    assert!(a_pos < c_pos);

    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("ok.py", "print('ok')\n")?;
    test.write_file("bad.py", "lprint('bad')\n")?;

    let output = test.check_command().args(["--format", "json"]).output()?;
    let json: Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["fileCount"], 2);
    assert_eq!(json["totalLines"], 2);
    assert_eq!(json["skippedPaths"], 0);
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["file"], "./bad.py");
    assert_eq!(diagnostics[0]["line"], "?");
    assert_eq!(diagnostics[0]["message"], "Undefined names: lprint");
    assert_eq!(diagnostics[0]["rule"], "undefined-name");

    Ok(())
}

#[test]
fn test_empty_project() -> Result<()> {
    let test = CliTest::with_file("README.md", "# nothing to scan\n")?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("No Python files found"));

    Ok(())
}

#[test]
fn test_prompted_path_is_normalized() -> Result<()> {
    let test = CliTest::with_file("pkg/mod.py", "value = 1\n")?;
    let mut cmd = test.command();
    cmd.arg("check");

    let output = CliTest::run_with_stdin(cmd, "  \"pkg\"  \n")?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("Enter project folder path:"));
    assert!(stdout_of(&output).contains("Python files: 1"));

    Ok(())
}

#[test]
fn test_missing_path() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().args(["check", "does-not-exist"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("does not exist"));

    Ok(())
}

#[test]
fn test_config_ignores() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".pyscanrc.json",
        r#"{
         "ignores": ["**/generated/**"]
     }"#,
    )?;
    test.write_file("src/generated/schema.py", "broken(\n")?;
    test.write_file("src/app.py", "print('hi')\n")?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Python files: 1"));

    Ok(())
}

#[test]
fn test_invalid_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".pyscanrc.json", r#"{ "ignores": ["[unclosed*"] }"#)?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("Invalid glob pattern"));

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;
    let stdout = stdout_of(&output);

    assert!(output.status.success());
    assert!(stdout.contains("check"));
    assert!(stdout.contains("init"));

    Ok(())
}
