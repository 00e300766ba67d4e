use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Helper, Highlighter, Hinter, Result};

/// Helper that extends editor
///
/// Currently only implements `Validator` trait to trigger multiline editing when a `\` is seen at
/// the end of a line.
#[derive(Completer, Helper, Highlighter, Hinter)]
pub struct ReplHelper {}

impl ReplHelper {
    pub fn new() -> Self {
        ReplHelper {}
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        if ctx.input().ends_with('\\') {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Remove `#` comments
///
/// The language has no string literals, so a `#` anywhere on a line starts a
/// comment.
pub fn strip_comments(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    for line in input.lines() {
        match line.find('#') {
            Some(idx) => stripped.push_str(&line[..idx]),
            None => stripped.push_str(line),
        }

        // Replace newlines with spaces (it doesn't matter)
        stripped.push(' ');
    }

    // Remove extra newline
    stripped.pop();

    stripped
}

/// Fixup input so the parser is happy
///
/// Currently removes the multiline escape created by `ReplHelper`.
pub fn fixup_input(input: &str) -> String {
    input.replace("\\\n", " ")
}

#[test]
fn test_strip_comments() {
    let data = vec![
        ("x = 1", "x = 1"),
        ("x = 1 #comment", "x = 1 "),
        ("x = 1# comment", "x = 1"),
        ("# whole line", ""),
        ("x = 1 # one\ny = 2 # two", "x = 1  y = 2 "),
    ];

    for (input, expected) in data {
        assert_eq!(strip_comments(input), expected);
    }
}

#[test]
fn test_fixup_input() {
    assert_eq!(fixup_input("subtotal \\\n+ tax"), "subtotal  + tax");
    assert_eq!(fixup_input("subtotal \\ \n+ tax"), "subtotal \\ \n+ tax");
    assert_eq!(fixup_input("x = 1"), "x = 1");
}
