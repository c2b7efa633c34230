//! Cyclomatic complexity estimate for submitted solutions.
//!
//! Starts at 1 and adds one per branching construct: `if`, `for`, `while`,
//! `case`, `catch` (whole words), `&&`, `||` and `?`. Before counting, `//`
//! and `/* */` comments are dropped and `"..."` / `'...'` literals are
//! blanked. An opener without a close swallows the rest of the input.
//!
//! This pass is C-family only: `#` lines (`#if`) and backticks are ordinary
//! code here, unlike in the display lexer.

use serde::Serialize;

const BRANCH_WORDS: &[&str] = &["if", "for", "while", "case", "catch"];

/// Breakdown of a complexity estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplexityReport {
    pub complexity: u32,
    /// `if`/`for`/`while`/`case`/`catch` occurrences
    pub branches: u32,
    /// `&&` and `||` occurrences
    pub logical_ops: u32,
    /// `?` occurrences
    pub ternaries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
}

/// Code with comments removed and literal contents replaced by spaces.
fn strip_comments_and_strings(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut region = Region::Code;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match region {
            Region::LineComment => {
                if c == '\n' {
                    region = Region::Code;
                    out.push('\n');
                }
            }
            Region::BlockComment => {
                if c == '*' && next == Some('/') {
                    chars.next();
                    region = Region::Code;
                }
            }
            Region::Quoted(quote) => {
                if c == '\\' && next.is_some() {
                    chars.next();
                } else if c == quote {
                    region = Region::Code;
                }
                out.push(' ');
            }
            Region::Code => match (c, next) {
                ('/', Some('/')) => {
                    chars.next();
                    region = Region::LineComment;
                }
                ('/', Some('*')) => {
                    chars.next();
                    region = Region::BlockComment;
                }
                ('"' | '\'', _) => {
                    region = Region::Quoted(c);
                    out.push(' ');
                }
                _ => out.push(c),
            },
        }
    }
    out
}

/// Analyze `code`. Blank input has complexity 1.
pub fn analyze(code: &str) -> ComplexityReport {
    let mut report = ComplexityReport {
        complexity: 1,
        ..ComplexityReport::default()
    };
    if code.trim().is_empty() {
        return report;
    }

    let sanitized = strip_comments_and_strings(code);
    report.branches = sanitized
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| BRANCH_WORDS.contains(word))
        .count() as u32;
    report.logical_ops =
        (sanitized.matches("&&").count() + sanitized.matches("||").count()) as u32;
    report.ternaries = sanitized.matches('?').count() as u32;

    report.complexity += report.branches + report.logical_ops + report.ternaries;
    report
}

/// Complexity number only.
pub fn cyclomatic_complexity(code: &str) -> u32 {
    analyze(code).complexity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_is_one() {
        assert_eq!(cyclomatic_complexity(""), 1);
        assert_eq!(cyclomatic_complexity("   \n"), 1);
    }

    #[test]
    fn single_if() {
        assert_eq!(cyclomatic_complexity("if (a > b) { return a; }"), 2);
    }

    #[test]
    fn loops_count() {
        let code = "for (int i = 0; i < n; i++) {\n    while (true) {\n        break;\n    }\n}\n";
        assert_eq!(cyclomatic_complexity(code), 3);
    }

    #[test]
    fn switch_cases_count() {
        let code = "switch(value) {\n    case 1 -> {}\n    case 2 -> {}\n}\n";
        assert_eq!(cyclomatic_complexity(code), 3);
    }

    #[test]
    fn logical_operators_count() {
        let report = analyze("if (a && b || c) { return 1; }");
        assert_eq!(report.complexity, 4);
        assert_eq!(report.branches, 1);
        assert_eq!(report.logical_ops, 2);
    }

    #[test]
    fn ternary_counts() {
        let report = analyze("int x = condition ? 1 : 2;");
        assert_eq!(report.complexity, 2);
        assert_eq!(report.ternaries, 1);
    }

    #[test]
    fn catch_counts() {
        let code = "try {\n    risky();\n} catch (Exception ex) {\n    handle();\n}\n";
        assert_eq!(cyclomatic_complexity(code), 2);
    }

    #[test]
    fn ignores_comments() {
        let code = "// if inside comment\n/*\n    while loop comment\n*/\nint x = 0;\n";
        assert_eq!(cyclomatic_complexity(code), 1);
    }

    #[test]
    fn ignores_strings() {
        assert_eq!(
            cyclomatic_complexity("String text = \"if for while && ?\";"),
            1
        );
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        assert_eq!(
            cyclomatic_complexity("int x = 0; /* TODO if (a) { while (b) {} }"),
            1
        );
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        assert_eq!(cyclomatic_complexity("String s = \"if for while"), 1);
        assert_eq!(cyclomatic_complexity("char c = 'x; if (a) {}"), 1);
    }

    #[test]
    fn code_after_closed_comment_still_counts() {
        assert_eq!(cyclomatic_complexity("/* if */ if (a) {} // while\nfor (;;) {}"), 3);
    }

    #[test]
    fn preprocessor_and_backticks_are_code() {
        assert_eq!(cyclomatic_complexity("#if DEBUG\nlog();\n#endif"), 2);
        assert_eq!(cyclomatic_complexity("s = `if`"), 2);
    }

    #[test]
    fn stripping_blanks_literals_and_drops_comments() {
        assert_eq!(
            strip_comments_and_strings("a \"b\\\"c\" d // e\nf /* g */h"),
            "a       d \nf h"
        );
    }

    #[test]
    fn aggregates_everything() {
        let code = "public int compute(int a, int b) {\n    if (a > b && b > 0) {\n        return a;\n    } else if (a == b || b == 0) {\n        return b;\n    }\n    return a > b ? a : b;\n}\n";
        assert_eq!(cyclomatic_complexity(code), 6);
    }
}
