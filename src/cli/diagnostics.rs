//! Diagnostic presentation for syntax errors.
//!
//! This module renders collected [`SyntaxError`]s with the source line they point
//! at and a caret under the offending column, in colour when the terminal
//! supports it.

use crate::diagnostics::SyntaxError;
use std::fmt::{self, Display, Formatter};
use std::io::IsTerminal;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

// === Constants ===

/// Number of lines of context to show before the error in code snippets.
const SNIPPET_CONTEXT_LINES: usize = 1;

// === Core Types ===

/// Which stage of the front-end reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lexer => f.write_str("lexer"),
            Stage::Parser => f.write_str("parser"),
        }
    }
}

/// A syntax error together with the source it was found in.
pub struct SyntaxDiagnostic<'a> {
    stage: Stage,
    error: &'a SyntaxError,
    path: &'a Path,
    source: &'a str,
}

impl<'a> SyntaxDiagnostic<'a> {
    pub fn new(stage: Stage, error: &'a SyntaxError, path: &'a Path, source: &'a str) -> Self {
        Self {
            stage,
            error,
            path,
            source,
        }
    }

    fn location(&self) -> String {
        format!(
            "{}:{}:{}",
            self.path.display(),
            self.error.line,
            self.error.column + 1
        )
    }
}

impl Display for SyntaxDiagnostic<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} error: {}", self.stage, self.error)?;
        writeln!(f, "  --> {}", self.location())?;
        if let Some(snippet) = generate_code_snippet(self.source, self.error) {
            write!(f, "{snippet}")?;
        }
        Ok(())
    }
}

// === Formatting Helpers ===

/// Source lines leading up to the error line, followed by a caret line.
fn generate_code_snippet(source: &str, error: &SyntaxError) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let line = *lines.get(error.line.checked_sub(1)?)?;

    let display_start = error.line.saturating_sub(SNIPPET_CONTEXT_LINES).max(1);
    let width = error.line.to_string().len();

    let mut result = String::new();
    for line_num in display_start..=error.line {
        result.push_str(&format!(
            "{:width$} | {}\n",
            line_num,
            lines[line_num - 1],
            width = width
        ));
    }
    result.push_str(&format!("{:width$} | ", "", width = width));
    result.push_str(&pointer_line(line, error.column));
    result.push('\n');
    Some(result)
}

/// Blank out everything before `column` (keeping tabs so the caret lines up) and
/// place a caret under it.
fn pointer_line(line: &str, column: usize) -> String {
    let mut s: String = line
        .chars()
        .take(column)
        .map(|ch| if ch == '\t' { '\t' } else { ' ' })
        .collect();
    let missing = column.saturating_sub(line.chars().count());
    s.extend(std::iter::repeat(' ').take(missing));
    s.push('^');
    s
}

// === Public API ===

/// Prints a diagnostic to standard error with colorization if supported.
pub fn print_diagnostic_to_stderr(diagnostic: &SyntaxDiagnostic) {
    let mut stderr = StandardStream::stderr(color_choice(&std::io::stderr()));
    if print_diagnostic_colored(&mut stderr, diagnostic).is_err() {
        eprintln!("{diagnostic}");
    }
}

/// Colour only when writing to a terminal.
pub fn color_choice(stream: &impl IsTerminal) -> ColorChoice {
    if stream.is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

// === Internal Color Printing ===

fn print_diagnostic_colored(
    writer: &mut impl WriteColor,
    diagnostic: &SyntaxDiagnostic,
) -> std::io::Result<()> {
    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(writer, "{} error", diagnostic.stage)?;
    writer.reset()?;
    writeln!(writer, ": {}", diagnostic.error)?;

    writer.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
    write!(writer, "  -->")?;
    writer.reset()?;
    writeln!(writer, " {}", diagnostic.location())?;

    if let Some(snippet) = generate_code_snippet(diagnostic.source, diagnostic.error) {
        let (body, caret) = snippet
            .trim_end_matches('\n')
            .rsplit_once('\n')
            .unwrap_or(("", snippet.trim_end_matches('\n')));
        if !body.is_empty() {
            writeln!(writer, "{body}")?;
        }
        writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        writeln!(writer, "{caret}")?;
    }

    writer.reset()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(line: usize, column: usize) -> SyntaxError {
        SyntaxError::new(Some("no viable alternative at input '*'".into()), line, column)
    }

    #[test]
    fn test_snippet_points_at_column() {
        let snippet = generate_code_snippet("1 + * 2\n", &error(1, 4)).unwrap();
        assert_eq!(snippet, "1 | 1 + * 2\n  |     ^\n");
    }

    #[test]
    fn test_snippet_includes_previous_line() {
        let snippet = generate_code_snippet("a = 1\nb = )\n", &error(2, 4)).unwrap();
        assert_eq!(snippet, "1 | a = 1\n2 | b = )\n  |     ^\n");
    }

    #[test]
    fn test_caret_past_end_of_line() {
        assert_eq!(pointer_line("(1", 2), "  ^");
        assert_eq!(pointer_line("\tx", 1), "\t^");
    }

    #[test]
    fn test_no_snippet_for_missing_line() {
        assert!(generate_code_snippet("", &error(1, 0)).is_none());
    }

    #[test]
    fn test_display() {
        let err = error(1, 4);
        let diagnostic = SyntaxDiagnostic::new(Stage::Parser, &err, Path::new("a.calc"), "1 + * 2");
        let rendered = diagnostic.to_string();
        assert!(rendered.starts_with("parser error: Line 1:4 no viable alternative at input '*'\n"));
        assert!(rendered.contains("  --> a.calc:1:5\n"));
    }
}
