//! Handles all user-facing output for the CLI.
//!
//! Trees, token listings, diffs and summaries go to stdout; diagnostics go to
//! stderr through [`diagnostics`](super::diagnostics).

use crate::error::{ArboristError, Result};
use crate::frontend::ParseOutput;
use crate::runtime::{Token, Vocabulary};
use difference::{Changeset, Difference};
use std::io::Write;
use std::path::Path;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use super::diagnostics::color_choice;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints a parse result as pretty JSON.
pub fn print_json(output: &ParseOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ArboristError::Render {
        message: e.to_string(),
    })?;
    println!("{json}");
    Ok(())
}

/// Formats one token per line: position, symbolic name and quoted text.
pub fn format_tokens(tokens: &[Token], vocabulary: &Vocabulary) -> String {
    let mut out = String::new();
    for token in tokens {
        let symbol = vocabulary
            .symbolic_name(token.token_type)
            .map_or_else(|| token.token_type.to_string(), str::to_string);
        out.push_str(&format!(
            "{}:{}\t{}\t{}\n",
            token.line,
            token.column,
            symbol,
            token.error_display()
        ));
    }
    out
}

/// Prints a line diff of two renderings; returns whether they differ.
pub fn print_diff(left: &str, right: &str) -> bool {
    let changeset = Changeset::new(left, right, "\n");
    if changeset.distance == 0 {
        println!("parse trees are identical");
        return false;
    }
    let mut stdout = StandardStream::stdout(color_choice(&std::io::stdout()));
    if write_diff(&mut stdout, &changeset.diffs).is_err() {
        print!("{}", plain_diff(&changeset.diffs));
    }
    true
}

/// Prints the outcome of one file in a `check` run.
pub fn print_check_line(path: &Path, errors: usize) {
    let mut stdout = StandardStream::stdout(color_choice(&std::io::stdout()));
    if write_check_line(&mut stdout, path, errors).is_err() {
        println!("{}", check_line(path, errors));
    }
}

pub fn print_check_summary(files: usize, failed: usize) {
    println!("\nchecked {files} files: {} ok, {failed} with errors", files - failed);
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn check_label(errors: usize) -> (&'static str, Color) {
    if errors == 0 {
        ("ok", Color::Green)
    } else {
        ("FAIL", Color::Red)
    }
}

fn check_detail(path: &Path, errors: usize) -> String {
    if errors == 0 {
        path.display().to_string()
    } else {
        format!("{} ({errors} syntax errors)", path.display())
    }
}

fn check_line(path: &Path, errors: usize) -> String {
    let (label, _) = check_label(errors);
    format!("{label:<4} {}", check_detail(path, errors))
}

fn write_check_line(writer: &mut impl WriteColor, path: &Path, errors: usize) -> std::io::Result<()> {
    let (label, color) = check_label(errors);
    writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(writer, "{label:<4}")?;
    writer.reset()?;
    writeln!(writer, " {}", check_detail(path, errors))
}

fn write_diff(writer: &mut impl WriteColor, diffs: &[Difference]) -> std::io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                writer.reset()?;
                write_lines(writer, ' ', x)?;
            }
            Difference::Add(x) => {
                writer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write_lines(writer, '+', x)?;
            }
            Difference::Rem(x) => {
                writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                write_lines(writer, '-', x)?;
            }
        }
    }
    writer.reset()
}

/// `difference` groups consecutive lines into one chunk; mark each line.
fn write_lines(writer: &mut impl WriteColor, marker: char, chunk: &str) -> std::io::Result<()> {
    for line in chunk.lines() {
        writeln!(writer, "{marker}{line}")?;
    }
    Ok(())
}

fn plain_diff(diffs: &[Difference]) -> String {
    let mut out = String::new();
    for diff in diffs {
        let (marker, chunk) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Add(x) => ('+', x),
            Difference::Rem(x) => ('-', x),
        };
        for line in chunk.lines() {
            out.push(marker);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::calc::{NUMBER, PLUS, VOCABULARY};
    use crate::runtime::eof_token;

    #[test]
    fn test_format_tokens() {
        let tokens = vec![
            Token {
                token_type: NUMBER,
                text: "1".into(),
                line: 1,
                column: 0,
                start: 0,
                stop: 1,
                index: 0,
            },
            Token {
                token_type: PLUS,
                text: "+".into(),
                line: 1,
                column: 2,
                start: 2,
                stop: 3,
                index: 1,
            },
            eof_token("1 +", 1, 3),
        ];
        assert_eq!(
            format_tokens(&tokens, &VOCABULARY),
            "1:0\tNUMBER\t'1'\n1:2\tPLUS\t'+'\n1:3\tEOF\t'<EOF>'\n"
        );
    }

    #[test]
    fn test_check_line_plain_and_colored_agree() {
        let path = Path::new("dir/a.calc");
        assert_eq!(check_line(path, 0), "ok   dir/a.calc");
        assert_eq!(check_line(path, 2), "FAIL dir/a.calc (2 syntax errors)");

        let mut buffer = termcolor::Buffer::no_color();
        write_check_line(&mut buffer, path, 2).unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            "FAIL dir/a.calc (2 syntax errors)\n"
        );
    }

    #[test]
    fn test_plain_diff_marks_every_line() {
        let changeset = Changeset::new("a\nb\nc", "a\nx\nc", "\n");
        assert_eq!(plain_diff(&changeset.diffs), " a\n-b\n+x\n c\n");
    }
}
