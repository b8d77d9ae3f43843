use std::io::{self, IsTerminal, Write};

use nu_ansi_term::{Color, Style};

use crate::EngineError;

/// Characters shown on each side of the failing instruction.
const WINDOW_CHARS: usize = 32;

/// Render an [`EngineError`] as a one-line message plus a caret context window.
/// If `program` is `Some("brfucky")`, the message is prefixed with "brfucky: ".
pub fn format_engine_error(
    program: Option<&str>,
    code: &str,
    err: &EngineError,
    color: bool,
) -> String {
    let msg = match err {
        EngineError::PointerUnderflow { .. } => "Runtime error: trying to point to non-existent \
            memory (pointer moved left of cell 0)"
            .to_string(),
        EngineError::PointerOverflow { ptr, capacity, .. } => format!(
            "Runtime error: pointer moved past the end of the tape (ptr={ptr}, capacity={capacity})"
        ),
        EngineError::UnmatchedBracket { kind, .. } => {
            format!("Runtime error: unmatched bracket {kind}")
        }
        EngineError::Io { source, .. } => format!("I/O error: {source}"),
    };
    let msg = match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg,
    };
    format_with_context(&msg, code, err.ip(), color)
}

/// Print [`format_engine_error`] to stderr, coloured when stderr is a TTY.
pub fn print_engine_error(program: Option<&str>, code: &str, err: &EngineError) {
    let color = io::stderr().is_terminal();
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "{}", format_engine_error(program, code, err, color));
    let _ = stderr.flush();
}

/// Build a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
fn format_with_context(prefix: &str, code: &str, pos: usize, color: bool) -> String {
    let (head, caret) = if color {
        (Style::new().bold().fg(Color::Red), Style::new().bold().fg(Color::Yellow))
    } else {
        (Style::new(), Style::new())
    };

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char);
    // One column per char, so line breaks and tabs would throw the caret off
    let slice: String = code[start_byte..end_byte]
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    // Caret under the exact position
    let underline = format!("{}^", " ".repeat(pos.saturating_sub(start_char)));

    format!(
        "{} at instruction {pos}\n  {slice}\n  {}\n",
        head.paint(prefix),
        caret.paint(underline)
    )
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}
