//! CLI utilities for ferro-mirror
//!
//! Input-line handling for id lists and record output formatting, kept in
//! the library so the binary stays a thin shell over testable functions.

pub mod format;

// Re-export commonly used items
pub use format::{write_failure, write_fasta, write_insd, write_json, write_record, OutputFormat};

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// This is common when files are exported from Windows applications or Excel.
///
/// # Examples
///
/// ```
/// use ferro_mirror::cli::strip_bom;
///
/// assert_eq!(strip_bom("\u{feff}X56734"), "X56734");
/// assert_eq!(strip_bom("X56734"), "X56734");
/// ```
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Strip inline comments from an id line.
///
/// Comments start with `#` and extend to the end of the line.
/// Leading/trailing whitespace is also trimmed.
///
/// # Examples
///
/// ```
/// use ferro_mirror::cli::strip_inline_comment;
///
/// assert_eq!(strip_inline_comment("P12345  # sprot"), "P12345");
/// assert_eq!(strip_inline_comment("P12345"), "P12345");
/// assert_eq!(strip_inline_comment("# full line comment"), "");
/// ```
pub fn strip_inline_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => s[..pos].trim(),
        None => s.trim(),
    }
}

/// Process an input line: trim whitespace, strip BOM (for first line), and strip inline comments.
///
/// Returns None if the line is empty or a comment-only line.
///
/// # Arguments
///
/// * `line` - The input line to process
/// * `is_first_line` - Whether this is the first line of input (for BOM handling).
///   Note: UTF-8 BOM only appears at the beginning of a file, never on subsequent lines,
///   so we intentionally only check for it on the first line.
///
/// # Examples
///
/// ```
/// use ferro_mirror::cli::process_input_line;
///
/// assert_eq!(process_input_line("X56734", false), Some("X56734"));
/// assert_eq!(process_input_line("X56734  # note", false), Some("X56734"));
/// assert_eq!(process_input_line("\u{feff}X56734", true), Some("X56734"));
/// assert_eq!(process_input_line("", false), None);
/// assert_eq!(process_input_line("# comment", false), None);
/// ```
pub fn process_input_line(line: &str, is_first_line: bool) -> Option<&str> {
    let line = line.trim();
    let line = if is_first_line { strip_bom(line) } else { line };
    let line = strip_inline_comment(line);

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
