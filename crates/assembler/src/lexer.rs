//! Tokenizer for IPPcode23 source text.

/// Header every program must start with, compared case-insensitively.
pub(crate) const HEADER: &str = ".IPPcode23";

/// Tokenize a single line of source text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line. Tokens are separated
/// by ASCII whitespace.
pub(crate) fn tokenize_line(line: &str) -> Vec<&str> {
    let code = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    code.split_ascii_whitespace().collect()
}

/// True if the tokens form exactly the header line.
pub(crate) fn is_header(tokens: &[&str]) -> bool {
    matches!(tokens, [only] if only.eq_ignore_ascii_case(HEADER))
}
