//! `\DDD` escape sequences in string literals.
//!
//! A backslash followed by exactly three decimal digits stands for the
//! character with that code point. Decoding is a single left-to-right pass;
//! a decoded backslash (`\092`) is never re-examined.

use crate::error::LoadError;

/// Decode every `\DDD` escape in `raw`.
///
/// Fails if a backslash is not followed by three ASCII digits, or if the
/// code point is not a Unicode scalar value.
pub fn decode(raw: &str) -> Result<String, LoadError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code = 0u32;
        for _ in 0..3 {
            let digit = chars
                .next()
                .and_then(|d| d.to_digit(10))
                .ok_or_else(|| LoadError::InvalidEscape(raw.to_string()))?;
            code = code * 10 + digit;
        }
        let decoded = char::from_u32(code).ok_or_else(|| LoadError::InvalidEscape(raw.to_string()))?;
        out.push(decoded);
    }

    Ok(out)
}

/// Encode `text` so it survives as a single whitespace-free source token.
///
/// ASCII whitespace, ASCII control characters, `#` and `\` become `\DDD`;
/// everything else is kept verbatim.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if needs_escape(c) {
            out.push_str(&format!("\\{:03}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn needs_escape(c: char) -> bool {
    c.is_ascii_whitespace() || c.is_ascii_control() || c == '#' || c == '\\'
}
