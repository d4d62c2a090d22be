//! String literal decoding and evaluation directives.

use crate::errors::{invalid_string, EvalError};

/// Decode a raw string token, quotes included.
///
/// - `@"..."`: verbatim, `""` stands for one quote.
/// - `"..."`: backslash escapes `\a \b \f \n \r \t \v \\ \" \'`,
///   `\u:XXXX` (four hex digits), `\x:H..` (one to four hex digits) and
///   `\NNN` (one to three octal digits). Any other escaped character
///   stands for itself.
pub fn decode(raw: &str) -> Result<String, EvalError> {
    if let Some(body) = raw.strip_prefix("@\"") {
        let body = body
            .strip_suffix('"')
            .ok_or_else(|| invalid_string("unterminated verbatim string"))?;
        return Ok(body.replace("\"\"", "\""));
    }
    let body = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| invalid_string("missing quotes"))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| invalid_string("dangling escape"))?;
                match escaped {
                    'a' | 'A' => out.push('\u{7}'),
                    'b' | 'B' => out.push('\u{8}'),
                    'f' | 'F' => out.push('\u{c}'),
                    'n' | 'N' => out.push('\n'),
                    'r' | 'R' => out.push('\r'),
                    't' | 'T' => out.push('\t'),
                    'v' | 'V' => out.push('\u{b}'),
                    'u' | 'x' => {
                        if chars.next() != Some(':') {
                            return Err(invalid_string("invalid escape sequence"));
                        }
                        let mut digits = String::new();
                        while digits.len() < 4 {
                            match chars.peek() {
                                Some(d) if d.is_ascii_hexdigit() => {
                                    digits.push(*d);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        if digits.is_empty() || (escaped == 'u' && digits.len() != 4) {
                            return Err(invalid_string("invalid escape sequence"));
                        }
                        out.push(code_point(&digits, 16)?);
                    }
                    '0'..='7' => {
                        let mut digits = String::from(escaped);
                        while digits.len() < 3 {
                            match chars.peek() {
                                Some(d @ '0'..='7') => {
                                    digits.push(*d);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        out.push(code_point(&digits, 8)?);
                    }
                    other => out.push(other),
                }
            }
            '"' => return Err(invalid_string("unexpected quote in string")),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn code_point(digits: &str, radix: u32) -> Result<char, EvalError> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| invalid_string("invalid escape sequence"))
}

/// An evaluator setting switched by a string literal statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `"@@TYPESAFETY ON|OFF"`
    TypeSafety(bool),
    /// `"@@LAZYINVOKATION ON|OFF"`: dispatch plan caching.
    InlineCache(bool),
}

impl Directive {
    /// Recognize a directive in decoded literal text (case-insensitive,
    /// surrounding whitespace ignored).
    pub fn parse(text: &str) -> Option<Directive> {
        let mut words = text.split_whitespace();
        let (Some(name), Some(switch), None) = (words.next(), words.next(), words.next()) else {
            return None;
        };
        let on = if switch.eq_ignore_ascii_case("on") {
            true
        } else if switch.eq_ignore_ascii_case("off") {
            false
        } else {
            return None;
        };
        if name.eq_ignore_ascii_case("@@typesafety") {
            Some(Directive::TypeSafety(on))
        } else if name.eq_ignore_ascii_case("@@lazyinvokation") {
            Some(Directive::InlineCache(on))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests;
