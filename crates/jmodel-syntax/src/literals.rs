//! Decoding of Java literal tokens into values.

use std::ops::Range;

use crate::ast::LiteralKind;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LiteralError {
    pub message: String,
    /// Byte range within the literal text (not file offsets).
    pub span: Range<usize>,
}

fn err(message: impl Into<String>, span: Range<usize>) -> LiteralError {
    LiteralError {
        message: message.into(),
        span,
    }
}

/// Decodes the value of a literal token. `true`, `false` and `null` carry no payload here.
pub fn parse_literal(kind: LiteralKind, text: &str) -> Result<LiteralValue, LiteralError> {
    match kind {
        LiteralKind::Int => Ok(LiteralValue::Int(parse_int_literal(text)?)),
        LiteralKind::Long => Ok(LiteralValue::Long(parse_long_literal(text)?)),
        LiteralKind::Float => Ok(LiteralValue::Float(parse_float_literal(text)?)),
        LiteralKind::Double => Ok(LiteralValue::Double(parse_double_literal(text)?)),
        LiteralKind::Char => Ok(LiteralValue::Char(unescape_char_literal(text)?)),
        LiteralKind::String => Ok(LiteralValue::String(unescape_string_literal(text)?)),
        LiteralKind::TextBlock => Ok(LiteralValue::String(unescape_text_block(text)?)),
        LiteralKind::True | LiteralKind::False | LiteralKind::Null => Err(err(
            format!("no literal value for {kind:?}"),
            0..text.len(),
        )),
    }
}

/// Parses an `int` literal. `2147483648` is accepted and wraps to `i32::MIN` so that a
/// negated occurrence folds to the right value.
pub fn parse_int_literal(text: &str) -> Result<i32, LiteralError> {
    if text.ends_with(['l', 'L']) {
        return Err(err("int literal must not have `L` suffix", 0..text.len()));
    }
    let (value, decimal) = parse_integer(text, 32)?;
    if decimal && value > 1 << 31 {
        return Err(err("integer literal is out of range", 0..text.len()));
    }
    Ok(value as u32 as i32)
}

/// Parses a `long` literal including its `L` suffix.
pub fn parse_long_literal(text: &str) -> Result<i64, LiteralError> {
    let Some(digits) = text.strip_suffix(['l', 'L']) else {
        return Err(err("long literal is missing `L` suffix", 0..text.len()));
    };
    let (value, decimal) = parse_integer(digits, 64)?;
    if decimal && value > 1 << 63 {
        return Err(err("integer literal is out of range", 0..text.len()));
    }
    Ok(value as u64 as i64)
}

/// Returns the magnitude and whether the literal was decimal.
fn parse_integer(text: &str, bits: u32) -> Result<(u128, bool), LiteralError> {
    if text.is_empty() {
        return Err(err("empty integer literal", 0..0));
    }
    if text.starts_with('_') || text.ends_with('_') {
        return Err(err("underscore at the edge of a numeric literal", 0..text.len()));
    }

    let lower = text.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(err("missing digits", 0..text.len()));
    }

    let mut value: u128 = 0;
    for (idx, c) in digits.chars().enumerate() {
        let digit = c
            .to_digit(radix)
            .ok_or_else(|| err(format!("invalid digit `{c}`"), idx..idx + 1))?;
        value = value * radix as u128 + digit as u128;
        if value > u64::MAX as u128 {
            return Err(err("integer literal is out of range", 0..text.len()));
        }
    }

    if radix != 10 && value >> bits != 0 {
        return Err(err("integer literal is out of range", 0..text.len()));
    }
    Ok((value, radix == 10))
}

pub fn parse_float_literal(text: &str) -> Result<f32, LiteralError> {
    let main = text.strip_suffix(['f', 'F']).unwrap_or(text);
    let value = parse_floating(main)?;
    let narrowed = value as f32;
    if narrowed.is_infinite() {
        return Err(err("floating-point literal is out of range", 0..text.len()));
    }
    Ok(narrowed)
}

pub fn parse_double_literal(text: &str) -> Result<f64, LiteralError> {
    let main = text.strip_suffix(['d', 'D']).unwrap_or(text);
    parse_floating(main)
}

fn parse_floating(text: &str) -> Result<f64, LiteralError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let value = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => parse_hex_floating(hex).ok_or_else(|| err("malformed hex floating literal", 0..text.len()))?,
        None => cleaned
            .parse::<f64>()
            .map_err(|_| err("malformed floating-point literal", 0..text.len()))?,
    };
    if value.is_infinite() {
        return Err(err("floating-point literal is out of range", 0..text.len()));
    }
    Ok(value)
}

/// `h.hhhp±d` without the `0x` prefix.
fn parse_hex_floating(text: &str) -> Option<f64> {
    let (mantissa, exponent) = text.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let mut value = 0f64;
    for c in whole.chars().chain(fraction.chars()) {
        value = value * 16.0 + c.to_digit(16)? as f64;
    }
    let shift = exponent - 4 * fraction.len() as i32;
    Some(value * 2f64.powi(shift))
}

pub fn unescape_char_literal(text: &str) -> Result<char, LiteralError> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|inner| !inner.is_empty())
        .ok_or_else(|| err("invalid char literal", 0..text.len()))?;
    let decoded = unescape(inner, 1)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.len_utf16() == 1 => Ok(c),
        _ => Err(err("char literal must contain exactly one character", 0..text.len())),
    }
}

pub fn unescape_string_literal(text: &str) -> Result<String, LiteralError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| err("invalid string literal", 0..text.len()))?;
    unescape(inner, 1)
}

/// Decodes a text block: strips incidental indentation and trailing spaces, then processes
/// escapes (including `\<newline>` and `\s`).
pub fn unescape_text_block(text: &str) -> Result<String, LiteralError> {
    let inner = text
        .strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
        .ok_or_else(|| err("invalid text block literal", 0..text.len()))?;
    let Some((opening, content)) = inner.split_once('\n') else {
        return Err(err("missing line terminator after opening delimiter", 0..text.len()));
    };
    if !opening.trim().is_empty() {
        return Err(err("text block must start on a new line", 3..3 + opening.len()));
    }

    let content = content.replace("\r\n", "\n");
    let lines: Vec<&str> = content.split('\n').collect();
    let last = lines.len() - 1;
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| *idx == last || !line.trim().is_empty())
        .map(|(_, line)| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut stripped = String::new();
    for (idx, line) in lines.iter().enumerate() {
        let body = if line.len() >= indent { &line[indent..] } else { "" };
        let body = body.trim_end_matches([' ', '\t']);
        stripped.push_str(body);
        if idx != last {
            stripped.push('\n');
        }
    }

    unescape(&stripped, 3)
}

fn unescape(text: &str, offset: usize) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(text.len());
    let mut pending_high: Option<u16> = None;
    let mut chars = text.char_indices().peekable();

    let push_unit = |out: &mut String, unit: u16, pending: &mut Option<u16>| {
        match (*pending, unit) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let c = 0x10000 + (((high as u32) - 0xD800) << 10) + (unit as u32 - 0xDC00);
                out.push(char::from_u32(c).unwrap_or('\u{FFFD}'));
                *pending = None;
            }
            (_, 0xD800..=0xDBFF) => *pending = Some(unit),
            _ => {
                out.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
                *pending = None;
            }
        }
    };

    while let Some((idx, c)) = chars.next() {
        if c != '\\' {
            if pending_high.take().is_some() {
                out.push('\u{FFFD}');
            }
            out.push(c);
            continue;
        }
        let start = offset + idx;
        let Some((_, escape)) = chars.next() else {
            return Err(err("unterminated escape sequence", start..start + 1));
        };
        let decoded = match escape {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            's' => ' ',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '\n' => continue,
            'u' => {
                while chars.peek().is_some_and(|(_, c)| *c == 'u') {
                    chars.next();
                }
                let mut unit = 0u32;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16))
                        .ok_or_else(|| err("invalid unicode escape", start..start + 2))?;
                    unit = unit * 16 + digit;
                }
                push_unit(&mut out, unit as u16, &mut pending_high);
                continue;
            }
            '0'..='7' => {
                let max_len = if escape <= '3' { 3 } else { 2 };
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 1..max_len {
                    match chars.peek().and_then(|(_, c)| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value).unwrap_or('\u{FFFD}')
            }
            other => {
                return Err(err(
                    format!("invalid escape sequence `\\{other}`"),
                    start..start + 1 + other.len_utf8(),
                ))
            }
        };
        if pending_high.take().is_some() {
            out.push('\u{FFFD}');
        }
        out.push(decoded);
    }
    if pending_high.is_some() {
        out.push('\u{FFFD}');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_literals_in_all_radixes() {
        assert_eq!(parse_int_literal("1_000").unwrap(), 1000);
        assert_eq!(parse_int_literal("0x7fff_ffff").unwrap(), i32::MAX);
        assert_eq!(parse_int_literal("0xFFFFFFFF").unwrap(), -1);
        assert_eq!(parse_int_literal("017").unwrap(), 15);
        assert_eq!(parse_int_literal("0b101").unwrap(), 5);
        assert_eq!(parse_int_literal("2147483648").unwrap(), i32::MIN);
        assert!(parse_int_literal("2147483649").is_err());
        assert!(parse_int_literal("0x1_0000_0000").is_err());
        assert!(parse_int_literal("09").is_err());
    }

    #[test]
    fn long_and_floating_literals() {
        assert_eq!(parse_long_literal("9223372036854775807L").unwrap(), i64::MAX);
        assert_eq!(parse_long_literal("0xFFFF_FFFF_FFFF_FFFFl").unwrap(), -1);
        assert_eq!(parse_double_literal("1e3").unwrap(), 1000.0);
        assert_eq!(parse_double_literal(".5").unwrap(), 0.5);
        assert_eq!(parse_float_literal("2.5f").unwrap(), 2.5);
        assert_eq!(parse_double_literal("0x1.8p1").unwrap(), 3.0);
        assert!(parse_float_literal("1e40f").is_err());
    }

    #[test]
    fn escapes_in_strings_and_chars() {
        assert_eq!(unescape_string_literal(r#""a\tb\"\101B""#).unwrap(), "a\tb\"AB");
        assert_eq!(unescape_char_literal(r"'\n'").unwrap(), '\n');
        assert_eq!(
            unescape_char_literal("'ab'").unwrap_err().message,
            "char literal must contain exactly one character"
        );
        assert_eq!(unescape_string_literal(r#""😀""#).unwrap(), "\u{1F600}");
        assert!(unescape_string_literal(r#""\q""#).is_err());
    }

    #[test]
    fn text_block_strips_incidental_indentation() {
        let text = "\"\"\"\n    <p>\n      hi  \n    </p>\n    \"\"\"";
        assert_eq!(unescape_text_block(text).unwrap(), "<p>\n  hi\n</p>\n");
    }
}
