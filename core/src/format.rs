//! printf-style formatting of a single value.
//!
//! Supports the conversions `%s`, `%d`, `%i`, `%f`, `%F`, `%x`, `%X` and the
//! literal `%%`, each with optional flags (`-`, `+`, space, `0`), width and
//! precision. A format with no placeholder renders as-is; a format with more
//! than one placeholder is rejected since there is only one value to place.
//!
//! # Examples
//!
//! ```
//! use command_args_core::{ArgValue, format};
//!
//! assert_eq!(format::apply("-j%d", &ArgValue::Int(4)).unwrap(), "-j4");
//! assert_eq!(format::apply("-std=%s", &"c++17".into()).unwrap(), "-std=c++17");
//! assert_eq!(format::apply("--ratio=%.2f", &ArgValue::Float(0.5)).unwrap(), "--ratio=0.50");
//! assert_eq!(format::apply("-O2", &"ignored".into()).unwrap(), "-O2");
//! ```

use std::iter::Peekable;
use std::str::Chars;

use crate::error::FormatError;
use crate::value::ArgValue;

const DEFAULT_FLOAT_PRECISION: usize = 6;
/// Upper bound for a width or precision written in a format.
pub const MAX_FIELD_WIDTH: usize = 4096;

#[derive(Debug, Default)]
struct Conversion {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: char,
}

/// Applies `format` to `value`.
///
/// # Errors
///
/// Returns [`FormatError`] for unknown conversions, a second placeholder, a
/// trailing `%`, a width or precision above [`MAX_FIELD_WIDTH`], or a value
/// the conversion cannot render (e.g. non-numeric text for `%d`).
pub fn apply(format: &str, value: &ArgValue) -> Result<String, FormatError> {
    let mut out = String::with_capacity(format.len() + 16);
    let mut chars = format.chars().peekable();
    let mut substituted = false;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let conversion = parse_conversion(&mut chars)?;
        if substituted {
            return Err(FormatError::TooManyPlaceholders);
        }
        substituted = true;
        out.push_str(&render(&conversion, value)?);
    }

    Ok(out)
}

fn parse_conversion(chars: &mut Peekable<Chars<'_>>) -> Result<Conversion, FormatError> {
    let mut conversion = Conversion::default();

    while let Some(&flag) = chars.peek() {
        match flag {
            '-' => conversion.left_align = true,
            '0' => conversion.zero_pad = true,
            '+' => conversion.plus_sign = true,
            ' ' => conversion.space_sign = true,
            _ => break,
        }
        chars.next();
    }

    conversion.width = read_digits(chars)?;
    if chars.peek() == Some(&'.') {
        chars.next();
        conversion.precision = Some(read_digits(chars)?.unwrap_or(0));
    }

    let kind = chars.next().ok_or(FormatError::Truncated)?;
    if !matches!(kind, 's' | 'd' | 'i' | 'f' | 'F' | 'x' | 'X') {
        return Err(FormatError::UnknownConversion(kind));
    }
    conversion.kind = kind;
    Ok(conversion)
}

fn read_digits(chars: &mut Peekable<Chars<'_>>) -> Result<Option<usize>, FormatError> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_FIELD_WIDTH => Ok(Some(n)),
        _ => Err(FormatError::FieldTooWide {
            limit: MAX_FIELD_WIDTH,
        }),
    }
}

fn render(conversion: &Conversion, value: &ArgValue) -> Result<String, FormatError> {
    let incompatible = || FormatError::IncompatibleValue {
        conversion: conversion.kind,
        value: value.to_string(),
    };

    let (sign, body) = match conversion.kind {
        's' => {
            let text = value.to_string();
            let body = match conversion.precision {
                Some(limit) => text.chars().take(limit).collect(),
                None => text,
            };
            return Ok(pad(conversion, "", &body, false));
        }
        'd' | 'i' => {
            let n = value.as_i64().ok_or_else(incompatible)?;
            (sign_of(conversion, n < 0), n.unsigned_abs().to_string())
        }
        'f' | 'F' => {
            let x = value.as_f64().ok_or_else(incompatible)?;
            let precision = conversion.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
            let body = format!("{:.*}", precision, x.abs());
            let negative = x.is_sign_negative() && body.chars().any(|c| c != '0' && c != '.');
            (sign_of(conversion, negative), body)
        }
        'x' => {
            let n = value.as_i64().ok_or_else(incompatible)?;
            (sign_of(conversion, n < 0), format!("{:x}", n.unsigned_abs()))
        }
        'X' => {
            let n = value.as_i64().ok_or_else(incompatible)?;
            (sign_of(conversion, n < 0), format!("{:X}", n.unsigned_abs()))
        }
        other => return Err(FormatError::UnknownConversion(other)),
    };

    Ok(pad(conversion, sign, &body, true))
}

fn sign_of(conversion: &Conversion, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if conversion.plus_sign {
        "+"
    } else if conversion.space_sign {
        " "
    } else {
        ""
    }
}

fn pad(conversion: &Conversion, sign: &str, body: &str, numeric: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    let fill = conversion.width.unwrap_or(0).saturating_sub(len);

    if conversion.left_align {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if conversion.zero_pad && numeric {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}
