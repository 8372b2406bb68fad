use super::{AtomicKind, IntegerKind};
use crate::engine::runtime::{Error, ErrorCode};
use core::fmt;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Value of `xs:integer` or one of its derived types.
///
/// The facet of `kind` is checked on construction, so a value that exists
/// always satisfies its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsInteger {
    kind: IntegerKind,
    value: i128,
}

impl XsInteger {
    pub fn new(kind: IntegerKind, value: i128) -> Result<Self, Error> {
        if !kind.admits(value) {
            return Err(Error::facet(AtomicKind::Integer(kind), value));
        }
        Ok(Self { kind, value })
    }

    /// Plain `xs:integer`; never fails.
    pub fn integer(value: i128) -> Self {
        Self {
            kind: IntegerKind::Integer,
            value,
        }
    }

    pub fn parse(kind: IntegerKind, lexical: &str) -> Result<Self, Error> {
        let target = AtomicKind::Integer(kind);
        let value = match parse_integer_lexical(lexical) {
            Ok(v) => v,
            Err(IntegerLexError::Syntax) => return Err(Error::lexical(target, lexical)),
            Err(IntegerLexError::Overflow) => {
                return Err(Error::from_code(
                    ErrorCode::FOCA0003,
                    format!("integer value too large: {lexical}"),
                ));
            }
        };
        Self::new(kind, value)
    }

    pub fn kind(&self) -> IntegerKind {
        self.kind
    }

    pub fn value(&self) -> i128 {
        self.value
    }
}

impl fmt::Display for XsInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum IntegerLexError {
    Syntax,
    Overflow,
}

/// `[+-]?[0-9]+`
pub(crate) fn parse_integer_lexical(s: &str) -> Result<i128, IntegerLexError> {
    let (negative, digits) = split_sign(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IntegerLexError::Syntax);
    }
    let mut acc: i128 = 0;
    for b in digits.bytes() {
        let d = i128::from(b - b'0');
        acc = acc
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(d) } else { v.checked_add(d) })
            .ok_or(IntegerLexError::Overflow)?;
    }
    Ok(acc)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Splits `digits(.digits)?` / `.digits` into integer and fraction parts.
fn split_decimal_digits(s: &str) -> Option<(&str, &str)> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    Some((int_part, frac_part))
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DecimalLexError {
    Syntax,
    Overflow,
}

/// `[+-]?(digits(.digits?)?|.digits)`, no exponent.
pub(crate) fn parse_decimal_lexical(s: &str) -> Result<Decimal, DecimalLexError> {
    let (negative, body) = split_sign(s);
    let (int_part, frac_part) = split_decimal_digits(body).ok_or(DecimalLexError::Syntax)?;
    let int_part = int_part.trim_start_matches('0');
    let mut normalized = String::with_capacity(body.len() + 2);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    let frac_part = frac_part.trim_end_matches('0');
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }
    Decimal::from_str(&normalized).map_err(|_| DecimalLexError::Overflow)
}

/// Validates the XSD float/double grammar; returns the text Rust's parser accepts.
fn check_floating_lexical(s: &str) -> Option<FloatLex> {
    match s {
        "INF" => return Some(FloatLex::PosInf),
        "-INF" => return Some(FloatLex::NegInf),
        "NaN" => return Some(FloatLex::NaN),
        _ => {}
    }
    let (_, body) = split_sign(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    split_decimal_digits(mantissa)?;
    if let Some(exp) = exponent {
        let (_, exp_digits) = split_sign(exp);
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    Some(FloatLex::Finite)
}

enum FloatLex {
    Finite,
    PosInf,
    NegInf,
    NaN,
}

pub(crate) fn parse_double_lexical(s: &str) -> Option<f64> {
    match check_floating_lexical(s)? {
        FloatLex::PosInf => Some(f64::INFINITY),
        FloatLex::NegInf => Some(f64::NEG_INFINITY),
        FloatLex::NaN => Some(f64::NAN),
        FloatLex::Finite => s.parse::<f64>().ok(),
    }
}

pub(crate) fn parse_float_lexical(s: &str) -> Option<f32> {
    match check_floating_lexical(s)? {
        FloatLex::PosInf => Some(f32::INFINITY),
        FloatLex::NegInf => Some(f32::NEG_INFINITY),
        FloatLex::NaN => Some(f32::NAN),
        FloatLex::Finite => s.parse::<f32>().ok(),
    }
}

/// Canonical decimal: no trailing fractional zeros, no exponent, `0` for zero.
pub fn format_decimal(d: &Decimal) -> String {
    if d.is_zero() {
        return "0".to_string();
    }
    d.normalize().to_string()
}

/// Canonical `xs:double` string.
///
/// Values with magnitude in `[1e-6, 1e6)` print in decimal notation; all
/// others use a mantissa with at least one fractional digit and an `E` exponent.
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = v.abs();
    if (1e-6..1e6).contains(&abs) {
        format!("{v}")
    } else {
        with_exponent(format!("{v:E}"))
    }
}

pub fn format_float(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = v.abs();
    if (1e-6..1e6).contains(&abs) {
        format!("{v}")
    } else {
        with_exponent(format!("{v:E}"))
    }
}

// `1E6` -> `1.0E6`
fn with_exponent(raw: String) -> String {
    match raw.split_once('E') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
        _ => raw,
    }
}
