use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CapsError, Result};

/// A rational number, used for frame rates and pixel aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numer: i32,
    pub denom: i32,
}

impl Fraction {
    /// Create a new fraction. The denominator is not checked here.
    pub const fn new(numer: i32, denom: i32) -> Self {
        Self { numer, denom }
    }

    /// Returns true if the fraction has a positive numerator and denominator.
    pub fn is_positive(&self) -> bool {
        self.numer > 0 && self.denom > 0
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

/// A typed descriptor field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    Int(i32),
    String(String),
    Bitmask(u64),
    Fraction(Fraction),
    Boolean(bool),
}

impl FieldValue {
    /// The type annotation used in the text form.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::String(_) => "string",
            FieldValue::Bitmask(_) => "bitmask",
            FieldValue::Fraction(_) => "fraction",
            FieldValue::Boolean(_) => "boolean",
        }
    }

    /// Parse a value that carries an explicit `(type)` annotation.
    pub(crate) fn parse_typed(field: &str, ty: &str, raw: &str) -> Result<Self> {
        let invalid = || CapsError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        };

        match ty {
            "int" | "i" => raw.parse().map(FieldValue::Int).map_err(|_| invalid()),
            "string" | "s" => Ok(FieldValue::String(raw.to_string())),
            "bitmask" => parse_bitmask(raw).map(FieldValue::Bitmask).ok_or_else(invalid),
            "fraction" => parse_fraction(raw)
                .map(FieldValue::Fraction)
                .ok_or_else(invalid),
            "boolean" | "bool" | "b" => parse_bool(raw).map(FieldValue::Boolean).ok_or_else(invalid),
            _ => Err(CapsError::UnknownType {
                field: field.to_string(),
                ty: ty.to_string(),
            }),
        }
    }

    /// Infer the type of an unannotated value.
    ///
    /// Integers, `0x` bitmasks, `n/d` fractions and `true`/`false` are
    /// recognized; anything else is a string.
    pub(crate) fn parse_untyped(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i32>() {
            return FieldValue::Int(v);
        }
        if raw.starts_with("0x") || raw.starts_with("0X") {
            if let Some(mask) = parse_bitmask(raw) {
                return FieldValue::Bitmask(mask);
            }
        }
        if let Some(fraction) = parse_fraction(raw) {
            return FieldValue::Fraction(fraction);
        }
        if let Some(flag) = parse_bool(raw) {
            return FieldValue::Boolean(flag);
        }
        FieldValue::String(raw.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.type_name())?;
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::String(s) if needs_quotes(s) => {
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Bitmask(mask) => write!(f, "0x{mask:016x}"),
            FieldValue::Fraction(fraction) => write!(f, "{fraction}"),
            FieldValue::Boolean(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Fraction> for FieldValue {
    fn from(value: Fraction) -> Self {
        FieldValue::Fraction(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | ';' | '=' | '"' | '(' | ')'))
}

fn parse_bitmask(raw: &str) -> Option<u64> {
    match raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn parse_fraction(raw: &str) -> Option<Fraction> {
    let (numer, denom) = raw.split_once('/')?;
    Some(Fraction::new(
        numer.trim().parse().ok()?,
        denom.trim().parse().ok()?,
    ))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "TRUE" | "yes" => Some(true),
        "false" | "FALSE" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_parse() {
        assert_eq!(
            FieldValue::parse_typed("rate", "int", "48000").unwrap(),
            FieldValue::Int(48000)
        );
        assert_eq!(
            FieldValue::parse_typed("channel-mask", "bitmask", "0x3").unwrap(),
            FieldValue::Bitmask(3)
        );
        assert_eq!(
            FieldValue::parse_typed("framerate", "fraction", "30000/1001").unwrap(),
            FieldValue::Fraction(Fraction::new(30000, 1001))
        );
        assert_eq!(
            FieldValue::parse_typed("flag", "b", "true").unwrap(),
            FieldValue::Boolean(true)
        );
    }

    #[test]
    fn typed_value_rejects_garbage() {
        let err = FieldValue::parse_typed("rate", "int", "fast").unwrap_err();
        assert!(matches!(err, CapsError::InvalidValue { .. }));

        let err = FieldValue::parse_typed("rate", "double", "1.0").unwrap_err();
        assert!(matches!(err, CapsError::UnknownType { .. }));
    }

    #[test]
    fn untyped_values_are_inferred() {
        assert_eq!(FieldValue::parse_untyped("2"), FieldValue::Int(2));
        assert_eq!(FieldValue::parse_untyped("0x3f"), FieldValue::Bitmask(0x3f));
        assert_eq!(
            FieldValue::parse_untyped("25/1"),
            FieldValue::Fraction(Fraction::new(25, 1))
        );
        assert_eq!(FieldValue::parse_untyped("false"), FieldValue::Boolean(false));
        assert_eq!(
            FieldValue::parse_untyped("S16LE"),
            FieldValue::String("S16LE".to_string())
        );
    }

    #[test]
    fn display_quotes_strings_with_separators() {
        assert_eq!(FieldValue::from("S16LE").to_string(), "(string)S16LE");
        assert_eq!(FieldValue::from("a, b").to_string(), "(string)\"a, b\"");
        assert_eq!(
            FieldValue::Bitmask(3).to_string(),
            "(bitmask)0x0000000000000003"
        );
    }
}
