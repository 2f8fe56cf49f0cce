//! Conversion of fetched text into typed field values.
//!
//! Each function writes through the slot only after the whole text parsed,
//! so a malformed value leaves the field as it was.

use crate::field::{FieldSlot, FloatSlot, IntSlot};

/// Why a fetched value could not be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed(pub String);

impl Malformed {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Assign `text` to the field behind `slot`.
///
/// `Unsupported` slots are rejected by the caller before anything is fetched;
/// reaching one here is reported as malformed rather than silently ignored.
pub fn assign(slot: FieldSlot<'_>, text: &str) -> Result<(), Malformed> {
    match slot {
        FieldSlot::Text(field) => {
            *field = text.to_owned();
            Ok(())
        }
        FieldSlot::Int(field) => assign_int(field, parse_int(text)?),
        FieldSlot::Float(field) => {
            let value = parse_float(text)?;
            match field {
                FloatSlot::F32(f) => *f = value as f32,
                FloatSlot::F64(f) => *f = value,
            }
            Ok(())
        }
        FieldSlot::Bool(field) => {
            *field = parse_bool(text)?;
            Ok(())
        }
        FieldSlot::Unsupported { type_name } => Err(Malformed::new(format!(
            "type '{type_name}' cannot be assigned"
        ))),
    }
}

fn assign_int(field: IntSlot<'_>, value: i64) -> Result<(), Malformed> {
    fn narrow<T: TryFrom<i64>>(value: i64, ty: &str) -> Result<T, Malformed> {
        T::try_from(value).map_err(|_| Malformed::new(format!("{value} out of range for {ty}")))
    }

    match field {
        IntSlot::I8(f) => *f = narrow(value, "i8")?,
        IntSlot::I16(f) => *f = narrow(value, "i16")?,
        IntSlot::I32(f) => *f = narrow(value, "i32")?,
        IntSlot::I64(f) => *f = value,
        IntSlot::Isize(f) => *f = narrow(value, "isize")?,
    }
    Ok(())
}

/// Parse a signed 64-bit integer, inferring the base from its prefix.
///
/// Accepts an optional sign, then `0x`/`0X` (hex), `0o`/`0O` (octal),
/// `0b`/`0B` (binary), a bare leading `0` (octal) or plain decimal digits.
/// `_` may separate digits or follow a base prefix.
pub fn parse_int(text: &str) -> Result<i64, Malformed> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'+') => (false, &text[1..]),
        Some(b'-') => (true, &text[1..]),
        _ => (false, text),
    };
    if body.is_empty() {
        return Err(Malformed::new("no digits"));
    }

    let (radix, digits, prefixed) = split_radix(body);
    if !underscores_ok(digits, prefixed) {
        return Err(Malformed::new("misplaced '_' separator"));
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(Malformed::new("no digits after base prefix"));
    }
    // from_str_radix takes its own sign; only one is allowed, and it was consumed above.
    if !cleaned.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Malformed::new(format!("invalid base-{radix} digits")));
    }

    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => Malformed::new("out of range for i64"),
        _ => Malformed::new(format!("invalid base-{radix} digits")),
    })?;

    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.ok_or_else(|| Malformed::new("out of range for i64"))
}

fn split_radix(body: &str) -> (u32, &str, bool) {
    let bytes = body.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return (10, body, false);
    }
    match bytes[1].to_ascii_lowercase() {
        b'x' => (16, &body[2..], true),
        b'o' => (8, &body[2..], true),
        b'b' => (2, &body[2..], true),
        _ => (8, &body[1..], true),
    }
}

fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    let bytes = digits.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'_' {
            continue;
        }
        let after_prefix = i == 0 && prefixed;
        let after_digit = i > 0 && bytes[i - 1] != b'_';
        let before_digit = bytes.get(i + 1).is_some_and(|next| *next != b'_');
        if !(after_prefix || after_digit) || !before_digit {
            return false;
        }
    }
    true
}

/// Parse a 64-bit float: decimal or exponent notation, `inf`/`infinity`/`nan`
/// in any case, optional sign.
///
/// Unlike [`parse_int`], no base prefixes or `_` separators: hex floats such
/// as `0x1p-2` and grouped digits such as `1_000.5` are rejected.
pub fn parse_float(text: &str) -> Result<f64, Malformed> {
    text.parse::<f64>().map_err(|e| Malformed::new(e.to_string()))
}

/// Parse a boolean.
///
/// True: `1 t T TRUE true True`. False: `0 f F FALSE false False`.
/// Nothing else, including surrounding whitespace, is accepted.
pub fn parse_bool(text: &str) -> Result<bool, Malformed> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Malformed::new(
            "expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_decimal_and_sign() {
        assert_eq!(parse_int("26"), Ok(26));
        assert_eq!(parse_int("+26"), Ok(26));
        assert_eq!(parse_int("-26"), Ok(-26));
        assert_eq!(parse_int("0"), Ok(0));
        assert_eq!(parse_int("-0"), Ok(0));
    }

    #[test]
    fn int_base_prefixes() {
        assert_eq!(parse_int("0x1A"), Ok(26));
        assert_eq!(parse_int("0X1a"), Ok(26));
        assert_eq!(parse_int("0o32"), Ok(26));
        assert_eq!(parse_int("032"), Ok(26));
        assert_eq!(parse_int("0b11010"), Ok(26));
        assert_eq!(parse_int("-0x10"), Ok(-16));
    }

    #[test]
    fn int_underscores() {
        assert_eq!(parse_int("1_000"), Ok(1000));
        assert_eq!(parse_int("0x_ff"), Ok(255));
        assert_eq!(parse_int("0_7"), Ok(7));
        assert!(parse_int("_1").is_err());
        assert!(parse_int("1_").is_err());
        assert!(parse_int("1__0").is_err());
    }

    #[test]
    fn int_limits() {
        assert_eq!(parse_int("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert!(parse_int("9223372036854775808").is_err());
        assert!(parse_int("-9223372036854775809").is_err());
    }

    #[test]
    fn int_rejects_garbage() {
        for text in ["", "-", "abc", "0x", "08", "1.5", " 1", "1 ", "+-1", "--1", "0b2"] {
            assert!(parse_int(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn narrowing_checks_width() {
        let mut small: i8 = 3;
        let err = assign(FieldSlot::Int(IntSlot::I8(&mut small)), "300").unwrap_err();
        assert!(err.0.contains("i8"));
        assert_eq!(small, 3);

        let mut wide: i32 = 0;
        assign(FieldSlot::Int(IntSlot::I32(&mut wide)), "-0x7f").unwrap();
        assert_eq!(wide, -127);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("26.24"), Ok(26.24));
        assert_eq!(parse_float("-1e3"), Ok(-1000.0));
        assert_eq!(parse_float("Infinity"), Ok(f64::INFINITY));
        assert!(parse_float("NaN").unwrap().is_nan());
        assert!(parse_float("26,24").is_err());
        assert!(parse_float("1_000.5").is_err());
        assert!(parse_float("0x1p-2").is_err());
        assert!(parse_float("").is_err());

        let mut single: f32 = 0.0;
        assign(FieldSlot::Float(FloatSlot::F32(&mut single)), "0.5").unwrap();
        assert_eq!(single, 0.5);
    }

    #[test]
    fn bool_literals() {
        for text in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(text), Ok(true), "{text}");
        }
        for text in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(text), Ok(false), "{text}");
        }
        for text in ["yes", "no", "tRuE", " true", "2", ""] {
            assert!(parse_bool(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn malformed_leaves_field_untouched() {
        let mut flag = true;
        assert!(assign(FieldSlot::Bool(&mut flag), "maybe").is_err());
        assert!(flag);

        let mut text = String::from("old");
        assign(FieldSlot::Text(&mut text), "  new value ").unwrap();
        assert_eq!(text, "  new value ");
    }
}
