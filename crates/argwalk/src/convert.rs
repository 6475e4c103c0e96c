//! Raw token to typed value conversion.
//!
//! Every converter is a plain `fn(&str) -> Result<T, String>`; the error
//! string is the reason shown to the user. Anything with that shape
//! (closures included) can be passed to [`crate::ArgParser::add_argument`].

use std::str::FromStr;

/// Boxed converter stored inside a spec.
pub type Converter<T> = Box<dyn Fn(&str) -> Result<T, String>>;

/// Signed integers, decimal only. The whole token must be consumed.
pub fn int(raw: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|e| format!("expected an integer ({e})"))
}

pub fn float(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|e| format!("expected a number ({e})"))
}

pub fn string(raw: &str) -> Result<String, String> {
    Ok(raw.to_string())
}

/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`, case-insensitive.
pub fn boolean(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

/// Converter used by flags. A bare flag is fed the synthetic token `"true"`;
/// `--flag=false` goes through [`boolean`].
pub fn flag(raw: &str) -> Result<bool, String> {
    boolean(raw)
}

/// Converter for any `FromStr` type.
pub fn from_str<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_rejects_trailing_garbage() {
        assert_eq!(int("42"), Ok(42));
        assert_eq!(int("-7"), Ok(-7));
        assert!(int("12abc").is_err());
        assert!(int("").is_err());
        assert!(int(" 5").is_err());
        assert!(int("5 ").is_err());
    }

    #[test]
    fn float_takes_the_whole_token() {
        assert_eq!(float("2.5"), Ok(2.5));
        assert!(float(" 2.5").is_err());
        assert!(float("2.5x").is_err());
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(boolean(raw), Ok(true), "{raw}");
        }
        for raw in ["false", "0", "No", "off"] {
            assert_eq!(boolean(raw), Ok(false), "{raw}");
        }
        assert!(boolean("maybe").is_err());
    }

    #[test]
    fn from_str_reports_the_parse_error() {
        let err = from_str::<u8>("300").unwrap_err();
        assert!(err.contains("too large"), "{err}");
        assert_eq!(from_str::<char>("x"), Ok('x'));
    }
}
