//! String conversion helpers.

use std::fmt::Display;
use std::str::FromStr;

/// Parses `s` into `T`, ignoring surrounding whitespace.
///
/// Returns `None` on malformed input. The whole trimmed string must parse:
/// `"12abc"` is rejected rather than read as `12`.
///
/// ```
/// use sharedloop::parse_string;
///
/// assert_eq!(parse_string::<u16>(" 8080 "), Some(8080));
/// assert_eq!(parse_string::<u16>("eighty"), None);
/// ```
pub fn parse_string<T: FromStr>(s: &str) -> Option<T> {
    s.trim().parse().ok()
}

/// Formats `value` with its [`Display`] impl.
pub fn to_string<T: Display + ?Sized>(value: &T) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_string::<i32>("-12"), Some(-12));
        assert_eq!(parse_string::<i32>("12abc"), None);
        assert_eq!(parse_string::<i32>(""), None);
        assert_eq!(parse_string::<f64>("\t0.5\n"), Some(0.5));
        assert_eq!(parse_string::<bool>("true"), Some(true));
    }

    #[test]
    fn stringify_uses_display() {
        assert_eq!(to_string(&42u8), "42");
        assert_eq!(to_string("abc"), "abc");
    }
}
