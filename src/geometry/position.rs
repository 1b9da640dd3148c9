//! One-axis background position grammar.
//!
//! | Form        | Example  | Offset                                    |
//! |-------------|----------|-------------------------------------------|
//! | all digits  | `120`    | the value itself                          |
//! | percentage  | `-50%`   | `actual * |p| / 100`, sign discarded      |
//! | pixels      | `-30px`  | `v` if `v >= 0`, else `(-v) mod actual`   |
//!
//! Forms are tried in table order and the first syntactic match decides. The
//! number inside a matched form is read with `parseInt` leniency: the longest
//! signed integer prefix counts, so `1-2%` is 1% and `5-px` is 5px. A form with
//! no leading integer (`-%`, `--3px`) is invalid, never retried as another form.
//!
//! A negative pixel offset wraps around the sheet's *actual* dimension. This is
//! not CSS `background-position`; catalogs in the wild rely on it.

use regex::Regex;

use crate::error::{PipelineError, PipelineResult};

/// Raw X/Y tokens as written in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSpec {
    pub x: String,
    pub y: String,
}

impl PositionSpec {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl Default for PositionSpec {
    fn default() -> Self {
        Self::new("0", "0")
    }
}

/// Compiled patterns for position tokens.
///
/// Built once by the caller and shared by every render worker.
#[derive(Debug, Clone)]
pub struct PositionGrammar {
    all_digits: Regex,
    percent: Regex,
    pixels: Regex,
}

impl Default for PositionGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionGrammar {
    pub fn new() -> Self {
        // ASCII classes: `\d` would also accept non-ASCII digits that `parse` rejects.
        Self {
            all_digits: Regex::new(r"^[0-9]+$").unwrap(),
            percent: Regex::new(r"^([-0-9]+)%$").unwrap(),
            pixels: Regex::new(r"^([-0-9]+)px$").unwrap(),
        }
    }

    /// Resolve one axis of a position spec to a pixel offset.
    ///
    /// `declared` is the asset's declared extent on this axis and `actual` the
    /// fetched sheet's extent. Only `actual` participates in the result.
    pub fn resolve_offset(&self, spec: &str, _declared: u32, actual: u32) -> PipelineResult<u32> {
        let invalid = || PipelineError::invalid_position(spec);

        if self.all_digits.is_match(spec) {
            return spec.parse::<u32>().map_err(|_| invalid());
        }

        if let Some(caps) = self.percent.captures(spec) {
            let percent = parse_int_prefix(&caps[1]).ok_or_else(invalid)?.unsigned_abs();
            let offset = u64::from(actual) * percent / 100;
            return u32::try_from(offset).map_err(|_| invalid());
        }

        if let Some(caps) = self.pixels.captures(spec) {
            let pixels = parse_int_prefix(&caps[1]).ok_or_else(invalid)?;
            if pixels >= 0 {
                return u32::try_from(pixels).map_err(|_| invalid());
            }
            let wrapped = pixels
                .unsigned_abs()
                .checked_rem(u64::from(actual))
                .unwrap_or(0);
            return u32::try_from(wrapped).map_err(|_| invalid());
        }

        Err(invalid())
    }
}

/// Longest leading signed integer, after leading whitespace (`" +12px"` → 12).
///
/// `None` when no digit follows the optional sign.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(spec: &str, declared: u32, actual: u32) -> PipelineResult<u32> {
        PositionGrammar::new().resolve_offset(spec, declared, actual)
    }

    #[test]
    fn test_all_digits_is_absolute() {
        assert_eq!(offset("120", 200, 300).unwrap(), 120);
        assert_eq!(offset("0", 64, 64).unwrap(), 0);
    }

    #[test]
    fn test_percentage_of_actual() {
        assert_eq!(offset("50%", 200, 100).unwrap(), 50);
        assert_eq!(offset("100%", 10, 40).unwrap(), 40);
    }

    #[test]
    fn test_percentage_sign_discarded() {
        assert_eq!(offset("-50%", 200, 100).unwrap(), 50);
    }

    #[test]
    fn test_percentage_floors() {
        assert_eq!(offset("50%", 10, 101).unwrap(), 50);
    }

    #[test]
    fn test_positive_pixels() {
        assert_eq!(offset("30px", 200, 100).unwrap(), 30);
        assert_eq!(offset("0px", 200, 100).unwrap(), 0);
    }

    #[test]
    fn test_negative_pixels_wrap_modulo_actual() {
        assert_eq!(offset("-30px", 200, 100).unwrap(), 30);
        assert_eq!(offset("-130px", 200, 100).unwrap(), 30);
        assert_eq!(offset("-100px", 200, 100).unwrap(), 0);
    }

    #[test]
    fn test_negative_pixels_on_empty_axis() {
        assert_eq!(offset("-30px", 10, 0).unwrap(), 0);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let err = offset("garbage", 200, 100).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidPositionSpec { ref spec } if spec == "garbage"
        ));
    }

    #[test]
    fn test_lenient_number_inside_form() {
        assert_eq!(offset("1-2%", 10, 200).unwrap(), 2);
        assert_eq!(offset("5-px", 10, 100).unwrap(), 5);
        assert_eq!(offset("-5-3px", 10, 100).unwrap(), 5);
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("12"), Some(12));
        assert_eq!(parse_int_prefix(" +12px"), Some(12));
        assert_eq!(parse_int_prefix("-4-2"), Some(-4));
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("--3"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_syntactic_match_does_not_fall_through() {
        // Matches a form but carries no integer; never retried as another form.
        assert!(offset("-%", 10, 10).is_err());
        assert!(offset("--3px", 10, 10).is_err());
        assert!(offset("-px", 10, 10).is_err());
        assert!(offset("center", 10, 10).is_err());
        assert!(offset("", 10, 10).is_err());
    }

    #[test]
    fn test_default_spec_is_origin() {
        let spec = PositionSpec::default();
        assert_eq!(spec, PositionSpec::new("0", "0"));
    }
}
