//! Cell parsing for survey files.

/// Parses a grid coordinate cell.
///
/// Non-finite spellings (`NaN`, `inf`) parse successfully; rejecting them
/// is the reprojector's job so the error carries the record index.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Parses a death count cell.
///
/// Accepts plain integers as well as whole-valued decimals such as `"3.0"`
/// (spreadsheet exports often write integer columns that way). Returns
/// `None` for negative, fractional, or out-of-range values.
#[must_use]
pub fn parse_count(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(count) = s.parse::<u32>() {
        return Some(count);
    }

    let value = s.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        assert!((parse_coordinate(" 529308.741 ").unwrap() - 529_308.741).abs() < 1e-9);
        assert!(parse_coordinate("NaN").unwrap().is_nan());
        assert!(parse_coordinate("").is_none());
        assert!(parse_coordinate("abc").is_none());
    }

    #[test]
    fn parses_integer_counts() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 15 "), Some(15));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn parses_whole_decimal_counts() {
        assert_eq!(parse_count("3.0"), Some(3));
    }

    #[test]
    fn rejects_bad_counts() {
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("1e20"), None);
    }
}
