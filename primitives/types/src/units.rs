use thiserror::Error;

/// Number of mojos in one XCH.
pub const MOJO_PER_XCH: u64 = 1_000_000_000_000;

const DECIMALS: usize = 12;

/// Errors produced when parsing an XCH amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Not a non-negative decimal number.
    #[error("invalid amount '{0}'")]
    Invalid(String),
    /// More than twelve fractional digits.
    #[error("amount '{0}' is more precise than one mojo")]
    TooPrecise(String),
    /// Does not fit in a u64 mojo count.
    #[error("amount '{0}' is too large")]
    Overflow(String),
}

/// Formats a mojo amount as XCH without trailing zeros (`1500000000000` → `"1.5"`).
pub fn format_xch(mojos: u64) -> String {
    let whole = mojos / MOJO_PER_XCH;
    let frac = mojos % MOJO_PER_XCH;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parses a decimal XCH amount into mojos without going through floating point.
pub fn parse_xch(text: &str) -> Result<u64, AmountError> {
    let trimmed = text.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Invalid(text.to_string()));
    }
    if frac.len() > DECIMALS {
        return Err(AmountError::TooPrecise(text.to_string()));
    }

    let overflow = || AmountError::Overflow(text.to_string());
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| overflow())? };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = DECIMALS).parse().map_err(|_| overflow())?
    };

    whole.checked_mul(MOJO_PER_XCH).and_then(|m| m.checked_add(frac)).ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_xch() {
        assert_eq!(format_xch(0), "0");
        assert_eq!(format_xch(1), "0.000000000001");
        assert_eq!(format_xch(MOJO_PER_XCH), "1");
        assert_eq!(format_xch(1_500_000_000_000), "1.5");
        assert_eq!(format_xch(2_000_000_000_250), "2.00000000025");
    }

    #[test]
    fn test_parse_xch() {
        assert_eq!(parse_xch("1"), Ok(MOJO_PER_XCH));
        assert_eq!(parse_xch("1.5"), Ok(1_500_000_000_000));
        assert_eq!(parse_xch(".25"), Ok(250_000_000_000));
        assert_eq!(parse_xch("3."), Ok(3 * MOJO_PER_XCH));
        assert_eq!(parse_xch(" 0.000000000001 "), Ok(1));
        assert_eq!(parse_xch("18446744.073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn test_parse_xch_errors() {
        assert!(matches!(parse_xch(""), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_xch("."), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_xch("-1"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_xch("1e3"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_xch("1.2.3"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_xch("0.0000000000001"), Err(AmountError::TooPrecise(_))));
        assert!(matches!(parse_xch("18446744.073709551616"), Err(AmountError::Overflow(_))));
        assert!(matches!(parse_xch("99999999999999999999"), Err(AmountError::Overflow(_))));
    }
}
