//! Exact fixed-point amount scaling (§4.7 step 3, §9's re-shaping
//! note). `amount_human` is a decimal string; `amount_raw` is the
//! integer-unit representation rendered back as a string. Binary
//! floating point never appears on this path.

use num_bigint::BigUint;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid decimal amount: {0}")]
    InvalidDecimal(String),
    #[error("amount is negative")]
    Negative,
    #[error("fractional part has more digits than asset decimals ({decimals})")]
    TooManyFractionalDigits { decimals: u32 },
    #[error("raw amount is not a valid unsigned integer: {0}")]
    InvalidRaw(String),
}

/// Scales a human-readable decimal amount (e.g. `"1.5"`) into the
/// asset's raw integer unit representation (e.g. `"1500000000000000000"`
/// for 18 decimals), by string manipulation: split on `.`, right-pad
/// the fractional part to `decimals`, concatenate, and parse as an
/// arbitrary-precision unsigned integer. Never goes through `f64`.
pub fn human_to_raw(amount_human: &str, decimals: u32) -> Result<String, AmountError> {
    // Validate the input is a well-formed non-negative decimal first,
    // using rust_decimal purely for validation/shape-checking.
    let parsed = Decimal::from_str_exact(amount_human.trim())
        .map_err(|e| AmountError::InvalidDecimal(e.to_string()))?;
    if parsed.is_sign_negative() {
        return Err(AmountError::Negative);
    }

    let trimmed = amount_human.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if frac_part.len() > decimals as usize {
        return Err(AmountError::TooManyFractionalDigits { decimals });
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in 0..(decimals as usize - frac_part.len()) {
        digits.push('0');
    }

    // Strip any leading zeros introduced by the concatenation so the
    // stored raw string has no leading-zero artifacts, but keep at
    // least one digit.
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let value: BigUint = digits
        .parse()
        .map_err(|_| AmountError::InvalidRaw(digits.to_string()))?;

    Ok(value.to_string())
}

/// Inverse of [`human_to_raw`]: renders a raw integer-unit string back
/// into a human decimal string with `decimals` fractional digits.
pub fn raw_to_human(amount_raw: &str, decimals: u32) -> Result<String, AmountError> {
    let value: BigUint = amount_raw
        .parse()
        .map_err(|_| AmountError::InvalidRaw(amount_raw.to_string()))?;
    let digits = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return Ok(digits);
    }

    if digits.len() <= decimals {
        let padded = format!("{:0>width$}", digits, width = decimals);
        Ok(format!("0.{padded}"))
    } else {
        let split_at = digits.len() - decimals;
        Ok(format!("{}.{}", &digits[..split_at], &digits[split_at..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scales_whole_and_fractional_amount() {
        assert_eq!(
            human_to_raw("1.5", 18).unwrap(),
            "1500000000000000000"
        );
    }

    #[test]
    fn scales_integer_only_amount() {
        assert_eq!(human_to_raw("3", 6).unwrap(), "3000000");
    }

    #[test]
    fn scales_fractional_only_amount() {
        assert_eq!(human_to_raw(".5", 2).unwrap(), "50");
    }

    #[test]
    fn rejects_too_many_fractional_digits() {
        let err = human_to_raw("1.123", 2).unwrap_err();
        assert!(matches!(err, AmountError::TooManyFractionalDigits { decimals: 2 }));
    }

    #[test]
    fn rejects_negative_amount() {
        assert!(matches!(human_to_raw("-1.5", 18), Err(AmountError::Negative)));
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(human_to_raw("not-a-number", 18).is_err());
    }

    #[test]
    fn round_trips_through_raw_and_back() {
        let raw = human_to_raw("42.001", 6).unwrap();
        assert_eq!(raw, "42001000");
        let human = raw_to_human(&raw, 6).unwrap();
        assert_eq!(human, "42.001000");
    }

    #[test]
    fn zero_decimals_pass_through_unchanged() {
        assert_eq!(human_to_raw("7", 0).unwrap(), "7");
        assert_eq!(raw_to_human("7", 0).unwrap(), "7");
    }

    proptest! {
        #[test]
        fn raw_to_human_never_panics(raw in "[0-9]{1,30}", decimals in 0u32..30) {
            let _ = raw_to_human(&raw, decimals);
        }
    }
}
