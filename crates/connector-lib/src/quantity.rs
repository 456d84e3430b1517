//! Kubernetes resource quantity parsing
//!
//! Capacity values arrive as quantity strings such as `4`, `16Gi` or
//! `8032216Ki`. The aggregator only accepts values that are exact integers;
//! anything fractional (`500m`, `1.5`) or outside `i64` is rejected.

use std::fmt;

/// Why a quantity string could not be read as an exact integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    Empty,
    Malformed,
    Fractional,
    OutOfRange,
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityError::Empty => write!(f, "empty quantity"),
            QuantityError::Malformed => write!(f, "malformed quantity"),
            QuantityError::Fractional => write!(f, "quantity is not an integer"),
            QuantityError::OutOfRange => write!(f, "quantity exceeds i64 range"),
        }
    }
}

impl std::error::Error for QuantityError {}

/// Multiplier implied by a quantity suffix.
#[derive(Debug, Clone, Copy)]
enum Suffix {
    /// Power of ten
    Decimal(i32),
    /// Power of two
    Binary(u32),
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    let parsed = match suffix {
        "" => Suffix::Decimal(0),
        "n" => Suffix::Decimal(-9),
        "u" => Suffix::Decimal(-6),
        "m" => Suffix::Decimal(-3),
        "k" => Suffix::Decimal(3),
        "M" => Suffix::Decimal(6),
        "G" => Suffix::Decimal(9),
        "T" => Suffix::Decimal(12),
        "P" => Suffix::Decimal(15),
        "E" => Suffix::Decimal(18),
        "Ki" => Suffix::Binary(10),
        "Mi" => Suffix::Binary(20),
        "Gi" => Suffix::Binary(30),
        "Ti" => Suffix::Binary(40),
        "Pi" => Suffix::Binary(50),
        "Ei" => Suffix::Binary(60),
        _ => return None,
    };
    Some(parsed)
}

/// Split `input` into (number, exponent, suffix). A trailing `e`/`E` followed
/// by an optionally signed integer is a decimal exponent; otherwise `E` and
/// `Ei` are suffixes.
fn split_number(input: &str) -> Result<(&str, i32, &str), QuantityError> {
    let end = input
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '+' || *c == '-'))))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let (number, rest) = input.split_at(end);

    if let Some(exp) = rest.strip_prefix(['e', 'E']) {
        if is_signed_integer(exp) {
            // Too large for i32 is beyond anything an i64 can hold
            let exponent = exp.parse::<i32>().map_err(|_| QuantityError::OutOfRange)?;
            return Ok((number, exponent, ""));
        }
    }

    Ok((number, 0, rest))
}

fn is_signed_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a quantity string into its exact integer value.
pub fn parse_quantity_i64(input: &str) -> Result<i64, QuantityError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (number, exponent, suffix) = split_number(input)?;
    let suffix = parse_suffix(suffix).ok_or(QuantityError::Malformed)?;

    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(QuantityError::Malformed);
    }
    if fraction.contains('.') {
        return Err(QuantityError::Malformed);
    }

    let mut mantissa: i128 = 0;
    for c in whole.chars().chain(fraction.chars()) {
        let digit = c.to_digit(10).ok_or(QuantityError::Malformed)? as i128;
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(digit))
            .ok_or(QuantityError::OutOfRange)?;
    }

    if mantissa == 0 {
        return Ok(0);
    }
    if let Suffix::Binary(bits) = suffix {
        mantissa = mantissa
            .checked_mul(1i128 << bits)
            .ok_or(QuantityError::OutOfRange)?;
    }

    let fraction_digits = i64::try_from(fraction.len()).map_err(|_| QuantityError::Fractional)?;
    let mut scale = i64::from(exponent) - fraction_digits;
    if let Suffix::Decimal(power) = suffix {
        scale += i64::from(power);
    }

    let value = if scale >= 0 {
        let factor = u32::try_from(scale)
            .ok()
            .and_then(|s| 10i128.checked_pow(s))
            .ok_or(QuantityError::OutOfRange)?;
        mantissa.checked_mul(factor).ok_or(QuantityError::OutOfRange)?
    } else {
        // Any nonzero mantissa fits in i128, so a divisor beyond i128 leaves a fraction
        let divisor = u32::try_from(scale.unsigned_abs())
            .ok()
            .and_then(|s| 10i128.checked_pow(s))
            .ok_or(QuantityError::Fractional)?;
        if mantissa % divisor != 0 {
            return Err(QuantityError::Fractional);
        }
        mantissa / divisor
    };

    let value = if negative { -value } else { value };
    i64::try_from(value).map_err(|_| QuantityError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(parse_quantity_i64("1"), Ok(1));
        assert_eq!(parse_quantity_i64("16"), Ok(16));
        assert_eq!(parse_quantity_i64("0"), Ok(0));
        assert_eq!(parse_quantity_i64("-3"), Ok(-3));
    }

    #[test]
    fn test_binary_suffixes() {
        assert_eq!(parse_quantity_i64("1Gi"), Ok(1_073_741_824));
        assert_eq!(parse_quantity_i64("512Mi"), Ok(536_870_912));
        assert_eq!(parse_quantity_i64("8032216Ki"), Ok(8_032_216 * 1024));
        assert_eq!(parse_quantity_i64("1.5Gi"), Ok(1_610_612_736));
    }

    #[test]
    fn test_decimal_suffixes() {
        assert_eq!(parse_quantity_i64("2k"), Ok(2_000));
        assert_eq!(parse_quantity_i64("4G"), Ok(4_000_000_000));
        assert_eq!(parse_quantity_i64("2000m"), Ok(2));
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(parse_quantity_i64("1e3"), Ok(1_000));
        assert_eq!(parse_quantity_i64("12E2"), Ok(1_200));
        // A bare `E` is the exa suffix
        assert_eq!(parse_quantity_i64("1E"), Ok(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_fractional_values_are_rejected() {
        assert_eq!(parse_quantity_i64("500m"), Err(QuantityError::Fractional));
        assert_eq!(parse_quantity_i64("1.5"), Err(QuantityError::Fractional));
        assert_eq!(parse_quantity_i64("3n"), Err(QuantityError::Fractional));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert_eq!(parse_quantity_i64(""), Err(QuantityError::Empty));
        assert_eq!(parse_quantity_i64("abc"), Err(QuantityError::Malformed));
        assert_eq!(parse_quantity_i64("1Qi"), Err(QuantityError::Malformed));
        assert_eq!(parse_quantity_i64("."), Err(QuantityError::Malformed));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(parse_quantity_i64("100Ei"), Err(QuantityError::OutOfRange));
        assert_eq!(parse_quantity_i64("1e19"), Err(QuantityError::OutOfRange));
        assert_eq!(parse_quantity_i64("1e2147483647"), Err(QuantityError::OutOfRange));
        assert_eq!(parse_quantity_i64("1e99999999999"), Err(QuantityError::OutOfRange));
    }

    #[test]
    fn test_exa_suffixes() {
        assert_eq!(parse_quantity_i64("1Ei"), Ok(1 << 60));
        assert_eq!(parse_quantity_i64("7Ei"), Ok(7 << 60));
        assert_eq!(parse_quantity_i64("2E"), Ok(2_000_000_000_000_000_000));
        assert_eq!(parse_quantity_i64("1Ex"), Err(QuantityError::Malformed));
    }

    #[test]
    fn test_extreme_exponents_do_not_overflow() {
        assert_eq!(
            parse_quantity_i64("0.1e-2147483648"),
            Err(QuantityError::Fractional)
        );
        assert_eq!(parse_quantity_i64("5e-3n"), Err(QuantityError::Malformed));
        assert_eq!(parse_quantity_i64("0e2147483647"), Ok(0));
        assert_eq!(parse_quantity_i64("1000e-3"), Ok(1));
        assert_eq!(parse_quantity_i64("1e+3"), Ok(1_000));
    }
}
