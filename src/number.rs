//! Numeric type inference for a single column.
//!
//! [`classify`] scans a column once and returns the narrowest [`SqlType`]
//! able to hold every observed value without loss:
//!
//! - the empty string is a null, as is a literal `nan` token;
//! - one value that is not a plain number (`[+-]digits[.digits][e[+-]digits]`)
//!   makes the whole column `string`;
//! - scientific notation is expanded by shifting decimal digits, never through
//!   floating point, so `5e-4` carries a scale of exactly 4;
//! - integer parts are tracked as [`BigInteger`] so values past the 64-bit
//!   range still compare exactly and land in `bigint`;
//! - trailing fractional zeros do not count towards scale (`1.50` is `1.5`).
//!
//! The classifier holds no shared state and may run on many columns at once.

use std::{cmp::Ordering, fmt};

use crate::schema::SqlType;

/// Integer types from narrowest to widest with their signed bounds. A column
/// fits when `min > lower` and `max <= upper`, so `-128` does not fit `tinyint`.
const INTEGER_LADDER: [(SqlType, i64, i64); 3] = [
    (SqlType::TinyInt, i8::MIN as i64, i8::MAX as i64),
    (SqlType::SmallInt, i16::MIN as i64, i16::MAX as i64),
    (SqlType::Int, i32::MIN as i64, i32::MAX as i64),
];

/// Exact signed integer of unbounded width.
///
/// Trailing zeros are kept as a count, so `1e3000000000` costs one digit of
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInteger {
    negative: bool,
    // ASCII digits without leading or trailing zeros; zero is "0".
    significant: String,
    trailing_zeros: u64,
}

impl BigInteger {
    pub fn zero() -> Self {
        Self {
            negative: false,
            significant: "0".to_string(),
            trailing_zeros: 0,
        }
    }

    /// Builds `digits` followed by `extra_zeros` zeros.
    fn from_parts(negative: bool, digits: &str, extra_zeros: u64) -> Self {
        let trimmed = digits.trim_start_matches('0');
        let significant = trimmed.trim_end_matches('0');
        if significant.is_empty() {
            return Self::zero();
        }
        let stripped = (trimmed.len() - significant.len()) as u64;
        Self {
            negative,
            significant: significant.to_string(),
            trailing_zeros: extra_zeros.saturating_add(stripped),
        }
    }

    fn from_digits(negative: bool, digits: &str) -> Self {
        Self::from_parts(negative, digits, 0)
    }

    fn total_digits(&self) -> u64 {
        (self.significant.len() as u64).saturating_add(self.trailing_zeros)
    }

    /// Number of decimal digits, sign excluded.
    pub fn digit_count(&self) -> usize {
        usize::try_from(self.total_digits()).unwrap_or(usize::MAX)
    }

    fn compare_magnitude(&self, other: &Self) -> Ordering {
        // Equal lengths: the significant runs end in a non-zero digit, so a
        // shorter run padded with zeros sorts first, as plain bytes do.
        self.total_digits()
            .cmp(&other.total_digits())
            .then_with(|| self.significant.as_bytes().cmp(other.significant.as_bytes()))
    }
}

impl From<i64> for BigInteger {
    fn from(value: i64) -> Self {
        Self::from_digits(value < 0, &value.unsigned_abs().to_string())
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.compare_magnitude(other),
            (true, true) => other.compare_magnitude(self),
        }
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.significant)?;
        for _ in 0..self.trailing_zeros {
            f.write_str("0")?;
        }
        Ok(())
    }
}

fn split_sign(token: &str) -> (bool, &str) {
    if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = token.strip_prefix('+') {
        (false, rest)
    } else {
        (false, token)
    }
}

/// A number expanded to fixed-point form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPoint {
    pub integer: BigInteger,
    /// Fractional digits left after trailing zeros are stripped.
    pub fraction_digits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Number(FixedPoint),
}

/// Parses one non-empty cell. Returns `None` when the cell is not a number.
pub fn parse_cell(raw: &str) -> Option<CellValue> {
    let body = raw.trim_ascii();
    if is_nan_token(body) {
        return Some(CellValue::Null);
    }

    let (negative, unsigned) = split_sign(body);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let (integer_digits, fraction_digits) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    if integer_digits.is_empty() && fraction_digits.is_empty() {
        return None;
    }
    if !integer_digits.bytes().all(|b| b.is_ascii_digit())
        || !fraction_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let exponent = match exponent {
        Some(token) => parse_exponent(token)?,
        None => 0,
    };

    Some(CellValue::Number(expand(negative, integer_digits, fraction_digits, exponent)))
}

fn is_nan_token(body: &str) -> bool {
    split_sign(body).1.eq_ignore_ascii_case("nan")
}

/// Exponents past the `i64` range saturate; the value stays a number.
fn parse_exponent(token: &str) -> Option<i64> {
    let (negative, digits) = split_sign(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Moves the decimal point `exponent` places to the right of its written
/// position and splits the result into integer and fractional parts.
fn expand(
    negative: bool,
    integer_digits: &str,
    fraction_digits: &str,
    exponent: i64,
) -> FixedPoint {
    let digits = format!("{integer_digits}{fraction_digits}");
    let point = (integer_digits.len() as i64).saturating_add(exponent);

    let significant_end = digits.trim_end_matches('0').len() as i64;
    let fraction_digits =
        usize::try_from(significant_end.saturating_sub(point).max(0)).unwrap_or(usize::MAX);

    let integer = if significant_end == 0 || point <= 0 {
        BigInteger::zero()
    } else if point as u64 <= digits.len() as u64 {
        BigInteger::from_digits(negative, &digits[..point as usize])
    } else {
        BigInteger::from_parts(negative, &digits, point as u64 - digits.len() as u64)
    };

    FixedPoint {
        integer,
        fraction_digits,
    }
}

#[derive(Debug, Default)]
struct ColumnAccumulator {
    values: usize,
    nulls: usize,
    max_integer_digits: usize,
    max_fraction_digits: usize,
    max_value: Option<BigInteger>,
    min_value: Option<BigInteger>,
}

impl ColumnAccumulator {
    fn record_null(&mut self) {
        self.values += 1;
        self.nulls += 1;
    }

    fn record(&mut self, number: FixedPoint) {
        self.values += 1;
        self.max_integer_digits = self.max_integer_digits.max(number.integer.digit_count());
        self.max_fraction_digits = self.max_fraction_digits.max(number.fraction_digits);
        if self.min_value.as_ref().is_none_or(|min| number.integer < *min) {
            self.min_value = Some(number.integer.clone());
        }
        if self.max_value.as_ref().is_none_or(|max| number.integer > *max) {
            self.max_value = Some(number.integer);
        }
    }

    fn decide(self) -> SqlType {
        // Covers the empty column too.
        if self.nulls == self.values {
            return SqlType::TinyInt;
        }
        let (Some(min), Some(max)) = (self.min_value, self.max_value) else {
            return SqlType::TinyInt;
        };
        if self.max_fraction_digits == 0 {
            return integer_type(&min, &max);
        }
        let scale = saturating_u32(self.max_fraction_digits);
        let precision = saturating_u32(self.max_integer_digits).saturating_add(scale);
        SqlType::Decimal { precision, scale }
    }
}

fn integer_type(min: &BigInteger, max: &BigInteger) -> SqlType {
    INTEGER_LADDER
        .iter()
        .find(|(_, lower, upper)| {
            *min > BigInteger::from(*lower) && *max <= BigInteger::from(*upper)
        })
        .map(|(sql_type, _, _)| *sql_type)
        .unwrap_or(SqlType::BigInt)
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Classifies a column of raw cell values.
///
/// Never fails: an empty or all-null column is `tinyint`, and any value that
/// is not a number turns the whole column into `string`.
pub fn classify<I, S>(values: I) -> SqlType
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut accumulator = ColumnAccumulator::default();
    for value in values {
        let value = value.as_ref();
        if value.is_empty() {
            accumulator.record_null();
            continue;
        }
        match parse_cell(value) {
            Some(CellValue::Null) => accumulator.record_null(),
            Some(CellValue::Number(number)) => accumulator.record(number),
            None => return SqlType::String,
        }
    }
    accumulator.decide()
}
