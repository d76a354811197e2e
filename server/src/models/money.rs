// server/src/models/money.rs

//! Money is kept as integer cents and only becomes a decimal at the JSON edge.

/// Largest amount, in either direction, accepted from a client.
pub const MAX_DECIMAL_AMOUNT: f64 = 1e9;

/// Converts a decimal amount such as `9.5` into cents. `None` for NaN, infinity
/// or anything beyond [`MAX_DECIMAL_AMOUNT`].
pub fn cents_from_decimal(value: f64) -> Option<i64> {
  if !value.is_finite() || value.abs() > MAX_DECIMAL_AMOUNT {
    return None;
  }
  Some((value * 100.0).round() as i64)
}

pub fn to_decimal(cents: i64) -> f64 {
  cents as f64 / 100.0
}

/// `1650` -> `"16.50"`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decimal_conversion_rounds_to_nearest_cent() {
    assert_eq!(cents_from_decimal(9.5), Some(950));
    assert_eq!(cents_from_decimal(16.499), Some(1650));
    assert_eq!(cents_from_decimal(0.1 + 0.2), Some(30));
    assert_eq!(cents_from_decimal(f64::NAN), None);
    assert_eq!(cents_from_decimal(-1e300), None);
    assert_eq!(cents_from_decimal(1e10), None);
    assert_eq!(cents_from_decimal(-2.5), Some(-250));
    assert_eq!(to_decimal(1650), 16.5);
  }

  #[test]
  fn formatting() {
    assert_eq!(format_cents(1650), "16.50");
    assert_eq!(format_cents(5), "0.05");
    assert_eq!(format_cents(-120), "-1.20");
  }
}
