//! Types used throughout the ATM.
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::bank::AmountRejection;

/// Decimal precision for monetary values.
/// This is used to convert floating-point values to fixed-point representation.
pub const DECIMAL_PRECISION: f64 = 10000.0;

/// Money type, representing a fixed-point monetary value.
pub type Money = i64;

/// Converts a fixed-point amount back to a decimal number.
pub fn money_to_f64(money: Money) -> f64 {
    money as f64 / DECIMAL_PRECISION
}

/// Renders an amount with two decimal places, e.g. `600.00`.
pub fn format_money(money: Money) -> String {
    format!("{:.2}", money_to_f64(money))
}

/// Parses a decimal string such as `"100"` or `"12.50"` into fixed-point money.
/// The sign is kept; deciding whether it is acceptable is up to the caller.
pub fn parse_money(input: &str) -> Result<Money, AmountRejection> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| AmountRejection::NotANumber)?;
    if !value.is_finite() {
        return Err(AmountRejection::NotANumber);
    }

    let scaled = (value * DECIMAL_PRECISION).round();
    if scaled.abs() >= Money::MAX as f64 {
        return Err(AmountRejection::OutOfRange);
    }
    if value > 0.0 && scaled == 0.0 {
        return Err(AmountRejection::BelowPrecision);
    }
    Ok(scaled as Money)
}

pub fn serialize_money<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    money_to_f64(*money).serialize(serializer)
}

/// Identifies one caller of the ATM. Minted by the caller and presented
/// with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }

    /// Parses a token previously handed out by [`SessionId::to_string`].
    pub fn parse(token: &str) -> Option<Self> {
        Uuid::parse_str(token.trim()).ok().map(SessionId)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
