use crate::{
    db::models::OrderRecord,
    error::{ConsoleError, ConsoleResult},
};

use super::OrderClass;

/// Orders finished in this many minutes or fewer are on time.
pub const ON_TIME_THRESHOLD_MINUTES: i64 = 1;

/// Classify one completed order from its `"<minutes> <unit>"` completion time.
///
/// Fails with `MalformedOrderData` when there is no leading integer; callers
/// exclude such orders rather than guessing a bucket.
pub fn classify(order: &OrderRecord) -> ConsoleResult<OrderClass> {
    let raw = order.completion_time().unwrap_or_default();
    let token = raw.split(' ').next().unwrap_or_default();

    let minutes = parse_leading_minutes(token).ok_or_else(|| ConsoleError::MalformedOrderData {
        value: raw.to_string(),
    })?;

    if minutes <= ON_TIME_THRESHOLD_MINUTES {
        Ok(OrderClass::OnTime)
    } else {
        Ok(OrderClass::Late)
    }
}

/// Lenient integer read: leading whitespace, optional sign, then digits.
/// A `0x` prefix switches to hex. Anything after the digits is ignored; no
/// digits means no value.
pub fn parse_leading_minutes(token: &str) -> Option<i64> {
    let trimmed = token.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digit_count = digits
        .chars()
        .take_while(|ch| ch.is_digit(radix))
        .count();
    if digit_count == 0 {
        return None;
    }

    // Saturate instead of failing: an absurdly large value is still "late".
    let magnitude = i64::from_str_radix(&digits[..digit_count], radix).unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
