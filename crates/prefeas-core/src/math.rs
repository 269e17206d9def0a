use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// `numerator / denominator`, or zero when the denominator is zero.
/// Quotients beyond the decimal range saturate to `Decimal::MAX` / `MIN`.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(
        if numerator.is_sign_negative() != denominator.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        },
    )
}

/// True when a value sits at either end of the decimal range.
pub fn is_saturated(value: Decimal) -> bool {
    value == Decimal::MAX || value == Decimal::MIN
}

/// Whole count of a value, saturating at zero below and `u32::MAX` above.
fn saturating_count(whole: Decimal) -> u32 {
    whole
        .to_u32()
        .unwrap_or(if whole.is_sign_positive() { u32::MAX } else { 0 })
}

/// Round to `dp` places with halves going away from zero.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest whole month.
pub fn round_months(value: Decimal) -> u32 {
    saturating_count(round_half_up(value, 0))
}

/// Ceiling of a quantity as a whole count.
pub fn ceil_count(value: Decimal) -> u32 {
    saturating_count(value.ceil())
}

/// Floor of a quantity as a whole count.
pub fn floor_count(value: Decimal) -> u32 {
    saturating_count(value.floor())
}
