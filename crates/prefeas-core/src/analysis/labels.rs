use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::round_half_up;
use crate::types::Rate;

/// One tick on a sensitivity grid axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Input value used for this row / column
    pub value: Decimal,
    pub label: String,
    pub is_base: bool,
}

/// Format with thousands separators, e.g. `1,234,567` or `1,234.50`.
pub fn format_amount(value: Decimal, dp: u32) -> String {
    let rounded = round_half_up(value, dp);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a fraction as a percentage, e.g. `0.125` → `12.5%` with one place.
pub fn format_percent(value: Rate, dp: u32) -> String {
    format!("{:.*}%", dp as usize, round_half_up(value.saturating_mul(dec!(100)), dp))
}

/// Whole-percent delta for a step, e.g. step 2 at 5% → `+10%`.
pub fn format_step_delta(step: i32, variation_pct: Rate) -> String {
    let delta = round_half_up(Decimal::from(step) * variation_pct * dec!(100), 0);
    if step > 0 {
        format!("+{delta}%")
    } else {
        format!("{delta}%")
    }
}

/// `Base` at the centre, otherwise the signed percentage delta.
pub fn relative_label(step: i32, variation_pct: Rate) -> String {
    if step == 0 {
        "Base".to_string()
    } else {
        format_step_delta(step, variation_pct)
    }
}

/// Formatted absolute value, with `(Base)` at the centre and the percentage
/// delta in parentheses elsewhere.
pub fn absolute_label(formatted: &str, step: i32, variation_pct: Rate) -> String {
    if step == 0 {
        format!("{formatted} (Base)")
    } else {
        format!("{formatted} ({})", format_step_delta(step, variation_pct))
    }
}

/// Append ` (Base)` to the label at the base index.
pub fn mark_base(label: String, is_base: bool) -> String {
    if is_base {
        format!("{label} (Base)")
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(dec!(950), 0), "950");
        assert_eq!(format_amount(dec!(1000), 0), "1,000");
        assert_eq!(format_amount(dec!(1657.142857), 0), "1,657");
        assert_eq!(format_amount(dec!(2900000), 0), "2,900,000");
        assert_eq!(format_amount(dec!(-12345.678), 2), "-12,345.68");
        assert_eq!(format_amount(dec!(997.5), 0), "998");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.11), 1), "11.0%");
        assert_eq!(format_percent(dec!(0.125), 1), "12.5%");
        assert_eq!(format_percent(dec!(0.75), 0), "75%");
    }

    #[test]
    fn test_relative_labels() {
        assert_eq!(relative_label(0, dec!(0.05)), "Base");
        assert_eq!(relative_label(2, dec!(0.05)), "+10%");
        assert_eq!(relative_label(-3, dec!(0.05)), "-15%");
    }

    #[test]
    fn test_absolute_labels() {
        assert_eq!(absolute_label("950", 0, dec!(0.05)), "950 (Base)");
        assert_eq!(absolute_label("998", 1, dec!(0.05)), "998 (+5%)");
        assert_eq!(absolute_label("903", -1, dec!(0.05)), "903 (-5%)");
    }

    #[test]
    fn test_mark_base() {
        assert_eq!(mark_base("18m".to_string(), true), "18m (Base)");
        assert_eq!(mark_base("11.0%".to_string(), false), "11.0%");
    }
}
