use rust_decimal::Decimal;

use crate::error::PrefeasError;
use crate::project::assumptions::ProjectInput;
use crate::PrefeasResult;

/// Human-readable names of required fields that are still empty or zero.
///
/// This is the pre-flight check a front end runs before generating an
/// analysis. The engine itself accepts blank projects.
pub fn missing_fields(input: &ProjectInput) -> Vec<&'static str> {
    let a = &input.assumptions;
    let mut missing = Vec::new();

    if a.project_name.trim().is_empty() {
        missing.push("project_name");
    }
    if a.location.trim().is_empty() {
        missing.push("location");
    }
    if a.date.is_none() {
        missing.push("date");
    }

    let required_amounts: [(&'static str, Decimal); 10] = [
        ("land_area", a.land_area),
        ("land_price", a.land_price),
        ("construction_cost_per_m2", a.construction_cost_per_m2),
        ("soft_costs_pct", a.soft_costs_pct),
        ("sales_commission_pct", a.sales_commission_pct),
        ("annual_interest_rate", a.annual_interest_rate),
        ("draw_factor", a.draw_factor),
        ("presale_pct", a.presale_pct),
        ("collection_pct", a.collection_pct),
        ("partner_cash_equity", a.partner_cash_equity),
    ];
    for (name, value) in required_amounts {
        if value.is_zero() {
            missing.push(name);
        }
    }

    let required_months = [
        ("pre_dev_months", a.pre_dev_months),
        ("construction_months", a.construction_months),
        ("post_sale_months", a.post_sale_months),
    ];
    for (name, months) in required_months {
        if months == 0 {
            missing.push(name);
        }
    }

    if !input.unit_mix.iter().any(|line| line.is_complete()) {
        missing.push("unit_mix");
    }

    missing
}

/// Fail with every missing field listed at once.
pub fn validate_for_analysis(input: &ProjectInput) -> PrefeasResult<()> {
    let missing = missing_fields(input);
    if missing.is_empty() {
        return Ok(());
    }
    if missing == ["unit_mix"] {
        return Err(PrefeasError::InsufficientData(
            "Unit mix needs at least one line with quantity, area and price".into(),
        ));
    }
    Err(PrefeasError::InvalidInput {
        field: missing.join(", "),
        reason: "Required for analysis".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::assumptions::UnitMixLine;

    #[test]
    fn test_sample_is_complete() {
        assert!(missing_fields(&ProjectInput::sample()).is_empty());
        assert!(validate_for_analysis(&ProjectInput::sample()).is_ok());
    }

    #[test]
    fn test_blank_lists_everything() {
        let missing = missing_fields(&ProjectInput::default());
        assert!(missing.contains(&"project_name"));
        assert!(missing.contains(&"land_area"));
        assert!(missing.contains(&"construction_months"));
        assert!(missing.contains(&"unit_mix"));
        // Marketing and contingency are optional
        assert!(!missing.contains(&"marketing_pct"));
        assert!(!missing.contains(&"contingency_pct"));
    }

    #[test]
    fn test_incomplete_mix_line_is_insufficient() {
        let mut input = ProjectInput::sample();
        input.unit_mix = vec![UnitMixLine {
            type_label: "Studio".into(),
            quantity: 4,
            ..UnitMixLine::default()
        }];
        let err = validate_for_analysis(&input).unwrap_err();
        assert!(matches!(err, PrefeasError::InsufficientData(_)));
    }
}
