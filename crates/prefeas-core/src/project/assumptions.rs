use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Development assumptions for a single pre-feasibility analysis.
///
/// Every percentage is a fraction (0.05 = 5%). Missing fields deserialise to
/// their defaults so a partially filled project file is still a complete
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectAssumptions {
    /// Project identifier (not used in calculation)
    pub project_name: String,
    /// Site location (not used in calculation)
    pub location: String,
    /// Analysis date (not used in calculation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Land plot area in m²
    pub land_area: Decimal,
    /// Land acquisition price; also imputed as the landowner's equity
    pub land_price: Money,

    /// Hard construction cost per sellable m²
    pub construction_cost_per_m2: Money,

    /// Soft costs as a fraction of gross revenue
    pub soft_costs_pct: Rate,
    /// Brokerage commission as a fraction of gross revenue
    pub sales_commission_pct: Rate,
    /// Marketing as a fraction of gross revenue
    pub marketing_pct: Rate,
    /// Contingency as a fraction of construction cost
    pub contingency_pct: Rate,

    /// Annual interest rate on the construction loan
    pub annual_interest_rate: Rate,
    /// Average fraction of the loan outstanding during construction
    pub draw_factor: Rate,
    /// Up-front bank fee as a fraction of the loan
    pub bank_fee_pct: Rate,

    pub pre_dev_months: u32,
    pub construction_months: u32,
    pub post_sale_months: u32,

    /// Fraction of units sold during construction
    pub presale_pct: Rate,
    /// Fraction of the presale price collected before delivery
    pub collection_pct: Rate,

    /// Cash contributed by the capital partner
    pub partner_cash_equity: Money,

    pub designed_parking_spaces: u32,
    /// Resident spaces per unit
    pub resident_ratio: Decimal,
    /// One visitor space per this many units (0 disables visitor spaces)
    pub visitor_divisor: u32,
    /// Accessible spaces as a fraction of resident spaces
    pub disability_pct: Rate,
}

impl Default for ProjectAssumptions {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            location: String::new(),
            date: None,
            land_area: Decimal::ZERO,
            land_price: Decimal::ZERO,
            construction_cost_per_m2: Decimal::ZERO,
            soft_costs_pct: Decimal::ZERO,
            sales_commission_pct: Decimal::ZERO,
            marketing_pct: Decimal::ZERO,
            contingency_pct: Decimal::ZERO,
            annual_interest_rate: Decimal::ZERO,
            draw_factor: Decimal::ZERO,
            bank_fee_pct: Decimal::ZERO,
            pre_dev_months: 0,
            construction_months: 0,
            post_sale_months: 0,
            presale_pct: Decimal::ZERO,
            collection_pct: Decimal::ZERO,
            partner_cash_equity: Decimal::ZERO,
            designed_parking_spaces: 0,
            resident_ratio: Decimal::ONE,
            visitor_divisor: 10,
            disability_pct: dec!(0.04),
        }
    }
}

impl ProjectAssumptions {
    pub fn with_construction_cost_per_m2(&self, cost: Money) -> Self {
        Self {
            construction_cost_per_m2: cost,
            ..self.clone()
        }
    }

    pub fn with_interest_rate(&self, rate: Rate) -> Self {
        Self {
            annual_interest_rate: rate,
            ..self.clone()
        }
    }

    pub fn with_partner_cash_equity(&self, equity: Money) -> Self {
        Self {
            partner_cash_equity: equity,
            ..self.clone()
        }
    }

    pub fn with_construction_months(&self, months: u32) -> Self {
        Self {
            construction_months: months,
            ..self.clone()
        }
    }

    pub fn with_presale_pct(&self, presale_pct: Rate) -> Self {
        Self {
            presale_pct,
            ..self.clone()
        }
    }

    /// Pre-development + construction + post-sale months, saturating at `u32::MAX`.
    pub fn total_months(&self) -> u32 {
        self.pre_dev_months
            .saturating_add(self.construction_months)
            .saturating_add(self.post_sale_months)
    }
}

/// One line of the product mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitMixLine {
    pub type_label: String,
    pub quantity: u32,
    /// Sellable area per unit in m²
    pub area_m2: Decimal,
    pub price_per_unit: Money,
}

impl Default for UnitMixLine {
    fn default() -> Self {
        Self {
            type_label: String::new(),
            quantity: 0,
            area_m2: Decimal::ZERO,
            price_per_unit: Decimal::ZERO,
        }
    }
}

impl UnitMixLine {
    pub fn new(type_label: &str, quantity: u32, area_m2: Decimal, price_per_unit: Money) -> Self {
        Self {
            type_label: type_label.to_string(),
            quantity,
            area_m2,
            price_per_unit,
        }
    }

    /// A line with quantity, area and price all filled in.
    pub fn is_complete(&self) -> bool {
        self.quantity > 0 && self.area_m2 > Decimal::ZERO && self.price_per_unit > Decimal::ZERO
    }
}

/// Scale every line's unit price by `factor`, leaving the input untouched.
pub fn scale_prices(mix: &[UnitMixLine], factor: Decimal) -> Vec<UnitMixLine> {
    mix.iter()
        .map(|line| UnitMixLine {
            price_per_unit: line.price_per_unit.saturating_mul(factor),
            ..line.clone()
        })
        .collect()
}

/// Go/no-go bounds. `*_min` must be met or exceeded, `*_max` must not be
/// exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub roi_min: Rate,
    pub margin_min: Rate,
    pub moic_min: Multiple,
    pub markup_min: Multiple,
    pub irr_min: Rate,
    pub ltv_max: Rate,
    pub ltc_max: Rate,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            roi_min: dec!(0.18),
            margin_min: dec!(0.125),
            moic_min: dec!(1.5),
            markup_min: dec!(1.25),
            irr_min: dec!(0.25),
            ltv_max: dec!(0.45),
            ltc_max: dec!(0.55),
        }
    }
}

/// A complete project: the shape that is saved, loaded and analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    pub assumptions: ProjectAssumptions,
    pub unit_mix: Vec<UnitMixLine>,
    pub thresholds: Thresholds,
}

impl Default for ProjectInput {
    fn default() -> Self {
        Self {
            assumptions: ProjectAssumptions::default(),
            unit_mix: (1..=6)
                .map(|i| UnitMixLine {
                    type_label: format!("Type {i}"),
                    ..UnitMixLine::default()
                })
                .collect(),
            thresholds: Thresholds::default(),
        }
    }
}

impl ProjectInput {
    /// Quick-fill example: a 20-unit mid-rise on a 1,332 m² plot.
    pub fn sample() -> Self {
        let assumptions = ProjectAssumptions {
            project_name: "Project 1".into(),
            location: "Santiago, DR".into(),
            date: NaiveDate::from_ymd_opt(2026, 2, 22),
            land_area: dec!(1332),
            land_price: dec!(275000),
            construction_cost_per_m2: dec!(950),
            soft_costs_pct: dec!(0.025),
            sales_commission_pct: dec!(0.05),
            marketing_pct: dec!(0.003),
            contingency_pct: dec!(0.02),
            annual_interest_rate: dec!(0.11),
            draw_factor: dec!(0.55),
            bank_fee_pct: dec!(0.01),
            pre_dev_months: 6,
            construction_months: 18,
            post_sale_months: 6,
            presale_pct: dec!(0.75),
            collection_pct: dec!(0.25),
            partner_cash_equity: dec!(300000),
            designed_parking_spaces: 33,
            resident_ratio: Decimal::ONE,
            visitor_divisor: 10,
            disability_pct: dec!(0.04),
        };

        let mut unit_mix = vec![
            UnitMixLine::new("Type 1", 10, dec!(82), dec!(140000)),
            UnitMixLine::new("Type 2", 10, dec!(93), dec!(150000)),
        ];
        unit_mix.extend((3..=6).map(|i| UnitMixLine {
            type_label: format!("Type {i}"),
            ..UnitMixLine::default()
        }));

        Self {
            assumptions,
            unit_mix,
            thresholds: Thresholds::default(),
        }
    }
}
