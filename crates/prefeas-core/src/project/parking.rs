use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{ceil_count, floor_count};
use crate::project::assumptions::ProjectAssumptions;

/// Required parking under the zoning policy in the assumptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingRequirement {
    pub resident_spaces: u32,
    pub visitor_spaces: u32,
    /// Always at least one
    pub disability_spaces: u32,
    pub required_spaces: u32,
    pub designed_spaces: u32,
    pub compliant: bool,
}

pub fn required_parking(total_units: u32, assumptions: &ProjectAssumptions) -> ParkingRequirement {
    let units = Decimal::from(total_units);

    let resident_spaces = ceil_count(units.saturating_mul(assumptions.resident_ratio));
    let visitor_spaces = if assumptions.visitor_divisor > 0 {
        floor_count(units / Decimal::from(assumptions.visitor_divisor))
    } else {
        0
    };
    let disability_spaces =
        ceil_count(Decimal::from(resident_spaces).saturating_mul(assumptions.disability_pct)).max(1);

    let required_spaces = resident_spaces
        .saturating_add(visitor_spaces)
        .saturating_add(disability_spaces);

    ParkingRequirement {
        resident_spaces,
        visitor_spaces,
        disability_spaces,
        required_spaces,
        designed_spaces: assumptions.designed_parking_spaces,
        compliant: assumptions.designed_parking_spaces >= required_spaces,
    }
}
