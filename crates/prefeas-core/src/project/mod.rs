pub mod assumptions;
pub mod decision;
pub mod metrics;
pub mod parking;
pub mod validation;
