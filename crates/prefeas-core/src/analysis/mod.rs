pub mod break_even;
pub mod capital_structure;
pub mod labels;
pub mod scenarios;
pub mod sensitivity;
pub mod study;
pub mod tables;
