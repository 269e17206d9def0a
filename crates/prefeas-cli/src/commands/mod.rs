pub mod project;
pub mod sensitivity;
pub mod study;
