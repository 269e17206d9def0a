pub mod file;
pub mod formula;
pub mod overrides;
pub mod project;
pub mod stdin;
