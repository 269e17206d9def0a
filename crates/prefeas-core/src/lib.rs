pub mod error;
pub mod math;
pub mod project;
pub mod types;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::PrefeasError;
pub use types::*;

/// Standard result type for all pre-feasibility operations
pub type PrefeasResult<T> = Result<T, PrefeasError>;
