pub mod error;
pub mod lattice;
pub mod math;
pub mod types;

pub use error::LatticeError;
pub use types::*;

/// Standard result type for all lattice operations
pub type LatticeResult<T> = Result<T, LatticeError>;
