//! Direct solvers for dense linear systems
//!
//! - [`QtzFactorization`]: complete orthogonal factorization for one element type
//! - [`FactorQtz`]: the same factorization behind a type-erased handle

mod facade;
mod householder;
mod qtz;

pub use facade::{DenseMatrix, DenseVector, FactorQtz, QtzScalar};
pub use householder::{apply_reflector_left, make_reflector};
pub use qtz::{QtzConfig, QtzError, QtzFactorization};
