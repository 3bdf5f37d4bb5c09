//! Complete orthogonal (QTZ) factorization for dense linear systems
//!
//! This crate solves `A x = b` and computes pseudo-inverses for square,
//! rectangular and rank-deficient matrices. Column-pivoted QR is followed,
//! when the matrix is rank-deficient or wide, by a second orthogonal
//! transform that zeroes the trailing block, which gives a rank estimate and
//! minimum-norm least-squares solutions.
//!
//! # Features
//!
//! - **Rank-revealing**: numerical rank from the triangular factor's diagonal
//! - **Minimum-norm solves**: for under/overdetermined and singular systems
//! - **Generic Scalar Types**: Works with Complex64, Complex32, f64, f32
//! - **Type-erased handle**: [`FactorQtz`] checks the element type of every request
//!
//! # Example
//!
//! ```
//! use math_audio_qtz::FactorQtz;
//! use ndarray::array;
//!
//! let a = array![[1.0_f64, 2.0], [2.0, 4.0], [0.0, 1.0]];
//! let qtz = FactorQtz::new(&a).unwrap();
//! assert_eq!(qtz.rank(), 2);
//!
//! let x = qtz.solve(&array![1.0_f64, 2.0, 0.0]).unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12);
//! assert!(x[1].abs() < 1e-12);
//! ```

pub mod blas_helpers;
pub mod direct;
pub mod parallel;
pub mod traits;

// Re-export main types
pub use traits::{ComplexField, ElementType};

// Re-export direct solvers
pub use direct::{
    DenseMatrix, DenseVector, FactorQtz, QtzConfig, QtzError, QtzFactorization, QtzScalar,
};
