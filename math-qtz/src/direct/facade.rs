//! Type-erased QTZ factorization handle
//!
//! [`FactorQtz`] holds a factorization of any of the four supported element
//! types behind one value. Solves are generic over [`QtzScalar`]; asking a
//! handle factored with one element type to solve with another is a checked
//! [`QtzError::TypeMismatch`], never an implicit conversion.
//!
//! Callers that only learn the element type at runtime can use the
//! [`DenseMatrix`] / [`DenseVector`] tagged containers instead.

use crate::direct::qtz::{QtzConfig, QtzError, QtzFactorization};
use crate::traits::{ComplexField, ElementType};
use ndarray::{Array1, Array2};
use num_complex::{Complex32, Complex64};

/// Scalars a [`FactorQtz`] handle can be built from
pub trait QtzScalar: ComplexField {
    /// Move a typed factorization into a handle
    fn wrap(engine: QtzFactorization<Self>) -> FactorQtz;

    /// Borrow the typed factorization back if the handle holds this type
    fn engine(handle: &FactorQtz) -> Option<&QtzFactorization<Self>>;
}

macro_rules! impl_qtz_scalar {
    ($t:ty, $variant:ident) => {
        impl QtzScalar for $t {
            fn wrap(engine: QtzFactorization<Self>) -> FactorQtz {
                FactorQtz::$variant(engine)
            }

            fn engine(handle: &FactorQtz) -> Option<&QtzFactorization<Self>> {
                match handle {
                    FactorQtz::$variant(engine) => Some(engine),
                    _ => None,
                }
            }
        }
    };
}

impl_qtz_scalar!(f32, Real32);
impl_qtz_scalar!(f64, Real64);
impl_qtz_scalar!(Complex32, Complex32);
impl_qtz_scalar!(Complex64, Complex64);

/// Dense matrix whose element type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum DenseMatrix {
    Real32(Array2<f32>),
    Real64(Array2<f64>),
    Complex32(Array2<Complex32>),
    Complex64(Array2<Complex64>),
}

/// Dense vector whose element type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum DenseVector {
    Real32(Array1<f32>),
    Real64(Array1<f64>),
    Complex32(Array1<Complex32>),
    Complex64(Array1<Complex64>),
}

impl DenseMatrix {
    pub fn element_type(&self) -> ElementType {
        match self {
            DenseMatrix::Real32(_) => ElementType::Real32,
            DenseMatrix::Real64(_) => ElementType::Real64,
            DenseMatrix::Complex32(_) => ElementType::Complex32,
            DenseMatrix::Complex64(_) => ElementType::Complex64,
        }
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        match self {
            DenseMatrix::Real32(m) => m.dim(),
            DenseMatrix::Real64(m) => m.dim(),
            DenseMatrix::Complex32(m) => m.dim(),
            DenseMatrix::Complex64(m) => m.dim(),
        }
    }
}

impl DenseVector {
    pub fn element_type(&self) -> ElementType {
        match self {
            DenseVector::Real32(_) => ElementType::Real32,
            DenseVector::Real64(_) => ElementType::Real64,
            DenseVector::Complex32(_) => ElementType::Complex32,
            DenseVector::Complex64(_) => ElementType::Complex64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DenseVector::Real32(v) => v.len(),
            DenseVector::Real64(v) => v.len(),
            DenseVector::Complex32(v) => v.len(),
            DenseVector::Complex64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Array2<f32>> for DenseMatrix {
    fn from(m: Array2<f32>) -> Self {
        DenseMatrix::Real32(m)
    }
}

impl From<Array2<f64>> for DenseMatrix {
    fn from(m: Array2<f64>) -> Self {
        DenseMatrix::Real64(m)
    }
}

impl From<Array2<Complex32>> for DenseMatrix {
    fn from(m: Array2<Complex32>) -> Self {
        DenseMatrix::Complex32(m)
    }
}

impl From<Array2<Complex64>> for DenseMatrix {
    fn from(m: Array2<Complex64>) -> Self {
        DenseMatrix::Complex64(m)
    }
}

impl From<Array1<f32>> for DenseVector {
    fn from(v: Array1<f32>) -> Self {
        DenseVector::Real32(v)
    }
}

impl From<Array1<f64>> for DenseVector {
    fn from(v: Array1<f64>) -> Self {
        DenseVector::Real64(v)
    }
}

impl From<Array1<Complex32>> for DenseVector {
    fn from(v: Array1<Complex32>) -> Self {
        DenseVector::Complex32(v)
    }
}

impl From<Array1<Complex64>> for DenseVector {
    fn from(v: Array1<Complex64>) -> Self {
        DenseVector::Complex64(v)
    }
}

/// QTZ factorization of a matrix of any supported element type
///
/// A handle starts out [`FactorQtz::Unfactored`] (see [`Default`]) or is
/// built directly from a matrix. Every solve, inverse or clone on an
/// unfactored handle fails with [`QtzError::NotFactored`].
#[derive(Debug, Clone, Default)]
pub enum FactorQtz {
    #[default]
    Unfactored,
    Real32(QtzFactorization<f32>),
    Real64(QtzFactorization<f64>),
    Complex32(QtzFactorization<Complex32>),
    Complex64(QtzFactorization<Complex64>),
}

impl FactorQtz {
    /// Handle with no factorization yet
    pub fn new_unfactored() -> Self {
        FactorQtz::Unfactored
    }

    /// Factor `a` with the default rank tolerance
    pub fn new<T: QtzScalar>(a: &Array2<T>) -> Result<Self, QtzError> {
        Self::with_config(a, &QtzConfig::default())
    }

    /// Factor `a`, overriding the relative rank tolerance
    pub fn with_tolerance<T: QtzScalar>(
        a: &Array2<T>,
        tolerance: T::Real,
    ) -> Result<Self, QtzError> {
        Self::with_config(a, &QtzConfig::with_tolerance(tolerance))
    }

    pub fn with_config<T: QtzScalar>(
        a: &Array2<T>,
        config: &QtzConfig<T::Real>,
    ) -> Result<Self, QtzError> {
        QtzFactorization::factor(a, config).map(T::wrap)
    }

    /// Factor a runtime-typed matrix
    pub fn from_dense(a: &DenseMatrix) -> Result<Self, QtzError> {
        match a {
            DenseMatrix::Real32(m) => Self::new(m),
            DenseMatrix::Real64(m) => Self::new(m),
            DenseMatrix::Complex32(m) => Self::new(m),
            DenseMatrix::Complex64(m) => Self::new(m),
        }
    }

    /// Factor `a` into this handle.
    ///
    /// The previous state is replaced only if factorization succeeds.
    pub fn factor<T: QtzScalar>(&mut self, a: &Array2<T>) -> Result<(), QtzError> {
        *self = Self::new(a)?;
        Ok(())
    }

    pub fn is_factored(&self) -> bool {
        !matches!(self, FactorQtz::Unfactored)
    }

    /// Element type the handle was factored with
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            FactorQtz::Unfactored => None,
            FactorQtz::Real32(_) => Some(ElementType::Real32),
            FactorQtz::Real64(_) => Some(ElementType::Real64),
            FactorQtz::Complex32(_) => Some(ElementType::Complex32),
            FactorQtz::Complex64(_) => Some(ElementType::Complex64),
        }
    }

    /// Estimated rank, zero for an unfactored handle
    pub fn rank(&self) -> usize {
        match self {
            FactorQtz::Unfactored => 0,
            FactorQtz::Real32(f) => f.rank(),
            FactorQtz::Real64(f) => f.rank(),
            FactorQtz::Complex32(f) => f.rank(),
            FactorQtz::Complex64(f) => f.rank(),
        }
    }

    /// `(rows, cols)` of the factored matrix
    pub fn dim(&self) -> Option<(usize, usize)> {
        match self {
            FactorQtz::Unfactored => None,
            FactorQtz::Real32(f) => Some((f.rows(), f.cols())),
            FactorQtz::Real64(f) => Some((f.rows(), f.cols())),
            FactorQtz::Complex32(f) => Some((f.rows(), f.cols())),
            FactorQtz::Complex64(f) => Some((f.rows(), f.cols())),
        }
    }

    fn check_factored(&self, operation: &'static str) -> Result<ElementType, QtzError> {
        self.element_type().ok_or(QtzError::NotFactored { operation })
    }

    /// Borrow the typed factorization, checking factored state then type
    pub fn engine<T: QtzScalar>(
        &self,
        operation: &'static str,
    ) -> Result<&QtzFactorization<T>, QtzError> {
        let factored = self.check_factored(operation)?;
        T::engine(self).ok_or(QtzError::TypeMismatch {
            operation,
            requested: T::ELEMENT_TYPE,
            factored,
        })
    }

    /// Minimum-norm least-squares solution of `A x = b`
    pub fn solve<T: QtzScalar>(&self, b: &Array1<T>) -> Result<Array1<T>, QtzError> {
        self.engine::<T>("solve")?.solve(b)
    }

    /// Solve `A X = B` for every column of `B`
    pub fn solve_matrix<T: QtzScalar>(&self, b: &Array2<T>) -> Result<Array2<T>, QtzError> {
        self.engine::<T>("solve")?.solve_matrix(b)
    }

    /// Inverse, or pseudo-inverse for rectangular and rank-deficient matrices
    pub fn inverse<T: QtzScalar>(&self) -> Result<Array2<T>, QtzError> {
        Ok(self.engine::<T>("inverse")?.inverse())
    }

    pub fn inverse_into<T: QtzScalar>(&self, out: &mut Array2<T>) -> Result<(), QtzError> {
        self.engine::<T>("inverse")?.inverse_into(out)
    }

    /// Solve with a runtime-typed right-hand side
    pub fn solve_dense(&self, b: &DenseVector) -> Result<DenseVector, QtzError> {
        match b {
            DenseVector::Real32(v) => self.solve(v).map(DenseVector::Real32),
            DenseVector::Real64(v) => self.solve(v).map(DenseVector::Real64),
            DenseVector::Complex32(v) => self.solve(v).map(DenseVector::Complex32),
            DenseVector::Complex64(v) => self.solve(v).map(DenseVector::Complex64),
        }
    }

    pub fn solve_dense_matrix(&self, b: &DenseMatrix) -> Result<DenseMatrix, QtzError> {
        match b {
            DenseMatrix::Real32(m) => self.solve_matrix(m).map(DenseMatrix::Real32),
            DenseMatrix::Real64(m) => self.solve_matrix(m).map(DenseMatrix::Real64),
            DenseMatrix::Complex32(m) => self.solve_matrix(m).map(DenseMatrix::Complex32),
            DenseMatrix::Complex64(m) => self.solve_matrix(m).map(DenseMatrix::Complex64),
        }
    }

    /// Inverse in the handle's own element type
    pub fn inverse_dense(&self) -> Result<DenseMatrix, QtzError> {
        match self {
            FactorQtz::Unfactored => Err(QtzError::NotFactored {
                operation: "inverse",
            }),
            FactorQtz::Real32(f) => Ok(DenseMatrix::Real32(f.inverse())),
            FactorQtz::Real64(f) => Ok(DenseMatrix::Real64(f.inverse())),
            FactorQtz::Complex32(f) => Ok(DenseMatrix::Complex32(f.inverse())),
            FactorQtz::Complex64(f) => Ok(DenseMatrix::Complex64(f.inverse())),
        }
    }

    /// Independent deep copy of a factored handle
    pub fn try_clone(&self) -> Result<Self, QtzError> {
        self.check_factored("clone")?;
        Ok(self.clone())
    }
}
