//! Complete orthogonal (QTZ) factorization
//!
//! Factors `A P = Q [T 0; 0 0] Z` where `P` is a column permutation chosen by
//! pivoted QR, `Q` and `Z` are products of elementary reflectors and `T` is
//! upper triangular of size `rank x rank`. The factorization reveals the
//! numerical rank of `A` and yields minimum-norm least-squares solutions for
//! square, rectangular and rank-deficient systems.

use crate::blas_helpers::{max_abs, scale_inplace, vector_norm};
use crate::direct::householder::{apply_reflector_left, make_reflector};
use crate::parallel::parallel_map_indexed;
use crate::traits::{ComplexField, ElementType};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use num_traits::{Float, FromPrimitive, One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by QTZ factorizations and solves
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QtzError {
    #[error("{operation} called before the matrix was factored")]
    NotFactored { operation: &'static str },
    #[error(
        "{operation} called with rhs of type {requested} which does not match type of original linear system ({factored})"
    )]
    TypeMismatch {
        operation: &'static str,
        requested: ElementType,
        factored: ElementType,
    },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Output shape mismatch: expected {expected:?}, got {got:?}")]
    OutputShape {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("Relative tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error("Factorization breakdown: {reason}")]
    Breakdown { reason: &'static str },
}

/// QTZ factorization configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QtzConfig<R> {
    /// Relative cutoff on `|R[i,i]| / |R[0,0]|` used to decide the rank.
    /// `None` selects `max(rows, cols) * 10 * eps`.
    #[serde(default)]
    pub relative_tolerance: Option<R>,
    /// Rescale matrices whose max-norm is close to under/overflow
    #[serde(default = "default_scale")]
    pub scale: bool,
}

fn default_scale() -> bool {
    true
}

impl<R> Default for QtzConfig<R> {
    fn default() -> Self {
        Self {
            relative_tolerance: None,
            scale: true,
        }
    }
}

impl<R> QtzConfig<R> {
    /// Configuration with an explicit rank tolerance
    pub fn with_tolerance(tolerance: R) -> Self {
        Self {
            relative_tolerance: Some(tolerance),
            scale: true,
        }
    }
}

/// Complete orthogonal factorization of a dense matrix
///
/// The value only exists once factorization succeeded, so every field is
/// fully populated. It is immutable afterwards and may be shared across
/// threads: each solve allocates its own scratch.
#[derive(Debug, Clone)]
pub struct QtzFactorization<T: ComplexField> {
    /// `T` in the leading `rank x rank` block, QR reflector tails below the
    /// diagonal, RZ reflector tails in rows `0..rank`, columns `rank..cols`
    qtz: Array2<T>,
    /// `pivots[j]` is the original column placed at position `j`
    pivots: Vec<usize>,
    /// One scalar per QR reflector (`min(rows, cols)` of them)
    tau_qr: Vec<T>,
    /// One scalar per RZ reflector, present when `rank < cols`
    tau_rz: Option<Vec<T>>,
    rank: usize,
    n_rows: usize,
    n_cols: usize,
    scale_factor: T::Real,
    matrix_norm: T::Real,
    rcond: T::Real,
}

impl<T: ComplexField> QtzFactorization<T> {
    /// Factor `a` with the default configuration
    pub fn new(a: &Array2<T>) -> Result<Self, QtzError> {
        Self::factor(a, &QtzConfig::default())
    }

    /// Factor `a` with an explicit relative rank tolerance
    pub fn with_tolerance(a: &Array2<T>, tolerance: T::Real) -> Result<Self, QtzError> {
        Self::factor(a, &QtzConfig::with_tolerance(tolerance))
    }

    /// Compute the complete orthogonal factorization of `a`
    pub fn factor(a: &Array2<T>, config: &QtzConfig<T::Real>) -> Result<Self, QtzError> {
        let (m, n) = a.dim();
        let mn = m.min(n);

        if let Some(tol) = config.relative_tolerance {
            if !tol.is_finite() || tol < T::Real::zero() {
                return Err(QtzError::InvalidTolerance(tol.to_f64().unwrap_or(f64::NAN)));
            }
        }
        if !a.iter().all(|v| v.is_finite()) {
            return Err(QtzError::Breakdown {
                reason: "matrix contains non-finite entries",
            });
        }

        let mut qtz = a.to_owned();
        let mut anrm = max_abs(qtz.view());

        // Scale towards the safe range when the norm is near under/overflow
        let eps = T::Real::epsilon();
        let small_num = T::Real::min_positive_value() / eps;
        let big_num = small_num.recip();
        let mut scale_factor = T::Real::one();
        if config.scale && anrm > T::Real::zero() {
            if anrm < small_num {
                scale_factor = small_num / anrm;
            } else if anrm > big_num {
                scale_factor = big_num / anrm;
            }
        }
        if scale_factor != T::Real::one() {
            log::trace!(
                "QTZ: scaling {}x{} matrix with max-norm {:.3e} by {:.3e}",
                m,
                n,
                anrm.to_f64().unwrap_or(0.0),
                scale_factor.to_f64().unwrap_or(0.0)
            );
            let s = T::from_real(scale_factor);
            qtz.mapv_inplace(|v| v * s);
            anrm = max_abs(qtz.view());
        }

        let mut pivots: Vec<usize> = (0..n).collect();

        if anrm.is_zero() {
            // Zero or empty matrix: rank 0, every solution is zero
            log::debug!("QTZ: {}x{} matrix is zero, rank 0", m, n);
            return Ok(Self {
                qtz,
                pivots,
                tau_qr: Vec::new(),
                tau_rz: None,
                rank: 0,
                n_rows: m,
                n_cols: n,
                scale_factor,
                matrix_norm: anrm,
                rcond: T::Real::zero(),
            });
        }

        let tau_qr = pivoted_qr(&mut qtz, &mut pivots);

        if !(0..mn).all(|i| qtz[[i, i]].is_finite()) {
            return Err(QtzError::Breakdown {
                reason: "pivoted QR produced a non-finite triangular factor",
            });
        }

        let tolerance = config.relative_tolerance.unwrap_or_else(|| {
            let dim = T::Real::from_usize(m.max(n)).unwrap_or_else(T::Real::one);
            let ten = T::Real::from_f64(10.0).unwrap_or_else(T::Real::one);
            dim * ten * eps
        });
        let r00 = qtz[[0, 0]].norm();
        let rank = (0..mn)
            .take_while(|&i| qtz[[i, i]].norm() > tolerance * r00)
            .count();
        let rcond = if rank > 0 {
            qtz[[rank - 1, rank - 1]].norm() / r00
        } else {
            T::Real::zero()
        };

        let tau_rz = if rank < n {
            log::trace!("QTZ: rank {} < {} columns, annihilating trailing block", rank, n);
            Some(annihilate_trailing(&mut qtz, rank))
        } else {
            None
        };

        log::debug!(
            "QTZ: factored {}x{} matrix, rank {}, rcond {:.3e}, scaled {}",
            m,
            n,
            rank,
            rcond.to_f64().unwrap_or(0.0),
            scale_factor != T::Real::one()
        );

        Ok(Self {
            qtz,
            pivots,
            tau_qr,
            tau_rz,
            rank,
            n_rows: m,
            n_cols: n,
            scale_factor,
            matrix_norm: anrm,
            rcond,
        })
    }

    /// Estimated numerical rank
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of rows of the factored matrix
    pub fn rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns of the factored matrix
    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// `min(rows, cols)`
    pub fn min_dim(&self) -> usize {
        self.n_rows.min(self.n_cols)
    }

    /// `max(rows, cols)`
    pub fn max_dim(&self) -> usize {
        self.n_rows.max(self.n_cols)
    }

    /// True if the matrix was rescaled before factoring
    pub fn is_scaled(&self) -> bool {
        self.scale_factor != T::Real::one()
    }

    /// Multiplier applied to the matrix (one when not scaled)
    pub fn scale_factor(&self) -> T::Real {
        self.scale_factor
    }

    /// Max-norm of the (possibly scaled) matrix
    pub fn matrix_norm(&self) -> T::Real {
        self.matrix_norm
    }

    /// Estimate of 1/cond(A) from the diagonal of the triangular factor
    pub fn reciprocal_condition(&self) -> T::Real {
        self.rcond
    }

    /// Column permutation chosen by pivoted QR
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    /// Minimum-norm least-squares solution of `A x = b`
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, QtzError> {
        if b.len() != self.n_rows {
            return Err(QtzError::DimensionMismatch {
                expected: self.n_rows,
                got: b.len(),
            });
        }
        Ok(self.solve_column(b.view()))
    }

    /// Solve `A X = B` column by column
    pub fn solve_matrix(&self, b: &Array2<T>) -> Result<Array2<T>, QtzError> {
        if b.nrows() != self.n_rows {
            return Err(QtzError::DimensionMismatch {
                expected: self.n_rows,
                got: b.nrows(),
            });
        }
        let columns = parallel_map_indexed(b.ncols(), |j| self.solve_column(b.column(j)));

        let mut x = Array2::zeros((self.n_cols, b.ncols()));
        for (mut dst, src) in x.axis_iter_mut(Axis(1)).zip(columns.iter()) {
            dst.assign(src);
        }
        Ok(x)
    }

    /// Inverse (pseudo-inverse when rectangular or rank-deficient), `cols x rows`
    pub fn inverse(&self) -> Array2<T> {
        let identity = Array2::from_diag_elem(self.n_rows, T::one());
        let columns = parallel_map_indexed(self.n_rows, |j| self.solve_column(identity.column(j)));

        let mut x = Array2::zeros((self.n_cols, self.n_rows));
        for (mut dst, src) in x.axis_iter_mut(Axis(1)).zip(columns.iter()) {
            dst.assign(src);
        }
        x
    }

    /// Write the inverse into a caller-provided `cols x rows` matrix
    pub fn inverse_into(&self, out: &mut Array2<T>) -> Result<(), QtzError> {
        let expected = (self.n_cols, self.n_rows);
        if out.dim() != expected {
            return Err(QtzError::OutputShape {
                expected,
                got: out.dim(),
            });
        }
        out.assign(&self.inverse());
        Ok(())
    }

    fn solve_column(&self, b: ArrayView1<'_, T>) -> Array1<T> {
        let k = self.rank;
        let mut work = b.to_owned();
        if self.is_scaled() {
            scale_inplace(work.view_mut(), T::from_real(self.scale_factor));
        }

        // work := Q^H b
        for (i, &tau) in self.tau_qr.iter().enumerate() {
            apply_reflector_left(
                tau,
                self.qtz.slice(s![i + 1.., i]),
                work.slice_mut(s![i..]),
            );
        }

        // T y = (Q^H b)[..k], trailing unknowns stay zero
        let mut y = Array1::zeros(self.n_cols);
        for i in (0..k).rev() {
            let mut sum = work[i];
            for j in (i + 1)..k {
                sum -= self.qtz[[i, j]] * y[j];
            }
            y[i] = sum * self.qtz[[i, i]].inv();
        }

        // y := Z_{k-1} ... Z_0 y
        if let Some(tau_rz) = &self.tau_rz {
            for (i, &tau) in tau_rz.iter().enumerate() {
                if tau.is_zero() {
                    continue;
                }
                let tail = self.qtz.slice(s![i, k..]);
                let mut w = y[i];
                for (j, v) in tail.iter().enumerate() {
                    w += v.conj() * y[k + j];
                }
                let t = tau * w;
                y[i] -= t;
                for (j, v) in tail.iter().enumerate() {
                    y[k + j] -= t * *v;
                }
            }
        }

        let mut x = Array1::zeros(self.n_cols);
        for (j, &p) in self.pivots.iter().enumerate() {
            x[p] = y[j];
        }
        x
    }
}

/// Householder QR with column pivoting on `a` in place.
///
/// At each step the column with the largest remaining partial norm moves to
/// the front (first index on ties). Returns one reflector scalar per step.
fn pivoted_qr<T: ComplexField>(a: &mut Array2<T>, pivots: &mut [usize]) -> Vec<T> {
    let (m, n) = a.dim();
    let mn = m.min(n);
    let tol3z = T::Real::epsilon().sqrt();

    let mut vn1: Vec<T::Real> = a.columns().into_iter().map(vector_norm).collect();
    let mut vn2 = vn1.clone();
    let mut tau = Vec::with_capacity(mn);

    for i in 0..mn {
        let mut pvt = i;
        for j in (i + 1)..n {
            if vn1[j] > vn1[pvt] {
                pvt = j;
            }
        }
        if pvt != i {
            for r in 0..m {
                a.swap([r, i], [r, pvt]);
            }
            pivots.swap(i, pvt);
            vn1[pvt] = vn1[i];
            vn2[pvt] = vn2[i];
        }

        let alpha = a[[i, i]];
        let (beta, t) = make_reflector(alpha, a.slice_mut(s![i + 1.., i]));
        a[[i, i]] = beta;
        tau.push(t);

        if i + 1 < n {
            let (left, mut right) = a.view_mut().split_at(Axis(1), i + 1);
            let tail = left.slice(s![i + 1.., i]);
            for col in right.axis_iter_mut(Axis(1)) {
                apply_reflector_left(t, tail, col.slice_move(s![i..]));
            }
        }

        // Downdate partial column norms, recomputing when cancellation is severe
        for j in (i + 1)..n {
            if vn1[j].is_zero() {
                continue;
            }
            let ratio = a[[i, j]].norm() / vn1[j];
            let temp = (T::Real::one() - ratio * ratio).max(T::Real::zero());
            let drift = vn1[j] / vn2[j];
            if temp * drift * drift <= tol3z {
                if i + 1 < m {
                    vn1[j] = vector_norm(a.slice(s![i + 1.., j]));
                } else {
                    vn1[j] = T::Real::zero();
                }
                vn2[j] = vn1[j];
            } else {
                vn1[j] *= temp.sqrt();
            }
        }
    }

    tau
}

/// Reduce the upper trapezoid `R[0..rank, 0..cols]` to `[T 0]` by reflectors
/// applied from the right, last row first.
///
/// The reflector for row `i` acts on column `i` and columns `rank..cols`; its
/// tail replaces the entries it zeroed.
fn annihilate_trailing<T: ComplexField>(a: &mut Array2<T>, rank: usize) -> Vec<T> {
    let mut tau = vec![T::zero(); rank];

    for i in (0..rank).rev() {
        // Reflect the conjugated row so that row * H = [beta 0]
        let alpha = a[[i, i]].conj();
        let mut tail: Array1<T> = a.slice(s![i, rank..]).mapv(|v| v.conj());
        let (beta, t) = make_reflector(alpha, tail.view_mut());
        a[[i, i]] = beta;
        a.slice_mut(s![i, rank..]).assign(&tail);
        tau[i] = t;

        if t.is_zero() {
            continue;
        }
        for r in 0..i {
            let mut w = a[[r, i]];
            for (j, v) in tail.iter().enumerate() {
                w += a[[r, rank + j]] * *v;
            }
            let tw = t * w;
            a[[r, i]] -= tw;
            for (j, v) in tail.iter().enumerate() {
                a[[r, rank + j]] -= tw * v.conj();
            }
        }
    }

    tau
}
