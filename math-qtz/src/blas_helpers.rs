//! Level-1 kernels used by the factorizations
//!
//! Inner products, norms and vector updates over ndarray views, so that
//! rows, columns and sub-blocks of a factored matrix can be passed without
//! copying.
//!
//! Norms are computed with the scaled sum-of-squares recurrence: the
//! factorization runs on matrices deliberately scaled towards the
//! under/overflow thresholds, where a naive `sqrt(Σ |x_i|^2)` fails.

use crate::traits::ComplexField;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};
use num_traits::{Float, One, Zero};

/// Compute inner product (x, y) = Σ conj(x_i) * y_i
#[inline]
pub fn inner_product<T: ComplexField>(x: ArrayView1<'_, T>, y: ArrayView1<'_, T>) -> T {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );
    let mut sum = T::zero();
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum += xi.conj() * *yi;
    }
    sum
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ |x_i|^2) without intermediate overflow
pub fn vector_norm<T: ComplexField>(x: ArrayView1<'_, T>) -> T::Real {
    let mut scale = T::Real::zero();
    let mut ssq = T::Real::one();
    for xi in x.iter() {
        for part in [xi.re(), xi.im()] {
            if part != T::Real::zero() {
                let a = part.abs();
                if scale < a {
                    let r = scale / a;
                    ssq = T::Real::one() + ssq * r * r;
                    scale = a;
                } else {
                    let r = a / scale;
                    ssq += r * r;
                }
            }
        }
    }
    scale * ssq.sqrt()
}

/// sqrt(a² + b² + c²) without intermediate overflow
pub fn hypot3<R: Float>(a: R, b: R, c: R) -> R {
    let (a, b, c) = (a.abs(), b.abs(), c.abs());
    let w = a.max(b).max(c);
    if w == R::zero() {
        // also covers the all-zero case
        a + b + c
    } else {
        let (a, b, c) = (a / w, b / w, c / w);
        w * (a * a + b * b + c * c).sqrt()
    }
}

/// Largest element magnitude of a matrix (the max-norm)
///
/// Returns zero for an empty matrix. Non-finite entries are not detected
/// here; callers check finiteness separately.
pub fn max_abs<T: ComplexField>(a: ArrayView2<'_, T>) -> T::Real {
    a.iter()
        .fold(T::Real::zero(), |acc, v| acc.max(v.norm()))
}

/// Compute axpy: y = α * x + y
#[inline]
pub fn axpy<T: ComplexField>(alpha: T, x: ArrayView1<'_, T>, mut y: ArrayViewMut1<'_, T>) {
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * *xi;
    }
}

/// Compute vector scale in-place: x = α * x
#[inline]
pub fn scale_inplace<T: ComplexField>(mut x: ArrayViewMut1<'_, T>, alpha: T) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_inner_product_real() {
        let x = array![1.0_f64, 2.0, 3.0];
        let y = array![4.0_f64, 5.0, 6.0];

        let ip = inner_product(x.view(), y.view());
        assert_relative_eq!(ip, 1.0 * 4.0 + 2.0 * 5.0 + 3.0 * 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_inner_product_complex() {
        let x = array![Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)];
        let y = array![Complex64::new(5.0, 6.0), Complex64::new(7.0, 8.0)];

        let ip = inner_product(x.view(), y.view());
        let expected = Complex64::new(70.0, -8.0);
        assert_relative_eq!(ip.re, expected.re, epsilon = 1e-10);
        assert_relative_eq!(ip.im, expected.im, epsilon = 1e-10);
    }

    #[test]
    fn test_vector_norm_complex() {
        let x = array![Complex64::new(3.0, 0.0), Complex64::new(0.0, 4.0)];
        assert_relative_eq!(vector_norm(x.view()), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_vector_norm_zero() {
        let x = array![0.0_f64, 0.0, 0.0];
        assert_relative_eq!(vector_norm(x.view()), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_vector_norm_extreme_magnitudes() {
        let big = array![3.0e200_f64, 4.0e200];
        assert_relative_eq!(vector_norm(big.view()), 5.0e200, max_relative = 1e-12);

        let tiny = array![3.0e-200_f64, 4.0e-200];
        assert_relative_eq!(vector_norm(tiny.view()), 5.0e-200, max_relative = 1e-12);
    }

    #[test]
    fn test_hypot3() {
        assert_relative_eq!(hypot3(1.0_f64, 2.0, 2.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(hypot3(0.0_f64, 0.0, 0.0), 0.0);
        assert_relative_eq!(hypot3(2.0e300_f64, 1.0e300, 2.0e300), 3.0e300, max_relative = 1e-12);
    }

    #[test]
    fn test_max_abs() {
        let a = array![[1.0_f64, -7.5], [2.0, 3.0]];
        assert_relative_eq!(max_abs(a.view()), 7.5);

        let empty = ndarray::Array2::<f64>::zeros((0, 3));
        assert_relative_eq!(max_abs(empty.view()), 0.0);
    }

    #[test]
    fn test_axpy() {
        let x = array![1.0_f64, 2.0, 3.0];
        let mut y = array![1.0_f64, 1.0, 1.0];

        axpy(2.0, x.view(), y.view_mut());

        assert_relative_eq!(y[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(y[1], 5.0, epsilon = 1e-10);
        assert_relative_eq!(y[2], 7.0, epsilon = 1e-10);
    }

    #[test]
    fn test_scale_inplace() {
        let mut x = array![1.0_f64, 2.0, 3.0];

        scale_inplace(x.view_mut(), 0.5);

        assert_relative_eq!(x[0], 0.5, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[2], 1.5, epsilon = 1e-10);
    }
}
