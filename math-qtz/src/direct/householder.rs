//! Elementary reflectors
//!
//! A reflector is `H = I - tau v v^H` with `v[0] = 1`. Only the tail
//! `v[1..]` is stored, usually in the entries the reflector annihilated.

use crate::blas_helpers::{axpy, hypot3, inner_product, vector_norm};
use crate::traits::ComplexField;
use ndarray::{ArrayView1, ArrayViewMut1, Axis};
use num_traits::Zero;

/// Generate a reflector with `H^H [alpha; x] = [beta; 0]`, `beta` real.
///
/// On return `x` holds the tail of `v`. Returns `(beta, tau)`; `tau` is zero
/// (so `H = I`) when `x` is already zero and `alpha` is real.
pub fn make_reflector<T: ComplexField>(alpha: T, mut x: ArrayViewMut1<'_, T>) -> (T, T) {
    let xnorm = vector_norm(x.view());
    let (alpha_re, alpha_im) = (alpha.re(), alpha.im());

    if xnorm.is_zero() && alpha_im.is_zero() {
        return (alpha, T::zero());
    }

    let magnitude = hypot3(alpha_re, alpha_im, xnorm);
    let beta = if alpha_re >= T::Real::zero() {
        -magnitude
    } else {
        magnitude
    };
    let tau = T::from_re_im((beta - alpha_re) / beta, -alpha_im / beta);

    let scale = (alpha - T::from_real(beta)).inv();
    x.mapv_inplace(|v| v * scale);

    (T::from_real(beta), tau)
}

/// Apply `H^H` to `c` from the left: `c := c - conj(tau) v (v^H c)`.
///
/// `c` covers the reflector's support, so `c.len() == tail.len() + 1`.
pub fn apply_reflector_left<T: ComplexField>(
    tau: T,
    tail: ArrayView1<'_, T>,
    c: ArrayViewMut1<'_, T>,
) {
    if tau.is_zero() {
        return;
    }
    let (mut head, rest) = c.split_at(Axis(0), 1);
    let w = head[0] + inner_product(tail, rest.view());
    let k = -(tau.conj() * w);
    head[0] += k;
    axpy(k, tail, rest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array, s};
    use num_complex::Complex64;

    fn reflect<T: ComplexField>(alpha: T, x: &Array1<T>) -> (T, T, Array1<T>) {
        let mut tail = x.clone();
        let (beta, tau) = make_reflector(alpha, tail.view_mut());
        (beta, tau, tail)
    }

    #[test]
    fn test_reflector_annihilates_real() {
        let alpha = 3.0_f64;
        let x = array![4.0_f64, 0.0, 12.0];
        let (beta, tau, tail) = reflect(alpha, &x);

        assert_relative_eq!(beta.abs(), 13.0, epsilon = 1e-12);

        let mut c = array![alpha, 4.0, 0.0, 12.0];
        apply_reflector_left(tau, tail.view(), c.view_mut());
        assert_relative_eq!(c[0], beta, epsilon = 1e-12);
        for i in 1..4 {
            assert_relative_eq!(c[i], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reflector_annihilates_complex() {
        let alpha = Complex64::new(1.0, 2.0);
        let x = array![Complex64::new(-2.0, 1.0), Complex64::new(0.5, -3.0)];
        let (beta, tau, tail) = reflect(alpha, &x);

        assert_relative_eq!(beta.im, 0.0);

        let mut c = array![alpha, x[0], x[1]];
        apply_reflector_left(tau, tail.view(), c.view_mut());
        assert_relative_eq!((c[0] - beta).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.slice(s![1..]).iter().map(|v| v.norm()).sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reflector_is_unitary() {
        let alpha = Complex64::new(0.3, -0.7);
        let x = array![Complex64::new(1.5, 0.2), Complex64::new(-0.4, 0.9)];
        let (_, tau, tail) = reflect(alpha, &x);

        // applying H^H preserves the 2-norm of any vector
        let mut c = array![
            Complex64::new(2.0, 1.0),
            Complex64::new(-1.0, 0.5),
            Complex64::new(0.25, -3.0)
        ];
        let before = vector_norm(c.view());
        apply_reflector_left(tau, tail.view(), c.view_mut());
        assert_relative_eq!(vector_norm(c.view()), before, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_reflector_for_zero_tail() {
        let x = array![0.0_f64, 0.0];
        let (beta, tau, _) = reflect(-2.5_f64, &x);
        assert_relative_eq!(beta, -2.5);
        assert_relative_eq!(tau, 0.0);

        let mut c = array![1.0_f64, 2.0, 3.0];
        apply_reflector_left(tau, array![0.0_f64, 0.0].view(), c.view_mut());
        assert_eq!(c, array![1.0_f64, 2.0, 3.0]);
    }
}
