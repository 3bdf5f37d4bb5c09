//! Core traits for dense factorizations
//!
//! This module defines the scalar abstractions used throughout the crate:
//! - [`ComplexField`]: Trait for scalar types (complex and real numbers)
//! - [`ElementType`]: Runtime tag naming one of the four supported scalars

use num_complex::{Complex32, Complex64};
use num_traits::{Float, FromPrimitive, NumAssign, One, ToPrimitive, Zero};
use std::fmt::{self, Debug};
use std::ops::Neg;

/// The four element types a factorization can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `f32`
    Real32,
    /// `f64`
    Real64,
    /// `Complex<f32>`
    Complex32,
    /// `Complex<f64>`
    Complex64,
}

impl ElementType {
    /// True for the two complex element types
    pub fn is_complex(self) -> bool {
        matches!(self, ElementType::Complex32 | ElementType::Complex64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Real32 => "f32",
            ElementType::Real64 => "f64",
            ElementType::Complex32 => "Complex<f32>",
            ElementType::Complex64 => "Complex<f64>",
        };
        f.write_str(name)
    }
}

/// Trait for scalar types that can be used in linear algebra operations.
///
/// This trait abstracts over real and complex number types, providing
/// a unified interface for operations like conjugation, norm computation,
/// and conversion from real values.
///
/// `norm` and `inv` must not overflow for values whose magnitude is
/// representable, since factorizations run on matrices scaled close to
/// the overflow and underflow thresholds.
///
/// # Implementations
///
/// Provided for `Complex64`, `Complex32`, `f64` and `f32`.
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// The real number type underlying this field
    type Real: Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static;

    /// Runtime tag for this scalar type
    const ELEMENT_TYPE: ElementType;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Create from a real value
    fn from_real(r: Self::Real) -> Self;

    /// Create from real and imaginary parts
    fn from_re_im(re: Self::Real, im: Self::Real) -> Self;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Imaginary part
    fn im(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;

    /// True if both parts are finite
    fn is_finite(&self) -> bool {
        self.re().is_finite() && self.im().is_finite()
    }
}

impl ComplexField for Complex64 {
    type Real = f64;

    const ELEMENT_TYPE: ElementType = ElementType::Complex64;

    #[inline]
    fn conj(&self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn from_re_im(re: f64, im: f64) -> Self {
        Complex64::new(re, im)
    }

    #[inline]
    fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    fn im(&self) -> f64 {
        self.im
    }

    /// Smith's algorithm, no intermediate |z|²
    #[inline]
    fn inv(&self) -> Self {
        if self.re.abs() >= self.im.abs() {
            let r = self.im / self.re;
            let d = self.re + self.im * r;
            Complex64::new(1.0 / d, -r / d)
        } else {
            let r = self.re / self.im;
            let d = self.im + self.re * r;
            Complex64::new(r / d, -1.0 / d)
        }
    }
}

impl ComplexField for Complex32 {
    type Real = f32;

    const ELEMENT_TYPE: ElementType = ElementType::Complex32;

    #[inline]
    fn conj(&self) -> Self {
        Complex32::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn norm(&self) -> f32 {
        self.re.hypot(self.im)
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        Complex32::new(r, 0.0)
    }

    #[inline]
    fn from_re_im(re: f32, im: f32) -> Self {
        Complex32::new(re, im)
    }

    #[inline]
    fn re(&self) -> f32 {
        self.re
    }

    #[inline]
    fn im(&self) -> f32 {
        self.im
    }

    #[inline]
    fn inv(&self) -> Self {
        if self.re.abs() >= self.im.abs() {
            let r = self.im / self.re;
            let d = self.re + self.im * r;
            Complex32::new(1.0 / d, -r / d)
        } else {
            let r = self.re / self.im;
            let d = self.im + self.re * r;
            Complex32::new(r / d, -1.0 / d)
        }
    }
}

impl ComplexField for f64 {
    type Real = f64;

    const ELEMENT_TYPE: ElementType = ElementType::Real64;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }

    #[inline]
    fn norm(&self) -> f64 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn from_re_im(re: f64, _im: f64) -> Self {
        re
    }

    #[inline]
    fn re(&self) -> f64 {
        *self
    }

    #[inline]
    fn im(&self) -> f64 {
        0.0
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

impl ComplexField for f32 {
    type Real = f32;

    const ELEMENT_TYPE: ElementType = ElementType::Real32;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f32 {
        *self * *self
    }

    #[inline]
    fn norm(&self) -> f32 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        r
    }

    #[inline]
    fn from_re_im(re: f32, _im: f32) -> Self {
        re
    }

    #[inline]
    fn re(&self) -> f32 {
        *self
    }

    #[inline]
    fn im(&self) -> f32 {
        0.0
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_complex64_field() {
        let z = Complex64::new(3.0, 4.0);
        assert_relative_eq!(z.norm_sqr(), 25.0);
        assert_relative_eq!(ComplexField::norm(&z), 5.0);

        let z_conj = ComplexField::conj(&z);
        assert_relative_eq!(z_conj.re, 3.0);
        assert_relative_eq!(z_conj.im, -4.0);

        let z_inv = ComplexField::inv(&z);
        let product = z * z_inv;
        assert_relative_eq!(product.re, 1.0, epsilon = 1e-10);
        assert_relative_eq!(product.im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_complex_inverse_near_overflow() {
        // |z|² overflows f64 here, the reciprocal must not
        let z = Complex64::new(3.0e200, -4.0e200);
        let z_inv = ComplexField::inv(&z);
        assert!(z_inv.re.is_finite() && z_inv.im.is_finite());
        assert_relative_eq!(z_inv.re, 3.0 / 25.0 * 1e-200, max_relative = 1e-12);
        assert_relative_eq!(z_inv.im, 4.0 / 25.0 * 1e-200, max_relative = 1e-12);
        assert_relative_eq!(ComplexField::norm(&z), 5.0e200, max_relative = 1e-12);
    }

    #[test]
    fn test_f64_field() {
        let x: f64 = -3.0;
        assert_relative_eq!(x.norm_sqr(), 9.0);
        assert_relative_eq!(ComplexField::norm(&x), 3.0);
        assert_relative_eq!(ComplexField::conj(&x), -3.0);
        assert_relative_eq!(ComplexField::inv(&x), -1.0 / 3.0);
        assert!(!ComplexField::is_finite(&f64::NAN));
    }

    #[test]
    fn test_element_type_tags() {
        assert_eq!(<f32 as ComplexField>::ELEMENT_TYPE, ElementType::Real32);
        assert_eq!(<Complex64 as ComplexField>::ELEMENT_TYPE, ElementType::Complex64);
        assert!(ElementType::Complex32.is_complex());
        assert!(!ElementType::Real64.is_complex());
        assert_eq!(ElementType::Complex32.to_string(), "Complex<f32>");
        assert_eq!(ElementType::Real64.to_string(), "f64");
    }
}
