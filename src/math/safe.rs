//! Degenerate-input tolerant arithmetic
//!
//! Zero scale components and singular matrices show up routinely in scene
//! data (collapsed objects, animation keys passing through zero). The helpers
//! here resolve them to sentinel values instead of producing `inf`/`NaN`:
//!
//! - [`SafeRecip`]: `0 ↦ 0`, otherwise `1 / x`, element-wise on vectors
//! - [`SafeInverse::safe_inverse`]: singular matrices invert to identity
//! - [`SafeInverse::strict_inverse`]: singular matrices fail with [`InversionError`]
//!
//! A matrix is singular when its `f32` determinant is exactly zero (or not
//! finite). Inversion itself runs in `f64`, so regular matrices with a
//! subnormal determinant (tiny uniform scales) still invert correctly.

use glam::{Affine2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Reciprocal that maps zero to zero.
pub trait SafeRecip {
    /// Returns `1 / self`, or zero where `self` is zero.
    #[must_use]
    fn safe_recip(self) -> Self;
}

impl SafeRecip for f32 {
    #[inline]
    fn safe_recip(self) -> Self {
        if self == 0.0 { 0.0 } else { 1.0 / self }
    }
}

impl SafeRecip for f64 {
    #[inline]
    fn safe_recip(self) -> Self {
        if self == 0.0 { 0.0 } else { 1.0 / self }
    }
}

impl SafeRecip for Vec2 {
    #[inline]
    fn safe_recip(self) -> Self {
        Self::new(self.x.safe_recip(), self.y.safe_recip())
    }
}

impl SafeRecip for Vec3 {
    #[inline]
    fn safe_recip(self) -> Self {
        Self::new(self.x.safe_recip(), self.y.safe_recip(), self.z.safe_recip())
    }
}

impl SafeRecip for Vec4 {
    #[inline]
    fn safe_recip(self) -> Self {
        Self::new(
            self.x.safe_recip(),
            self.y.safe_recip(),
            self.z.safe_recip(),
            self.w.safe_recip(),
        )
    }
}

/// Error returned by [`SafeInverse::strict_inverse`] for a singular matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionError {
    /// Name of the matrix type that failed to invert
    pub matrix: &'static str,
    /// Determinant of the rejected matrix
    pub determinant: f32,
}

impl std::fmt::Display for InversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to invert {}: singular matrix (determinant {})",
            self.matrix, self.determinant
        )
    }
}

impl std::error::Error for InversionError {}

/// Matrix inversion with an explicit policy for singular input.
pub trait SafeInverse: Sized {
    /// Invert, or return `None` when the matrix is singular.
    fn checked_inverse(&self) -> Option<Self>;

    /// Invert, falling back to the identity matrix when singular.
    #[must_use]
    fn safe_inverse(&self) -> Self;

    /// Invert, failing when the matrix is singular.
    ///
    /// # Errors
    ///
    /// Returns [`InversionError`] if the determinant is zero.
    fn strict_inverse(&self) -> Result<Self, InversionError>;
}

#[inline]
fn is_singular(det: f32) -> bool {
    det == 0.0 || !det.is_finite()
}

impl SafeInverse for Mat4 {
    fn checked_inverse(&self) -> Option<Self> {
        if is_singular(self.determinant()) {
            return None;
        }
        // An inverse too large for f32 is as unusable as a singular one.
        let inverse = self.as_dmat4().inverse().as_mat4();
        inverse.is_finite().then_some(inverse)
    }

    fn safe_inverse(&self) -> Self {
        self.checked_inverse().unwrap_or(Self::IDENTITY)
    }

    fn strict_inverse(&self) -> Result<Self, InversionError> {
        self.checked_inverse().ok_or(InversionError {
            matrix: "Mat4",
            determinant: self.determinant(),
        })
    }
}

impl SafeInverse for Affine2 {
    fn checked_inverse(&self) -> Option<Self> {
        if is_singular(self.matrix2.determinant()) {
            return None;
        }
        let inverse = Mat3::from(*self).as_dmat3().inverse().as_mat3();
        inverse.is_finite().then(|| Self::from_mat3(inverse))
    }

    fn safe_inverse(&self) -> Self {
        self.checked_inverse().unwrap_or(Self::IDENTITY)
    }

    fn strict_inverse(&self) -> Result<Self, InversionError> {
        self.checked_inverse().ok_or(InversionError {
            matrix: "Affine2",
            determinant: self.matrix2.determinant(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_safe_recip_zero() {
        assert_eq!(0.0_f32.safe_recip(), 0.0);
        assert_eq!(0.0_f64.safe_recip(), 0.0);
        assert_eq!(Vec3::ZERO.safe_recip(), Vec3::ZERO);
    }

    #[test]
    fn test_safe_recip_nonzero() {
        for x in [0.5_f32, -4.0, 3.0, 1.0e-3, 250.0] {
            assert!((x.safe_recip() * x - 1.0).abs() < 1e-6);
        }
        assert!((7.0_f64.safe_recip() * 7.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_safe_recip_vectors_elementwise() {
        assert_eq!(Vec2::new(2.0, 0.0).safe_recip(), Vec2::new(0.5, 0.0));
        assert_eq!(
            Vec3::new(0.0, 4.0, -2.0).safe_recip(),
            Vec3::new(0.0, 0.25, -0.5)
        );
        assert_eq!(
            Vec4::new(1.0, 0.0, 0.5, 0.0).safe_recip(),
            Vec4::new(1.0, 0.0, 2.0, 0.0)
        );
    }

    #[test]
    fn test_safe_inverse_singular_is_identity() {
        let singular = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(singular.safe_inverse(), Mat4::IDENTITY);
        assert!(singular.checked_inverse().is_none());
    }

    #[test]
    fn test_safe_inverse_regular() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 4.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, -2.0, 5.0),
        );
        let product = m * m.safe_inverse();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_strict_inverse_error() {
        let err = Mat4::ZERO.strict_inverse().unwrap_err();
        assert_eq!(err.matrix, "Mat4");
        assert_eq!(err.determinant, 0.0);
        assert!(err.to_string().contains("Mat4"));
    }

    #[test]
    fn test_subnormal_determinant_is_regular() {
        let tiny = Mat4::from_scale(Vec3::splat(1e-13));
        assert!(tiny.determinant() != 0.0);
        assert!(tiny.determinant().abs() < f32::MIN_POSITIVE);

        let inv = tiny.strict_inverse().unwrap();
        let p = inv.transform_point3(Vec3::new(1e-13, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::X, 1e-4));

        let flat = Affine2::from_scale(Vec2::splat(1e-20));
        let inv = flat.strict_inverse().unwrap();
        assert!(inv.transform_point2(Vec2::new(0.0, 1e-20)).abs_diff_eq(Vec2::Y, 1e-4));
    }

    #[test]
    fn test_affine2_inverse() {
        let a = Affine2::from_scale_angle_translation(Vec2::new(2.0, 2.0), 0.3, Vec2::X);
        let inv = a.strict_inverse().unwrap();
        assert!((a * inv).abs_diff_eq(Affine2::IDENTITY, 1e-5));

        let collapsed = Affine2::from_scale(Vec2::new(0.0, 1.0));
        assert_eq!(collapsed.safe_inverse(), Affine2::IDENTITY);
        assert!(collapsed.strict_inverse().is_err());
    }
}
