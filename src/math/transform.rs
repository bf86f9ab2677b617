//! Scale-rotate-translate transform value type
//!
//! [`SrtTransform`] is the placement of an object: scale first, then rotate,
//! then translate. It is a plain `Copy` value; every operation returns a new
//! transform and nothing is shared between nodes.
//!
//! # Conventions
//!
//! `compose(a, b)` applies `a` first, then `b` (`a` nested inside `b`'s frame),
//! so a node's world transform is `local.compose(&parent_world)`.
//!
//! [`SrtTransform::to_matrix`] produces the glam (column-vector) matrix
//! `T * R * S`. Its column-major array layout is byte-identical to the
//! row-vector `S * R * T` matrix used by row-major APIs.
//!
//! The rotation is assumed to be unit length. Nothing normalizes it; callers
//! own that contract.

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::safe::{InversionError, SafeInverse, SafeRecip};

/// Location, rotation and non-uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrtTransform {
    /// Translation, applied last
    pub location: Vec3,
    /// Rotation, applied after scale
    pub rotation: Quat,
    /// Per-axis scale, applied first
    pub scale: Vec3,
}

impl SrtTransform {
    /// The transform that leaves every point in place.
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform from all three parts.
    #[must_use]
    pub const fn new(location: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    /// Create a transform at the origin with the given rotation and scale.
    #[must_use]
    pub const fn from_rotation_scale(rotation: Quat, scale: Vec3) -> Self {
        Self::new(Vec3::ZERO, rotation, scale)
    }

    /// Create a unit-scale transform.
    #[must_use]
    pub const fn from_location_rotation(location: Vec3, rotation: Quat) -> Self {
        Self::new(location, rotation, Vec3::ONE)
    }

    /// Create a pure translation.
    #[must_use]
    pub const fn from_location(location: Vec3) -> Self {
        Self::new(location, Quat::IDENTITY, Vec3::ONE)
    }

    /// Return a copy with a different location.
    #[must_use]
    pub const fn with_location(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    /// Return a copy with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Return a copy with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    // -------------------------------------------------------------------------
    // Matrices
    // -------------------------------------------------------------------------

    /// Affine matrix: scale, then rotate, then translate.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }

    /// Scale and rotation without translation.
    ///
    /// This is the matrix applied to normals and directions. It is not the
    /// inverse-transpose, so normals skew under non-uniform scale.
    #[must_use]
    pub fn to_normal_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, Vec3::ZERO)
    }

    // -------------------------------------------------------------------------
    // Algebra
    // -------------------------------------------------------------------------

    /// Apply `self` first, then `outer`.
    ///
    /// `child_local.compose(&parent_world)` yields the child's world transform.
    #[must_use]
    pub fn compose(&self, outer: &Self) -> Self {
        Self {
            rotation: outer.rotation * self.rotation,
            scale: self.scale * outer.scale,
            location: outer.rotation * (outer.scale * self.location) + outer.location,
        }
    }

    /// Left fold of [`compose`](Self::compose); an empty sequence is the identity.
    #[must_use]
    pub fn compose_all<I>(transforms: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut iter = transforms.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, |acc, t| acc.compose(&t)),
            None => Self::IDENTITY,
        }
    }

    /// Inverse transform. Zero scale components invert to zero.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = quat_inverse(self.rotation);
        let scale = self.scale.safe_recip();
        Self {
            rotation,
            scale,
            location: rotation * (scale * -self.location),
        }
    }

    /// Express `self` (a world-space transform) in `parent`'s local frame.
    ///
    /// Inverse of [`compose`](Self::compose) with respect to `parent`.
    #[must_use]
    pub fn relative_to(&self, parent: &Self) -> Self {
        let inv_scale = parent.scale.safe_recip();
        let inv_rotation = quat_inverse(parent.rotation);
        Self {
            scale: self.scale * inv_scale,
            location: (inv_rotation * (self.location - parent.location)) * inv_scale,
            rotation: inv_rotation * self.rotation,
        }
    }

    // -------------------------------------------------------------------------
    // Applying the transform
    // -------------------------------------------------------------------------

    /// Transform a point (translation included).
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.to_matrix().transform_point3(point)
    }

    /// Transform a direction or normal with [`to_normal_matrix`](Self::to_normal_matrix).
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.to_normal_matrix().transform_vector3(vector)
    }

    /// Transform a homogeneous 4-vector.
    #[must_use]
    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        self.to_matrix() * v
    }

    /// Map a point back through the inverted matrix.
    ///
    /// Inverts `to_matrix()` directly rather than going through
    /// [`inverse`](Self::inverse); the two can diverge for nearly degenerate
    /// transforms. A singular matrix yields the identity, so the point is
    /// returned unchanged.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.to_matrix().safe_inverse().transform_point3(point)
    }

    /// Strict counterpart of [`inverse_transform_point`](Self::inverse_transform_point).
    ///
    /// # Errors
    ///
    /// Returns [`InversionError`] if the transform matrix is singular.
    pub fn try_inverse_transform_point(&self, point: Vec3) -> Result<Vec3, InversionError> {
        Ok(self.to_matrix().strict_inverse()?.transform_point3(point))
    }

    /// Map a direction back through the inverted normal matrix.
    #[must_use]
    pub fn inverse_transform_vector(&self, vector: Vec3) -> Vec3 {
        self.to_normal_matrix()
            .safe_inverse()
            .transform_vector3(vector)
    }

    /// Map a homogeneous 4-vector back through the inverted matrix.
    #[must_use]
    pub fn inverse_transform_vec4(&self, v: Vec4) -> Vec4 {
        self.to_matrix().safe_inverse() * v
    }

    /// Component-wise comparison within `tolerance`.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.location.abs_diff_eq(other.location, tolerance)
            && self.rotation.abs_diff_eq(other.rotation, tolerance)
            && self.scale.abs_diff_eq(other.scale, tolerance)
    }
}

impl Default for SrtTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<SrtTransform> for Mat4 {
    fn from(t: SrtTransform) -> Self {
        t.to_matrix()
    }
}

/// Quaternion inverse that does not assume unit length.
///
/// A zero quaternion inverts to zero.
#[inline]
fn quat_inverse(q: Quat) -> Quat {
    q.conjugate() * q.length_squared().safe_recip()
}
