use nalgebra::ComplexField;

use super::{Point2, Point3, Primitive};

/// Relative-error equality for scalars.
///
/// Exact matches always compare equal. When either value is zero (or both
/// are too small for a relative comparison) the difference must be below
/// `eps * MIN_POSITIVE`; otherwise the difference is measured against the
/// combined magnitude of the two values.
#[must_use]
pub fn adaptive_equivalent<T: Primitive>(a: T, b: T, eps: T) -> bool {
    if a == b {
        return true;
    }
    let abs_a = ComplexField::abs(a);
    let abs_b = ComplexField::abs(b);
    let diff = ComplexField::abs(a - b);
    let sum = abs_a + abs_b;
    if a == T::ZERO || b == T::ZERO || sum < T::MIN_POSITIVE {
        return diff < eps * T::MIN_POSITIVE;
    }
    diff / sum < eps
}

/// Per-component [`adaptive_equivalent`] for 2D points.
#[must_use]
pub fn adaptive_equivalent_2d<T: Primitive>(a: &Point2<T>, b: &Point2<T>, eps: T) -> bool {
    adaptive_equivalent(a.x, b.x, eps) && adaptive_equivalent(a.y, b.y, eps)
}

/// Per-component [`adaptive_equivalent`] for points carrying a time in `z`.
#[must_use]
pub fn adaptive_equivalent_3d<T: Primitive>(a: &Point3<T>, b: &Point3<T>, eps: T) -> bool {
    adaptive_equivalent(a.x, b.x, eps)
        && adaptive_equivalent(a.y, b.y, eps)
        && adaptive_equivalent(a.z, b.z, eps)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exact_values_match() {
        assert!(adaptive_equivalent(0.0_f64, 0.0, 1e-8));
        assert!(adaptive_equivalent(-3.5_f64, -3.5, 1e-8));
    }

    #[test]
    fn relative_difference_scales_with_magnitude() {
        assert!(adaptive_equivalent(1.0e6_f64, 1.0e6 + 1.0e-3, 1e-8));
        assert!(!adaptive_equivalent(1.0_f64, 1.0 + 1.0e-3, 1e-8));
    }

    #[test]
    fn zero_requires_near_exact_match() {
        assert!(!adaptive_equivalent(0.0_f64, 1e-12, 1e-8));
        assert!(adaptive_equivalent(0.0_f64, f64::MIN_POSITIVE * 1e-9, 1e-8));
    }

    #[test]
    fn points_compare_per_component() {
        let a = Point3::new(0.5_f32, 0.5, 0.5);
        let b = Point3::new(0.500_001_f32, 0.5, 0.5);
        let c = Point3::new(0.5_f32, 0.6, 0.5);
        assert!(adaptive_equivalent_3d(&a, &b, 1e-4));
        assert!(!adaptive_equivalent_3d(&a, &c, 1e-4));
        assert!(adaptive_equivalent_2d(&a.xy(), &b.xy(), 1e-4));
    }
}
