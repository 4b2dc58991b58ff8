use nalgebra::ComplexField;

use super::{Matrix3, Primitive, Vector3};

/// Solves `m * x = rhs` through the matrix inverse.
///
/// Returns `None` when the determinant is within [`Primitive::EPSILON`] of
/// zero, which is how the event solvers learn that their offset lines are
/// (nearly) parallel.
#[must_use]
pub fn solve_3x3<T: Primitive>(m: &Matrix3<T>, rhs: &Vector3<T>) -> Option<Vector3<T>> {
    if ComplexField::abs(m.determinant()) < T::EPSILON {
        return None;
    }
    let inverse = m.try_inverse()?;
    Some(inverse * rhs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn solves_square_collapse_system() {
        // Offset lines of the bottom edge of a unit square and its two neighbours.
        let m = Matrix3::new(1.0, 0.0, -1.0, 0.0, 1.0, -1.0, -1.0, 0.0, -1.0);
        let x = solve_3x3(&m, &Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert_relative_eq!(x, Vector3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn singular_system_fails() {
        let m = Matrix3::new(-1.0, 0.0, -1.0, -1.0, 0.0, -1.0, 0.0, 1.0, -1.0);
        assert!(solve_3x3(&m, &Vector3::new(1.0, 2.0, 3.0)).is_none());
    }

    #[test]
    fn near_singular_system_fails_in_single_precision() {
        let m = Matrix3::new(1.0_f32, 0.0, -1.0, 1.0, 1e-5, -1.0, 0.0, 1.0, -1.0);
        assert!(solve_3x3(&m, &Vector3::new(0.0, 0.0, 1.0)).is_none());
    }
}
