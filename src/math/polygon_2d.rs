use super::{Point2, Primitive, Vector2};

/// Turn direction at the middle of three consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingType {
    /// Counter-clockwise turn (convex on a counter-clockwise loop).
    Left,
    /// Clockwise turn (reflex on a counter-clockwise loop).
    Right,
    /// Collinear, the path continues in the same direction.
    Straight,
    /// Collinear, the path doubles back on itself.
    FlatV,
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d<T: Primitive>(points: &[Point2<T>]) -> T {
    let n = points.len();
    if n < 3 {
        return T::ZERO;
    }
    let mut sum = T::ZERO;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum / (T::ONE + T::ONE)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal<T: Primitive>(dir: &Vector2<T>) -> Vector2<T> {
    Vector2::new(-dir.y, dir.x)
}

/// Left-pointing unit normal of the segment `from -> to`, or `None` when the
/// segment is shorter than `min_length`.
#[must_use]
pub fn unit_left_normal<T: Primitive>(
    from: &Point2<T>,
    to: &Point2<T>,
    min_length: T,
) -> Option<Vector2<T>> {
    let d = to - from;
    let len = d.norm();
    if len < min_length {
        return None;
    }
    Some(left_normal(&(d / len)))
}

/// Cross product of `one - zero` and `two - zero`.
#[must_use]
pub fn winding_determinant<T: Primitive>(zero: &Point2<T>, one: &Point2<T>, two: &Point2<T>) -> T {
    let a = one - zero;
    let b = two - zero;
    a.x * b.y - a.y * b.x
}

/// Classifies the turn made at `one` when walking `zero -> one -> two`.
///
/// Determinants within `threshold` of zero are treated as collinear and
/// split into [`WindingType::Straight`] and [`WindingType::FlatV`] by the
/// direction of the two legs.
#[must_use]
pub fn calculate_winding<T: Primitive>(
    zero: &Point2<T>,
    one: &Point2<T>,
    two: &Point2<T>,
    threshold: T,
) -> WindingType {
    let det = winding_determinant(zero, one, two);
    if det > threshold {
        return WindingType::Left;
    }
    if det < -threshold {
        return WindingType::Right;
    }
    let back = zero - one;
    let forward = two - one;
    if back.dot(&forward) > T::ZERO {
        WindingType::FlatV
    } else {
        WindingType::Straight
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-10;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d::<f64>(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d::<f64>(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn left_normal_basic() {
        let n = left_normal(&Vector2::new(1.0_f64, 0.0));
        assert!(n.x.abs() < TOLERANCE);
        assert!((n.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn unit_left_normal_rejects_short_segments() {
        let a = Point2::new(1.0_f64, 1.0);
        assert!(unit_left_normal(&a, &Point2::new(1.0, 1.0 + 1e-12), 1e-8).is_none());
        let n = unit_left_normal(&a, &Point2::new(1.0, 4.0), 1e-8).unwrap();
        assert!((n.x + 1.0).abs() < TOLERANCE);
        assert!(n.y.abs() < TOLERANCE);
    }

    // ── winding classification ──

    #[test]
    fn winding_left_and_right() {
        let a = Point2::new(0.0_f64, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(
            calculate_winding(&a, &b, &Point2::new(1.0, 1.0), 1e-8),
            WindingType::Left
        );
        assert_eq!(
            calculate_winding(&a, &b, &Point2::new(1.0, -1.0), 1e-8),
            WindingType::Right
        );
    }

    #[test]
    fn winding_collinear_cases() {
        let a = Point2::new(0.0_f64, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(
            calculate_winding(&a, &b, &Point2::new(2.0, 0.0), 1e-8),
            WindingType::Straight
        );
        assert_eq!(
            calculate_winding(&a, &b, &Point2::new(0.5, 0.0), 1e-8),
            WindingType::FlatV
        );
    }
}
