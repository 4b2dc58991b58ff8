use super::polygon_2d::left_normal;
use super::{Point2, Primitive, Vector2};

/// Velocity scale used by the fixed-point routines: an edge advances this
/// many integer units per unit of time, giving sub-unit precision on
/// integer coordinates.
pub const FIXED_POINT_VELOCITY_SCALE: i64 = 1 << 10;

/// Integer 2D coordinate pair.
pub type IntPoint2 = (i64, i64);

/// Intersection of the infinite lines `a -> b` and `c -> d`.
///
/// Each line is written in implicit form `x*u + y*v + i = 0` and the pair
/// is solved with Cramer's rule. Returns `None` only for exactly parallel
/// lines; callers classify near-parallel configurations beforehand.
#[must_use]
pub fn line_intersection<T: Primitive>(
    a: &Point2<T>,
    b: &Point2<T>,
    c: &Point2<T>,
    d: &Point2<T>,
) -> Option<Point2<T>> {
    let u = b.y - a.y;
    let v = a.x - b.x;
    let i = a.y * b.x - a.x * b.y;

    let s = d.y - c.y;
    let t = c.x - d.x;
    let j = c.y * d.x - c.x * d.y;

    let denom = s * v - t * u;
    if denom == T::ZERO {
        return None;
    }
    Some(Point2::new((i * t - j * v) / denom, (j * u - i * s) / denom))
}

/// Scaled-integer counterpart of [`line_intersection`].
///
/// Intermediate products are promoted to `i128`; the result is rounded to
/// the nearest integer. Returns `None` for parallel lines, on overflow, or
/// when the result does not fit in `i64`.
#[must_use]
pub fn line_intersection_i64(
    a: IntPoint2,
    b: IntPoint2,
    c: IntPoint2,
    d: IntPoint2,
) -> Option<IntPoint2> {
    let (ax, ay) = (i128::from(a.0), i128::from(a.1));
    let (bx, by) = (i128::from(b.0), i128::from(b.1));
    let (cx, cy) = (i128::from(c.0), i128::from(c.1));
    let (dx, dy) = (i128::from(d.0), i128::from(d.1));

    let u = by - ay;
    let v = ax - bx;
    let i = ay.checked_mul(bx)?.checked_sub(ax.checked_mul(by)?)?;

    let s = dy - cy;
    let t = cx - dx;
    let j = cy.checked_mul(dx)?.checked_sub(cx.checked_mul(dy)?)?;

    let denom = s.checked_mul(v)?.checked_sub(t.checked_mul(u)?)?;
    if denom == 0 {
        return None;
    }
    let x_num = i.checked_mul(t)?.checked_sub(j.checked_mul(v)?)?;
    let y_num = j.checked_mul(u)?.checked_sub(i.checked_mul(s)?)?;
    let x = i64::try_from(div_round(x_num, denom)).ok()?;
    let y = i64::try_from(div_round(y_num, denom)).ok()?;
    Some((x, y))
}

/// Integer division rounding half away from zero.
fn div_round(num: i128, denom: i128) -> i128 {
    let q = num / denom;
    let r = num % denom;
    if 2 * r.abs() >= denom.abs() {
        if (num < 0) == (denom < 0) {
            q + 1
        } else {
            q - 1
        }
    } else {
        q
    }
}

/// Distance a vertex travels in one unit of time, found by intersecting
/// the offset lines of its two adjacent edges `prev -> vertex` and
/// `vertex -> next`.
///
/// Each edge is pushed along its left normal by [`Primitive::VELOCITY_SCALE`].
/// Returns `None` when either edge has zero length or the two edges are
/// exactly parallel.
#[must_use]
pub fn vertex_velocity<T: Primitive>(
    prev: &Point2<T>,
    vertex: &Point2<T>,
    next: &Point2<T>,
) -> Option<Vector2<T>> {
    let t0 = vertex - prev;
    let t1 = next - vertex;
    let len0 = t0.norm();
    let len1 = t1.norm();
    if len0 == T::ZERO || len1 == T::ZERO {
        return None;
    }
    let n0 = left_normal(&t0) * (T::VELOCITY_SCALE / len0);
    let n1 = left_normal(&t1) * (T::VELOCITY_SCALE / len1);

    let a = Point2::from(prev - vertex + n0);
    let b = Point2::from(n0);
    let c = Point2::from(n1);
    let d = Point2::from(next - vertex + n1);
    line_intersection(&a, &b, &c, &d).map(|p| p.coords)
}

/// Fixed-point counterpart of [`vertex_velocity`], scaled by
/// [`FIXED_POINT_VELOCITY_SCALE`].
#[must_use]
pub fn vertex_velocity_i64(prev: IntPoint2, vertex: IntPoint2, next: IntPoint2) -> Option<IntPoint2> {
    let t0 = (vertex.0 - prev.0, vertex.1 - prev.1);
    let t1 = (next.0 - vertex.0, next.1 - vertex.1);
    let n0 = scaled_left_normal_i64(t0, FIXED_POINT_VELOCITY_SCALE)?;
    let n1 = scaled_left_normal_i64(t1, FIXED_POINT_VELOCITY_SCALE)?;

    let a = (prev.0 - vertex.0 + n0.0, prev.1 - vertex.1 + n0.1);
    let d = (next.0 - vertex.0 + n1.0, next.1 - vertex.1 + n1.1);
    line_intersection_i64(a, n0, n1, d)
}

/// Left normal of an integer direction, rounded to magnitude `mag`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn scaled_left_normal_i64(dir: IntPoint2, mag: i64) -> Option<IntPoint2> {
    if dir == (0, 0) {
        return None;
    }
    let (nx, ny) = (-dir.1 as f64, dir.0 as f64);
    let len = nx.hypot(ny);
    let scale = mag as f64 / len;
    Some(((nx * scale).round() as i64, (ny * scale).round() as i64))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    // ── floating point ──

    #[test]
    fn perpendicular_lines_cross() {
        let p = line_intersection(
            &Point2::new(0.0_f64, 1.0),
            &Point2::new(4.0, 1.0),
            &Point2::new(2.0, -3.0),
            &Point2::new(2.0, 5.0),
        )
        .unwrap();
        assert_relative_eq!(p, Point2::new(2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_cross() {
        let p = line_intersection(
            &Point2::new(0.0_f64, 0.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 2.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn square_corner_moves_along_diagonal() {
        let v = vertex_velocity(
            &Point2::new(0.0_f64, 1.0),
            &Point2::new(0.0_f64, 0.0),
            &Point2::new(1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(v, Vector2::new(1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn reflex_corner_moves_outward_of_turn() {
        // L-shaped notch corner, heading back towards the outer corner.
        let v = vertex_velocity(
            &Point2::new(2.0_f32, 1.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(1.0, 2.0),
        )
        .unwrap();
        assert_relative_eq!(v, Vector2::new(-1.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn collinear_vertex_has_no_intersection() {
        let v = vertex_velocity(
            &Point2::new(0.0_f64, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert!(v.is_none());
    }

    // ── fixed point ──

    #[test]
    fn integer_lines_round_to_nearest() {
        let p = line_intersection_i64((0, 0), (3, 1), (0, 1), (3, 0)).unwrap();
        assert_eq!(p, (2, 1));
        assert!(line_intersection_i64((0, 0), (1, 1), (0, 1), (1, 2)).is_none());
    }

    #[test]
    fn integer_velocity_matches_scale() {
        let v = vertex_velocity_i64((0, 4096), (0, 0), (4096, 0)).unwrap();
        assert_eq!(v, (FIXED_POINT_VELOCITY_SCALE, FIXED_POINT_VELOCITY_SCALE));
    }

    #[test]
    fn integer_overflow_is_reported_as_none() {
        let big = i64::MAX / 2;
        assert!(line_intersection_i64((0, 0), (big, big), (big, 0), (0, big)).is_none());
    }
}
