use crate::math::linear::solve_3x3;
use crate::math::polygon_2d::unit_left_normal;
use crate::math::{later, signed_square, Matrix3, Point2, Primitive, Vector3};

use super::vertex::{PointAndTime, Vertex, VertexId};

/// Where a motorcycle meets the edge it crashes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashHit {
    /// At the edge's head vertex.
    Head,
    /// At the edge's tail vertex.
    Tail,
    /// Strictly between the two endpoints.
    Middle,
}

/// A solved motorcycle crash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashSolution<T: Primitive> {
    pub at: PointAndTime<T>,
    pub hit: CrashHit,
}

/// One row of an offset-line system: a point `(x, y)` reached at time `t`
/// lies on the line `a -> b` pushed along its left normal by
/// `t * VELOCITY_SCALE`.
fn offset_row<T: Primitive>(a: &Point2<T>, b: &Point2<T>) -> Option<([T; 3], T)> {
    let n = unit_left_normal(a, b, T::EPSILON)? * T::VELOCITY_SCALE;
    Some(([n.x, n.y, -n.norm_squared()], a.coords.dot(&n)))
}

fn solve_rows<T: Primitive>(rows: [([T; 3], T); 3]) -> Option<Vector3<T>> {
    let [(r0, b0), (r1, b1), (r2, b2)] = rows;
    let m = Matrix3::new(
        r0[0], r0[1], r0[2], r1[0], r1[1], r1[2], r2[0], r2[1], r2[2],
    );
    solve_3x3(&m, &Vector3::new(b0, b1, b2))
}

fn latest_start<T: Primitive>(vertices: &[Vertex<T>], ids: &[VertexId]) -> T {
    ids.iter()
        .map(|&id| vertices[id].initial_time())
        .fold(vertices[ids[0]].initial_time(), later)
}

/// Collapse point and time of the edge `v0 -> v1`, flanked by
/// `vm1 -> v0` and `v1 -> v2`.
///
/// # Algorithm
///
/// 1. Sample all four vertices at the latest of their creation times.
/// 2. Intersect the three offset lines as a 3x3 system in `(x, y, t)`,
///    relative to `v0`.
/// 3. When the system is singular (collinear neighbours), fall back to the
///    closest approach of the two endpoint trajectories.
///
/// Returns `None` when a flanking edge is shorter than
/// [`Primitive::EPSILON`] or the edge is growing.
#[must_use]
pub fn collapse_event<T: Primitive>(
    vertices: &[Vertex<T>],
    vm1: VertexId,
    v0: VertexId,
    v1: VertexId,
    v2: VertexId,
) -> Option<PointAndTime<T>> {
    let calc_time = latest_start(vertices, &[vm1, v0, v1, v2]);
    let pm1 = vertices[vm1].position_at_time(calc_time);
    let p0 = vertices[v0].position_at_time(calc_time);
    let p1 = vertices[v1].position_at_time(calc_time);
    let p2 = vertices[v2].position_at_time(calc_time);

    let edge = p1 - p0;
    if edge.norm() < T::EPSILON {
        return Some(PointAndTime::new(p0 + edge / (T::ONE + T::ONE), calc_time));
    }

    let origin = Point2::origin();
    let rows = [
        offset_row(&Point2::from(pm1 - p0), &origin)?,
        offset_row(&origin, &Point2::from(edge))?,
        offset_row(&Point2::from(edge), &Point2::from(p2 - p0))?,
    ];
    let Some(solution) = solve_rows(rows) else {
        return converging_endpoints(&vertices[v0], &vertices[v1], calc_time);
    };
    if solution.z < T::ZERO {
        return None;
    }
    Some(PointAndTime::new(
        Point2::new(p0.x + solution.x, p0.y + solution.y),
        calc_time + solution.z,
    ))
}

/// Meeting point of two vertices travelling along parallel offset lines.
///
/// Takes the time of closest approach of the two trajectories and accepts
/// it when the gap there is within tolerance.
fn converging_endpoints<T: Primitive>(
    start: &Vertex<T>,
    end: &Vertex<T>,
    calc_time: T,
) -> Option<PointAndTime<T>> {
    let p0 = start.position_at_time(calc_time);
    let p1 = end.position_at_time(calc_time);
    let gap = p1 - p0;
    let closing = end.velocity() - start.velocity();
    let closing_sq = closing.norm_squared();
    if closing_sq < T::EPSILON * T::EPSILON {
        return None;
    }
    let t = -gap.dot(&closing) / closing_sq;
    if t < T::ZERO {
        return None;
    }
    let residual = gap + closing * t;
    let tolerance = T::EPSILON * later(gap.norm(), T::ONE);
    if residual.norm() > tolerance {
        return None;
    }
    let at_start = p0 + start.velocity() * t;
    Some(PointAndTime::new(
        at_start + residual / (T::ONE + T::ONE),
        calc_time + t,
    ))
}

/// Crash of the motorcycle at `motor` into the edge `edge_tail -> edge_head`.
///
/// The motorcycle's path is the intersection of the offset lines of its own
/// two edges (`motor_prev -> motor` and `motor -> motor_next`); if those
/// lines are parallel the motor's velocity is used instead. The solution is
/// then checked against the contracted edge at the crash time and
/// classified by which part of the edge is hit.
#[must_use]
pub fn crash_event<T: Primitive>(
    vertices: &[Vertex<T>],
    edge_head: VertexId,
    edge_tail: VertexId,
    motor_prev: VertexId,
    motor: VertexId,
    motor_next: VertexId,
) -> Option<CrashSolution<T>> {
    let calc_time = latest_start(
        vertices,
        &[edge_head, edge_tail, motor_prev, motor, motor_next],
    );
    let m1 = vertices[motor].position_at_time(calc_time);
    let p0 = Point2::from(vertices[edge_head].position_at_time(calc_time) - m1);
    let p1 = Point2::from(vertices[edge_tail].position_at_time(calc_time) - m1);
    let m0 = Point2::from(vertices[motor_prev].position_at_time(calc_time) - m1);
    let m2 = Point2::from(vertices[motor_next].position_at_time(calc_time) - m1);
    let origin = Point2::origin();

    let edge_row = offset_row(&p1, &p0)?;
    let flanks = [offset_row(&m0, &origin)?, offset_row(&origin, &m2)?];
    let solution = match solve_rows([edge_row, flanks[0], flanks[1]]) {
        Some(solution) => solution,
        None => {
            let vel = vertices[motor].velocity();
            if vel.norm_squared() == T::ZERO {
                return None;
            }
            solve_rows([
                edge_row,
                ([T::ONE, T::ZERO, -vel.x], T::ZERO),
                ([T::ZERO, T::ONE, -vel.y], T::ZERO),
            ])?
        }
    };
    if solution.z < -T::EPSILON {
        return None;
    }

    let at = PointAndTime::new(
        Point2::new(m1.x + solution.x, m1.y + solution.y),
        calc_time + solution.z,
    );
    let hit = classify_hit(
        &vertices[edge_head].position_at_time(at.time),
        &vertices[edge_tail].position_at_time(at.time),
        &at.point,
    )?;
    Some(CrashSolution { at, hit })
}

/// Locates `p2` on the segment `p1 -> p0` using projected distances
/// measured from each end, with a tolerance scaled by the edge length.
fn classify_hit<T: Primitive>(p0: &Point2<T>, p1: &Point2<T>, p2: &Point2<T>) -> Option<CrashHit> {
    let edge_mag_sq = (p1 - p0).norm_squared();
    if edge_mag_sq < T::EPSILON * T::EPSILON {
        return None;
    }
    let d0_sq = signed_square((p1 - p0).dot(&(p2 - p0)));
    let d1_sq = signed_square((p0 - p1).dot(&(p2 - p1)));
    let e_sq = T::EPSILON * T::EPSILON * edge_mag_sq;
    if d0_sq < -e_sq || d1_sq < -e_sq {
        return None;
    }
    if d0_sq < e_sq {
        Some(CrashHit::Head)
    } else if d1_sq < e_sq {
        Some(CrashHit::Tail)
    } else {
        Some(CrashHit::Middle)
    }
}
