use crate::math::polygon_2d::{calculate_winding, unit_left_normal, WindingType};
use crate::math::intersect_2d::vertex_velocity;
use crate::math::{Point2, Point3, Primitive, Vector2};

/// Index of a vertex in the graph's vertex arena.
pub type VertexId = usize;

/// A position paired with the time it is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAndTime<T: Primitive> {
    pub point: Point2<T>,
    pub time: T,
}

impl<T: Primitive> PointAndTime<T> {
    #[must_use]
    pub fn new(point: Point2<T>, time: T) -> Self {
        Self { point, time }
    }

    /// Packs the time into `z`.
    #[must_use]
    pub fn to_point3(&self) -> Point3<T> {
        Point3::new(self.point.x, self.point.y, self.time)
    }
}

/// A wavefront vertex moving at constant velocity between two anchors.
///
/// A vertex whose anchors share a time is stationary: it sits at
/// `anchor0` for every time after its creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex<T: Primitive> {
    pub anchor0: PointAndTime<T>,
    pub anchor1: PointAndTime<T>,
}

impl<T: Primitive> Vertex<T> {
    /// A vertex that has not started moving.
    #[must_use]
    pub fn stationary(point: Point2<T>, time: T) -> Self {
        let anchor = PointAndTime::new(point, time);
        Self {
            anchor0: anchor,
            anchor1: anchor,
        }
    }

    /// A vertex leaving `point` at `time` with the given velocity.
    #[must_use]
    pub fn moving(point: Point2<T>, time: T, velocity: &Vector2<T>) -> Self {
        Self {
            anchor0: PointAndTime::new(point, time),
            anchor1: PointAndTime::new(point + velocity, time + T::ONE),
        }
    }

    /// Time at which the vertex came into existence.
    #[must_use]
    pub fn initial_time(&self) -> T {
        self.anchor0.time
    }

    /// Whether both anchors share a time.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.anchor0.time == self.anchor1.time
    }

    /// Position at time `t`, which must not precede [`Self::initial_time`].
    ///
    /// Stationary vertices return `anchor0` unchanged, and querying exactly
    /// at either anchor time returns that anchor's position bit for bit.
    #[must_use]
    pub fn position_at_time(&self, t: T) -> Point2<T> {
        if self.is_stationary() {
            return self.anchor0.point;
        }
        let w1 = (t - self.anchor0.time) / (self.anchor1.time - self.anchor0.time);
        let w0 = T::ONE - w1;
        Point2::new(
            w0 * self.anchor0.point.x + w1 * self.anchor1.point.x,
            w0 * self.anchor0.point.y + w1 * self.anchor1.point.y,
        )
    }

    /// Displacement per unit time.
    #[must_use]
    pub fn velocity(&self) -> Vector2<T> {
        if self.is_stationary() {
            return Vector2::zeros();
        }
        (self.anchor1.point - self.anchor0.point) / (self.anchor1.time - self.anchor0.time)
    }
}

/// Result of working out how a vertex moves from its two neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory<T: Primitive> {
    pub velocity: Vector2<T>,
    pub winding: WindingType,
}

/// Velocity of the vertex at `vertex` between `prev` and `next`.
///
/// Collinear vertices travel along the shared normal; vertices where the
/// boundary doubles back stay put. Returns `None` when either neighbour is
/// closer than [`Primitive::EPSILON`], leaving the direction undefined until
/// that short edge collapses.
#[must_use]
pub fn trajectory<T: Primitive>(
    prev: &Point2<T>,
    vertex: &Point2<T>,
    next: &Point2<T>,
) -> Option<Trajectory<T>> {
    let in_len = (vertex - prev).norm();
    let out_len = (next - vertex).norm();
    if in_len < T::EPSILON || out_len < T::EPSILON {
        return None;
    }
    let winding = calculate_winding(prev, vertex, next, T::EPSILON * in_len * out_len);
    let velocity = match winding {
        WindingType::FlatV => Vector2::zeros(),
        WindingType::Straight => unit_left_normal(prev, vertex, T::EPSILON)? * T::VELOCITY_SCALE,
        WindingType::Left | WindingType::Right => match vertex_velocity(prev, vertex, next) {
            Some(v) => v,
            None => unit_left_normal(prev, vertex, T::EPSILON)? * T::VELOCITY_SCALE,
        },
    };
    Some(Trajectory { velocity, winding })
}
