pub mod equivalence;
pub mod intersect_2d;
pub mod linear;
pub mod polygon_2d;

use std::fmt;

use nalgebra::RealField;

/// 2D point type.
pub type Point2<T> = nalgebra::Point2<T>;

/// 3D point type. Skeleton outputs store the event time in `z`.
pub type Point3<T> = nalgebra::Point3<T>;

/// 2D vector type.
pub type Vector2<T> = nalgebra::Vector2<T>;

/// 3D vector type.
pub type Vector3<T> = nalgebra::Vector3<T>;

/// 3x3 matrix type.
pub type Matrix3<T> = nalgebra::Matrix3<T>;

/// Scalar type the skeleton is computed in.
///
/// The constants are resolved at compile time for each implementation, so
/// single and double precision each get tolerances that suit their mantissa.
pub trait Primitive: RealField + Copy + fmt::Debug + fmt::Display {
    /// Length and determinant tolerance.
    const EPSILON: Self;

    /// Events closer together than this are processed as one batch.
    const TIME_EPSILON: Self;

    /// Distance an edge travels in one unit of time.
    const VELOCITY_SCALE: Self;

    /// Smallest positive normal value.
    const MIN_POSITIVE: Self;

    const ZERO: Self;
    const ONE: Self;

    /// Lossy conversion used for averaging and diagnostics.
    fn from_count(value: usize) -> Self;

    /// Widening conversion used in error reports.
    fn widen(self) -> f64;
}

impl Primitive for f32 {
    const EPSILON: Self = 1e-4;
    const TIME_EPSILON: Self = 1e-4;
    const VELOCITY_SCALE: Self = 1.0;
    const MIN_POSITIVE: Self = f32::MIN_POSITIVE;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[allow(clippy::cast_precision_loss)]
    fn from_count(value: usize) -> Self {
        value as f32
    }

    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl Primitive for f64 {
    const EPSILON: Self = 1e-8;
    const TIME_EPSILON: Self = 1e-8;
    const VELOCITY_SCALE: Self = 1.0;
    const MIN_POSITIVE: Self = f64::MIN_POSITIVE;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[allow(clippy::cast_precision_loss)]
    fn from_count(value: usize) -> Self {
        value as f64
    }

    fn widen(self) -> f64 {
        self
    }
}

/// `value * value` carrying the sign of `value`.
#[must_use]
pub fn signed_square<T: Primitive>(value: T) -> T {
    if value < T::ZERO {
        -(value * value)
    } else {
        value * value
    }
}

/// Returns the later of two times.
#[must_use]
pub fn later<T: Primitive>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}
