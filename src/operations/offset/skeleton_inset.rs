use nalgebra::ComplexField;

use crate::error::{OperationError, Result};
use crate::math::{Point2, Primitive};
use crate::operations::skeleton::StraightSkeleton2D;

/// Insets a counter-clockwise polygon by running its wavefront up to a
/// fixed distance.
///
/// Unlike a per-segment offset, the result handles reflex corners and
/// splitting: a polygon that pinches apart before `distance` yields one
/// outline per remaining piece. Parts that vanish before `distance` are
/// dropped.
#[derive(Debug)]
pub struct SkeletonInset2D<T: Primitive> {
    points: Vec<Point2<T>>,
    distance: T,
}

impl<T: Primitive> SkeletonInset2D<T> {
    /// Creates a new inset operation.
    #[must_use]
    pub fn new(points: Vec<Point2<T>>, distance: T) -> Self {
        Self { points, distance }
    }

    /// Executes the inset.
    ///
    /// # Errors
    ///
    /// - `OperationError::InvalidInput` if `distance` is not a positive finite
    ///   value or the polygon is rejected by [`StraightSkeleton2D::execute`]
    /// - `TopologyError::Junction` if two outlines touch at a vertex
    pub fn execute(&self) -> Result<Vec<Vec<Point2<T>>>> {
        if self.distance <= T::ZERO || !self.distance.is_finite() {
            return Err(OperationError::InvalidInput(format!(
                "inset distance must be positive and finite, got {}",
                self.distance
            ))
            .into());
        }

        let skeleton = StraightSkeleton2D::new(self.points.clone())
            .with_max_inset(self.distance)
            .execute()?;

        Ok(skeleton
            .wavefront_loops()?
            .into_iter()
            .filter(|outline| {
                outline.len() >= 3
                    && outline
                        .iter()
                        .all(|p| ComplexField::abs(p.z - self.distance) < T::TIME_EPSILON)
            })
            .map(|outline| outline.iter().map(|p| Point2::new(p.x, p.y)).collect())
            .collect())
    }
}
