//! Straight skeleton of a simple polygon by wavefront propagation.
//!
//! Every boundary edge moves inwards at unit speed. Edges that shrink to a
//! point collapse and are replaced by a single vertex; reflex vertices
//! launch motorcycles that split the wavefront when they run into an
//! opposite edge. The traces of all vertices, together with the wavefront
//! left at the end, make up the skeleton.

mod assemble;
mod collapse;
mod graph;
mod solver;
mod split;
pub mod validate;
mod vertex;
mod wavefront;

pub use assemble::{EdgeKind, SkeletonEdge, StraightSkeleton};
pub use graph::{FrozenLoop, Graph, GraphStats, LoopId, StepOutcome, VertexPath};
pub use solver::{collapse_event, crash_event, CrashHit, CrashSolution};
pub use vertex::{trajectory, PointAndTime, Trajectory, Vertex, VertexId};
pub use wavefront::{Event, EventKind, MotorcycleSegment, WavefrontEdge, WavefrontLoop};

use std::cmp::Ordering;

use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::{Point2, Primitive};

/// Computes the straight skeleton of one or more disjoint counter-clockwise
/// polygons.
///
/// # Algorithm
///
/// 1. Launch every boundary vertex along the bisector of its two edges.
/// 2. Repeatedly take one active wavefront loop, find its next batch of
///    simultaneous collapse and crash events, and apply them.
/// 3. Freeze loops that run out of events, shrink to two edges or reach the
///    maximum inset.
/// 4. Emit the paths of retired vertices and the frozen wavefront.
///
/// With a maximum inset the propagation stops at that time, and the frozen
/// wavefront edges form the inset outline.
#[derive(Debug)]
pub struct StraightSkeleton2D<T: Primitive> {
    loops: Vec<Vec<Point2<T>>>,
    max_inset: Option<T>,
    batch_limit: Option<usize>,
}

impl<T: Primitive> StraightSkeleton2D<T> {
    /// Creates a new skeleton operation.
    #[must_use]
    pub fn new(points: Vec<Point2<T>>) -> Self {
        Self {
            loops: vec![points],
            max_inset: None,
            batch_limit: None,
        }
    }

    /// Adds another boundary loop. Its points are numbered after those of
    /// the loops given before it.
    #[must_use]
    pub fn with_loop(mut self, points: Vec<Point2<T>>) -> Self {
        self.loops.push(points);
        self
    }

    /// Stops the wavefront at time `inset`. An infinite inset leaves the
    /// propagation unbounded.
    #[must_use]
    pub fn with_max_inset(mut self, inset: T) -> Self {
        self.max_inset = Some(inset);
        self
    }

    /// Overrides the number of event batches after which the remaining
    /// wavefront is frozen.
    #[must_use]
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    /// Executes the skeleton computation.
    ///
    /// # Errors
    ///
    /// - `OperationError::InvalidInput` if a loop has fewer than 2 points, a
    ///   coordinate is not finite, or the maximum inset is negative or NaN
    pub fn execute(&self) -> Result<StraightSkeleton<T>> {
        if let Some(inset) = self.max_inset {
            if !matches!(
                inset.partial_cmp(&T::ZERO),
                Some(Ordering::Greater | Ordering::Equal)
            ) {
                return Err(OperationError::InvalidInput(format!(
                    "maximum inset must be non-negative, got {inset}"
                ))
                .into());
            }
        }

        let (first, rest) = self
            .loops
            .split_first()
            .ok_or_else(|| OperationError::InvalidInput("no boundary loops given".to_owned()))?;
        let mut graph = Graph::new(first)?;
        for points in rest {
            graph.add_loop(points)?;
        }
        if let Some(limit) = self.batch_limit {
            graph = graph.with_batch_limit(limit);
        }
        graph.run(self.max_inset);

        let stats = graph.stats();
        let boundary_points = graph.boundary_point_count();
        let skeleton = graph.into_skeleton();
        info!(
            loops = self.loops.len(),
            points = boundary_points,
            batches = stats.batches,
            collapses = stats.collapse_events,
            crashes = stats.crash_events,
            motorcycles = stats.motorcycles_created,
            steiner = skeleton.steiner_vertices.len(),
            edges = skeleton.edges.len(),
            "straight skeleton complete"
        );
        Ok(skeleton)
    }
}

/// Shorthand for [`StraightSkeleton2D`] with an optional maximum inset.
///
/// # Errors
///
/// See [`StraightSkeleton2D::execute`].
pub fn calculate_straight_skeleton<T: Primitive>(
    points: &[Point2<T>],
    max_inset: Option<T>,
) -> Result<StraightSkeleton<T>> {
    let mut op = StraightSkeleton2D::new(points.to_vec());
    if let Some(inset) = max_inset {
        op = op.with_max_inset(inset);
    }
    op.execute()
}
