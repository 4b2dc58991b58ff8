use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{OperationError, Result};
use crate::math::polygon_2d::{signed_area_2d, WindingType};
use crate::math::{later, Point2, Primitive};

use super::assemble::{assemble, StraightSkeleton};
use super::split::CrashOutcome;
use super::vertex::{trajectory, PointAndTime, Vertex, VertexId};
use super::wavefront::{MotorcycleSegment, WavefrontEdge, WavefrontLoop};

slotmap::new_key_type! {
    /// Identifier of an active wavefront loop.
    pub struct LoopId;
}

/// A loop that stopped propagating, kept with the time it stopped at.
#[derive(Debug, Clone)]
pub struct FrozenLoop<T: Primitive> {
    pub edges: Vec<WavefrontEdge>,
    pub time: T,
}

/// The trace a vertex left from its creation to the event that retired it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPath<T: Primitive> {
    pub vertex: VertexId,
    pub start: PointAndTime<T>,
    pub end: PointAndTime<T>,
}

/// Counters collected while the wavefront propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub motorcycles_created: usize,
    pub collapse_events: usize,
    pub crash_events: usize,
    pub batches: usize,
}

/// What one call to [`Graph::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome<T: Primitive> {
    /// A batch of events was applied to the loop.
    Processed {
        loop_id: LoopId,
        /// Batch window the loop carried before this step.
        previous: Option<(T, T)>,
        /// `(earliest, latest)` time of the batch just applied.
        window: (T, T),
        events: usize,
    },
    /// The loop stopped propagating and was moved to the frozen set.
    Frozen { loop_id: LoopId, time: T },
    /// No active loops remain.
    Finished,
}

/// Wavefront state of a skeleton computation.
///
/// Owns every vertex ever created (indexed by [`VertexId`]), the active
/// loops, the loops that have stopped, and the paths of retired vertices.
/// The first `boundary_point_count` vertices are the input points.
#[derive(Debug)]
pub struct Graph<T: Primitive> {
    pub(super) vertices: Vec<Vertex<T>>,
    pub(super) loops: SlotMap<LoopId, WavefrontLoop<T>>,
    pub(super) frozen: Vec<FrozenLoop<T>>,
    pub(super) paths: Vec<VertexPath<T>>,
    /// Vertices created in the batch being processed.
    pub(super) fresh: Vec<VertexId>,
    pub(super) stats: GraphStats,
    boundary_point_count: usize,
    /// Defaults to `32 * (boundary_point_count + 4)`.
    batch_limit: Option<usize>,
    limit_reported: bool,
}

impl<T: Primitive> Graph<T> {
    /// Sets up the initial wavefront from a counter-clockwise boundary.
    ///
    /// Every input point becomes a vertex moving with its initial
    /// trajectory. Reflex vertices additionally become motorcycles.
    /// Further disjoint boundaries can be added with [`Graph::add_loop`].
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if fewer than 2 points are
    /// given or a coordinate is not finite.
    pub fn new(points: &[Point2<T>]) -> Result<Self> {
        let mut graph = Self {
            vertices: Vec::with_capacity(points.len()),
            loops: SlotMap::with_key(),
            frozen: Vec::new(),
            paths: Vec::new(),
            fresh: Vec::new(),
            stats: GraphStats::default(),
            boundary_point_count: 0,
            batch_limit: None,
            limit_reported: false,
        };
        graph.add_loop(points)?;
        Ok(graph)
    }

    /// Adds another counter-clockwise boundary loop propagating
    /// independently of the others.
    ///
    /// Its points take the next boundary indices, following those of the
    /// loops added before it.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if fewer than 2 points are
    /// given, a coordinate is not finite, or the wavefront has already been
    /// stepped.
    pub fn add_loop(&mut self, points: &[Point2<T>]) -> Result<()> {
        if self.vertices.len() != self.boundary_point_count
            || self.stats.batches > 0
            || !self.frozen.is_empty()
        {
            return Err(OperationError::InvalidInput(
                "boundary loops must be added before the wavefront is stepped".to_owned(),
            )
            .into());
        }
        let n = points.len();
        if n < 2 {
            return Err(OperationError::InvalidInput(format!(
                "at least 2 boundary points are required, got {n}"
            ))
            .into());
        }
        if let Some(i) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(
                OperationError::InvalidInput(format!("boundary point {i} is not finite")).into(),
            );
        }

        let area = signed_area_2d(points);
        if area <= T::ZERO {
            warn!(
                area = area.widen(),
                "boundary is not counter-clockwise; the wavefront will grow outwards"
            );
        }

        let base = self.vertices.len();
        let mut motorcycles = Vec::new();
        for i in 0..n {
            let prev = &points[(i + n - 1) % n];
            let next = &points[(i + 1) % n];
            let vertex = match trajectory(prev, &points[i], next) {
                Some(t) if t.winding != WindingType::FlatV => {
                    if t.winding == WindingType::Right && t.velocity.norm_squared() > T::ZERO {
                        motorcycles.push(MotorcycleSegment { motor: base + i });
                    }
                    Vertex::moving(points[i], T::ZERO, &t.velocity)
                }
                _ => Vertex::stationary(points[i], T::ZERO),
            };
            self.vertices.push(vertex);
        }

        let cycle: Vec<VertexId> = (base..base + n).collect();
        let mut initial = WavefrontLoop::from_vertex_cycle(&cycle);
        self.stats.motorcycles_created += motorcycles.len();
        debug!(
            points = n,
            first_index = base,
            motorcycles = motorcycles.len(),
            "added boundary loop"
        );
        initial.motorcycles = motorcycles;
        self.loops.insert(initial);
        self.boundary_point_count += n;
        Ok(())
    }

    /// Caps the number of event batches processed before the remaining
    /// loops are frozen where they stand.
    #[must_use]
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn boundary_point_count(&self) -> usize {
        self.boundary_point_count
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex<T>] {
        &self.vertices
    }

    /// Loops that are still propagating.
    pub fn active_loops(&self) -> impl Iterator<Item = (LoopId, &WavefrontLoop<T>)> {
        self.loops.iter()
    }

    #[must_use]
    pub fn frozen_loops(&self) -> &[FrozenLoop<T>] {
        &self.frozen
    }

    #[must_use]
    pub fn vertex_paths(&self) -> &[VertexPath<T>] {
        &self.paths
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    /// Advances one active loop by one event batch, or freezes it.
    ///
    /// A loop is frozen when it is down to two edges, when it has no
    /// further events, or when its next batch starts at or after `limit`.
    /// Loops without events freeze at `limit` if one is given, otherwise
    /// at the latest time they reached. An infinite `limit` is the same as
    /// none.
    pub fn step(&mut self, limit: Option<T>) -> StepOutcome<T> {
        let Some((key, current)) = self.loops.iter().next() else {
            return StepOutcome::Finished;
        };
        let now = current.current_time();
        let limit = limit.filter(|l| l.is_finite());
        let batch_limit = self
            .batch_limit
            .unwrap_or(32 * (self.boundary_point_count + 4));

        if self.stats.batches >= batch_limit {
            if !self.limit_reported {
                warn!(
                    batches = self.stats.batches,
                    "batch limit reached; freezing the remaining wavefront"
                );
                self.limit_reported = true;
            }
            return self.freeze(key, now);
        }
        if current.edges.len() <= 2 {
            return self.freeze(key, now);
        }

        let batch = current.next_batch(&self.vertices);
        let window = match (batch.first(), batch.last()) {
            (Some(first), Some(last)) => (first.at.time, last.at.time),
            _ => return self.freeze(key, limit.unwrap_or(now)),
        };
        if let Some(limit) = limit {
            if window.0 >= limit {
                return self.freeze(key, later(limit, now));
            }
        }

        let Some(mut lp) = self.loops.get_mut(key).map(std::mem::take) else {
            return StepOutcome::Finished;
        };
        let previous = lp.batch_window;
        let events = batch.len();
        lp.pending = batch;

        let mut work = vec![lp];
        let mut done = Vec::new();
        while let Some(mut current) = work.pop() {
            if let Some(index) = current.pending.iter().position(|e| e.kind.is_collapse()) {
                self.collapse_group(&mut current, index);
                work.push(current);
            } else if current.pending.is_empty() {
                done.push(current);
            } else {
                let event = current.pending.remove(0);
                match self.split_at_crash(current, &event) {
                    CrashOutcome::Split {
                        tail_side,
                        head_side,
                    } => {
                        work.push(head_side);
                        work.push(tail_side);
                    }
                    CrashOutcome::Skipped(unchanged) => work.push(unchanged),
                }
            }
        }

        let mut slot = Some(key);
        for mut lp in done.into_iter().filter(|lp| !lp.edges.is_empty()) {
            self.launch_fresh(&mut lp);
            lp.batch_window = Some(window);
            match slot.take() {
                Some(k) => self.loops[k] = lp,
                None => {
                    self.loops.insert(lp);
                }
            }
        }
        if let Some(k) = slot {
            self.loops.remove(k);
        }
        self.fresh.clear();
        self.stats.batches += 1;

        debug!(
            earliest = window.0.widen(),
            latest = window.1.widen(),
            events,
            "processed event batch"
        );
        StepOutcome::Processed {
            loop_id: key,
            previous,
            window,
            events,
        }
    }

    /// Steps until every loop has frozen.
    pub fn run(&mut self, limit: Option<T>) {
        while !matches!(self.step(limit), StepOutcome::Finished) {}
    }

    /// Turns the vertex paths and frozen loops into a skeleton.
    #[must_use]
    pub fn into_skeleton(self) -> StraightSkeleton<T> {
        assemble(
            &self.vertices,
            self.boundary_point_count,
            &self.frozen,
            &self.paths,
        )
    }

    /// Adds a stationary vertex created by the current batch.
    pub(super) fn push_fresh(&mut self, at: PointAndTime<T>) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(Vertex::stationary(at.point, at.time));
        self.fresh.push(id);
        id
    }

    /// Records the trace of `vertex` ending at `end`.
    pub(super) fn record_path(&mut self, vertex: VertexId, end: PointAndTime<T>) {
        let start = self.vertices[vertex].anchor0;
        self.paths.push(VertexPath { vertex, start, end });
    }

    fn freeze(&mut self, key: LoopId, time: T) -> StepOutcome<T> {
        if let Some(lp) = self.loops.remove(key) {
            debug!(
                edges = lp.edges.len(),
                time = time.widen(),
                "freezing wavefront loop"
            );
            if !lp.edges.is_empty() {
                self.frozen.push(FrozenLoop {
                    edges: lp.edges,
                    time,
                });
            }
        }
        StepOutcome::Frozen { loop_id: key, time }
    }

    /// Gives every vertex created in this batch its trajectory, sampled at
    /// the latest creation time among it and its two neighbours.
    fn launch_fresh(&mut self, lp: &mut WavefrontLoop<T>) {
        if lp.edges.len() <= 2 {
            return;
        }
        let mut launched = Vec::new();
        for (i, edge) in lp.edges.iter().enumerate() {
            let vertex = edge.tail;
            if !self.fresh.contains(&vertex) {
                continue;
            }
            let (prev, next) = lp.neighbours(i);
            let calc_time = [prev, vertex, next]
                .iter()
                .map(|&v| self.vertices[v].initial_time())
                .fold(T::ZERO, later);
            let at = |v: VertexId| self.vertices[v].position_at_time(calc_time);
            if let Some(t) = trajectory(&at(prev), &at(vertex), &at(next)) {
                launched.push((vertex, t));
            }
        }

        for (vertex, t) in launched {
            if t.winding == WindingType::FlatV {
                continue;
            }
            let anchor = self.vertices[vertex].anchor0;
            self.vertices[vertex] = Vertex::moving(anchor.point, anchor.time, &t.velocity);
            if t.winding == WindingType::Right && t.velocity.norm_squared() > T::ZERO {
                lp.motorcycles.push(MotorcycleSegment { motor: vertex });
                self.stats.motorcycles_created += 1;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Vector2;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn rejects_short_input() {
        assert!(Graph::new(&[Point2::new(0.0_f64, 0.0)]).is_err());
        assert!(Graph::<f64>::new(&[]).is_err());
    }

    #[test]
    fn rejects_non_finite_input() {
        let pts = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(Graph::new(&pts).is_err());
    }

    #[test]
    fn added_loops_take_following_indices() {
        let far: Vec<Point2<f64>> = square().iter().map(|p| p + Vector2::new(3.0, 0.0)).collect();
        let mut g = Graph::new(&square()).unwrap();
        g.add_loop(&far).unwrap();
        assert_eq!(g.boundary_point_count(), 8);
        assert_eq!(g.active_loops().count(), 2);
        let mut cycles: Vec<Vec<VertexId>> =
            g.active_loops().map(|(_, lp)| lp.vertex_cycle()).collect();
        cycles.sort();
        assert_eq!(cycles, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
        assert_relative_eq!(g.vertices()[5].anchor0.point, Point2::new(4.0, 0.0));
    }

    #[test]
    fn add_loop_after_stepping_is_rejected() {
        let mut g = Graph::new(&square()).unwrap();
        assert!(matches!(g.step(None), StepOutcome::Processed { .. }));
        assert!(g.add_loop(&square()).is_err());
    }

    #[test]
    fn reflex_vertices_become_motorcycles() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 4.0),
            Point2::new(3.0, 3.0),
            Point2::new(0.0, 4.0),
        ];
        let g = Graph::new(&pts).unwrap();
        let (_, lp) = g.active_loops().next().unwrap();
        assert_eq!(lp.motorcycles, vec![MotorcycleSegment { motor: 3 }]);
        assert_eq!(g.stats().motorcycles_created, 1);
    }

    #[test]
    fn square_collapses_in_one_batch() {
        let mut g = Graph::new(&square()).unwrap();
        match g.step(None) {
            StepOutcome::Processed {
                previous, window, ..
            } => {
                assert!(previous.is_none());
                assert_relative_eq!(window.0, 0.5, epsilon = 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(g.active_loops().count(), 0);
        assert_eq!(g.step(None), StepOutcome::Finished);
        assert_eq!(g.vertex_paths().len(), 4);
        assert_eq!(g.stats().collapse_events, 4);
    }

    #[test]
    fn limit_freezes_before_first_batch() {
        let mut g = Graph::new(&square()).unwrap();
        match g.step(Some(0.2)) {
            StepOutcome::Frozen { time, .. } => assert_relative_eq!(time, 0.2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(g.frozen_loops().len(), 1);
        assert_eq!(g.frozen_loops()[0].edges.len(), 4);
    }

    #[test]
    fn infinite_limit_is_unbounded() {
        let mut g = Graph::new(&square()).unwrap();
        g.run(Some(f64::INFINITY));
        assert!(g.frozen_loops().is_empty());
        assert_eq!(g.vertex_paths().len(), 4);
    }

    #[test]
    fn two_point_boundary_freezes_immediately() {
        let mut g = Graph::new(&[Point2::new(0.0_f64, 0.0), Point2::new(1.0, 0.0)]).unwrap();
        assert!(matches!(g.step(None), StepOutcome::Frozen { .. }));
        assert_eq!(g.step(None), StepOutcome::Finished);
        assert_eq!(g.frozen_loops()[0].edges.len(), 2);
    }

    #[test]
    fn batch_limit_freezes_remaining_loops() {
        let mut g = Graph::new(&square()).unwrap().with_batch_limit(0);
        g.run(None);
        assert_eq!(g.stats().batches, 0);
        assert_eq!(g.frozen_loops().len(), 1);
        assert_relative_eq!(g.frozen_loops()[0].time, 0.0);
    }

    #[test]
    fn rectangle_leaves_a_ridge() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mut g = Graph::new(&pts).unwrap();
        assert!(matches!(g.step(None), StepOutcome::Processed { events: 2, .. }));
        let (_, lp) = g.active_loops().next().unwrap();
        assert_eq!(lp.edges.len(), 2);
        // Both merged vertices stay put; the two remaining edges form the ridge.
        assert!(lp.edges.iter().all(|e| g.vertices()[e.head].is_stationary()));
        g.run(None);
        assert_eq!(g.frozen_loops().len(), 1);
        assert_relative_eq!(g.frozen_loops()[0].time, 0.5, epsilon = 1e-9);
    }
}
