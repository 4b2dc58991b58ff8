use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, TopologyError};
use crate::math::equivalence::adaptive_equivalent_3d;
use crate::math::{Point2, Point3, Primitive};

use super::graph::{FrozenLoop, VertexPath};
use super::vertex::{PointAndTime, Vertex, VertexId};

/// Which part of the propagation an output edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A segment of a frozen wavefront loop.
    Wavefront,
    /// The trace of a vertex moving through time.
    VertexPath,
}

/// An output edge between two skeleton vertices, indexed as described on
/// [`StraightSkeleton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonEdge {
    pub head: usize,
    pub tail: usize,
    pub kind: EdgeKind,
}

/// A computed straight skeleton.
///
/// Vertex indices below [`Self::boundary_point_count`] refer to the input
/// points; index `boundary_point_count() + i` refers to
/// `steiner_vertices[i]`, whose `z` is the time it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct StraightSkeleton<T: Primitive> {
    pub boundary_points: Vec<Point2<T>>,
    pub steiner_vertices: Vec<Point3<T>>,
    pub edges: Vec<SkeletonEdge>,
}

impl<T: Primitive> StraightSkeleton<T> {
    #[must_use]
    pub fn boundary_point_count(&self) -> usize {
        self.boundary_points.len()
    }

    /// Position of vertex `index`; boundary points report time zero.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3<T>> {
        let bpc = self.boundary_point_count();
        if index < bpc {
            let p = self.boundary_points[index];
            Some(Point3::new(p.x, p.y, T::ZERO))
        } else {
            self.steiner_vertices.get(index - bpc).copied()
        }
    }

    /// Edges of one kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &SkeletonEdge> + '_ {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Chains the wavefront edges into vertex sequences.
    ///
    /// Open chains come first, each starting at a vertex with no incoming
    /// edge; closed cycles follow, each starting at its lowest index.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Junction` if a vertex has more than one
    /// incoming or outgoing wavefront edge.
    pub fn as_vertex_loops_ordered(&self) -> Result<Vec<Vec<usize>>> {
        let mut next: BTreeMap<usize, usize> = BTreeMap::new();
        let mut incoming: BTreeSet<usize> = BTreeSet::new();
        for e in self.edges_of(EdgeKind::Wavefront) {
            if next.insert(e.tail, e.head).is_some() {
                return Err(TopologyError::Junction(e.tail).into());
            }
            if !incoming.insert(e.head) {
                return Err(TopologyError::Junction(e.head).into());
            }
        }

        let starts: Vec<usize> = next
            .keys()
            .copied()
            .filter(|v| !incoming.contains(v))
            .collect();
        let mut loops = Vec::new();
        for start in starts {
            loops.push(follow(&mut next, start));
        }
        while let Some((&start, _)) = next.first_key_value() {
            loops.push(follow(&mut next, start));
        }
        Ok(loops)
    }

    /// The wavefront loops as point sequences.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::as_vertex_loops_ordered`].
    pub fn wavefront_loops(&self) -> Result<Vec<Vec<Point3<T>>>> {
        Ok(self
            .as_vertex_loops_ordered()?
            .into_iter()
            .map(|ids| ids.into_iter().filter_map(|i| self.position(i)).collect())
            .collect())
    }

    /// Index of the Steiner vertex at `p`, adding one if none matches.
    fn steiner_index(&mut self, p: Point3<T>) -> usize {
        let bpc = self.boundary_point_count();
        let found = self
            .steiner_vertices
            .iter()
            .position(|s| adaptive_equivalent_3d(s, &p, T::EPSILON) || (s - p).norm() < T::EPSILON);
        match found {
            Some(i) => bpc + i,
            None => {
                self.steiner_vertices.push(p);
                bpc + self.steiner_vertices.len() - 1
            }
        }
    }

    /// Output index for `vertex` located at `at`.
    fn index_at(&mut self, vertex: VertexId, anchor: &PointAndTime<T>, at: &PointAndTime<T>) -> usize {
        if vertex < self.boundary_point_count() && at.time == anchor.time {
            vertex
        } else {
            self.steiner_index(at.to_point3())
        }
    }

    fn push_edge(&mut self, head: usize, tail: usize, kind: EdgeKind) {
        if head == tail {
            return;
        }
        let duplicate = self.edges.iter().any(|e| {
            e.kind == kind && ((e.head == head && e.tail == tail) || (e.head == tail && e.tail == head))
        });
        if !duplicate {
            self.edges.push(SkeletonEdge { head, tail, kind });
        }
    }
}

/// Walks `next` from `start`, removing the edges it uses.
fn follow(next: &mut BTreeMap<usize, usize>, start: usize) -> Vec<usize> {
    let mut chain = vec![start];
    let mut current = start;
    while let Some(head) = next.remove(&current) {
        if head == start {
            break;
        }
        chain.push(head);
        current = head;
    }
    chain
}

/// Builds the output skeleton from retired vertex paths and frozen loops.
pub(super) fn assemble<T: Primitive>(
    vertices: &[Vertex<T>],
    boundary_point_count: usize,
    frozen: &[FrozenLoop<T>],
    paths: &[VertexPath<T>],
) -> StraightSkeleton<T> {
    let mut out = StraightSkeleton {
        boundary_points: vertices[..boundary_point_count]
            .iter()
            .map(|v| v.anchor0.point)
            .collect(),
        steiner_vertices: Vec::new(),
        edges: Vec::new(),
    };

    for path in paths {
        let tail = out.index_at(path.vertex, &path.start, &path.start);
        let head = out.steiner_index(path.end.to_point3());
        out.push_edge(head, tail, EdgeKind::VertexPath);
    }

    for lp in frozen {
        for e in &lp.edges {
            let tail_vertex = &vertices[e.tail];
            let head_vertex = &vertices[e.head];
            let tail_at = PointAndTime::new(tail_vertex.position_at_time(lp.time), lp.time);
            let head_at = PointAndTime::new(head_vertex.position_at_time(lp.time), lp.time);
            let tail = out.index_at(e.tail, &tail_vertex.anchor0, &tail_at);
            let head = out.index_at(e.head, &head_vertex.anchor0, &head_at);
            out.push_edge(head, tail, EdgeKind::Wavefront);

            if (tail_at.point - tail_vertex.anchor0.point).norm() >= T::EPSILON {
                let origin = out.index_at(e.tail, &tail_vertex.anchor0, &tail_vertex.anchor0);
                out.push_edge(tail, origin, EdgeKind::VertexPath);
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SkeletonError;

    fn skeleton(edges: &[(usize, usize)]) -> StraightSkeleton<f64> {
        StraightSkeleton {
            boundary_points: vec![Point2::new(0.0, 0.0); 4],
            steiner_vertices: vec![Point3::new(0.5, 0.5, 0.5); 4],
            edges: edges
                .iter()
                .map(|&(tail, head)| SkeletonEdge {
                    head,
                    tail,
                    kind: EdgeKind::Wavefront,
                })
                .collect(),
        }
    }

    #[test]
    fn closed_cycle_is_ordered_from_lowest_index() {
        let s = skeleton(&[(6, 7), (5, 6), (7, 4), (4, 5)]);
        assert_eq!(s.as_vertex_loops_ordered().unwrap(), vec![vec![4, 5, 6, 7]]);
    }

    #[test]
    fn open_chains_come_first() {
        let s = skeleton(&[(0, 1), (6, 7), (7, 6), (1, 2)]);
        // 6 -> 7 -> 6 is a closed two-cycle.
        assert_eq!(
            s.as_vertex_loops_ordered().unwrap(),
            vec![vec![0, 1, 2], vec![6, 7]]
        );
    }

    #[test]
    fn junction_is_reported() {
        let s = skeleton(&[(4, 5), (4, 6)]);
        assert!(matches!(
            s.as_vertex_loops_ordered(),
            Err(SkeletonError::Topology(TopologyError::Junction(4)))
        ));
    }

    #[test]
    fn steiner_vertices_are_shared() {
        let mut s = skeleton(&[]);
        s.steiner_vertices.clear();
        let a = s.steiner_index(Point3::new(1.0, 2.0, 0.5));
        let b = s.steiner_index(Point3::new(1.0, 2.0 + 1e-12, 0.5));
        let c = s.steiner_index(Point3::new(0.0, 1e-12, 0.5));
        let d = s.steiner_index(Point3::new(0.0, 0.0, 0.5));
        assert_eq!(a, b);
        assert_eq!(c, d);
        assert_eq!(s.steiner_vertices.len(), 2);
    }

    #[test]
    fn duplicate_and_reversed_edges_are_dropped() {
        let mut s = skeleton(&[]);
        s.push_edge(5, 4, EdgeKind::Wavefront);
        s.push_edge(4, 5, EdgeKind::Wavefront);
        s.push_edge(5, 4, EdgeKind::VertexPath);
        s.push_edge(6, 6, EdgeKind::Wavefront);
        assert_eq!(s.edges.len(), 2);
    }
}
