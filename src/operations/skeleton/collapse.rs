use tracing::{debug, trace};

use crate::math::{Point2, Primitive, Vector2};

use super::graph::Graph;
use super::vertex::{PointAndTime, VertexId};
use super::wavefront::{EventKind, WavefrontLoop};

impl<T: Primitive> Graph<T> {
    /// Applies the pending collapse at `index` together with every pending
    /// collapse chained to it through shared endpoints.
    ///
    /// The chain is replaced by one stationary vertex at the average of the
    /// event points and the earliest event time. A chain that consumes all
    /// but one edge closes the loop.
    pub(super) fn collapse_group(&mut self, lp: &mut WavefrontLoop<T>, index: usize) {
        let seed = lp.pending.remove(index);
        let EventKind::Collapse { head, tail } = seed.kind else {
            return;
        };
        if !lp.contains_edge(tail, head) {
            debug!(head, tail, "dropping stale collapse");
            return;
        }

        let mut members = vec![(tail, head)];
        let mut points = vec![seed.at];

        let mut group_tail = tail;
        while let Some(i) = lp.pending.iter().position(|e| {
            matches!(e.kind, EventKind::Collapse { head: h, tail: t } if h == group_tail && lp.contains_edge(t, h))
        }) {
            let event = lp.pending.remove(i);
            if let EventKind::Collapse { tail: t, head: h } = event.kind {
                members.push((t, h));
                group_tail = t;
            }
            points.push(event.at);
        }

        let mut group_head = head;
        while let Some(i) = lp.pending.iter().position(|e| {
            matches!(e.kind, EventKind::Collapse { head: h, tail: t } if t == group_head && lp.contains_edge(t, h))
        }) {
            let event = lp.pending.remove(i);
            if let EventKind::Collapse { tail: t, head: h } = event.kind {
                members.push((t, h));
                group_head = h;
            }
            points.push(event.at);
        }

        let sum = points
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.point.coords);
        let time = points
            .iter()
            .map(|p| p.time)
            .fold(seed.at.time, |a, b| if b < a { b } else { a });
        let at = PointAndTime::new(Point2::from(sum / T::from_count(points.len())), time);

        let mut retired: Vec<VertexId> = members.iter().flat_map(|&(t, h)| [t, h]).collect();
        retired.sort_unstable();
        retired.dedup();
        for &v in &retired {
            self.record_path(v, at);
        }
        lp.motorcycles.retain(|m| !retired.contains(&m.motor));
        lp.edges.retain(|e| !members.contains(&(e.tail, e.head)));
        self.stats.collapse_events += members.len();

        if lp.edges.len() <= 1 || group_head == group_tail {
            lp.edges.clear();
            lp.motorcycles.clear();
            lp.pending.clear();
            trace!(time = time.widen(), "loop closed by collapse");
            return;
        }

        let merged = self.push_fresh(at);
        for e in &mut lp.edges {
            if e.head == group_tail {
                e.head = merged;
            }
            if e.tail == group_head {
                e.tail = merged;
            }
        }

        let pending = std::mem::take(&mut lp.pending);
        lp.pending = pending
            .into_iter()
            .map(|mut e| {
                e.kind = e
                    .kind
                    .relabel(|v| if retired.contains(&v) { merged } else { v });
                e
            })
            .filter(|e| lp.holds(&e.kind))
            .collect();

        trace!(
            edges = members.len(),
            vertex = merged,
            time = time.widen(),
            "collapsed edge chain"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::super::wavefront::Event;
    use super::*;
    use crate::math::Point2;

    fn collapse(tail: VertexId, head: VertexId, x: f64, y: f64, t: f64) -> Event<f64> {
        Event {
            kind: EventKind::Collapse { head, tail },
            at: PointAndTime::new(Point2::new(x, y), t),
        }
    }

    fn pentagon() -> Graph<f64> {
        Graph::new(&[
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(2.0, 5.0),
            Point2::new(-1.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn single_collapse_merges_endpoints() {
        let mut g = pentagon();
        let mut lp = WavefrontLoop::from_vertex_cycle(&[0, 1, 2, 3, 4]);
        lp.pending = vec![
            collapse(1, 2, 4.0, 1.0, 1.0),
            collapse(3, 4, 1.0, 3.0, 1.0),
        ];
        g.collapse_group(&mut lp, 0);

        let merged = g.vertices().len() - 1;
        assert_eq!(lp.vertex_cycle(), vec![0, merged, 3, 4]);
        assert_eq!(lp.pending.len(), 1);
        assert_eq!(g.vertex_paths().len(), 2);
        assert!(g.vertices()[merged].is_stationary());
        assert_relative_eq!(g.vertices()[merged].anchor0.point, Point2::new(4.0, 1.0));
    }

    #[test]
    fn chained_collapses_average_their_points() {
        let mut g = pentagon();
        let mut lp = WavefrontLoop::from_vertex_cycle(&[0, 1, 2, 3, 4]);
        lp.pending = vec![
            collapse(2, 3, 3.0, 2.0, 1.0),
            collapse(1, 2, 3.0, 1.0, 0.9),
        ];
        g.collapse_group(&mut lp, 0);

        let merged = g.vertices().len() - 1;
        assert_eq!(lp.vertex_cycle(), vec![0, merged, 4]);
        assert!(lp.pending.is_empty());
        let anchor = g.vertices()[merged].anchor0;
        assert_relative_eq!(anchor.point, Point2::new(3.0, 1.5));
        assert_relative_eq!(anchor.time, 0.9);
        assert_eq!(g.vertex_paths().len(), 3);
    }

    #[test]
    fn collapse_rewrites_pending_crash() {
        let mut g = pentagon();
        let mut lp = WavefrontLoop::from_vertex_cycle(&[0, 1, 2, 3, 4]);
        lp.pending = vec![
            collapse(1, 2, 4.0, 1.0, 1.0),
            Event {
                kind: EventKind::MotorcycleCrash {
                    motor: 4,
                    edge_head: 2,
                    edge_tail: 2,
                },
                at: PointAndTime::new(Point2::new(4.0, 1.0), 1.0),
            },
        ];
        g.collapse_group(&mut lp, 0);

        let merged = g.vertices().len() - 1;
        assert_eq!(
            lp.pending[0].kind,
            EventKind::MotorcycleCrash {
                motor: 4,
                edge_head: merged,
                edge_tail: merged,
            }
        );
    }

    #[test]
    fn collapsing_all_but_one_edge_closes_loop() {
        let mut g = pentagon();
        let mut lp = WavefrontLoop::from_vertex_cycle(&[0, 1, 2]);
        lp.pending = vec![
            collapse(0, 1, 1.0, 1.0, 1.0),
            collapse(1, 2, 1.0, 1.0, 1.0),
        ];
        g.collapse_group(&mut lp, 0);
        assert!(lp.edges.is_empty());
        assert_eq!(g.vertex_paths().len(), 3);
    }
}
