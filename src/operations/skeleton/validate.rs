//! Consistency checks for a [`Graph`] between steps.

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::Primitive;

use super::graph::{Graph, StepOutcome};
use super::wavefront::WavefrontEdge;

/// Checks that every loop is a closed cycle without degenerate edges or
/// repeated vertices, that motorcycles sit on their loop, and that every
/// vertex's anchors are in time order.
///
/// # Errors
///
/// Returns the first violation found as a `TopologyError` or
/// `GeometryError`.
pub fn check_graph<T: Primitive>(graph: &Graph<T>) -> Result<()> {
    for (_, lp) in graph.active_loops() {
        check_cycle(&lp.edges)?;
        if let Some(m) = lp.motorcycles.iter().find(|m| !lp.contains_vertex(m.motor)) {
            return Err(TopologyError::UnknownMotorcycle(m.motor).into());
        }
    }
    for lp in graph.frozen_loops() {
        check_cycle(&lp.edges)?;
    }
    for (vertex, v) in graph.vertices().iter().enumerate() {
        if v.anchor1.time < v.anchor0.time {
            return Err(GeometryError::AnchorOrder {
                vertex,
                t0: v.anchor0.time.widen(),
                t1: v.anchor1.time.widen(),
            }
            .into());
        }
    }
    Ok(())
}

/// Checks that a processed batch does not start before the one the loop
/// processed previously.
///
/// # Errors
///
/// Returns `GeometryError::TimeRegression` on a backwards step.
pub fn check_step<T: Primitive>(outcome: &StepOutcome<T>) -> Result<()> {
    if let StepOutcome::Processed {
        previous: Some((_, previous)),
        window: (current, _),
        ..
    } = *outcome
    {
        if current < previous - T::TIME_EPSILON {
            return Err(GeometryError::TimeRegression {
                previous: previous.widen(),
                current: current.widen(),
            }
            .into());
        }
    }
    Ok(())
}

fn check_cycle(edges: &[WavefrontEdge]) -> Result<()> {
    let n = edges.len();
    let mut seen = Vec::with_capacity(n);
    for (i, e) in edges.iter().enumerate() {
        if e.head == e.tail {
            return Err(TopologyError::DegenerateEdge {
                edge: i,
                vertex: e.head,
            }
            .into());
        }
        if e.head != edges[(i + 1) % n].tail {
            return Err(TopologyError::BrokenCycle { edge: i }.into());
        }
        if seen.contains(&e.tail) {
            return Err(TopologyError::RepeatedVertex(e.tail).into());
        }
        seen.push(e.tail);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SkeletonError;
    use crate::math::Point2;

    fn edges(pairs: &[(usize, usize)]) -> Vec<WavefrontEdge> {
        pairs
            .iter()
            .map(|&(tail, head)| WavefrontEdge { head, tail })
            .collect()
    }

    #[test]
    fn accepts_fresh_graph() {
        let g = Graph::new(&[
            Point2::new(0.0_f64, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        assert!(check_graph(&g).is_ok());
    }

    #[test]
    fn cycle_violations() {
        assert!(check_cycle(&edges(&[(0, 1), (1, 2), (2, 0)])).is_ok());
        assert!(matches!(
            check_cycle(&edges(&[(0, 1), (2, 0)])),
            Err(SkeletonError::Topology(TopologyError::BrokenCycle { edge: 0 }))
        ));
        assert!(matches!(
            check_cycle(&edges(&[(0, 0)])),
            Err(SkeletonError::Topology(TopologyError::DegenerateEdge { .. }))
        ));
        assert!(matches!(
            check_cycle(&edges(&[(0, 1), (1, 0), (0, 1), (1, 0)])),
            Err(SkeletonError::Topology(TopologyError::RepeatedVertex(0)))
        ));
    }

    #[test]
    fn backwards_batch_is_rejected() {
        let mut g = Graph::new(&[
            Point2::new(0.0_f64, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        let StepOutcome::Processed { loop_id, .. } = g.step(None) else {
            panic!("triangle should collapse");
        };
        let outcome = StepOutcome::Processed {
            loop_id,
            previous: Some((0.5, 0.5)),
            window: (0.25, 0.25),
            events: 1,
        };
        assert!(matches!(
            check_step(&outcome),
            Err(SkeletonError::Geometry(GeometryError::TimeRegression { .. }))
        ));
    }
}
