use tracing::{debug, trace};

use crate::math::Primitive;

use super::graph::Graph;
use super::vertex::VertexId;
use super::wavefront::{Event, EventKind, WavefrontLoop};

/// Result of applying a motorcycle crash to a loop.
pub(super) enum CrashOutcome<T: Primitive> {
    /// The loop was cut in two at the crash point.
    Split {
        tail_side: WavefrontLoop<T>,
        head_side: WavefrontLoop<T>,
    },
    /// The crash no longer applied and the loop is returned untouched.
    Skipped(WavefrontLoop<T>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Tail,
    Head,
}

/// Where a crash cuts a loop: `motor` leaves through edge `m`, the
/// collision edge (or the hit vertex's outgoing edge) is `k`.
#[derive(Debug, Clone, Copy)]
struct Cut {
    m: usize,
    k: usize,
    hit_vertex: Option<VertexId>,
}

impl Cut {
    fn locate<T: Primitive>(
        lp: &WavefrontLoop<T>,
        motor: VertexId,
        edge_head: VertexId,
        edge_tail: VertexId,
    ) -> Option<Self> {
        if lp.edges.len() <= 2 || edge_head == motor || edge_tail == motor {
            return None;
        }
        let m = lp.outgoing(motor)?;
        let (prev, next) = lp.neighbours(m);
        if edge_head == edge_tail {
            if edge_head == prev || edge_head == next {
                return None;
            }
            return Some(Self {
                m,
                k: lp.outgoing(edge_head)?,
                hit_vertex: Some(edge_head),
            });
        }
        let k = lp
            .edges
            .iter()
            .position(|e| e.head == edge_head && e.tail == edge_tail)?;
        Some(Self {
            m,
            k,
            hit_vertex: None,
        })
    }
}

/// `cycle[from..=to]`, wrapping around the end.
fn walk(cycle: &[VertexId], from: usize, to: usize) -> Vec<VertexId> {
    let n = cycle.len();
    let mut out = Vec::new();
    let mut i = from;
    loop {
        out.push(cycle[i]);
        if i == to || out.len() == n {
            break;
        }
        i = (i + 1) % n;
    }
    out
}

/// Moves a pending event onto one side of a split.
///
/// Consumed vertices become that side's crash vertex, and an event on the
/// collision edge is moved onto the half of the edge the side keeps.
/// Crashes of consumed motorcycles are dropped.
fn carry_over(
    kind: EventKind,
    consumed: &[VertexId],
    collision: Option<(VertexId, VertexId)>,
    x: VertexId,
    side: Side,
) -> Option<EventKind> {
    let mut kind = kind;
    if let EventKind::MotorcycleCrash { motor, .. } = kind {
        if consumed.contains(&motor) {
            return None;
        }
    }
    if let Some((ct, ch)) = collision {
        kind = match (kind, side) {
            (EventKind::Collapse { head, tail }, Side::Tail) if (tail, head) == (ct, ch) => {
                EventKind::Collapse { head: x, tail }
            }
            (EventKind::Collapse { head, tail }, Side::Head) if (tail, head) == (ct, ch) => {
                EventKind::Collapse { head, tail: x }
            }
            (
                EventKind::MotorcycleCrash {
                    motor,
                    edge_head,
                    edge_tail,
                },
                Side::Tail,
            ) if (edge_tail, edge_head) == (ct, ch) => EventKind::MotorcycleCrash {
                motor,
                edge_head: x,
                edge_tail,
            },
            (
                EventKind::MotorcycleCrash {
                    motor,
                    edge_head,
                    edge_tail,
                },
                Side::Head,
            ) if (edge_tail, edge_head) == (ct, ch) => EventKind::MotorcycleCrash {
                motor,
                edge_head,
                edge_tail: x,
            },
            (other, _) => other,
        };
    }
    Some(kind.relabel(|v| if consumed.contains(&v) { x } else { v }))
}

impl<T: Primitive> Graph<T> {
    /// Splits `lp` where a motorcycle meets the opposite wavefront.
    ///
    /// Two stationary vertices are created at the crash point. With the
    /// loop's vertices `w` and the motor leaving through edge `m`, a crash
    /// into the middle of edge `k` yields
    ///
    /// ```text
    /// tail side: [Xt, w[m+1], ..., w[k]]
    /// head side: [Xh, w[k+1], ..., w[m-1]]
    /// ```
    ///
    /// and a crash into vertex `w[k]` drops `w[k]` from the tail side, since
    /// it is consumed together with the motor. Motorcycles and pending
    /// events follow the side holding their vertices.
    pub(super) fn split_at_crash(
        &mut self,
        lp: WavefrontLoop<T>,
        event: &Event<T>,
    ) -> CrashOutcome<T> {
        let EventKind::MotorcycleCrash {
            motor,
            edge_head,
            edge_tail,
        } = event.kind
        else {
            return CrashOutcome::Skipped(lp);
        };
        let Some(Cut { m, k, hit_vertex }) = Cut::locate(&lp, motor, edge_head, edge_tail) else {
            debug!(motor, edge_head, edge_tail, "dropping stale motorcycle crash");
            return CrashOutcome::Skipped(lp);
        };

        let n = lp.edges.len();
        let cycle = lp.vertex_cycle();
        let tail_x = self.push_fresh(event.at);
        let head_x = self.push_fresh(event.at);

        let tail_end = if hit_vertex.is_some() { (k + n - 1) % n } else { k };
        let mut tail_cycle = vec![tail_x];
        tail_cycle.extend(walk(&cycle, (m + 1) % n, tail_end));
        let mut head_cycle = vec![head_x];
        head_cycle.extend(walk(&cycle, (k + 1) % n, (m + n - 1) % n));

        let mut consumed = vec![motor];
        self.record_path(motor, event.at);
        if let Some(v) = hit_vertex {
            self.record_path(v, event.at);
            consumed.push(v);
        }
        self.stats.crash_events += 1;

        let mut tail_side = WavefrontLoop::from_vertex_cycle(&tail_cycle);
        let mut head_side = WavefrontLoop::from_vertex_cycle(&head_cycle);
        tail_side.batch_window = lp.batch_window;
        head_side.batch_window = lp.batch_window;

        for bike in lp.motorcycles {
            if consumed.contains(&bike.motor) {
                continue;
            }
            if tail_side.contains_vertex(bike.motor) {
                tail_side.motorcycles.push(bike);
            } else if head_side.contains_vertex(bike.motor) {
                head_side.motorcycles.push(bike);
            }
        }

        let collision = hit_vertex.is_none().then_some((edge_tail, edge_head));
        for pending in &lp.pending {
            for (side, x, target) in [
                (Side::Tail, tail_x, &mut tail_side),
                (Side::Head, head_x, &mut head_side),
            ] {
                let Some(kind) = carry_over(pending.kind, &consumed, collision, x, side) else {
                    continue;
                };
                if target.holds(&kind) {
                    target.pending.push(Event {
                        kind,
                        at: pending.at,
                    });
                }
            }
        }

        trace!(
            motor,
            tail_edges = tail_side.edges.len(),
            head_edges = head_side.edges.len(),
            time = event.at.time.widen(),
            "split wavefront at motorcycle crash"
        );
        CrashOutcome::Split {
            tail_side,
            head_side,
        }
    }
}
