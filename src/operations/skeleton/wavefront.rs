use std::cmp::Ordering;

use crate::math::{later, Primitive};

use super::solver::{collapse_event, crash_event, CrashHit};
use super::vertex::{PointAndTime, Vertex, VertexId};

/// A directed wavefront edge running from `tail` to `head`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavefrontEdge {
    pub head: VertexId,
    pub tail: VertexId,
}

/// A reflex vertex whose path may run into the wavefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorcycleSegment {
    pub motor: VertexId,
}

/// What happens at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The edge `tail -> head` shrinks to a point.
    Collapse { head: VertexId, tail: VertexId },
    /// The motorcycle at `motor` reaches the edge `edge_tail -> edge_head`,
    /// or the vertex `edge_head` when both ends are equal.
    MotorcycleCrash {
        motor: VertexId,
        edge_head: VertexId,
        edge_tail: VertexId,
    },
}

impl EventKind {
    #[must_use]
    pub fn is_collapse(&self) -> bool {
        matches!(self, Self::Collapse { .. })
    }

    /// Applies `f` to every vertex the event names.
    #[must_use]
    pub fn relabel(self, f: impl Fn(VertexId) -> VertexId) -> Self {
        match self {
            Self::Collapse { head, tail } => Self::Collapse {
                head: f(head),
                tail: f(tail),
            },
            Self::MotorcycleCrash {
                motor,
                edge_head,
                edge_tail,
            } => Self::MotorcycleCrash {
                motor: f(motor),
                edge_head: f(edge_head),
                edge_tail: f(edge_tail),
            },
        }
    }

    /// An edge collapsing onto itself or a motorcycle crashing into its
    /// own vertex.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Self::Collapse { head, tail } => head == tail,
            Self::MotorcycleCrash {
                motor,
                edge_head,
                edge_tail,
            } => motor == edge_head || motor == edge_tail,
        }
    }

    /// Whether the event names `vertex` anywhere.
    #[must_use]
    pub fn touches(&self, vertex: VertexId) -> bool {
        match *self {
            Self::Collapse { head, tail } => head == vertex || tail == vertex,
            Self::MotorcycleCrash {
                motor,
                edge_head,
                edge_tail,
            } => motor == vertex || edge_head == vertex || edge_tail == vertex,
        }
    }
}

/// A collapse or crash at a point in space and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<T: Primitive> {
    pub kind: EventKind,
    pub at: PointAndTime<T>,
}

/// One closed, counter-clockwise cycle of the shrinking wavefront.
///
/// `edges[i].head == edges[i + 1].tail` holds cyclically at all times.
#[derive(Debug, Clone)]
pub struct WavefrontLoop<T: Primitive> {
    pub edges: Vec<WavefrontEdge>,
    pub motorcycles: Vec<MotorcycleSegment>,
    /// Events of the batch currently being processed.
    pub pending: Vec<Event<T>>,
    /// `(earliest, latest)` event time of the last processed batch.
    pub batch_window: Option<(T, T)>,
}

impl<T: Primitive> Default for WavefrontLoop<T> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            motorcycles: Vec::new(),
            pending: Vec::new(),
            batch_window: None,
        }
    }
}

impl<T: Primitive> WavefrontLoop<T> {
    /// Builds the loop `cycle[0] -> cycle[1] -> ... -> cycle[0]`.
    #[must_use]
    pub fn from_vertex_cycle(cycle: &[VertexId]) -> Self {
        let n = cycle.len();
        let edges = (0..n)
            .map(|i| WavefrontEdge {
                tail: cycle[i],
                head: cycle[(i + 1) % n],
            })
            .collect();
        Self {
            edges,
            ..Self::default()
        }
    }

    /// Vertices in walking order, starting at the first edge's tail.
    #[must_use]
    pub fn vertex_cycle(&self) -> Vec<VertexId> {
        self.edges.iter().map(|e| e.tail).collect()
    }

    /// Index of the edge leaving `vertex`.
    #[must_use]
    pub fn outgoing(&self, vertex: VertexId) -> Option<usize> {
        self.edges.iter().position(|e| e.tail == vertex)
    }

    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.outgoing(vertex).is_some()
    }

    #[must_use]
    pub fn contains_edge(&self, tail: VertexId, head: VertexId) -> bool {
        self.edges.iter().any(|e| e.tail == tail && e.head == head)
    }

    /// Whether every edge and vertex `kind` refers to is still in the loop.
    #[must_use]
    pub fn holds(&self, kind: &EventKind) -> bool {
        if kind.is_degenerate() {
            return false;
        }
        match *kind {
            EventKind::Collapse { head, tail } => self.contains_edge(tail, head),
            EventKind::MotorcycleCrash {
                motor,
                edge_head,
                edge_tail,
            } => {
                self.contains_vertex(motor)
                    && if edge_head == edge_tail {
                        self.contains_vertex(edge_head)
                    } else {
                        self.contains_edge(edge_tail, edge_head)
                    }
            }
        }
    }

    /// The vertices before and after the one leaving through edge `index`.
    #[must_use]
    pub fn neighbours(&self, index: usize) -> (VertexId, VertexId) {
        let n = self.edges.len();
        (self.edges[(index + n - 1) % n].tail, self.edges[index].head)
    }

    /// Time the loop has advanced to.
    #[must_use]
    pub fn current_time(&self) -> T {
        self.batch_window.map_or(T::ZERO, |(_, latest)| latest)
    }

    /// Finds the next batch of simultaneous events, sorted by time.
    ///
    /// Every edge is tested for a collapse and every motorcycle for its
    /// earliest crash. Candidates more than [`Primitive::TIME_EPSILON`]
    /// after the earliest one are discarded.
    #[must_use]
    pub fn next_batch(&self, vertices: &[Vertex<T>]) -> Vec<Event<T>> {
        let n = self.edges.len();
        let now = self.current_time();
        let mut earliest: Option<T> = None;
        let mut events = Vec::new();

        for i in 0..n {
            let prev = self.edges[(i + n - 1) % n];
            let edge = self.edges[i];
            let next = self.edges[(i + 1) % n];
            if let Some(at) = collapse_event(vertices, prev.tail, edge.tail, edge.head, next.head) {
                let event = Event {
                    kind: EventKind::Collapse {
                        head: edge.head,
                        tail: edge.tail,
                    },
                    at: PointAndTime::new(at.point, later(at.time, now)),
                };
                push_candidate(&mut events, &mut earliest, event);
            }
        }

        for m in &self.motorcycles {
            if let Some(event) = self.earliest_crash(vertices, m.motor, now) {
                push_candidate(&mut events, &mut earliest, event);
            }
        }

        if let Some(earliest) = earliest {
            events.retain(|e| e.at.time < earliest + T::TIME_EPSILON);
        }
        events.sort_by(|a, b| a.at.time.partial_cmp(&b.at.time).unwrap_or(Ordering::Equal));
        events
    }

    /// Earliest crash of the motorcycle at `motor` into any edge not
    /// adjacent to it. Ties keep the first edge found.
    fn earliest_crash(&self, vertices: &[Vertex<T>], motor: VertexId, now: T) -> Option<Event<T>> {
        let (prev, next) = self.neighbours(self.outgoing(motor)?);
        let mut best: Option<Event<T>> = None;

        for e in &self.edges {
            if e.head == motor || e.tail == motor {
                continue;
            }
            let Some(crash) = crash_event(vertices, e.head, e.tail, prev, motor, next) else {
                continue;
            };
            let (edge_head, edge_tail) = match crash.hit {
                CrashHit::Head if e.head == prev => continue,
                CrashHit::Tail if e.tail == next => continue,
                CrashHit::Head => (e.head, e.head),
                CrashHit::Tail => (e.tail, e.tail),
                CrashHit::Middle => (e.head, e.tail),
            };
            if crash.at.time < now - T::TIME_EPSILON {
                continue;
            }
            let time = later(crash.at.time, now);
            if best.is_some_and(|b| b.at.time <= time) {
                continue;
            }
            best = Some(Event {
                kind: EventKind::MotorcycleCrash {
                    motor,
                    edge_head,
                    edge_tail,
                },
                at: PointAndTime::new(crash.at.point, time),
            });
        }
        best
    }
}

/// Adds `event` unless it is clearly later than the earliest candidate,
/// tightening the earliest time as it goes.
fn push_candidate<T: Primitive>(events: &mut Vec<Event<T>>, earliest: &mut Option<T>, event: Event<T>) {
    let time = event.at.time;
    match *earliest {
        Some(t) if time >= t + T::TIME_EPSILON => return,
        Some(t) if time >= t => {}
        _ => *earliest = Some(time),
    }
    events.push(event);
}
