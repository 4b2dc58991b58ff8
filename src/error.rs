use thiserror::Error;

/// Top-level error type for skeleton computations.
#[derive(Debug, Error)]
pub enum SkeletonError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to vertex trajectories and event timing.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A vertex whose second anchor precedes its first.
    #[error("vertex {vertex} has anchors out of order ({t0} > {t1})")]
    AnchorOrder { vertex: usize, t0: f64, t1: f64 },

    /// A loop processed an event batch earlier than its previous one.
    #[error("event batch at {current} precedes previous batch at {previous}")]
    TimeRegression { previous: f64, current: f64 },
}

/// Errors related to wavefront loop structure.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Consecutive edges of a loop do not share a vertex.
    #[error("loop is not a closed cycle at edge {edge}")]
    BrokenCycle { edge: usize },

    /// An edge whose head and tail are the same vertex.
    #[error("edge {edge} starts and ends at vertex {vertex}")]
    DegenerateEdge { edge: usize, vertex: usize },

    /// A vertex visited twice while walking a loop.
    #[error("vertex {0} appears more than once in a loop")]
    RepeatedVertex(usize),

    /// A motorcycle whose vertex is not part of its loop.
    #[error("motorcycle vertex {0} is not on its loop")]
    UnknownMotorcycle(usize),

    /// More than two wavefront segments meet at one output vertex.
    #[error("wavefront segments meet at a junction on vertex {0}")]
    Junction(usize),
}

/// Errors related to skeleton operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`SkeletonError`].
pub type Result<T> = std::result::Result<T, SkeletonError>;
