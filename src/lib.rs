pub mod error;
pub mod math;
pub mod operations;

pub use error::{Result, SkeletonError};
pub use operations::skeleton::{calculate_straight_skeleton, StraightSkeleton, StraightSkeleton2D};
