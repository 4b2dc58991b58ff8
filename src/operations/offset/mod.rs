mod skeleton_inset;

pub use skeleton_inset::SkeletonInset2D;
