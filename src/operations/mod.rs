pub mod offset;
pub mod skeleton;
