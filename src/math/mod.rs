pub mod math_helpers;
pub mod segment_math;
pub mod tick_math;
