pub mod bit_math;
pub mod errors;
pub mod fixed_point;

pub use errors::MathError;
