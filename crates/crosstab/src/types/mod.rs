mod date;
mod float;

pub use date::{Date, DateParseError};
pub use float::{Float64, FloatError};
