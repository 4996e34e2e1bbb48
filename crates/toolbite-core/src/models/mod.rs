//! Data models for a single transformation request.

mod operation;
mod payload;
mod transform;

pub use operation::*;
pub use payload::*;
pub use transform::*;
