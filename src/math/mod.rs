//! Transform algebra
//!
//! Value types and degenerate-input tolerant helpers built on glam

mod safe;
mod transform;

pub use safe::{InversionError, SafeInverse, SafeRecip};
pub use transform::SrtTransform;
