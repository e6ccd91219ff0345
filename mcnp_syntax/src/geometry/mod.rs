//! Semantic cell geometry
//!
//! [`HalfSpace`] is the boolean-algebra view of a cell's geometry syntax:
//! signed surfaces and complemented cells combined by intersection, union
//! and complement.

mod error;
mod half_space;
mod sync;

pub use error::GeometryError;
pub use half_space::{HalfSpace, HalfSpaceNode, NodeId, Operator, Unit};
