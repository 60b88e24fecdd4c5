//! Operator families that share one implementation across several op types.

pub mod binary_elementwise;
pub mod reduction;
pub mod unary_elementwise;

pub use binary_elementwise::BinaryElementwiseOp;
pub use reduction::ReductionOp;
pub use unary_elementwise::{UNARY_OP_TYPES, UnaryOp};
