//! Operation set for tessel.
//!
//! This crate provides type inference for the operations tessel passes reason
//! about, grouped into families where several op types share one
//! implementation.
//!
//! # Operator Families
//!
//! - **Unary elementwise**: relu, log, sigmoid, ... (shape preserving)
//! - **Binary elementwise**: add, sub, mul, real_div, maximum, minimum
//! - **Reduction**: reduce_mean, reduce_sum, reduce_max, ... (axes + keep_dims)
//!
//! # Individual Operators
//!
//! - const
//! - transpose
//! - concat
//! - pad

pub mod families;
pub mod operators;

mod helpers;
mod registry;

pub use families::{BinaryElementwiseOp, ReductionOp, UNARY_OP_TYPES, UnaryOp};
pub use operators::{ConcatOp, ConstOp, PadOp, TransposeOp};
pub use registry::core_operator_registry;
