//! Core intermediate representation, operator traits, and pass infrastructure for tessel.
//!
//! This crate provides the foundational abstractions the other tessel crates depend on:
//! - Block IR (`Program`, `Block`, `Operation`, `Value`) with stable op and value ids
//! - Constant payloads (`TensorValue`) and value types (`ValueType`)
//! - Operator and Pass traits for extensibility
//! - Operator registry for per-op-type type inference

pub mod broadcast;
pub mod context;
pub mod ir;
pub mod ir_builder;
pub mod operator;
pub mod pass;
pub mod permutation;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use broadcast::broadcast_shape;
pub use context::InferenceCtx;
pub use ir::{Block, Input, OpId, Operation, Program, Value, ValueData, ValueId};
pub use ir_builder::OpSpec;
pub use operator::Operator;
pub use pass::{Pass, Stage};
pub use registry::OperatorRegistry;
pub use types::{AttributeValue, DataType, TensorData, TensorShape, TensorValue, ValueType};

/// Result type using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tessel-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Unrecognized input container for op '{op}', input '{slot}'")]
    InputShape { op: String, slot: String },

    #[error("No axis update strategy registered for op type '{0}'")]
    MissingStrategy(String),

    #[error("An axis update strategy is already registered for op type '{0}'")]
    DuplicateStrategy(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Type inference error: {0}")]
    TypeInference(String),

    #[error("Attribute error: {0}")]
    Attribute(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Shape error: {0}")]
    Shape(String),
}
