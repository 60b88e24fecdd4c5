//! Individual operators with their own type inference rules.

pub mod concat;
pub mod constant;
pub mod pad;
pub mod transpose;

pub use concat::ConcatOp;
pub use constant::ConstOp;
pub use pad::PadOp;
pub use transpose::TransposeOp;
