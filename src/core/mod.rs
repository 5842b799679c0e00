//! The expression algebra: interning, simplification, differentiation,
//! evaluation and formatting of symbolic scalar expressions.

pub(crate) mod arena;
pub(crate) mod diff;
pub(crate) mod expr;
pub(crate) mod format;
pub(crate) mod functions;
pub(crate) mod ordering;
pub(crate) mod simplify;
pub(crate) mod vectorops;

pub use arena::Arena;
pub use expr::{Expr, Id};
pub use format::Format;
pub use functions::FuncKind;
