//! A small computer algebra system for symbolic scalar expressions.
//!
//! Start at [`core::Arena`], which interns every expression node and hosts
//! the universal operations (simplify, differentiate, evaluate, format),
//! and [`session::Session`], which drives the parse/simplify/print cycle.

pub mod core;
pub mod error;
pub mod panic;
pub mod parser;
pub mod session;
pub mod shell;

pub use crate::core::{Arena, Expr, Format, FuncKind, Id};
pub use error::Error;
