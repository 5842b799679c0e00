//! Parses REPL input lines (bare expressions, equations, `V := E`
//! assignments, and `name: L = R` assertions) into expression-arena ids.

pub(crate) mod parse;

pub use parse::{parse_statement, ExprParser, Rule, Statement};
