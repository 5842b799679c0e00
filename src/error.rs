//! The crate's single error type. Every fallible operation in [`crate::core`],
//! [`crate::parser`] and [`crate::session`] returns `Result<_, Error>`.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// A parse failure, with a message already formatted by pest (line/column
    /// and expected-token detail included).
    Parse(String),
    /// A variable was referenced in `evaluate`/`evaluate_at` context without
    /// a binding.
    UndefinedVariable(String),
    /// A function was applied outside its real domain, e.g. `Log(-1)` or
    /// `Asin(2)`.
    Domain { function: String, argument: f64 },
    /// A REPL command referenced a name that has no assertion or binding.
    UnknownName(String),
    /// A REPL command was malformed (bad syntax).
    Command(String),
    /// A function-like identifier was parsed that has no entry in the
    /// function registry. The grammar is built from the same registry, so
    /// this should never trigger on valid surface syntax; it exists as a
    /// fail-closed check rather than an `unreachable!()`.
    UnknownFunction(String),
    /// A vector operation (`gradient`, a compiled numeric function, ...) was
    /// given the wrong number of components.
    ArityError { expected: usize, found: usize },
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn domain(function: impl Into<String>, argument: f64) -> Self {
        Error::Domain {
            function: function.into(),
            argument,
        }
    }

    pub fn command(msg: impl Into<String>) -> Self {
        Error::Command(msg.into())
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        Error::UnknownFunction(name.into())
    }

    pub fn arity(expected: usize, found: usize) -> Self {
        Error::ArityError { expected, found }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Error::Domain { function, argument } => {
                write!(f, "{function} is not defined at {argument}")
            }
            Error::UnknownName(name) => write!(f, "no such name: {name}"),
            Error::Command(msg) => write!(f, "{msg}"),
            Error::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Error::ArityError { expected, found } => {
                write!(f, "expected {expected} component(s), found {found}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<pest::error::Error<crate::parser::Rule>> for Error {
    fn from(e: pest::error::Error<crate::parser::Rule>) -> Self {
        Error::Parse(e.to_string())
    }
}
