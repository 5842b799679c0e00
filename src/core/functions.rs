//! The scalar function registry: numeric implementations, derivative
//! templates and alias resolution for the standard unary functions.

use rustc_hash::FxHashMap;

use crate::core::arena::Arena;
use crate::core::expr::Id;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Log,
    Exp,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Atan,
    Atanh,
    Asin,
    Acos,
}

impl FuncKind {
    /// The canonical display name used in every output format; aliases
    /// (`Ln`, `Arctan`, ...) resolve to a kind at parse time but never
    /// appear in formatted output.
    pub fn base_name(self) -> &'static str {
        match self {
            FuncKind::Log => "Log",
            FuncKind::Exp => "Exp",
            FuncKind::Sin => "Sin",
            FuncKind::Cos => "Cos",
            FuncKind::Tan => "Tan",
            FuncKind::Sinh => "Sinh",
            FuncKind::Cosh => "Cosh",
            FuncKind::Tanh => "Tanh",
            FuncKind::Sqrt => "Sqrt",
            FuncKind::Atan => "Atan",
            FuncKind::Atanh => "Atanh",
            FuncKind::Asin => "Asin",
            FuncKind::Acos => "Acos",
        }
    }

    pub fn lowercase_name(self) -> &'static str {
        match self {
            FuncKind::Log => "log",
            FuncKind::Exp => "exp",
            FuncKind::Sin => "sin",
            FuncKind::Cos => "cos",
            FuncKind::Tan => "tan",
            FuncKind::Sinh => "sinh",
            FuncKind::Cosh => "cosh",
            FuncKind::Tanh => "tanh",
            FuncKind::Sqrt => "sqrt",
            FuncKind::Atan => "atan",
            FuncKind::Atanh => "atanh",
            FuncKind::Asin => "asin",
            FuncKind::Acos => "acos",
        }
    }

    pub fn tex_name(self) -> &'static str {
        match self {
            FuncKind::Log => "\\log",
            FuncKind::Exp => "\\exp",
            FuncKind::Sin => "\\sin",
            FuncKind::Cos => "\\cos",
            FuncKind::Tan => "\\tan",
            FuncKind::Sinh => "\\sinh",
            FuncKind::Cosh => "\\cosh",
            FuncKind::Tanh => "\\tanh",
            FuncKind::Sqrt => "\\sqrt",
            FuncKind::Atan => "\\arctan",
            FuncKind::Atanh => "\\operatorname{artanh}",
            FuncKind::Asin => "\\arcsin",
            FuncKind::Acos => "\\arccos",
        }
    }

    /// Resolves a surface-syntax function name (including aliases) to its
    /// kind. `Ln` resolves to `Log`, `Arctan`/`Arctanh`/`Arcsin`/`Arccos` to
    /// their non-"Arc" counterparts.
    pub fn from_name(name: &str) -> Option<FuncKind> {
        match name {
            "Log" => Some(FuncKind::Log),
            "Ln" => Some(FuncKind::Log),
            "Exp" => Some(FuncKind::Exp),
            "Sin" => Some(FuncKind::Sin),
            "Cos" => Some(FuncKind::Cos),
            "Tan" => Some(FuncKind::Tan),
            "Sinh" => Some(FuncKind::Sinh),
            "Cosh" => Some(FuncKind::Cosh),
            "Tanh" => Some(FuncKind::Tanh),
            "Sqrt" => Some(FuncKind::Sqrt),
            "Atan" => Some(FuncKind::Atan),
            "Arctan" => Some(FuncKind::Atan),
            "Atanh" => Some(FuncKind::Atanh),
            "Arctanh" => Some(FuncKind::Atanh),
            "Asin" => Some(FuncKind::Asin),
            "Arcsin" => Some(FuncKind::Asin),
            "Acos" => Some(FuncKind::Acos),
            "Arccos" => Some(FuncKind::Acos),
            _ => None,
        }
    }

    pub fn numeric(self, x: f64) -> Result<f64, Error> {
        match self {
            FuncKind::Log => {
                if x > 0.0 {
                    Ok(x.ln())
                } else {
                    Err(Error::domain(self.base_name(), x))
                }
            }
            FuncKind::Exp => Ok(x.exp()),
            FuncKind::Sin => Ok(x.sin()),
            FuncKind::Cos => Ok(x.cos()),
            FuncKind::Tan => Ok(x.tan()),
            FuncKind::Sinh => Ok(x.sinh()),
            FuncKind::Cosh => Ok(x.cosh()),
            FuncKind::Tanh => Ok(x.tanh()),
            FuncKind::Sqrt => {
                if x >= 0.0 {
                    Ok(x.sqrt())
                } else {
                    Err(Error::domain(self.base_name(), x))
                }
            }
            FuncKind::Atan => Ok(x.atan()),
            FuncKind::Atanh => {
                if x.abs() < 1.0 {
                    Ok(x.atanh())
                } else {
                    Err(Error::domain(self.base_name(), x))
                }
            }
            FuncKind::Asin => {
                if x.abs() <= 1.0 {
                    Ok(x.asin())
                } else {
                    Err(Error::domain(self.base_name(), x))
                }
            }
            FuncKind::Acos => {
                if x.abs() <= 1.0 {
                    Ok(x.acos())
                } else {
                    Err(Error::domain(self.base_name(), x))
                }
            }
        }
    }
}

/// Per-arena memo table of each kind's derivative template, built once on
/// first use and interned like any other expression.
#[derive(Default)]
pub(crate) struct TemplateCache(pub(crate) FxHashMap<FuncKind, Id>);

/// Returns the interned derivative-template expression for `kind` (an
/// expression containing `Dot`), building and memoizing it on first use.
pub(crate) fn derivative_template(arena: &mut Arena, kind: FuncKind) -> Id {
    if let Some(&id) = arena.func_templates().get(&kind) {
        return id;
    }
    let dot = arena.dot();
    let one = arena.constant(1.0);
    let template = match kind {
        FuncKind::Log => arena.divide(one, dot),
        FuncKind::Exp => arena.func(FuncKind::Exp, dot),
        FuncKind::Sin => arena.func(FuncKind::Cos, dot),
        FuncKind::Cos => {
            let s = arena.func(FuncKind::Sin, dot);
            arena.unary_minus(s)
        }
        FuncKind::Tan => {
            let t = arena.func(FuncKind::Tan, dot);
            let two = arena.constant(2.0);
            let t2 = arena.power(t, two);
            arena.plus(one, t2)
        }
        FuncKind::Sinh => arena.func(FuncKind::Cosh, dot),
        FuncKind::Cosh => arena.func(FuncKind::Sinh, dot),
        FuncKind::Tanh => {
            let t = arena.func(FuncKind::Tanh, dot);
            let two = arena.constant(2.0);
            let t2 = arena.power(t, two);
            arena.minus(one, t2)
        }
        FuncKind::Sqrt => {
            let s = arena.func(FuncKind::Sqrt, dot);
            let two = arena.constant(2.0);
            let denom = arena.times(two, s);
            arena.divide(one, denom)
        }
        FuncKind::Atan => {
            let two = arena.constant(2.0);
            let d2 = arena.power(dot, two);
            let denom = arena.plus(one, d2);
            arena.divide(one, denom)
        }
        FuncKind::Atanh => {
            let two = arena.constant(2.0);
            let d2 = arena.power(dot, two);
            let denom = arena.minus(one, d2);
            arena.divide(one, denom)
        }
        FuncKind::Asin => {
            let two = arena.constant(2.0);
            let d2 = arena.power(dot, two);
            let inner = arena.minus(one, d2);
            let root = arena.func(FuncKind::Sqrt, inner);
            arena.divide(one, root)
        }
        FuncKind::Acos => {
            let two = arena.constant(2.0);
            let d2 = arena.power(dot, two);
            let inner = arena.minus(one, d2);
            let root = arena.func(FuncKind::Sqrt, inner);
            let frac = arena.divide(one, root);
            arena.unary_minus(frac)
        }
    };
    arena.func_templates_mut().insert(kind, template);
    template
}
