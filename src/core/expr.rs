//! The expression node type and its hash-consing key.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::core::functions::FuncKind;

/// Index into an [`Arena`](crate::core::arena::Arena)'s node table.
pub type Id = usize;

/// A single expression node. Children are referenced by [`Id`] into the
/// owning arena, never owned directly, so every node is cheap to copy.
#[derive(Clone, Debug)]
pub enum Expr {
    Constant(f64),
    Variable(Rc<str>),
    /// Placeholder for "the argument"; appears only inside a function's
    /// derivative template, never in a parsed or differentiated expression.
    Dot,
    Plus(Id, Id),
    Minus(Id, Id),
    Times(Id, Id),
    Divide(Id, Id),
    Power(Id, Id),
    UnaryMinus(Id),
    Sum(Vec<Id>),
    Product(Vec<Id>),
    Func(FuncKind, Id),
    Vector(Vec<Id>),
    Equation(Id),
    Assertion(Rc<str>, Id),
}

impl Expr {
    pub(crate) fn children(&self) -> Vec<Id> {
        use Expr::*;
        match self {
            Constant(_) | Variable(_) | Dot => vec![],
            Plus(l, r) | Minus(l, r) | Times(l, r) | Divide(l, r) | Power(l, r) => {
                vec![*l, *r]
            }
            UnaryMinus(e) | Func(_, e) | Equation(e) | Assertion(_, e) => vec![*e],
            Sum(ts) | Product(ts) | Vector(ts) => ts.clone(),
        }
    }

    pub(crate) fn calc_hash(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        use Expr::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a.to_bits() == b.to_bits(),
            (Variable(a), Variable(b)) => a == b,
            (Dot, Dot) => true,
            (Plus(a1, a2), Plus(b1, b2))
            | (Minus(a1, a2), Minus(b1, b2))
            | (Times(a1, a2), Times(b1, b2))
            | (Divide(a1, a2), Divide(b1, b2))
            | (Power(a1, a2), Power(b1, b2)) => a1 == b1 && a2 == b2,
            (UnaryMinus(a), UnaryMinus(b)) => a == b,
            (Sum(a), Sum(b)) | (Product(a), Product(b)) | (Vector(a), Vector(b)) => a == b,
            (Func(k1, a), Func(k2, b)) => k1 == k2 && a == b,
            (Equation(a), Equation(b)) => a == b,
            (Assertion(n1, a), Assertion(n2, b)) => n1 == n2 && a == b,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use Expr::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Constant(v) => v.to_bits().hash(state),
            Variable(n) => n.hash(state),
            Dot => {}
            Plus(a, b) | Minus(a, b) | Times(a, b) | Divide(a, b) | Power(a, b) => {
                a.hash(state);
                b.hash(state);
            }
            UnaryMinus(a) => a.hash(state),
            Sum(ts) | Product(ts) | Vector(ts) => ts.hash(state),
            Func(k, a) => {
                k.hash(state);
                a.hash(state);
            }
            Equation(a) => a.hash(state),
            Assertion(n, a) => {
                n.hash(state);
                a.hash(state);
            }
        }
    }
}
