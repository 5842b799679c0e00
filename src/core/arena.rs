//! The expression arena: hash-consed storage for every node, plus the
//! universal operations every expression supports.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::expr::{Expr, Id};
use crate::core::format::{self, Format};
use crate::core::functions::{FuncKind, TemplateCache};
use crate::core::{diff, simplify, vectorops};
use crate::error::Error;

/// Interns every [`Expr`] node produced while parsing, simplifying or
/// differentiating. Structurally equal nodes share one [`Id`]; equality and
/// hashing are defined over a node's immediate fields only, which is sound
/// because children are themselves already-interned ids into this same
/// table (see [`Expr`]'s `PartialEq`/`Hash` impls).
pub struct Arena {
    exprs: Vec<Expr>,
    index: FxHashMap<u64, Vec<Id>>,
    func_templates: TemplateCache,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            exprs: Vec::new(),
            index: FxHashMap::default(),
            func_templates: TemplateCache::default(),
        }
    }

    pub(crate) fn func_templates(&self) -> &FxHashMap<FuncKind, Id> {
        &self.func_templates.0
    }

    pub(crate) fn func_templates_mut(&mut self) -> &mut FxHashMap<FuncKind, Id> {
        &mut self.func_templates.0
    }

    /// Interns `e`, returning the id of an existing structurally-equal node
    /// if one exists, or pushing a new one.
    pub(crate) fn add_expr(&mut self, e: Expr) -> Id {
        let hash = e.calc_hash();
        if let Some(ids) = self.index.get(&hash) {
            for &id in ids {
                if self.exprs[id] == e {
                    return id;
                }
            }
        }
        let id = self.exprs.len();
        self.exprs.push(e);
        self.index.entry(hash).or_default().push(id);
        id
    }

    pub fn get(&self, id: Id) -> &Expr {
        &self.exprs[id]
    }

    // --- construction sugar -------------------------------------------------

    pub fn constant(&mut self, v: f64) -> Id {
        self.add_expr(Expr::Constant(v))
    }

    pub fn variable(&mut self, name: impl AsRef<str>) -> Id {
        self.add_expr(Expr::Variable(Rc::from(name.as_ref())))
    }

    pub fn dot(&mut self) -> Id {
        self.add_expr(Expr::Dot)
    }

    pub fn plus(&mut self, l: Id, r: Id) -> Id {
        self.add_expr(Expr::Plus(l, r))
    }

    pub fn minus(&mut self, l: Id, r: Id) -> Id {
        self.add_expr(Expr::Minus(l, r))
    }

    pub fn times(&mut self, l: Id, r: Id) -> Id {
        self.add_expr(Expr::Times(l, r))
    }

    pub fn divide(&mut self, l: Id, r: Id) -> Id {
        self.add_expr(Expr::Divide(l, r))
    }

    pub fn power(&mut self, l: Id, r: Id) -> Id {
        self.add_expr(Expr::Power(l, r))
    }

    pub fn unary_minus(&mut self, e: Id) -> Id {
        self.add_expr(Expr::UnaryMinus(e))
    }

    pub fn sum(&mut self, terms: Vec<Id>) -> Id {
        self.add_expr(Expr::Sum(terms))
    }

    pub fn product(&mut self, terms: Vec<Id>) -> Id {
        self.add_expr(Expr::Product(terms))
    }

    pub fn func(&mut self, kind: FuncKind, arg: Id) -> Id {
        self.add_expr(Expr::Func(kind, arg))
    }

    pub fn vector(&mut self, items: Vec<Id>) -> Id {
        self.add_expr(Expr::Vector(items))
    }

    /// `Equation(L, R)` stores `Minus(L, R)` as its single child.
    pub fn equation(&mut self, left: Id, right: Id) -> Id {
        let diff = self.minus(left, right);
        self.add_expr(Expr::Equation(diff))
    }

    pub fn assertion(&mut self, name: impl AsRef<str>, expr: Id) -> Id {
        self.add_expr(Expr::Assertion(Rc::from(name.as_ref()), expr))
    }

    // --- universal operations ------------------------------------------------

    pub fn free_variables(&self, id: Id) -> BTreeSet<Rc<str>> {
        let mut set = BTreeSet::new();
        self.collect_free_variables(id, &mut set);
        set
    }

    fn collect_free_variables(&self, id: Id, set: &mut BTreeSet<Rc<str>>) {
        match self.get(id) {
            Expr::Variable(n) => {
                set.insert(n.clone());
            }
            Expr::Constant(_) | Expr::Dot => {}
            other => {
                for child in other.children() {
                    self.collect_free_variables(child, set);
                }
            }
        }
    }

    pub fn free_of(&self, id: Id, name: &str) -> bool {
        !self.free_variables(id).iter().any(|n| n.as_ref() == name)
    }

    /// Structural replacement of every `Variable(name)` by `replacement`.
    pub fn substitute(&mut self, id: Id, name: &str, replacement: Id) -> Id {
        match self.get(id).clone() {
            Expr::Variable(n) if n.as_ref() == name => replacement,
            Expr::Variable(_) | Expr::Constant(_) | Expr::Dot => id,
            Expr::Plus(l, r) => {
                let (l, r) = (
                    self.substitute(l, name, replacement),
                    self.substitute(r, name, replacement),
                );
                self.plus(l, r)
            }
            Expr::Minus(l, r) => {
                let (l, r) = (
                    self.substitute(l, name, replacement),
                    self.substitute(r, name, replacement),
                );
                self.minus(l, r)
            }
            Expr::Times(l, r) => {
                let (l, r) = (
                    self.substitute(l, name, replacement),
                    self.substitute(r, name, replacement),
                );
                self.times(l, r)
            }
            Expr::Divide(l, r) => {
                let (l, r) = (
                    self.substitute(l, name, replacement),
                    self.substitute(r, name, replacement),
                );
                self.divide(l, r)
            }
            Expr::Power(l, r) => {
                let (l, r) = (
                    self.substitute(l, name, replacement),
                    self.substitute(r, name, replacement),
                );
                self.power(l, r)
            }
            Expr::UnaryMinus(e) => {
                let e = self.substitute(e, name, replacement);
                self.unary_minus(e)
            }
            Expr::Sum(ts) => {
                let ts = ts
                    .into_iter()
                    .map(|t| self.substitute(t, name, replacement))
                    .collect();
                self.sum(ts)
            }
            Expr::Product(ts) => {
                let ts = ts
                    .into_iter()
                    .map(|t| self.substitute(t, name, replacement))
                    .collect();
                self.product(ts)
            }
            Expr::Func(k, a) => {
                let a = self.substitute(a, name, replacement);
                self.func(k, a)
            }
            Expr::Vector(items) => {
                let items = items
                    .into_iter()
                    .map(|t| self.substitute(t, name, replacement))
                    .collect();
                self.vector(items)
            }
            Expr::Equation(e) => {
                let e = self.substitute(e, name, replacement);
                self.add_expr(Expr::Equation(e))
            }
            Expr::Assertion(n, e) => {
                let e = self.substitute(e, name, replacement);
                self.add_expr(Expr::Assertion(n, e))
            }
        }
    }

    /// Replaces every `Dot` in `id` by `value`. Used to instantiate
    /// derivative templates (and, during parsing, repeated `'`s).
    pub fn evaluate_at(&mut self, id: Id, value: Id) -> Id {
        match self.get(id).clone() {
            Expr::Dot => value,
            Expr::Constant(_) | Expr::Variable(_) => id,
            Expr::Plus(l, r) => {
                let (l, r) = (self.evaluate_at(l, value), self.evaluate_at(r, value));
                self.plus(l, r)
            }
            Expr::Minus(l, r) => {
                let (l, r) = (self.evaluate_at(l, value), self.evaluate_at(r, value));
                self.minus(l, r)
            }
            Expr::Times(l, r) => {
                let (l, r) = (self.evaluate_at(l, value), self.evaluate_at(r, value));
                self.times(l, r)
            }
            Expr::Divide(l, r) => {
                let (l, r) = (self.evaluate_at(l, value), self.evaluate_at(r, value));
                self.divide(l, r)
            }
            Expr::Power(l, r) => {
                let (l, r) = (self.evaluate_at(l, value), self.evaluate_at(r, value));
                self.power(l, r)
            }
            Expr::UnaryMinus(e) => {
                let e = self.evaluate_at(e, value);
                self.unary_minus(e)
            }
            Expr::Sum(ts) => {
                let ts = ts.into_iter().map(|t| self.evaluate_at(t, value)).collect();
                self.sum(ts)
            }
            Expr::Product(ts) => {
                let ts = ts.into_iter().map(|t| self.evaluate_at(t, value)).collect();
                self.product(ts)
            }
            Expr::Func(k, a) => {
                let a = self.evaluate_at(a, value);
                self.func(k, a)
            }
            Expr::Vector(items) => {
                let items = items.into_iter().map(|t| self.evaluate_at(t, value)).collect();
                self.vector(items)
            }
            Expr::Equation(e) => {
                let e = self.evaluate_at(e, value);
                self.add_expr(Expr::Equation(e))
            }
            Expr::Assertion(n, e) => {
                let e = self.evaluate_at(e, value);
                self.add_expr(Expr::Assertion(n, e))
            }
        }
    }

    /// Numeric evaluation under `env`. Fails on an unbound variable or a
    /// function application outside its real domain.
    pub fn evaluate(&self, id: Id, env: &HashMap<String, f64>) -> Result<f64, Error> {
        match self.get(id) {
            Expr::Constant(v) => Ok(*v),
            Expr::Variable(n) => env
                .get(n.as_ref())
                .copied()
                .ok_or_else(|| Error::UndefinedVariable(n.to_string())),
            Expr::Dot => Err(Error::parse(
                "cannot evaluate an unapplied derivative template",
            )),
            Expr::Plus(l, r) => Ok(self.evaluate(*l, env)? + self.evaluate(*r, env)?),
            Expr::Minus(l, r) => Ok(self.evaluate(*l, env)? - self.evaluate(*r, env)?),
            Expr::Times(l, r) => Ok(self.evaluate(*l, env)? * self.evaluate(*r, env)?),
            Expr::Divide(l, r) => {
                let (l, r) = (self.evaluate(*l, env)?, self.evaluate(*r, env)?);
                if r == 0.0 {
                    return Err(Error::domain("/", r));
                }
                Ok(l / r)
            }
            Expr::Power(l, r) => Ok(self.evaluate(*l, env)?.powf(self.evaluate(*r, env)?)),
            Expr::UnaryMinus(e) => Ok(-self.evaluate(*e, env)?),
            Expr::Sum(ts) => ts.iter().try_fold(0.0, |acc, &t| Ok(acc + self.evaluate(t, env)?)),
            Expr::Product(ts) => {
                ts.iter().try_fold(1.0, |acc, &t| Ok(acc * self.evaluate(t, env)?))
            }
            Expr::Func(k, a) => k.numeric(self.evaluate(*a, env)?),
            Expr::Vector(_) => Err(Error::parse("cannot evaluate a vector as a scalar")),
            Expr::Equation(e) => self.evaluate(*e, env),
            Expr::Assertion(_, e) => self.evaluate(*e, env),
        }
    }

    /// Sorts commutative collections into canonical order without applying
    /// any other rewrite.
    pub fn sort(&mut self, id: Id) -> Id {
        match self.get(id).clone() {
            Expr::Sum(ts) => {
                let mut sorted: Vec<Id> = ts.into_iter().map(|t| self.sort(t)).collect();
                sorted.sort_by_key(|&t| crate::core::ordering::class_rank(self.get(t)));
                self.sum(sorted)
            }
            Expr::Product(ts) => {
                let mut sorted: Vec<Id> = ts.into_iter().map(|t| self.sort(t)).collect();
                sorted.sort_by_key(|&t| crate::core::ordering::class_rank(self.get(t)));
                self.product(sorted)
            }
            Expr::Plus(l, r) => {
                let (l, r) = (self.sort(l), self.sort(r));
                self.plus(l, r)
            }
            Expr::Minus(l, r) => {
                let (l, r) = (self.sort(l), self.sort(r));
                self.minus(l, r)
            }
            Expr::Times(l, r) => {
                let (l, r) = (self.sort(l), self.sort(r));
                self.times(l, r)
            }
            Expr::Divide(l, r) => {
                let (l, r) = (self.sort(l), self.sort(r));
                self.divide(l, r)
            }
            Expr::Power(l, r) => {
                let (l, r) = (self.sort(l), self.sort(r));
                self.power(l, r)
            }
            Expr::UnaryMinus(e) => {
                let e = self.sort(e);
                self.unary_minus(e)
            }
            Expr::Func(k, a) => {
                let a = self.sort(a);
                self.func(k, a)
            }
            Expr::Vector(items) => {
                let items = items.into_iter().map(|t| self.sort(t)).collect();
                self.vector(items)
            }
            Expr::Equation(e) => {
                let e = self.sort(e);
                self.add_expr(Expr::Equation(e))
            }
            Expr::Assertion(n, e) => {
                let e = self.sort(e);
                self.add_expr(Expr::Assertion(n, e))
            }
            Expr::Constant(_) | Expr::Variable(_) | Expr::Dot => id,
        }
    }

    pub fn simplify(&mut self, id: Id) -> Id {
        simplify::simplify(self, id)
    }

    pub fn partial(&mut self, id: Id, var: &str) -> Id {
        diff::partial(self, id, var)
    }

    pub fn gradient(&mut self, expr: Id, vars: &[&str]) -> Id {
        vectorops::gradient(self, expr, vars)
    }

    pub fn gradient_at(
        &mut self,
        expr: Id,
        vars: &[&str],
        env: &HashMap<String, f64>,
    ) -> Result<Vec<f64>, Error> {
        vectorops::gradient_at(self, expr, vars, env)
    }

    pub fn jacobian(&mut self, exprs: &[Id], vars: &[&str]) -> Vec<Id> {
        vectorops::jacobian(self, exprs, vars)
    }

    pub fn compile(&self, id: Id, vars: Vec<String>) -> impl Fn(&[f64]) -> Result<f64, Error> + '_ {
        vectorops::compile(self, id, vars)
    }

    pub fn format(&self, id: Id, fmt: Format) -> String {
        format::format(self, id, fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_shares_structurally_equal_nodes() {
        let mut arena = Arena::new();
        let a = arena.variable("x");
        let b = arena.variable("x");
        assert_eq!(a, b);
        let c = arena.constant(1.5);
        let d = arena.constant(1.5);
        assert_eq!(c, d);
    }

    #[test]
    fn negative_zero_is_distinct_from_zero() {
        // -0.0 and 0.0 have different bit patterns and are kept distinct as
        // arena nodes, even though they compare equal numerically.
        let mut arena = Arena::new();
        let a = arena.constant(0.0);
        let b = arena.constant(-0.0);
        assert_ne!(a, b);
    }

    #[test]
    fn free_variables_collects_names() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let sum = arena.plus(x, y);
        let vars = arena.free_variables(sum);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn substitute_replaces_matching_variable_only() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let sum = arena.plus(x, y);
        let two = arena.constant(2.0);
        let result = arena.substitute(sum, "x", two);
        assert_eq!(arena.free_variables(result).len(), 1);
    }
}
