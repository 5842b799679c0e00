//! Simplification: each binary operator rewrites itself into (or absorbs
//! into) a canonical n-ary `Sum`/`Product` collection, which is then
//! flattened, inverse-extracted, constant-folded and sorted.
//!
//! This mirrors the `AbelianCollection`/`Divide` algorithms of the system
//! this crate's arithmetic core is modeled on: associative operators keep
//! their operands in a flat `Vec`, and `Minus`/`Divide` are desugared by
//! pulling their right operand into a `UnaryMinus`/reciprocal member of that
//! collection rather than staying as their own node.

use std::rc::Rc;

use crate::core::arena::Arena;
use crate::core::expr::{Expr, Id};
use crate::core::ordering::class_rank;

pub(crate) fn simplify(arena: &mut Arena, id: Id) -> Id {
    match arena.get(id).clone() {
        Expr::Constant(_) | Expr::Variable(_) | Expr::Dot => id,

        Expr::Plus(l, r) => {
            let (l, r) = (simplify(arena, l), simplify(arena, r));
            simplify_sum(arena, vec![l, r])
        }
        Expr::Minus(l, r) => {
            let (l, r) = (simplify(arena, l), simplify(arena, r));
            let neg_r = negate(arena, r);
            simplify_sum(arena, vec![l, neg_r])
        }
        Expr::Sum(terms) => {
            let terms: Vec<Id> = terms.into_iter().map(|t| simplify(arena, t)).collect();
            simplify_sum(arena, terms)
        }

        Expr::Times(l, r) => {
            let (l, r) = (simplify(arena, l), simplify(arena, r));
            simplify_product(arena, vec![l, r], vec![])
        }
        Expr::Divide(l, r) => {
            let (l, r) = (simplify(arena, l), simplify(arena, r));
            let (mut nums, mut dens) = (vec![], vec![]);
            collect_division(arena, l, true, &mut nums, &mut dens);
            collect_division(arena, r, false, &mut nums, &mut dens);
            simplify_product(arena, nums, dens)
        }
        Expr::Product(terms) => {
            let terms: Vec<Id> = terms.into_iter().map(|t| simplify(arena, t)).collect();
            simplify_product(arena, terms, vec![])
        }

        Expr::UnaryMinus(e) => {
            let e = simplify(arena, e);
            negate(arena, e)
        }

        Expr::Power(l, r) => {
            let (l, r) = (simplify(arena, l), simplify(arena, r));
            simplify_power(arena, l, r)
        }

        Expr::Func(kind, a) => {
            let a = simplify(arena, a);
            if let Expr::Constant(x) = *arena.get(a) {
                if let Ok(v) = kind.numeric(x) {
                    return arena.constant(v);
                }
            }
            arena.func(kind, a)
        }

        Expr::Vector(items) => {
            let items: Vec<Id> = items.into_iter().map(|t| simplify(arena, t)).collect();
            arena.vector(items)
        }
        Expr::Equation(diff) => {
            let diff = simplify(arena, diff);
            let diff = arena.sort(diff);
            arena.add_expr(Expr::Equation(diff))
        }
        Expr::Assertion(name, e) => {
            let e = simplify(arena, e);
            arena.add_expr(Expr::Assertion(name, e))
        }
    }
}

/// `-(-a) = a`, `-0 = 0`, `-(const) = -const` folded directly; everything
/// else stays wrapped. Unlike a no-op, double negation and the constant
/// case are always collapsed.
fn negate(arena: &mut Arena, e: Id) -> Id {
    match arena.get(e).clone() {
        Expr::Constant(v) => arena.constant(-v),
        Expr::UnaryMinus(inner) => inner,
        _ => arena.unary_minus(e),
    }
}

/// Walks a `Divide` tree being flattened into a `Product`, pushing each leaf
/// into `nums` or `dens` depending on whether it's on the numerator or
/// denominator side, recursing through nested `Divide`s so `a/(b/c)` yields
/// numerator `{a, c}` and denominator `{b}`.
fn collect_division(arena: &mut Arena, id: Id, numerator_side: bool, nums: &mut Vec<Id>, dens: &mut Vec<Id>) {
    match arena.get(id).clone() {
        Expr::Divide(l, r) => {
            collect_division(arena, l, numerator_side, nums, dens);
            collect_division(arena, r, !numerator_side, nums, dens);
        }
        _ if numerator_side => nums.push(id),
        _ => dens.push(id),
    }
}

/// Flattens nested `Sum`s, folds constants into one, sorts, and collapses to
/// a bare scalar where there's only one term left.
fn simplify_sum(arena: &mut Arena, terms: Vec<Id>) -> Id {
    let mut flat = Vec::with_capacity(terms.len());
    for t in terms {
        flatten_sum(arena, t, &mut flat);
    }

    let mut constant_acc = 0.0;
    let mut has_constant = false;
    let mut like_terms: Vec<(f64, Id)> = Vec::with_capacity(flat.len());
    for t in flat {
        if let Expr::Constant(v) = *arena.get(t) {
            constant_acc += v;
            has_constant = true;
            continue;
        }
        let (coeff, base) = term_coefficient(arena, t);
        if let Some(slot) = like_terms.iter_mut().find(|(_, b)| *b == base) {
            slot.0 += coeff;
        } else {
            like_terms.push((coeff, base));
        }
    }

    let mut rest: Vec<Id> = like_terms
        .into_iter()
        .filter(|(coeff, _)| *coeff != 0.0)
        .map(|(coeff, base)| rebuild_term(arena, coeff, base))
        .collect();

    if rest.is_empty() {
        return arena.constant(constant_acc);
    }
    if has_constant && constant_acc != 0.0 {
        let c = arena.constant(constant_acc);
        rest.push(c);
    }

    rest.sort_by_key(|&t| class_rank(arena.get(t)));

    if rest.len() == 1 {
        rest[0]
    } else {
        arena.sum(rest)
    }
}

/// Splits a non-constant additive term into a numeric coefficient and the
/// base expression it multiplies, so `2*x` and `3*x` combine into `5*x`
/// instead of surviving as distinct summands. `-x` has coefficient `-1`;
/// a bare `x` has coefficient `1`.
fn term_coefficient(arena: &mut Arena, id: Id) -> (f64, Id) {
    match arena.get(id).clone() {
        Expr::UnaryMinus(inner) => {
            let (c, base) = term_coefficient(arena, inner);
            (-c, base)
        }
        Expr::Product(terms)
            if terms.first().is_some_and(|&t| matches!(arena.get(t), Expr::Constant(_))) =>
        {
            let Expr::Constant(c) = *arena.get(terms[0]) else { unreachable!() };
            let rest = terms[1..].to_vec();
            let base = if rest.len() == 1 { rest[0] } else { arena.add_expr(Expr::Product(rest)) };
            (c, base)
        }
        _ => (1.0, id),
    }
}

fn rebuild_term(arena: &mut Arena, coeff: f64, base: Id) -> Id {
    if coeff == 1.0 {
        base
    } else if coeff == -1.0 {
        arena.unary_minus(base)
    } else {
        let c = arena.constant(coeff);
        arena.product(vec![c, base])
    }
}

fn flatten_sum(arena: &mut Arena, id: Id, out: &mut Vec<Id>) {
    match arena.get(id).clone() {
        Expr::Sum(ts) => {
            for t in ts {
                flatten_sum(arena, t, out);
            }
        }
        _ => out.push(id),
    }
}

/// Flattens nested `Product`s and `Divide`s on both the numerator and
/// denominator side, folds each side's constants, then reconciles: a zero
/// numerator collapses the whole expression, and a unit denominator drops
/// the `Divide` entirely.
fn simplify_product(arena: &mut Arena, num_terms: Vec<Id>, den_terms: Vec<Id>) -> Id {
    let mut nums = Vec::new();
    let mut dens = Vec::new();
    for t in num_terms {
        flatten_product(arena, t, true, &mut nums, &mut dens);
    }
    for t in den_terms {
        flatten_product(arena, t, false, &mut nums, &mut dens);
    }

    let mut num_folded = fold_constant_product(arena, nums);
    if num_folded.constant == Some(0.0) {
        return arena.constant(0.0);
    }
    let mut den_folded = fold_constant_product(arena, dens);
    cancel_common_factors(&mut num_folded.rest, &mut den_folded.rest);

    let numerator = rebuild_product(arena, num_folded.constant, num_folded.rest);
    if den_folded.rest.is_empty() && den_folded.constant.unwrap_or(1.0) == 1.0 {
        return numerator;
    }
    let denominator = rebuild_product(arena, den_folded.constant, den_folded.rest);
    arena.divide(numerator, denominator)
}

/// Cancels one occurrence of each factor that appears on both sides of a
/// division, e.g. `x*y / x` leaves numerator `{y}` and denominator `{}`.
fn cancel_common_factors(num: &mut Vec<Id>, den: &mut Vec<Id>) {
    let mut i = 0;
    while i < num.len() {
        if let Some(pos) = den.iter().position(|&d| d == num[i]) {
            num.remove(i);
            den.remove(pos);
        } else {
            i += 1;
        }
    }
}

struct Folded {
    constant: Option<f64>,
    rest: Vec<Id>,
}

fn fold_constant_product(arena: &mut Arena, terms: Vec<Id>) -> Folded {
    let mut acc = 1.0;
    let mut has_constant = false;
    let mut rest = Vec::with_capacity(terms.len());
    for t in terms {
        if let Expr::Constant(v) = *arena.get(t) {
            acc *= v;
            has_constant = true;
        } else {
            rest.push(t);
        }
    }
    rest.sort_by_key(|&t| class_rank(arena.get(t)));
    Folded {
        constant: if has_constant { Some(acc) } else { None },
        rest,
    }
}

fn rebuild_product(arena: &mut Arena, constant: Option<f64>, mut rest: Vec<Id>) -> Id {
    if let Some(c) = constant {
        if c == 0.0 {
            return arena.constant(0.0);
        }
        if c != 1.0 || rest.is_empty() {
            let cid = arena.constant(c);
            rest.insert(0, cid);
        }
    }
    match rest.len() {
        0 => arena.constant(1.0),
        1 => rest[0],
        _ => arena.product(rest),
    }
}

fn flatten_product(arena: &mut Arena, id: Id, numerator_side: bool, nums: &mut Vec<Id>, dens: &mut Vec<Id>) {
    match arena.get(id).clone() {
        Expr::Product(ts) => {
            for t in ts {
                flatten_product(arena, t, numerator_side, nums, dens);
            }
        }
        Expr::Divide(l, r) => {
            flatten_product(arena, l, numerator_side, nums, dens);
            flatten_product(arena, r, !numerator_side, nums, dens);
        }
        _ if numerator_side => nums.push(id),
        _ => dens.push(id),
    }
}

/// `Power` rewrite rules, ordered so `0^0` is caught before the `x^0 -> 1`
/// and `0^x -> 0` identities would otherwise claim it: left symbolic when
/// both are zero, constant-fold when both sides are numbers, `x^0 = 1`,
/// `1^x = 1`, `0^x = 0` (x != 0), `x^1 = x`.
fn simplify_power(arena: &mut Arena, base: Id, exp: Id) -> Id {
    let base_val = if let Expr::Constant(v) = *arena.get(base) { Some(v) } else { None };
    let exp_val = if let Expr::Constant(v) = *arena.get(exp) { Some(v) } else { None };

    if let (Some(b), Some(e)) = (base_val, exp_val) {
        if b == 0.0 && e == 0.0 {
            return arena.power(base, exp);
        }
        return arena.constant(b.powf(e));
    }
    if let Some(e) = exp_val {
        if e == 0.0 {
            return arena.constant(1.0);
        }
        if e == 1.0 {
            return base;
        }
    }
    if let Some(b) = base_val {
        if b == 1.0 {
            return arena.constant(1.0);
        }
        if b == 0.0 {
            return arena.constant(0.0);
        }
    }
    arena.power(base, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(f: impl FnOnce(&mut Arena) -> Id) -> (Arena, Id) {
        let mut arena = Arena::new();
        let id = f(&mut arena);
        (arena, id)
    }

    #[test]
    fn folds_constant_sum() {
        let (mut arena, id) = make(|a| {
            let x = a.constant(2.0);
            let y = a.constant(3.0);
            a.plus(x, y)
        });
        let s = simplify(&mut arena, id);
        assert_eq!(*arena.get(s), Expr::Constant(5.0));
    }

    #[test]
    fn x_minus_x_is_zero() {
        let (mut arena, id) = make(|a| {
            let x = a.variable("x");
            a.minus(x, x)
        });
        let s = simplify(&mut arena, id);
        assert_eq!(*arena.get(s), Expr::Constant(0.0));
    }

    #[test]
    fn power_zero_zero_stays_symbolic() {
        let (mut arena, id) = make(|a| {
            let z1 = a.constant(0.0);
            let z2 = a.constant(0.0);
            a.power(z1, z2)
        });
        let s = simplify(&mut arena, id);
        assert!(matches!(*arena.get(s), Expr::Power(..)));
    }

    #[test]
    fn power_one_exponent_is_base() {
        let (mut arena, id) = make(|a| {
            let x = a.variable("x");
            let one = a.constant(1.0);
            a.power(x, one)
        });
        let s = simplify(&mut arena, id);
        assert!(matches!(*arena.get(s), Expr::Variable(_)));
    }

    #[test]
    fn divide_by_itself_is_one() {
        let (mut arena, id) = make(|a| {
            let x = a.variable("x");
            a.divide(x, x)
        });
        let s = simplify(&mut arena, id);
        assert_eq!(*arena.get(s), Expr::Constant(1.0));
    }

    #[test]
    fn assertion_survives_simplification() {
        let (mut arena, id) = make(|a| {
            let x = a.constant(1.0);
            let y = a.constant(1.0);
            let sum = a.plus(x, y);
            a.assertion("check", sum)
        });
        let s = simplify(&mut arena, id);
        match arena.get(s).clone() {
            Expr::Assertion(name, e) => {
                assert_eq!(name, Rc::from("check"));
                assert_eq!(*arena.get(e), Expr::Constant(2.0));
            }
            other => panic!("expected Assertion, got {other:?}"),
        }
    }
}
