//! Symbolic differentiation. Standard structural rules plus the templated
//! chain rule for the named functions in [`crate::core::functions`].

use crate::core::arena::Arena;
use crate::core::expr::{Expr, Id};
use crate::core::functions::derivative_template;

/// What a derivative is being taken with respect to: a named variable, or
/// the `Dot` placeholder used inside a function's own derivative template
/// (so that differentiating a template again, for `Sin''` and friends,
/// reuses exactly this same structural recursion).
#[derive(Clone, Copy)]
enum Wrt<'a> {
    Variable(&'a str),
    Dot,
}

pub(crate) fn partial(arena: &mut Arena, id: Id, var: &str) -> Id {
    let raw = diff_node(arena, id, Wrt::Variable(var));
    arena.simplify(raw)
}

/// Differentiates a function's derivative template with respect to `Dot`
/// itself, producing the next-order template. Used by the parser to build
/// `Sin''`, `Sin'''`, and so on from repeated trailing `'`s.
pub(crate) fn partial_dot(arena: &mut Arena, id: Id) -> Id {
    let raw = diff_node(arena, id, Wrt::Dot);
    arena.simplify(raw)
}

fn diff_node(arena: &mut Arena, id: Id, wrt: Wrt) -> Id {
    match arena.get(id).clone() {
        Expr::Constant(_) => arena.constant(0.0),
        Expr::Variable(_) => arena.constant(0.0),
        Expr::Dot => match wrt {
            Wrt::Dot => arena.constant(1.0),
            Wrt::Variable(_) => arena.constant(0.0),
        },

        Expr::Plus(l, r) => {
            let (dl, dr) = (diff_node(arena, l, wrt), diff_node(arena, r, wrt));
            arena.plus(dl, dr)
        }
        Expr::Minus(l, r) => {
            let (dl, dr) = (diff_node(arena, l, wrt), diff_node(arena, r, wrt));
            arena.minus(dl, dr)
        }
        Expr::Sum(terms) => {
            let mut acc = arena.constant(0.0);
            for t in terms {
                let dt = diff_node(arena, t, wrt);
                acc = arena.plus(acc, dt);
            }
            acc
        }
        Expr::UnaryMinus(e) => {
            let de = diff_node(arena, e, wrt);
            arena.unary_minus(de)
        }

        Expr::Times(l, r) => product_rule(arena, l, r, wrt),
        Expr::Product(terms) => {
            let mut acc = arena.constant(0.0);
            for i in 0..terms.len() {
                let mut factor = diff_node(arena, terms[i], wrt);
                for (j, &t) in terms.iter().enumerate() {
                    if j != i {
                        factor = arena.times(factor, t);
                    }
                }
                acc = arena.plus(acc, factor);
            }
            acc
        }
        Expr::Divide(l, r) => {
            let (dl, dr) = (diff_node(arena, l, wrt), diff_node(arena, r, wrt));
            let t1 = arena.times(dl, r);
            let t2 = arena.times(l, dr);
            let num = arena.minus(t1, t2);
            let den = arena.times(r, r);
            arena.divide(num, den)
        }

        Expr::Power(l, r) => power_rule(arena, l, r, wrt),

        Expr::Func(kind, a) => {
            let template = derivative_template(arena, kind);
            let outer = arena.evaluate_at(template, a);
            let da = diff_node(arena, a, wrt);
            arena.times(outer, da)
        }

        Expr::Vector(items) => {
            let items = items.into_iter().map(|t| diff_node(arena, t, wrt)).collect();
            arena.vector(items)
        }
        Expr::Equation(e) => {
            let de = diff_node(arena, e, wrt);
            arena.add_expr(Expr::Equation(de))
        }
        Expr::Assertion(name, e) => {
            // The derivative of an assertion is just the derivative of the
            // expression it carries; the assertion's label doesn't apply.
            let _ = name;
            diff_node(arena, e, wrt)
        }
    }
}

fn product_rule(arena: &mut Arena, l: Id, r: Id, wrt: Wrt) -> Id {
    let (dl, dr) = (diff_node(arena, l, wrt), diff_node(arena, r, wrt));
    let a = arena.times(dl, r);
    let b = arena.times(l, dr);
    arena.plus(a, b)
}

/// Three-way split on which side of `l^r` varies:
/// - `r` constant: power rule, `r * l^(r-1) * dl`.
/// - `l` constant (and `r` not): exponential rule, `l^r * ln(l) * dr`.
/// - both vary: full logarithmic-differentiation rule,
///   `l^r * (dr * ln(l) + r * dl / l)`.
fn power_rule(arena: &mut Arena, l: Id, r: Id, wrt: Wrt) -> Id {
    let r_is_const = matches!(arena.get(r), Expr::Constant(_));
    let l_is_const = matches!(arena.get(l), Expr::Constant(_));

    if r_is_const {
        let dl = diff_node(arena, l, wrt);
        let one = arena.constant(1.0);
        let r_minus_one = arena.minus(r, one);
        let power = arena.power(l, r_minus_one);
        let scaled = arena.times(r, power);
        return arena.times(scaled, dl);
    }
    if l_is_const {
        let dr = diff_node(arena, r, wrt);
        let ln_l = arena.func(crate::core::functions::FuncKind::Log, l);
        let power = arena.power(l, r);
        let scaled = arena.times(power, ln_l);
        return arena.times(scaled, dr);
    }

    let dl = diff_node(arena, l, wrt);
    let dr = diff_node(arena, r, wrt);
    let ln_l = arena.func(crate::core::functions::FuncKind::Log, l);
    let term1 = arena.times(dr, ln_l);
    let dl_over_l = arena.divide(dl, l);
    let term2 = arena.times(r, dl_over_l);
    let sum = arena.plus(term1, term2);
    let power = arena.power(l, r);
    arena.times(power, sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arena;

    #[test]
    fn derivative_of_x_squared_is_2x() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let two = arena.constant(2.0);
        let expr = arena.power(x, two);
        let d = partial(&mut arena, expr, "x");
        // 2 * x, after simplification, whichever canonical order that is.
        assert_eq!(arena.free_variables(d).len(), 1);
        let mut env = std::collections::HashMap::new();
        env.insert("x".to_string(), 3.0);
        assert_eq!(arena.evaluate(d, &env).unwrap(), 6.0);
    }

    #[test]
    fn derivative_of_constant_is_zero() {
        let mut arena = Arena::new();
        let c = arena.constant(5.0);
        let d = partial(&mut arena, c, "x");
        assert_eq!(*arena.get(d), Expr::Constant(0.0));
    }

    #[test]
    fn derivative_of_unrelated_variable_is_zero() {
        let mut arena = Arena::new();
        let y = arena.variable("y");
        let d = partial(&mut arena, y, "x");
        assert_eq!(*arena.get(d), Expr::Constant(0.0));
    }

    #[test]
    fn sin_derivative_matches_cos() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let sinx = arena.func(crate::core::functions::FuncKind::Sin, x);
        let d = partial(&mut arena, sinx, "x");
        let mut env = std::collections::HashMap::new();
        env.insert("x".to_string(), 0.0);
        assert!((arena.evaluate(d, &env).unwrap() - 1.0).abs() < 1e-9);
    }
}
