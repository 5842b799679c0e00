//! Vector-valued operations built on top of scalar differentiation:
//! gradients, their numeric evaluation, and Jacobians of several scalar
//! expressions against the same variable list.

use std::collections::HashMap;

use crate::core::arena::Arena;
use crate::core::expr::Id;
use crate::error::Error;

/// `Vector(partial(expr, vars[0]), partial(expr, vars[1]), ...)`.
pub(crate) fn gradient(arena: &mut Arena, expr: Id, vars: &[&str]) -> Id {
    let parts: Vec<Id> = vars.iter().map(|v| arena.partial(expr, v)).collect();
    arena.vector(parts)
}

/// The gradient, evaluated numerically at `env`. A gradient needs at least
/// one variable to be a well-formed vector operation.
pub(crate) fn gradient_at(
    arena: &mut Arena,
    expr: Id,
    vars: &[&str],
    env: &HashMap<String, f64>,
) -> Result<Vec<f64>, Error> {
    if vars.is_empty() {
        return Err(Error::arity(1, 0));
    }
    vars.iter()
        .map(|v| {
            let d = arena.partial(expr, v);
            arena.evaluate(d, env)
        })
        .collect()
}

/// The Jacobian of several scalar expressions: one gradient `Vector` per
/// expression, in the order given.
pub(crate) fn jacobian(arena: &mut Arena, exprs: &[Id], vars: &[&str]) -> Vec<Id> {
    exprs.iter().map(|&e| gradient(arena, e, vars)).collect()
}

/// Builds a closure that evaluates `id` given argument values bound
/// positionally to `vars`, for use as a compiled numeric function.
pub fn compile<'a>(
    arena: &'a Arena,
    id: Id,
    vars: Vec<String>,
) -> impl Fn(&[f64]) -> Result<f64, Error> + 'a {
    move |args: &[f64]| {
        if args.len() != vars.len() {
            return Err(Error::arity(vars.len(), args.len()));
        }
        let env: HashMap<String, f64> =
            vars.iter().cloned().zip(args.iter().copied()).collect();
        arena.evaluate(id, &env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Expr;

    #[test]
    fn gradient_of_xy_is_y_x() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let xy = arena.times(x, y);
        let xy = arena.simplify(xy);
        let grad = gradient(&mut arena, xy, &["x", "y"]);
        assert!(matches!(*arena.get(grad), Expr::Vector(ref v) if v.len() == 2));
    }

    #[test]
    fn gradient_at_evaluates_numerically() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let xy = arena.times(x, y);
        let xy = arena.simplify(xy);
        let mut env = HashMap::new();
        env.insert("x".to_string(), 2.0);
        env.insert("y".to_string(), 3.0);
        let g = gradient_at(&mut arena, xy, &["x", "y"], &env).unwrap();
        assert_eq!(g, vec![3.0, 2.0]);
    }

    #[test]
    fn gradient_at_rejects_an_empty_variable_list() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let err = gradient_at(&mut arena, x, &[], &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::ArityError { expected: 1, found: 0 }));
    }

    #[test]
    fn compile_evaluates_positional_args() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let sum = arena.plus(x, y);
        let sum = arena.simplify(sum);
        let f = compile(&arena, sum, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(f(&[1.0, 2.0]).unwrap(), 3.0);
    }
}
