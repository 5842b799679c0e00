//! Canonical ordering: a coarse class-rank total preorder used to sort the
//! children of commutative collections.

use crate::core::expr::Expr;

/// `Constant < Variable ≡ Dot < Plus < Sum < Minus ≡ UnaryMinus < Times <
/// Product < Divide < Power < Func`. Ties are broken by a stable sort, which
/// preserves insertion order -- this key is intentionally coarse; see the
/// design notes on strengthening it.
pub(crate) fn class_rank(e: &Expr) -> u8 {
    match e {
        Expr::Constant(_) => 0,
        Expr::Variable(_) | Expr::Dot => 1,
        Expr::Plus(..) => 2,
        Expr::Sum(_) => 3,
        Expr::Minus(..) | Expr::UnaryMinus(_) => 4,
        Expr::Times(..) => 5,
        Expr::Product(_) => 6,
        Expr::Divide(..) => 7,
        Expr::Power(..) => 8,
        Expr::Func(..) => 9,
        Expr::Vector(_) | Expr::Equation(_) | Expr::Assertion(..) => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_rank_below_variables() {
        assert!(class_rank(&Expr::Constant(1.0)) < class_rank(&Expr::Variable("x".into())));
    }

    #[test]
    fn sum_ranks_above_plus() {
        assert!(class_rank(&Expr::Plus(0, 1)) < class_rank(&Expr::Sum(vec![0, 1])));
    }

    #[test]
    fn power_ranks_above_divide() {
        assert!(class_rank(&Expr::Divide(0, 1)) < class_rank(&Expr::Power(0, 1)));
    }
}
