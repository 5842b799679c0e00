//! Rendering an expression back to text, in five output formats. Every
//! format computes parenthesization purely from a node's structural
//! precedence at render time -- nodes carry no mutable "needs parens" flag,
//! since arena nodes are immutable and shared.

use std::fmt::Write as _;

use crate::core::arena::Arena;
use crate::core::expr::{Expr, Id};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `2*x + Sin(y)`
    Plain,
    /// LaTeX math markup: `2 x + \sin(y)`
    Tex,
    /// A valid Python expression using lowercase function names: `sin(y)`.
    Python,
    /// The fully-parenthesized, unambiguous constructor form:
    /// `Plus(Times(Constant(2), Variable('x')), Func(Sin, Variable('y')))`
    Raw,
    /// A multi-line indented tree, one node per line.
    Tree,
}

impl Format {
    /// The name used to select this format from the REPL's `$format`
    /// command and to report it back from `$session`.
    pub fn name(self) -> &'static str {
        match self {
            Format::Plain => "plain",
            Format::Tex => "tex",
            Format::Python => "python",
            Format::Raw => "raw",
            Format::Tree => "tree",
        }
    }
}

pub(crate) fn format(arena: &Arena, id: Id, fmt: Format) -> String {
    match fmt {
        Format::Tree => {
            let mut out = String::new();
            write_tree(arena, id, "", &mut out);
            out
        }
        _ => write_expr(arena, id, fmt, 0),
    }
}

/// Binding strength: higher binds tighter. A child is parenthesized when its
/// precedence is lower than what its parent position requires.
fn prec(e: &Expr) -> u8 {
    match e {
        Expr::Sum(_) | Expr::Plus(..) | Expr::Minus(..) => 1,
        Expr::Product(_) | Expr::Times(..) | Expr::Divide(..) => 2,
        Expr::UnaryMinus(_) => 3,
        Expr::Power(..) => 4,
        Expr::Constant(_)
        | Expr::Variable(_)
        | Expr::Dot
        | Expr::Func(..)
        | Expr::Vector(_)
        | Expr::Equation(_)
        | Expr::Assertion(..) => 5,
    }
}

fn write_expr(arena: &Arena, id: Id, fmt: Format, min_prec: u8) -> String {
    let e = arena.get(id);
    let p = prec(e);
    let body = write_body(arena, id, fmt);
    if p < min_prec {
        format!("({body})")
    } else {
        body
    }
}

fn write_body(arena: &Arena, id: Id, fmt: Format) -> String {
    if fmt == Format::Raw {
        return write_raw(arena, id);
    }
    match arena.get(id) {
        Expr::Constant(v) => format_constant(*v),
        Expr::Variable(n) => n.to_string(),
        Expr::Dot => "\u{22a5}".to_string(),
        Expr::Plus(l, r) => format!(
            "{} + {}",
            write_expr(arena, *l, fmt, 1),
            write_expr(arena, *r, fmt, 1)
        ),
        Expr::Minus(l, r) => format!(
            "{} - {}",
            write_expr(arena, *l, fmt, 1),
            write_expr(arena, *r, fmt, 2)
        ),
        Expr::Sum(terms) => terms
            .iter()
            .map(|&t| write_expr(arena, t, fmt, 1))
            .collect::<Vec<_>>()
            .join(" + "),
        Expr::Times(l, r) => format!(
            "{}{}{}",
            write_expr(arena, *l, fmt, 2),
            mul_symbol(fmt),
            write_expr(arena, *r, fmt, 2)
        ),
        Expr::Product(terms) => terms
            .iter()
            .map(|&t| write_expr(arena, t, fmt, 2))
            .collect::<Vec<_>>()
            .join(mul_symbol(fmt)),
        Expr::Divide(l, r) => match fmt {
            Format::Tex => format!(
                "\\frac{{{}}}{{{}}}",
                write_expr(arena, *l, fmt, 0),
                write_expr(arena, *r, fmt, 0)
            ),
            _ => format!(
                "{} / {}",
                write_expr(arena, *l, fmt, 2),
                write_expr(arena, *r, fmt, 3)
            ),
        },
        Expr::Power(l, r) => match fmt {
            Format::Tex => format!(
                "{}^{{{}}}",
                write_expr(arena, *l, fmt, 5),
                write_expr(arena, *r, fmt, 0)
            ),
            Format::Python => format!(
                "{} ** {}",
                write_expr(arena, *l, fmt, 5),
                write_expr(arena, *r, fmt, 5)
            ),
            _ => format!(
                "{}^{}",
                write_expr(arena, *l, fmt, 5),
                write_expr(arena, *r, fmt, 5)
            ),
        },
        Expr::UnaryMinus(e) => format!("-{}", write_expr(arena, *e, fmt, 3)),
        Expr::Func(kind, arg) => {
            let name = match fmt {
                Format::Tex => kind.tex_name().to_string(),
                Format::Python => kind.lowercase_name().to_string(),
                _ => kind.base_name().to_string(),
            };
            match fmt {
                Format::Tex if *kind == crate::core::FuncKind::Sqrt => {
                    format!("\\sqrt{{{}}}", write_expr(arena, *arg, fmt, 0))
                }
                Format::Tex => format!("{}\\left({}\\right)", name, write_expr(arena, *arg, fmt, 0)),
                _ => format!("{}({})", name, write_expr(arena, *arg, fmt, 0)),
            }
        }
        Expr::Vector(items) => {
            let inner = items
                .iter()
                .map(|&t| write_expr(arena, t, fmt, 0))
                .collect::<Vec<_>>()
                .join(", ");
            match fmt {
                Format::Tex => format!("\\left({inner}\\right)"),
                Format::Python => format!("[{inner}]"),
                _ => format!("({inner})"),
            }
        }
        Expr::Equation(diff) => {
            // Equation(L, R) is stored as Minus(L, R); present it back as L = R.
            if let Expr::Minus(l, r) = arena.get(*diff).clone() {
                format!(
                    "{} = {}",
                    write_expr(arena, l, fmt, 0),
                    write_expr(arena, r, fmt, 0)
                )
            } else {
                format!("{} = 0", write_expr(arena, *diff, fmt, 0))
            }
        }
        Expr::Assertion(name, e) => format!("{name}: {}", write_expr(arena, *e, fmt, 0)),
    }
}

fn mul_symbol(fmt: Format) -> &'static str {
    match fmt {
        Format::Tex => " \\cdot ",
        Format::Python => " * ",
        _ => "*",
    }
}

fn format_constant(v: f64) -> String {
    if v == v.trunc() && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// The unambiguous, fully-parenthesized constructor form, e.g.
/// `Plus(Times(Constant(2), Variable('x')), Func(Sin, Variable('y')))`.
fn write_raw(arena: &Arena, id: Id) -> String {
    match arena.get(id) {
        Expr::Constant(v) => format!("Constant({v})"),
        Expr::Variable(n) => format!("Variable('{n}')"),
        Expr::Dot => "Dot".to_string(),
        Expr::Plus(l, r) => format!("Plus({}, {})", write_raw(arena, *l), write_raw(arena, *r)),
        Expr::Minus(l, r) => format!("Minus({}, {})", write_raw(arena, *l), write_raw(arena, *r)),
        Expr::Times(l, r) => format!("Times({}, {})", write_raw(arena, *l), write_raw(arena, *r)),
        Expr::Divide(l, r) => format!("Divide({}, {})", write_raw(arena, *l), write_raw(arena, *r)),
        Expr::Power(l, r) => format!("Power({}, {})", write_raw(arena, *l), write_raw(arena, *r)),
        Expr::UnaryMinus(e) => format!("UnaryMinus({})", write_raw(arena, *e)),
        Expr::Sum(ts) => format!(
            "Sum({})",
            ts.iter().map(|&t| write_raw(arena, t)).collect::<Vec<_>>().join(", ")
        ),
        Expr::Product(ts) => format!(
            "Product({})",
            ts.iter().map(|&t| write_raw(arena, t)).collect::<Vec<_>>().join(", ")
        ),
        Expr::Func(kind, a) => format!("Func({}, {})", kind.base_name(), write_raw(arena, *a)),
        Expr::Vector(ts) => format!(
            "Vector({})",
            ts.iter().map(|&t| write_raw(arena, t)).collect::<Vec<_>>().join(", ")
        ),
        Expr::Equation(e) => format!("Equation({})", write_raw(arena, *e)),
        Expr::Assertion(n, e) => format!("Assertion({n}, {})", write_raw(arena, *e)),
    }
}

/// Renders one node per line, each prefixed by `prefix`. A child's prefix is
/// built from its parent's by turning the parent's own trailing glyph into
/// plain continuation (`└─` becomes two spaces, `├─` becomes a vertical bar),
/// then appending `└─` for the last child or `├─` for any earlier one.
fn write_tree(arena: &Arena, id: Id, prefix: &str, out: &mut String) {
    let e = arena.get(id);
    let label = match e {
        Expr::Constant(v) => format!("Constant {v}"),
        Expr::Variable(n) => format!("Variable {n}"),
        Expr::Dot => "Dot".to_string(),
        Expr::Plus(..) => "Plus".to_string(),
        Expr::Minus(..) => "Minus".to_string(),
        Expr::Times(..) => "Times".to_string(),
        Expr::Divide(..) => "Divide".to_string(),
        Expr::Power(..) => "Power".to_string(),
        Expr::UnaryMinus(_) => "UnaryMinus".to_string(),
        Expr::Sum(_) => "Sum".to_string(),
        Expr::Product(_) => "Product".to_string(),
        Expr::Func(kind, _) => format!("Func {}", kind.base_name()),
        Expr::Vector(_) => "Vector".to_string(),
        Expr::Equation(_) => "Equation".to_string(),
        Expr::Assertion(n, _) => format!("Assertion {n}"),
    };
    let _ = writeln!(out, "{prefix}{label}");

    let continued = prefix.replace("└─", "  ").replace("├─", "│ ");
    let children: Vec<Id> = e.children();
    let last_index = children.len().checked_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        let branch = if Some(i) == last_index { "└─ " } else { "├─ " };
        let child_prefix = format!("{continued}  {branch}");
        write_tree(arena, child, &child_prefix, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arena;

    #[test]
    fn tree_format_uses_branch_glyphs_and_marks_the_last_child() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let y = arena.variable("y");
        let sum = arena.plus(x, y);
        let out = format(&arena, sum, Format::Tree);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Plus");
        assert!(lines[1].contains("├─"));
        assert!(lines[2].contains("└─"));
    }

    #[test]
    fn raw_format_quotes_variable_names() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        assert_eq!(format(&arena, x, Format::Raw), "Variable('x')");
    }

    #[test]
    fn python_format_has_no_math_prefix() {
        let mut arena = Arena::new();
        let x = arena.variable("x");
        let s = arena.func(crate::core::FuncKind::Sin, x);
        assert_eq!(format(&arena, s, Format::Python), "sin(x)");
    }
}
