//! Builds [`Expr`](crate::core::Expr) trees from the grammar in
//! `grammar.pest`, and resolves the repeated-prime derivative-template
//! syntax (`Sin''(x)`) into nested template instantiation.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::core::functions::{derivative_template, FuncKind};
use crate::core::{diff, Arena, Id};
use crate::error::Error;

#[derive(PestParser)]
#[grammar = "parser/grammar.pest"]
pub struct ExprParser;

/// A single parsed top-level input line.
pub enum Statement {
    Expr(Id),
    Equation(Id),
    Assignment(String, Id),
    Assertion(String, Id),
}

pub fn parse_statement(arena: &mut Arena, input: &str) -> Result<Statement, Error> {
    let mut pairs = ExprParser::parse(Rule::program, input.trim())?;
    let program = pairs.next().expect("program rule always produces one pair");
    let stmt = program.into_inner().next().expect("program wraps exactly one statement");

    match stmt.as_rule() {
        Rule::assertion => {
            let mut inner = stmt.into_inner();
            let name = inner.next().unwrap().as_str().to_string();
            let eq = inner.next().unwrap();
            let id = build_equation(arena, eq)?;
            Ok(Statement::Assertion(name, id))
        }
        Rule::assignment => {
            let mut inner = stmt.into_inner();
            let name = inner.next().unwrap().as_str().to_string();
            let expr = inner.next().unwrap();
            let id = build_expr(arena, expr)?;
            Ok(Statement::Assignment(name, id))
        }
        Rule::equation => Ok(Statement::Equation(build_equation(arena, stmt)?)),
        Rule::expr => Ok(Statement::Expr(build_expr(arena, stmt)?)),
        other => unreachable!("unexpected top-level rule {other:?}"),
    }
}

fn build_equation(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let left = build_expr(arena, inner.next().unwrap())?;
    let right = build_expr(arena, inner.next().unwrap())?;
    Ok(arena.equation(left, right))
}

fn build_expr(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    match pair.as_rule() {
        Rule::expr => build_expr(arena, pair.into_inner().next().unwrap()),
        Rule::sum => build_sum(arena, pair),
        Rule::product => build_product(arena, pair),
        Rule::power => build_power(arena, pair),
        Rule::unary => build_unary(arena, pair),
        Rule::atom => build_atom(arena, pair),
        other => unreachable!("unexpected expr rule {other:?}"),
    }
}

fn build_sum(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let mut acc = build_expr(arena, inner.next().unwrap())?;
    let mut op = None;
    for p in inner {
        match p.as_rule() {
            Rule::sum_op => op = Some(p.as_str().to_string()),
            _ => {
                let rhs = build_expr(arena, p)?;
                acc = match op.take().as_deref() {
                    Some("+") => arena.plus(acc, rhs),
                    Some("-") => arena.minus(acc, rhs),
                    _ => unreachable!("sum operand without preceding operator"),
                };
            }
        }
    }
    Ok(acc)
}

fn build_product(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let mut acc = build_expr(arena, inner.next().unwrap())?;
    for tail in inner {
        let mut tail_inner = tail.into_inner();
        let first = tail_inner.next().unwrap();
        acc = if first.as_rule() == Rule::product_op {
            let op = first.as_str();
            let rhs = build_expr(arena, tail_inner.next().unwrap())?;
            if op == "*" {
                arena.times(acc, rhs)
            } else {
                arena.divide(acc, rhs)
            }
        } else {
            let rhs = build_expr(arena, first)?;
            arena.times(acc, rhs)
        };
    }
    Ok(acc)
}

fn build_power(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let base = build_expr(arena, inner.next().unwrap())?;
    match inner.next() {
        Some(exp_pair) => {
            let exp = build_expr(arena, exp_pair)?;
            Ok(arena.power(base, exp))
        }
        None => Ok(base),
    }
}

fn build_unary(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let first = inner.next().unwrap();
    if first.as_rule() == Rule::unary {
        let inner_id = build_unary(arena, first)?;
        Ok(arena.unary_minus(inner_id))
    } else {
        build_expr(arena, first)
    }
}

fn build_atom(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::number => {
            let v: f64 = inner.as_str().parse().expect("number rule matches a valid float");
            Ok(arena.constant(v))
        }
        Rule::function_call => build_function_call(arena, inner),
        Rule::vector => {
            let items = inner
                .into_inner()
                .map(|p| build_expr(arena, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(arena.vector(items))
        }
        Rule::identifier => Ok(arena.variable(inner.as_str())),
        Rule::expr => build_expr(arena, inner),
        other => unreachable!("unexpected atom rule {other:?}"),
    }
}

fn build_function_call(arena: &mut Arena, pair: Pair<Rule>) -> Result<Id, Error> {
    let mut inner = pair.into_inner();
    let name_pair = inner.next().unwrap();
    let primes_pair = inner.next().unwrap();
    let arg_pair = inner.next().unwrap();

    // The grammar's `func_keyword` alternatives are meant to mirror the
    // registry exactly, but this lookup stays fallible rather than
    // `unreachable!()`-ing: a registry/grammar drift should surface as an
    // error on the offending input, not a panic.
    let kind = FuncKind::from_name(name_pair.as_str())
        .ok_or_else(|| Error::unknown_function(name_pair.as_str()))?;
    let order = primes_pair.as_str().len();
    let arg = build_expr(arena, arg_pair)?;

    if order == 0 {
        return Ok(arena.func(kind, arg));
    }

    let mut template = derivative_template(arena, kind);
    for _ in 1..order {
        template = diff::partial_dot(arena, template);
    }
    Ok(arena.evaluate_at(template, arg))
}
