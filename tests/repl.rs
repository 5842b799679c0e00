//! End-to-end scenarios driven through a [`Session`], exercising parsing,
//! simplification, differentiation and formatting together.

use leibniz::session::Session;

#[test]
fn constant_arithmetic_folds_to_one_number() {
    let mut s = Session::new();
    assert_eq!(s.input("2 + 3 * 4").unwrap(), "14");
}

#[test]
fn implicit_multiplication_parses() {
    let mut s = Session::new();
    assert_eq!(s.input("2x - 2x").unwrap(), "0");
}

#[test]
fn assignment_is_substituted_into_later_input() {
    let mut s = Session::new();
    s.input("r := 3").unwrap();
    assert_eq!(s.input("r * r").unwrap(), "9");
}

#[test]
fn assertion_reports_open_when_false() {
    let mut s = Session::new();
    let out = s.input("bad: 1 = 2").unwrap();
    assert!(out.contains("open"));
}

#[test]
fn derivative_of_power_uses_power_rule() {
    let mut s = Session::new();
    let derivative = s.input("$partial 3 * x^2 ; x").unwrap();
    s.input("$let x = 2").unwrap();
    assert_eq!(derivative, "6*x");
    assert_eq!(s.input("$eval 6*x").unwrap(), "12");
}

#[test]
fn sin_prime_is_cos() {
    let mut s = Session::new();
    s.input("$let x = 0").unwrap();
    let out = s.input("$eval Sin'(x)").unwrap();
    assert_eq!(out, "1");
}

#[test]
fn sin_double_prime_is_negative_sin() {
    let mut s = Session::new();
    s.input("$let x = 0").unwrap();
    let out = s.input("$eval Sin''(x)").unwrap();
    assert_eq!(out, "-0");
}

#[test]
fn undefined_variable_is_reported_as_an_error_not_a_panic() {
    let mut s = Session::new();
    let err = s.input("$eval y + 1").unwrap_err();
    assert!(err.to_string().contains("undefined variable"));
}

#[test]
fn log_of_negative_is_a_domain_error() {
    let mut s = Session::new();
    let err = s.input("$eval Log(-1)").unwrap_err();
    assert!(err.to_string().contains("Log"));
}

#[test]
fn tex_format_uses_frac_for_division() {
    let mut s = Session::new();
    s.input("$format tex").unwrap();
    let out = s.input("1 / x").unwrap();
    assert!(out.contains("\\frac"));
}

#[test]
fn gradient_of_xy_lists_both_partials() {
    let mut s = Session::new();
    let out = s.input("$gradient x * y ; x, y").unwrap();
    assert!(out.contains('y') && out.contains('x'));
}

#[test]
fn raw_format_is_fully_parenthesized_constructor_form() {
    let mut s = Session::new();
    s.input("$format raw").unwrap();
    let out = s.input("x + 1").unwrap();
    assert!(out.starts_with("Sum(") || out.starts_with("Plus("));
}
