//! Drives the parse/substitute/simplify/print cycle for one line of input,
//! tracking symbolic assignments (`V := E`) and numeric bindings (`$let`)
//! across a run.

use std::collections::HashMap;

use crate::core::{Arena, Expr, Format, Id};
use crate::error::Error;
use crate::parser::{parse_statement, Statement};

/// One REPL session: an arena plus the bindings accumulated while using it.
pub struct Session {
    pub arena: Arena,
    /// Symbolic bindings from `V := E`, substituted into later input before
    /// it is simplified.
    bindings: HashMap<String, Id>,
    /// Numeric bindings from `$let`, used by `$eval` and `$gradient`.
    vars: HashMap<String, f64>,
    format: Format,
    /// Toggled by `$debug`: whether a caught error prints a full detail
    /// block instead of a single line. Read by [`crate::shell`].
    debug: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            arena: Arena::new(),
            bindings: HashMap::new(),
            vars: HashMap::new(),
            format: Format::Plain,
            debug: false,
        }
    }

    /// Whether `$debug` mode is on. Read by [`crate::shell`] to decide how
    /// much detail to print for a caught error.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Processes one line of input, returning the text to print.
    pub fn input(&mut self, line: &str) -> Result<String, Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(String::new());
        }
        if let Some(rest) = line.strip_prefix('$') {
            return self.handle_command(rest.trim());
        }

        match parse_statement(&mut self.arena, line)? {
            Statement::Assignment(name, id) => {
                let id = self.resolve(id);
                let id = self.arena.simplify(id);
                self.bindings.insert(name.clone(), id);
                Ok(format!("{name} := {}", self.arena.format(id, self.format)))
            }
            Statement::Assertion(name, id) => {
                let id = self.resolve(id);
                let id = self.arena.simplify(id);
                let holds = matches!(self.arena.get(id), Expr::Equation(diff) if matches!(self.arena.get(*diff), Expr::Constant(v) if *v == 0.0));
                Ok(format!(
                    "{name}: {} [{}]",
                    self.arena.format(id, self.format),
                    if holds { "holds" } else { "open" }
                ))
            }
            Statement::Equation(id) => {
                let id = self.resolve(id);
                let id = self.arena.simplify(id);
                Ok(self.arena.format(id, self.format))
            }
            Statement::Expr(id) => {
                let id = self.resolve(id);
                let id = self.arena.simplify(id);
                Ok(self.arena.format(id, self.format))
            }
        }
    }

    /// Substitutes every previously bound name into `id`.
    fn resolve(&mut self, mut id: Id) -> Id {
        for (name, bound) in &self.bindings {
            id = self.arena.substitute(id, name, *bound);
        }
        id
    }

    fn handle_command(&mut self, rest: &str) -> Result<String, Error> {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next().unwrap_or("").trim();

        match cmd {
            "format" => {
                self.format = match arg {
                    "plain" => Format::Plain,
                    "tex" => Format::Tex,
                    "python" => Format::Python,
                    "raw" => Format::Raw,
                    "tree" => Format::Tree,
                    other => return Err(Error::command(format!("unknown format: {other}"))),
                };
                Ok(format!("format set to {}", self.format.name()))
            }
            "debug" => {
                self.debug = !self.debug;
                Ok(format!("debug mode {}", if self.debug { "on" } else { "off" }))
            }
            "session" => Ok(format!(
                "format: {}, debug: {}",
                self.format.name(),
                self.debug
            )),
            "let" => {
                let (name, value) = arg
                    .split_once('=')
                    .ok_or_else(|| Error::command("usage: $let name = value"))?;
                let name = name.trim().to_string();
                let value: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::command("expected a numeric value"))?;
                self.vars.insert(name.clone(), value);
                Ok(format!("{name} = {value}"))
            }
            "del" => {
                self.vars.remove(arg);
                self.bindings.remove(arg);
                Ok(format!("removed {arg}"))
            }
            "vars" => {
                let mut lines: Vec<String> =
                    self.vars.iter().map(|(n, v)| format!("{n} = {v}")).collect();
                lines.sort();
                Ok(lines.join("\n"))
            }
            "eval" => {
                let id = match parse_statement(&mut self.arena, arg)? {
                    Statement::Expr(id) | Statement::Equation(id) => id,
                    _ => return Err(Error::command("$eval expects a plain expression")),
                };
                let id = self.resolve(id);
                let value = self.arena.evaluate(id, &self.vars)?;
                Ok(format!("{value}"))
            }
            "gradient" => {
                let (expr_src, vars_src) = arg
                    .split_once(';')
                    .ok_or_else(|| Error::command("usage: $gradient expr ; v1, v2"))?;
                let id = match parse_statement(&mut self.arena, expr_src.trim())? {
                    Statement::Expr(id) | Statement::Equation(id) => id,
                    _ => return Err(Error::command("$gradient expects a plain expression")),
                };
                let id = self.resolve(id);
                let names: Vec<String> = vars_src.split(',').map(|s| s.trim().to_string()).collect();
                let names_ref: Vec<&str> = names.iter().map(String::as_str).collect();
                let grad = self.arena.gradient(id, &names_ref);
                let grad = self.arena.simplify(grad);
                Ok(self.arena.format(grad, self.format))
            }
            "partial" => {
                let (expr_src, var) = arg
                    .split_once(';')
                    .ok_or_else(|| Error::command("usage: $partial expr ; v"))?;
                let id = match parse_statement(&mut self.arena, expr_src.trim())? {
                    Statement::Expr(id) | Statement::Equation(id) => id,
                    _ => return Err(Error::command("$partial expects a plain expression")),
                };
                let id = self.resolve(id);
                let d = self.arena.partial(id, var.trim());
                Ok(self.arena.format(d, self.format))
            }
            other => Err(Error::command(format!("unknown command: ${other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_then_reference_substitutes() {
        let mut session = Session::new();
        session.input("a := 2").unwrap();
        let out = session.input("a + a").unwrap();
        assert_eq!(out, "4");
    }

    #[test]
    fn format_command_switches_output() {
        let mut session = Session::new();
        session.input("$format tex").unwrap();
        let out = session.input("x^2").unwrap();
        assert!(out.contains('^'));
    }

    #[test]
    fn assertion_reports_whether_it_holds() {
        let mut session = Session::new();
        let out = session.input("check: 1 + 1 = 2").unwrap();
        assert!(out.contains("holds"));
    }

    #[test]
    fn debug_command_toggles_and_is_reported_by_session() {
        let mut session = Session::new();
        assert!(!session.debug());
        session.input("$debug").unwrap();
        assert!(session.debug());
        let out = session.input("$session").unwrap();
        assert!(out.contains("debug: true"));
    }
}
