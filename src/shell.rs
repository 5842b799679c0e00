//! The interactive REPL: reads lines from stdin, feeds them to a
//! [`Session`], and prints the result or a themed error.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::session::Session;

fn use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stdout().is_terminal()
}

/// Runs the REPL over stdin/stdout until EOF.
pub fn repl() {
    let mut session = Session::new();
    let colored = use_color();
    let stdin = io::stdin();

    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => run_line(&mut session, &line, colored),
            Err(e) => {
                eprintln!("io error: {e}");
                break;
            }
        }
    }
}

fn run_line(session: &mut Session, line: &str, colored: bool) {
    if line.trim().is_empty() {
        return;
    }
    match session.input(line) {
        Ok(out) => {
            if !out.is_empty() {
                println!("{out}");
            }
        }
        Err(e) => report_error(&e, colored, session.debug()),
    }
}

/// Prints a caught `Result` error: a single themed line normally, or a full
/// detail block in `$debug` mode. Themed the same way as `panic.rs`'s hook,
/// reused here since this crate's core never actually panics on algebraic
/// input -- every failure path already returns a `Result`.
fn report_error(e: &crate::error::Error, colored: bool, debug: bool) {
    if !debug {
        if colored {
            eprintln!("\x1b[1;31merror:\x1b[0m {e}");
        } else {
            eprintln!("error: {e}");
        }
        return;
    }

    let (header, label, message, reset) = if colored {
        ("\x1b[1;31m", "\x1b[1;36m", "\x1b[97m", "\x1b[0m")
    } else {
        ("", "", "", "")
    };
    eprintln!("{header}error{reset}");
    eprintln!("{label}Message{reset} {message}{e}{reset}");
    eprintln!("{label}Kind{reset}    {message}{e:?}{reset}");
}

/// Runs each of `lines` as if typed at the REPL, printing results to
/// stdout. Used for non-interactive `-c`/file invocation.
pub fn run_lines(lines: impl Iterator<Item = String>) {
    let mut session = Session::new();
    let colored = use_color();
    for line in lines {
        run_line(&mut session, &line, colored);
    }
}
