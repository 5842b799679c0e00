use clap::Parser;

use leibniz::shell;

/// A small computer algebra system for symbolic scalar expressions.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Run one or more statements non-interactively instead of starting the
    /// REPL. May be given multiple times; statements run in order.
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

fn main() {
    leibniz::panic::install_panic_hook();
    let cli = Cli::parse();

    if cli.commands.is_empty() {
        shell::repl();
    } else {
        shell::run_lines(cli.commands.into_iter());
    }
}
