//! `mutative-apply` — apply patches or replay recorded entries.
//!
//! Usage:
//!   mutative-apply '<patch-array-json>'
//!   mutative-apply --recorded '<entry-array-json>'
//!
//! The document is read from stdin; the result goes to stdout. Set
//! `RUST_LOG=debug` to see skipped patches on stderr.

use std::io::{self, Read, Write};

use mutative::cli::{parse_args, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, arg_json) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(mode, buf.trim(), arg_json) {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to apply");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
