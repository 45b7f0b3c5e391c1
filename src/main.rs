//! Command-line interface for gramlex.
//!
//! Wraps the library pipeline behind two subcommands: `parse` reads a
//! grammar file and echoes it verbatim (a byte-identity check surface), and
//! `fmt` prints the pretty-printed form. Errors go to stderr with a nonzero
//! exit code. `RUST_LOG=trace` exposes the lexer and parser traces.

use clap::{Parser as ClapParser, Subcommand};
use std::fs;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parses a grammar and echoes it verbatim
    Parse {
        /// Input file with grammar rules
        #[arg(short, long)]
        input: String,
    },
    /// Parses a grammar and prints it pretty-printed
    Fmt {
        /// Input file with grammar rules
        #[arg(short, long)]
        input: String,
    },
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Commands::Parse { input } => {
            let source = fs::read_to_string(&input)?;
            let grammar = gramlex::parse(&source)?;
            print!("{}", grammar.source_text());
        }
        Commands::Fmt { input } => {
            let source = fs::read_to_string(&input)?;
            let grammar = gramlex::parse(&source)?;
            println!("{grammar}");
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
