//! Trellis CLI
//!
//! Usage:
//!   trellis [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --context <FILE>  Context chainfile layered over the template chain
//!   -e, --entry <NAME>    Property resolved first (default: main)
//!   -m, --marks           Wrap string output in provenance comment markers
//!   -h, --help            Print help

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use trellis::{resolve_with_config, ChainFile, ResolveConfig};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Layered template resolution over provider chains")]
struct Cli {
    /// Template chainfile in TOML format (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Context chainfile layered over the template chain
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Property resolved first
    #[arg(short, long, default_value = "main")]
    entry: String,

    /// Wrap string output in provenance comment markers
    #[arg(short, long)]
    marks: bool,
}

fn main() {
    let cli = Cli::parse();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Read the template chainfile
    let chainfile = match &cli.input {
        Some(path) => match ChainFile::from_file(path) {
            Ok(chainfile) => chainfile,
            Err(e) => {
                eprintln!("Error reading chainfile '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            }
            match ChainFile::from_str(&buffer) {
                Ok(chainfile) => chainfile,
                Err(e) => {
                    eprintln!("Error parsing chainfile: {}", e);
                    process::exit(1);
                }
            }
        }
    };
    let template = match chainfile.into_chain() {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Resolve with context chain, entrypoint, and marks
    let mut config = ResolveConfig::new()
        .with_entrypoint(&cli.entry)
        .with_debug_marks(cli.marks);
    if let Some(path) = &cli.context {
        match ChainFile::from_file(path).and_then(ChainFile::into_chain) {
            Ok(chain) => config = config.with_context(chain),
            Err(e) => {
                eprintln!("Error reading context chainfile '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    match resolve_with_config(template, config) {
        Ok(value) => {
            println!("{}", value);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Trellis - layered template resolution over provider chains

USAGE:
    trellis [OPTIONS] [FILE]
    cat chain.toml | trellis

OPTIONS:
    -c, --context <FILE>   Context chainfile layered over the template chain
    -e, --entry <NAME>     Property resolved first (default: main)
    -m, --marks            Wrap string output in provenance comment markers
    -h, --help             Print help

CHAINFILE FORMAT:
    A chain is a root-first list of providers; each provider shadows the
    entries of the ones declared before it.

    [[providers]]
    id = "base"
    entries = {{ main = "hello from base" }}

    [[providers]]
    id = "site"
    entries = {{ main = "hello from site" }}

QUICK START:
    trellis chain.toml
    trellis chain.toml --context request.toml --entry greeting

Entries in a context chainfile shadow the whole template chain, so one
template can be rendered against many contexts."#
    );
}
