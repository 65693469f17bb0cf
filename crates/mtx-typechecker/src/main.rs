use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use mtx_hir::{Ident, SearchPath};
use mtx_typechecker::TypeChecker;

/// Type checker driver for mtx programs
#[derive(Parser)]
#[command(name = "mtx-typecheck", about = "Locate and type check mtx entry functions")]
struct Cli {
    /// Entry function identifiers to resolve on the search path
    idents: Vec<String>,

    /// File listing one search-path directory per line
    #[arg(long)]
    path_file: PathBuf,

    /// Initial type store capacity
    #[arg(long, default_value_t = 100_000)]
    capacity: usize,

    /// Print store and candidate statistics
    #[arg(long)]
    show_diagnostics: bool,

    /// Exit non-zero when type errors are found
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();

    let search_path = match SearchPath::from_path_file(&cli.path_file) {
        Ok(path) => path,
        Err(e) => {
            eprintln!(
                "{} {}",
                "error:".red().bold(),
                format!("reading search path {}: {}", cli.path_file.display(), e),
            );
            process::exit(1);
        }
    };

    if cli.idents.is_empty() {
        eprintln!("{} specify at least one entry function", "error:".red().bold());
        process::exit(1);
    }

    let mut checker = TypeChecker::with_capacity(cli.capacity);

    for ident in &cli.idents {
        match checker.locate_entry(&search_path, Ident::new(ident)) {
            Some(candidate) => {
                let file = &search_path.candidate(candidate).defining_file;
                eprintln!(
                    "  {} {} {}",
                    ident.purple(),
                    "->".bright_black(),
                    file.display().to_string().cyan(),
                );
            }
            None => {
                eprintln!(
                    "{} {}",
                    "error:".red().bold(),
                    format!("no file on the search path matched: {}", ident),
                );
                process::exit(1);
            }
        }
    }

    if cli.show_diagnostics {
        eprintln!();
        eprintln!("  num types: {}", checker.store.len());
        eprintln!("  num equations: {}", checker.substitution.num_type_equations());
        eprintln!("  num candidates: {}", checker.pending.len());
        eprintln!("  search path entries: {}", search_path.len());
    }

    let errors = checker.errors();
    for error in errors {
        let location = match error.location() {
            Some((line, column)) => format!("{}:{} ", line, column),
            None => String::new(),
        };
        eprintln!(
            "  {}{}",
            location.bright_black(),
            error.to_string().red(),
        );
    }

    //  Type errors do not change the exit code unless --strict is given.
    if cli.strict && !errors.is_empty() {
        process::exit(2);
    }
    process::exit(0);
}
