//! Compiscript checker
//!
//! Usage: cpsc [OPTIONS] <input>

use anyhow::Context;
use clap::Parser as ClapParser;
use compiscript::common::{CompileError, DiagnosticReporter};
use compiscript::frontend::{CompileContext, CompiscriptFrontend, FrontendConfig};
use compiscript::logging::{init_logging, LogFormat, LogLevel, LogOptions};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "cpsc")]
#[command(author = "Compiscript Team")]
#[command(version)]
#[command(about = "Semantic checker for Compiscript programs", long_about = None)]
struct Args {
    /// Input source file (.cps)
    #[arg(required = true)]
    input: PathBuf,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Print the global symbol table after analysis
    #[arg(long)]
    symbols: bool,

    /// Print every scope with its symbols after analysis
    #[arg(long)]
    scopes: bool,

    /// Print diagnostics as plain `[ERROR SEMÁNTICO]` lines
    #[arg(long)]
    plain: bool,

    /// Log level (overrides CPSC_LOG_LEVEL)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format (overrides CPSC_LOG_FORMAT)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_options = LogOptions::from_env().with_cli(args.log_format, args.log_level, args.verbose);
    init_logging(log_options);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Read input file
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Checking {}", args.input.display());
    }

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
    };
    let ctx = CompileContext::new(filename, file_id, &reporter);
    let analysis = CompiscriptFrontend::new().check(&source, &ctx, &config)?;

    for diagnostic in &analysis.diagnostics {
        if args.plain {
            eprintln!("{diagnostic}");
        } else {
            reporter.report_semantic(file_id, diagnostic);
        }
    }

    if args.symbols {
        println!("=== Symbols ===");
        print!("{}", analysis.symbols.render_flat());
        println!("=== End Symbols ===");
    }
    if args.scopes {
        println!("=== Scopes ===");
        print!("{}", analysis.symbols.render());
        println!("=== End Scopes ===");
    }

    if !analysis.is_ok() {
        return Err(CompileError::semantic(analysis.diagnostics.len()).into());
    }

    if args.verbose {
        eprintln!("No semantic errors found");
    }
    Ok(())
}
