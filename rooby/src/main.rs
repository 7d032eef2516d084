//! rooby CLI

use clap::{Parser, Subcommand};
use rooby::error::report_error;
use rooby::interp::{Interpreter, Signal};
use rooby::repl::Repl;
use rooby::{CompileError, Config};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rooby", version, about = "rooby - a small class-based scripting language")]
struct Cli {
    /// Interpreter settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a rooby program
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Start the interactive REPL
    Repl,
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    rooby::init_tracing();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Run { file } => run_file(&file, config),
        Command::Repl => start_repl(config),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Read and parse a file, rendering compile errors against the source
fn load_program(path: &Path) -> Result<rooby::ast::Program, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match rooby::parse_source(&filename, &source) {
        Ok(program) => Ok(program),
        Err(err) => {
            report_error(&filename, &source, &err)?;
            Err(Box::new(err))
        }
    }
}

fn run_file(path: &Path, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let program = load_program(path)?;
    let mut interpreter = Interpreter::with_config(config);

    match interpreter.run(&program) {
        Ok(_) => Ok(()),
        Err(Signal::Error(err)) => Err(Box::new(err)),
        Err(Signal::Fatal(err)) => Err(Box::new(err)),
        // Program mode unwraps every top-level return
        Err(Signal::Return(_)) => Ok(()),
    }
}

fn start_repl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = Repl::with_config(config)?;
    repl.run()?;
    Ok(())
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ast = load_program(path)?;
    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = rooby::lexer::tokenize(&source).inspect_err(|err: &CompileError| {
        let _ = report_error(&path.display().to_string(), &source, err);
    })?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}
