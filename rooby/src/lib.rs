//! rooby: a tree-walking interpreter for a small class-based language with
//! Ruby-like syntax.

pub mod ast;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod util;

pub use ast::Span;
pub use config::Config;
pub use error::{CompileError, Result};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber, once, and only when `RUST_LOG` is set
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}

/// Lex and parse a source file
pub fn parse_source(filename: &str, source: &str) -> Result<ast::Program> {
    let tokens = lexer::tokenize(source)?;
    parser::parse(filename, source, tokens)
}
