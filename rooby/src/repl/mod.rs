//! REPL (Read-Eval-Print Loop) for rooby

use crate::config::Config;
use crate::interp::Interpreter;
use crate::lexer::{tokenize, Token};
use crate::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "rooby> ";
const CONTINUATION_PROMPT: &str = "rooby* ";

/// REPL state; globals and classes persist from one input to the next
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
    /// Lines of an unfinished `class`/`def`/`if`
    buffer: String,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(&config.history_file));
        let interpreter = Interpreter::with_config(config);

        let mut repl = Repl {
            editor,
            interpreter,
            history_path,
            buffer: String::new(),
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("rooby {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            let prompt = if self.buffer.is_empty() {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if self.buffer.is_empty() {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if trimmed.starts_with(':') {
                            let _ = self.editor.add_history_entry(trimmed);
                            if self.handle_command(trimmed) {
                                break;
                            }
                            continue;
                        }
                    }

                    self.buffer.push_str(&line);
                    self.buffer.push('\n');
                    if needs_more_input(&self.buffer) {
                        continue;
                    }

                    let source = std::mem::take(&mut self.buffer);
                    let _ = self.editor.add_history_entry(source.trim_end());
                    match self.eval_source(&source) {
                        Ok(result) => println!("=> {result}"),
                        Err(message) => eprintln!("{message}"),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    self.buffer.clear();
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":vars" => {
                for line in self.describe_globals() {
                    println!("{line}");
                }
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn print_help(&self) {
        println!("rooby REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :vars           List top-level bindings");
        println!("  :clear          Clear the screen");
        println!();
        println!("You can enter:");
        println!("  - Expressions: 1 + 2, \"ab\" * 3");
        println!("  - Assignments: x = 10");
        println!("  - Definitions: class Dog ... end, def greet(name) ... end");
        println!("  - Calls: Dog.new.bark, puts \"hi\"");
        println!();
        println!("Blocks continue on the next line until their `end`.");
    }

    /// `name = inspect` for each top-level binding, sorted by name
    fn describe_globals(&self) -> Vec<String> {
        let globals = self.interpreter.globals().borrow();
        let mut lines: Vec<String> = globals
            .bindings()
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect();
        lines.sort();
        lines
    }

    /// Lex, parse and run one complete input; the result in inspect form
    fn eval_source(&mut self, source: &str) -> Result<String, String> {
        let tokens = tokenize(source).map_err(|err| format!("Lexer error: {}", err.message()))?;
        let program =
            parse("<repl>", source, tokens).map_err(|err| format!("Parse error: {}", err.message()))?;
        self.interpreter
            .run(&program)
            .map(|value| value.to_string())
            .map_err(|signal| signal.to_string())
    }
}

/// Whether `source` has a `class`, `def` or `if` still waiting for its `end`.
///
/// Input that does not lex is complete; evaluating it reports the error.
pub fn needs_more_input(source: &str) -> bool {
    let Ok(tokens) = tokenize(source) else {
        return false;
    };
    let mut depth: i64 = 0;
    let mut after_dot = false;
    for (token, _) in &tokens {
        // `x.class` is a call, not a block opener
        if !after_dot {
            match token {
                Token::Class | Token::Def | Token::If => depth += 1,
                Token::End => depth -= 1,
                _ => {}
            }
        }
        after_dot = *token == Token::Dot;
    }
    depth > 0
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
