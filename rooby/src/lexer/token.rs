//! Token definitions

use logos::Logos;
use std::fmt;

/// Rooby token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // Keywords
    #[token("class")]
    Class,
    #[token("def")]
    Def,
    #[token("end")]
    End,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
    #[token("self")]
    SelfKw,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    StringLit(String),

    // Names
    #[regex(r"[a-z_][a-zA-Z0-9_]*\??", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),
    #[regex(r"[A-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Constant(String),
    /// Instance variable, name kept with its leading `@`
    #[regex(r"@[a-z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    InstanceVar(String),

    // Operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    /// Statement terminator: a line break or `;`
    #[token("\n")]
    #[token(";")]
    Newline,
}

/// Strip the surrounding quotes of a string literal and resolve escapes
fn unescape(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(quoted @ ('\\' | '"' | '\'')) => result.push(quoted),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Class => write!(f, "`class`"),
            Token::Def => write!(f, "`def`"),
            Token::End => write!(f, "`end`"),
            Token::If => write!(f, "`if`"),
            Token::Else => write!(f, "`else`"),
            Token::Return => write!(f, "`return`"),
            Token::SelfKw => write!(f, "`self`"),
            Token::True => write!(f, "`true`"),
            Token::False => write!(f, "`false`"),
            Token::IntLit(n) => write!(f, "integer `{n}`"),
            Token::StringLit(s) => write!(f, "string {s:?}"),
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::Constant(name) => write!(f, "constant `{name}`"),
            Token::InstanceVar(name) => write!(f, "instance variable `{name}`"),
            Token::EqEq => write!(f, "`==`"),
            Token::NotEq => write!(f, "`!=`"),
            Token::LtEq => write!(f, "`<=`"),
            Token::GtEq => write!(f, "`>=`"),
            Token::Lt => write!(f, "`<`"),
            Token::Gt => write!(f, "`>`"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::Percent => write!(f, "`%`"),
            Token::Bang => write!(f, "`!`"),
            Token::Eq => write!(f, "`=`"),
            Token::Dot => write!(f, "`.`"),
            Token::Comma => write!(f, "`,`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::Newline => write!(f, "end of line"),
        }
    }
}
