//! Recursive-descent parser with Pratt-style operator precedence

use crate::ast::{
    AssignTarget, Block, ClassDef, InfixOp, MethodDef, Node, PrefixOp, Program, Span, Spanned,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use std::rc::Rc;


/// Binding power of infix and postfix operators, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn infix_operator(token: &Token) -> Option<(InfixOp, Precedence)> {
    let op = match token {
        Token::EqEq => (InfixOp::Eq, Precedence::Equals),
        Token::NotEq => (InfixOp::NotEq, Precedence::Equals),
        Token::Lt => (InfixOp::Lt, Precedence::LessGreater),
        Token::Gt => (InfixOp::Gt, Precedence::LessGreater),
        Token::LtEq => (InfixOp::LtEq, Precedence::LessGreater),
        Token::GtEq => (InfixOp::GtEq, Precedence::LessGreater),
        Token::Plus => (InfixOp::Add, Precedence::Sum),
        Token::Minus => (InfixOp::Sub, Precedence::Sum),
        Token::Star => (InfixOp::Mul, Precedence::Product),
        Token::Slash => (InfixOp::Div, Precedence::Product),
        Token::Percent => (InfixOp::Mod, Precedence::Product),
        _ => return None,
    };
    Some(op)
}

/// Keywords are valid method names after a dot (`obj.class`)
fn keyword_text(token: &Token) -> Option<&'static str> {
    match token {
        Token::Class => Some("class"),
        Token::Def => Some("def"),
        Token::End => Some("end"),
        Token::If => Some("if"),
        Token::Else => Some("else"),
        Token::Return => Some("return"),
        Token::SelfKw => Some("self"),
        Token::True => Some("true"),
        Token::False => Some("false"),
        _ => None,
    }
}

/// Tokens that may begin the first argument of a parenthesis-less call
/// (`puts "hi"`, `obj.send "name"`)
fn starts_command_argument(token: &Token) -> bool {
    matches!(
        token,
        Token::IntLit(_)
            | Token::StringLit(_)
            | Token::Ident(_)
            | Token::Constant(_)
            | Token::InstanceVar(_)
            | Token::SelfKw
            | Token::True
            | Token::False
    )
}

/// Parse tokens into AST
pub fn parse(_filename: &str, source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    Parser::new(tokens, source.len()).parse_program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// End offset of the most recently consumed token
    prev_end: usize,
    /// Span reported for errors at end of input
    eof: Span,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>, source_len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            prev_end: 0,
            eof: Span::new(source_len, source_len),
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn current_span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or(self.eof)
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if let Some((_, span)) = &next {
            self.prev_end = span.end;
            self.pos += 1;
        }
        next
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.prev_end.max(start.end))
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::parser(message, self.current_span())
    }

    fn expect(&mut self, token: Token, context: &str) -> Result<Span> {
        if self.at(&token) {
            let (_, span) = self.advance().ok_or_else(|| self.error("unexpected end of input"))?;
            Ok(span)
        } else {
            Err(self.error(format!(
                "expected {token} {context}, found {}",
                self.describe_current()
            )))
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(&Token::Newline) {
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_program(mut self) -> Result<Program> {
        let statements = self.parse_statements(&[])?;
        if !self.at_end() {
            return Err(self.error(format!("unexpected {}", self.describe_current())));
        }
        Ok(Program::new(statements))
    }

    /// Parse statements until end of input or one of `closers` (left unconsumed)
    fn parse_statements(&mut self, closers: &[Token]) -> Result<Vec<Spanned<Node>>> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while let Some(token) = self.peek() {
            if closers.contains(token) {
                break;
            }
            statements.push(self.parse_statement()?);
            match self.peek() {
                None | Some(Token::Newline) => self.skip_newlines(),
                Some(token) if closers.contains(token) => {}
                Some(_) => {
                    return Err(self.error(format!(
                        "expected end of line after statement, found {}",
                        self.describe_current()
                    )));
                }
            }
        }
        Ok(statements)
    }

    fn parse_block(&mut self, closers: &[Token]) -> Result<Rc<Block>> {
        Ok(Block::new(self.parse_statements(closers)?))
    }

    fn parse_statement(&mut self) -> Result<Spanned<Node>> {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Return), _) => self.parse_return(),
            (Some(Token::Class), _) => self.parse_class(),
            (Some(Token::Def), _) => self.parse_def(),
            (Some(Token::Ident(_) | Token::Constant(_) | Token::InstanceVar(_)), Some(Token::Eq)) => {
                self.parse_assignment()
            }
            _ => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                let span = expr.span;
                Ok(Spanned::new(Node::ExpressionStatement(Box::new(expr)), span))
            }
        }
    }

    fn parse_return(&mut self) -> Result<Spanned<Node>> {
        let start = self.expect(Token::Return, "")?;
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Spanned::new(
            Node::ReturnStatement(Box::new(value)),
            self.span_from(start),
        ))
    }

    fn parse_assignment(&mut self) -> Result<Spanned<Node>> {
        let (token, start) = self
            .advance()
            .ok_or_else(|| self.error("expected assignment target"))?;
        let target = match token {
            Token::Ident(name) => AssignTarget::Identifier(name),
            Token::Constant(name) => AssignTarget::Constant(name),
            Token::InstanceVar(name) => AssignTarget::InstanceVariable(name),
            other => {
                return Err(CompileError::parser(
                    format!("cannot assign to {other}"),
                    start,
                ));
            }
        };
        self.expect(Token::Eq, "in assignment")?;
        self.skip_newlines();
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Spanned::new(
            Node::AssignStatement {
                target,
                value: Box::new(value),
            },
            self.span_from(start),
        ))
    }

    fn parse_class(&mut self) -> Result<Spanned<Node>> {
        let start = self.expect(Token::Class, "")?;
        let name = self.expect_constant("after `class`")?;
        let superclass = if self.at(&Token::Lt) {
            self.advance();
            Some(self.expect_constant("as superclass")?)
        } else {
            None
        };
        let body = self.parse_block(&[Token::End])?;
        self.expect(Token::End, "to close `class`")?;
        Ok(Spanned::new(
            Node::ClassStatement(ClassDef {
                name,
                superclass,
                body,
            }),
            self.span_from(start),
        ))
    }

    fn parse_def(&mut self) -> Result<Spanned<Node>> {
        let start = self.expect(Token::Def, "")?;
        let singleton = if self.at(&Token::SelfKw) && self.peek_at(1) == Some(&Token::Dot) {
            self.advance();
            self.advance();
            true
        } else {
            false
        };
        let name = self.expect_method_name("after `def`")?;

        let mut params = Vec::new();
        if self.at(&Token::LParen) {
            self.advance();
            self.skip_newlines();
            while !self.at(&Token::RParen) {
                params.push(self.expect_identifier("as parameter name")?);
                self.skip_newlines();
                if self.at(&Token::Comma) {
                    self.advance();
                    self.skip_newlines();
                } else {
                    break;
                }
            }
            self.expect(Token::RParen, "to close parameter list")?;
        }

        let body = self.parse_block(&[Token::End])?;
        self.expect(Token::End, "to close `def`")?;
        Ok(Spanned::new(
            Node::DefStatement(MethodDef {
                name,
                params,
                body,
                singleton,
            }),
            self.span_from(start),
        ))
    }

    fn expect_constant(&mut self, context: &str) -> Result<Spanned<String>> {
        match self.peek() {
            Some(Token::Constant(_)) => match self.advance() {
                Some((Token::Constant(name), span)) => Ok(Spanned::new(name, span)),
                _ => Err(self.error("expected constant")),
            },
            _ => Err(self.error(format!(
                "expected constant {context}, found {}",
                self.describe_current()
            ))),
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<Spanned<String>> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.advance() {
                Some((Token::Ident(name), span)) => Ok(Spanned::new(name, span)),
                _ => Err(self.error("expected identifier")),
            },
            _ => Err(self.error(format!(
                "expected identifier {context}, found {}",
                self.describe_current()
            ))),
        }
    }

    /// Method names: identifiers, constants, or keywords
    fn expect_method_name(&mut self, context: &str) -> Result<Spanned<String>> {
        let name = match self.peek() {
            Some(Token::Ident(name) | Token::Constant(name)) => name.clone(),
            Some(token) => match keyword_text(token) {
                Some(text) => text.to_string(),
                None => {
                    return Err(self.error(format!(
                        "expected method name {context}, found {}",
                        self.describe_current()
                    )));
                }
            },
            None => return Err(self.error(format!("expected method name {context}, found end of input"))),
        };
        let span = self.current_span();
        self.advance();
        Ok(Spanned::new(name, span))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Spanned<Node>> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some(token) = self.peek() else { break };
            if *token == Token::Dot {
                if precedence >= Precedence::Call {
                    break;
                }
                left = self.parse_method_call(left)?;
                continue;
            }
            let Some((operator, op_precedence)) = infix_operator(token) else {
                break;
            };
            if precedence >= op_precedence {
                break;
            }
            self.advance();
            self.skip_newlines();
            let right = self.parse_expression(op_precedence)?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Node::InfixExpression {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Node>> {
        let start = self.current_span();
        let Some((token, span)) = self.advance() else {
            return Err(self.error("expected expression, found end of input"));
        };

        let node = match token {
            Token::IntLit(n) => Node::IntegerLiteral(n),
            Token::StringLit(s) => Node::StringLiteral(s),
            Token::True => Node::Boolean(true),
            Token::False => Node::Boolean(false),
            Token::SelfKw => Node::SelfExpression,
            Token::Constant(name) => Node::Constant(name),
            Token::InstanceVar(name) => Node::InstanceVariable(name),
            Token::Ident(name) => {
                let receiver_less = self.at(&Token::LParen)
                    || self.peek().is_some_and(starts_command_argument);
                if !receiver_less {
                    return Ok(Spanned::new(Node::Identifier(name), span));
                }
                let arguments = self.parse_call_arguments()?;
                Node::CallExpression {
                    receiver: Box::new(Spanned::new(Node::SelfExpression, span)),
                    method: name,
                    arguments,
                }
            }
            Token::Bang => self.parse_prefix_operand(PrefixOp::Not)?,
            Token::Minus => self.parse_prefix_operand(PrefixOp::Neg)?,
            Token::LParen => {
                self.skip_newlines();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.skip_newlines();
                self.expect(Token::RParen, "to close parenthesized expression")?;
                return Ok(Spanned::new(inner.node, self.span_from(start)));
            }
            Token::If => return self.parse_if(start),
            other => {
                return Err(CompileError::parser(
                    format!("expected expression, found {other}"),
                    span,
                ));
            }
        };

        Ok(Spanned::new(node, self.span_from(start)))
    }

    fn parse_prefix_operand(&mut self, operator: PrefixOp) -> Result<Node> {
        let operand = self.parse_expression(Precedence::Prefix)?;
        Ok(Node::PrefixExpression {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_if(&mut self, start: Span) -> Result<Spanned<Node>> {
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block(&[Token::Else, Token::End])?;
        let alternative = if self.at(&Token::Else) {
            self.advance();
            Some(self.parse_block(&[Token::End])?)
        } else {
            None
        };
        self.expect(Token::End, "to close `if`")?;
        Ok(Spanned::new(
            Node::IfExpression {
                condition: Box::new(condition),
                consequence,
                alternative,
            },
            self.span_from(start),
        ))
    }

    /// `receiver.name`, `receiver.name(args)` or `receiver.name arg, ...`
    fn parse_method_call(&mut self, receiver: Spanned<Node>) -> Result<Spanned<Node>> {
        self.expect(Token::Dot, "")?;
        let method = self.expect_method_name("after `.`")?;
        let has_arguments =
            self.at(&Token::LParen) || self.peek().is_some_and(starts_command_argument);
        let arguments = if has_arguments {
            self.parse_call_arguments()?
        } else {
            Vec::new()
        };
        let span = self.span_from(receiver.span);
        Ok(Spanned::new(
            Node::CallExpression {
                receiver: Box::new(receiver),
                method: method.node,
                arguments,
            },
            span,
        ))
    }

    /// Arguments either in parentheses or as a comma list running to the end
    /// of the line
    fn parse_call_arguments(&mut self) -> Result<Vec<Spanned<Node>>> {
        let mut arguments = Vec::new();

        if self.at(&Token::LParen) {
            self.advance();
            self.skip_newlines();
            while !self.at(&Token::RParen) {
                arguments.push(self.parse_expression(Precedence::Lowest)?);
                self.skip_newlines();
                if self.at(&Token::Comma) {
                    self.advance();
                    self.skip_newlines();
                } else {
                    break;
                }
            }
            self.expect(Token::RParen, "to close argument list")?;
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression(Precedence::Lowest)?);
            if !self.at(&Token::Comma) {
                break;
            }
            self.advance();
            self.skip_newlines();
        }
        Ok(arguments)
    }
}
