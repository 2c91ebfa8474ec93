//! JavaScript subset parser
//!
//! Same layout as the JikiScript parser: token helpers here, statements and
//! expressions in their own `impl Parser` files.

mod expressions;
mod statements;

use super::ast::Program;
use super::lexer::{Lexer, Token};
use crate::syntax::{SourceLocation, SyntaxError};

pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    Parser::new(source)?.parse_program()
}

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, SyntaxError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut program = Program::default();
        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            program.statements.push(self.parse_statement(true)?);
        }
        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        // the lexer always terminates the stream with Eof
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.current_location())
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), SyntaxError> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.error(format!("{}: found: {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_identifier(&mut self, message: &str) -> Result<String, SyntaxError> {
        if let Token::Identifier(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("{}: found: {}", message, self.peek())))
        }
    }

    /// Semicolons are optional; swallow one if present.
    pub(crate) fn consume_semicolon(&mut self) {
        self.match_token(&Token::Semicolon(self.current_location()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::javascript::ast::*;

    #[test]
    fn test_parse_declarations_without_semicolons() {
        let program = parse("let x = 1\nconst y = x + 2\nconsole.log(y)").unwrap();
        assert_eq!(program.statements.len(), 3);
        assert!(matches!(
            program.statements[1],
            Statement::VariableDeclaration { kind: DeclarationKind::Const, .. }
        ));
    }

    #[test]
    fn test_parse_for_loops() {
        let program = parse("for (let i = 0; i < 3; i++) { x += i; }\nfor (const n of xs) {}").unwrap();
        assert!(matches!(program.statements[0], Statement::For { .. }));
        assert!(matches!(program.statements[1], Statement::ForOf { .. }));
    }

    #[test]
    fn test_parse_function() {
        let program = parse("function add(a, b) { return a + b; }").unwrap();
        match &program.statements[0] {
            Statement::Function(decl) => {
                assert_eq!(decl.name, "add");
                assert_eq!(decl.params.len(), 2);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_function_is_rejected() {
        let err = parse("function f(a) {\n  function g() {}\n}").unwrap_err();
        assert_eq!(err.message, "NestedFunctionDeclaration: name: g");
        assert_eq!(err.location.line, 2);

        let err = parse("if (true) {\n  function g() {}\n}").unwrap_err();
        assert_eq!(err.message, "NestedFunctionDeclaration: name: g");
    }

    #[test]
    fn test_const_requires_initializer() {
        let err = parse("const x;").unwrap_err();
        assert_eq!(err.message, "MissingInitializerInConstDeclaration: name: x");
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("if (x) { log(1);").unwrap_err();
        assert_eq!(err.message, "MissingRightBraceAfterBlock: found: end of file");
    }
}
