//! JikiScript parser
//!
//! Recursive descent over the token stream produced by [`Lexer`]. The parser
//! methods are split across files with `impl Parser` blocks:
//! - this module: the [`Parser`] struct, token helpers and the entry point
//! - `statements`: one method per statement form and block handling
//! - `expressions`: precedence climbing for operators, then postfix and
//!   primary expressions
//!
//! Every failure is a [`SyntaxError`] whose message names the mistake in the
//! learner's terms, e.g. `MissingDoToStartBlock: type: if`.

mod expressions;
mod statements;

use super::ast::Program;
use super::lexer::{Lexer, Token};
use crate::syntax::{SourceLocation, SyntaxError};

/// Parse a complete JikiScript program.
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
            if self.match_token(&Token::Newline(self.current_location())) {
                continue;
            }
            let statement = self.parse_statement(true)?;
            program.statements.push(statement);
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

    pub(crate) fn check_ahead(&self, n: usize, token: &Token) -> bool {
        self.tokens
            .get(self.position + n)
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
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
            Err(self.error(message))
        }
    }

    pub(crate) fn expect_identifier(&mut self, message: &str) -> Result<String, SyntaxError> {
        if let Token::Identifier(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error(message))
        }
    }

    /// Skip newlines inside bracketed literals that span lines.
    pub(crate) fn skip_newlines(&mut self) {
        while self.match_token(&Token::Newline(self.current_location())) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jikiscript::ast::*;

    #[test]
    fn test_parse_set_and_log() {
        let program = parse("set x to 1 + 2 * 3\nlog x").unwrap();
        assert_eq!(program.statements.len(), 2);
        match &program.statements[0] {
            Statement::Set { name, value, .. } => {
                assert_eq!(name, "x");
                assert!(matches!(value, Expression::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("Expected set statement, got {:?}", other),
        }
        assert!(matches!(program.statements[1], Statement::Log { .. }));
    }

    #[test]
    fn test_parse_if_else_chain() {
        let source = "if x is 1 do\n  log 1\nelse if x is 2 do\n  log 2\nelse do\n  log 3\nend";
        let program = parse(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::If { else_branch: Some(else_branch), .. } => {
                assert!(matches!(
                    else_branch[0],
                    Statement::If { else_branch: Some(_), .. }
                ));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_with_params() {
        let program = parse("function add with a, b do\n  return a + b\nend").unwrap();
        match &program.statements[0] {
            Statement::Function(decl) => {
                assert_eq!(decl.name, "add");
                assert_eq!(decl.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_do_and_end() {
        let err = parse("if x equals 1\nend").unwrap_err();
        assert_eq!(err.message, "MissingDoToStartBlock: type: if");

        let err = parse("if x equals 1 do\n").unwrap_err();
        assert_eq!(err.message, "MissingEndAfterBlock: type: if");

        let err = parse("repeat 5 times\nend").unwrap_err();
        assert_eq!(err.message, "MissingDoToStartBlock: type: repeat");

        let err = parse("if 5 > 4 do\nelse\nend").unwrap_err();
        assert_eq!(err.message, "MissingDoToStartBlock: type: else");
    }

    #[test]
    fn test_nested_function_is_rejected() {
        let err = parse("function f with a do\n  function g do\n  end\nend").unwrap_err();
        assert_eq!(err.message, "NestedFunctionDeclaration: name: g");
        assert_eq!(err.location.line, 2);

        let err = parse("repeat 2 times do\n  function g do\n  end\nend").unwrap_err();
        assert_eq!(err.message, "NestedFunctionDeclaration: name: g");
    }

    #[test]
    fn test_set_errors() {
        assert_eq!(
            parse("set value = \"value\"").unwrap_err().message,
            "UnexpectedEqualsForAssignmentUseSetInstead"
        );
        assert_eq!(
            parse("set 123 to \"value\"").unwrap_err().message,
            "InvalidNumericVariableName: name: 123"
        );
        assert_eq!(
            parse("set na me to \"Jeremy\"").unwrap_err().message,
            "UnexpectedSpaceInIdentifier: first_half: na, second_half: me"
        );
    }

    #[test]
    fn test_multiline_list_literal() {
        let program = parse("set xs to [\n  1,\n  2\n]").unwrap();
        match &program.statements[0] {
            Statement::Set { value: Expression::List { elements, .. }, .. } => {
                assert_eq!(elements.len(), 2)
            }
            other => panic!("Expected list literal, got {:?}", other),
        }
    }
}
