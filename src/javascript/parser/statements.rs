use super::Parser;
use crate::javascript::ast::*;
use crate::javascript::lexer::Token;
use crate::syntax::{SourceLocation, SyntaxError};

impl Parser {
    /// Parse one statement. Function declarations are only allowed when
    /// `top_level` is set.
    pub(crate) fn parse_statement(&mut self, top_level: bool) -> Result<Statement, SyntaxError> {
        let loc = self.current_location();
        match self.peek_token() {
            Token::Let(_) | Token::Const(_) => {
                let statement = self.parse_variable_declaration()?;
                self.consume_semicolon();
                Ok(statement)
            }
            Token::LBrace(_) => {
                self.advance();
                let body = self.parse_block_body()?;
                Ok(Statement::Block {
                    body,
                    location: loc,
                })
            }
            Token::If(_) => {
                self.advance();
                self.parse_if(loc)
            }
            Token::While(_) => {
                self.advance();
                let test = self.parse_parenthesized_test()?;
                let body = Box::new(self.parse_statement(false)?);
                Ok(Statement::While {
                    test,
                    body,
                    location: loc,
                })
            }
            Token::For(_) => {
                self.advance();
                self.parse_for(loc)
            }
            Token::Function(_) => {
                self.advance();
                self.parse_function(loc, top_level)
            }
            Token::Return(_) => {
                self.advance();
                let value = if self.check(&Token::Semicolon(loc))
                    || self.check(&Token::RBrace(loc))
                    || self.is_at_end()
                    || self.current_location().line != loc.line
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon();
                Ok(Statement::Return {
                    value,
                    location: loc,
                })
            }
            Token::Break(_) => {
                self.advance();
                self.consume_semicolon();
                Ok(Statement::Break { location: loc })
            }
            Token::Continue(_) => {
                self.advance();
                self.consume_semicolon();
                Ok(Statement::Continue { location: loc })
            }
            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon();
                Ok(Statement::Expression {
                    expression,
                    location: loc,
                })
            }
        }
    }

    /// `let x = e` / `const x = e`, without the trailing semicolon.
    fn parse_variable_declaration(&mut self) -> Result<Statement, SyntaxError> {
        let loc = self.current_location();
        let kind = match self.advance() {
            Token::Const(_) => DeclarationKind::Const,
            _ => DeclarationKind::Let,
        };
        let name = self.expect_identifier("MissingVariableName")?;

        let init = if self.match_token(&Token::Assign(self.current_location())) {
            Some(self.parse_expression()?)
        } else if kind == DeclarationKind::Const {
            return Err(self.error(format!(
                "MissingInitializerInConstDeclaration: name: {}",
                name
            )));
        } else {
            None
        };

        Ok(Statement::VariableDeclaration {
            kind,
            name,
            init,
            location: loc,
        })
    }

    /// Statements after an opening `{`, consuming the closing `}`.
    fn parse_block_body(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut body = Vec::new();
        loop {
            if self.match_token(&Token::RBrace(self.current_location())) {
                return Ok(body);
            }
            if self.is_at_end() {
                return Err(self.error(format!("MissingRightBraceAfterBlock: found: {}", self.peek())));
            }
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            body.push(self.parse_statement(false)?);
        }
    }

    fn parse_parenthesized_test(&mut self) -> Result<Expression, SyntaxError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            "MissingLeftParenthesisBeforeCondition",
        )?;
        let test = self.parse_expression()?;
        self.expect_token(
            &Token::RParen(self.current_location()),
            "MissingRightParenthesisAfterCondition",
        )?;
        Ok(test)
    }

    fn parse_if(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        let test = self.parse_parenthesized_test()?;
        let consequent = Box::new(self.parse_statement(false)?);
        let alternate = if self.match_token(&Token::Else(self.current_location())) {
            Some(Box::new(self.parse_statement(false)?))
        } else {
            None
        };
        Ok(Statement::If {
            test,
            consequent,
            alternate,
            location: loc,
        })
    }

    /// C-style `for (init; test; update)` or `for (const x of xs)`.
    fn parse_for(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            "MissingLeftParenthesisAfterFor",
        )?;

        let is_declaration = matches!(self.peek(), Token::Let(_) | Token::Const(_));
        let is_for_of = is_declaration
            && matches!(self.tokens.get(self.position + 1), Some(Token::Identifier(..)))
            && matches!(self.tokens.get(self.position + 2), Some(Token::Of(_)));

        if is_for_of {
            let kind = match self.advance() {
                Token::Const(_) => DeclarationKind::Const,
                _ => DeclarationKind::Let,
            };
            let name = self.expect_identifier("MissingVariableName")?;
            self.advance(); // `of`
            let iterable = self.parse_expression()?;
            self.expect_token(
                &Token::RParen(self.current_location()),
                "MissingRightParenthesisAfterForOf",
            )?;
            let body = Box::new(self.parse_statement(false)?);
            return Ok(Statement::ForOf {
                kind,
                name,
                iterable,
                body,
                location: loc,
            });
        }

        let init = if self.check(&Token::Semicolon(loc)) {
            None
        } else if is_declaration {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expression = self.parse_expression()?;
            Some(Box::new(Statement::Expression {
                expression,
                location: init_loc,
            }))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "MissingSemicolonAfterForInit",
        )?;

        let test = if self.check(&Token::Semicolon(loc)) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "MissingSemicolonAfterForCondition",
        )?;

        let update = if self.check(&Token::RParen(loc)) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(
            &Token::RParen(self.current_location()),
            "MissingRightParenthesisAfterForUpdate",
        )?;

        let body = Box::new(self.parse_statement(false)?);
        Ok(Statement::For {
            init,
            test,
            update,
            body,
            location: loc,
        })
    }

    fn parse_function(&mut self, loc: SourceLocation, top_level: bool) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier("MissingFunctionName")?;
        if !top_level {
            return Err(SyntaxError::new(
                format!("NestedFunctionDeclaration: name: {}", name),
                loc,
            ));
        }
        self.expect_token(
            &Token::LParen(self.current_location()),
            "MissingLeftParenthesisBeforeParameters",
        )?;

        let mut params = Vec::new();
        if !self.check(&Token::RParen(loc)) {
            loop {
                params.push(self.expect_identifier("MissingParameterName")?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }
        self.expect_token(
            &Token::RParen(self.current_location()),
            "MissingRightParenthesisAfterParameters",
        )?;
        self.expect_token(
            &Token::LBrace(self.current_location()),
            "MissingLeftBraceBeforeFunctionBody",
        )?;
        let body = self.parse_block_body()?;

        Ok(Statement::Function(FunctionDecl {
            name,
            params,
            body,
            location: loc,
        }))
    }
}
