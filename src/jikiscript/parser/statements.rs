//! Statement parsing
//!
//! Every statement occupies one line; blocks open with `do` at the end of the
//! header line and close with `end`. An `if` chain shares a single `end`:
//!
//! ```text
//! if x is 1 do
//!   …
//! else if x is 2 do
//!   …
//! else do
//!   …
//! end
//! ```

use super::Parser;
use crate::jikiscript::ast::*;
use crate::jikiscript::lexer::Token;
use crate::syntax::{SourceLocation, SyntaxError};

impl Parser {
    /// Parse one statement. Function declarations are only allowed when
    /// `top_level` is set.
    pub(crate) fn parse_statement(&mut self, top_level: bool) -> Result<Statement, SyntaxError> {
        let loc = self.current_location();
        let statement = match self.peek_token() {
            Token::Set(_) => {
                self.advance();
                self.parse_set(loc)?
            }
            Token::Change(_) => {
                self.advance();
                self.parse_change(loc)?
            }
            Token::Log(_) => {
                self.advance();
                let value = self.parse_expression()?;
                Statement::Log {
                    value,
                    location: loc,
                }
            }
            Token::If(_) => {
                self.advance();
                return self.parse_if(loc);
            }
            Token::Repeat(_) => {
                self.advance();
                return self.parse_repeat(loc);
            }
            Token::For(_) => {
                self.advance();
                return self.parse_foreach(loc);
            }
            Token::Do(_) => {
                self.advance();
                self.expect_end_of_line()?;
                let body = self.parse_block("do")?;
                self.expect_end_of_line()?;
                return Ok(Statement::Block {
                    body,
                    location: loc,
                });
            }
            Token::Function(_) => {
                self.advance();
                return self.parse_function(loc, top_level);
            }
            Token::Return(_) => {
                self.advance();
                let value = if self.check(&Token::Newline(loc)) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Statement::Return {
                    value,
                    location: loc,
                }
            }
            Token::Break(_) => {
                self.advance();
                Statement::Break { location: loc }
            }
            Token::Continue(lexeme, _) => {
                self.advance();
                Statement::Continue {
                    lexeme,
                    location: loc,
                }
            }
            _ => {
                let expression = self.parse_expression()?;
                Statement::Expression {
                    expression,
                    location: loc,
                }
            }
        };

        self.expect_end_of_line()?;
        Ok(statement)
    }

    fn expect_end_of_line(&mut self) -> Result<(), SyntaxError> {
        if self.match_token(&Token::Newline(self.current_location())) || self.is_at_end() {
            Ok(())
        } else {
            Err(self.error(format!(
                "MissingEndOfLine: previous: {}",
                self.previous().lexeme()
            )))
        }
    }

    fn parse_variable_name(&mut self, missing: &str) -> Result<String, SyntaxError> {
        match self.peek_token() {
            Token::Number(n, _) => Err(self.error(format!(
                "InvalidNumericVariableName: name: {}",
                crate::runtime::value::format_number(n)
            ))),
            Token::Identifier(name, _) => {
                self.advance();
                if let Token::Identifier(second, _) = self.peek_token() {
                    return Err(self.error(format!(
                        "UnexpectedSpaceInIdentifier: first_half: {}, second_half: {}",
                        name, second
                    )));
                }
                Ok(name)
            }
            _ => Err(self.error(missing)),
        }
    }

    fn expect_to(&mut self, name: &str) -> Result<(), SyntaxError> {
        if self.check(&Token::Eq(self.current_location())) {
            return Err(self.error("UnexpectedEqualsForAssignmentUseSetInstead"));
        }
        self.expect_token(
            &Token::To(self.current_location()),
            &format!("MissingToAfterVariableNameToInitializeValue: name: {}", name),
        )
    }

    fn parse_set(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        let name = self.parse_variable_name("MissingVariableNameInSetStatement")?;
        self.expect_to(&name)?;
        let value = self.parse_expression()?;
        Ok(Statement::Set {
            name,
            value,
            location: loc,
        })
    }

    /// `change x to v` or `change x[i][j] to v`.
    fn parse_change(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        let name_loc = self.current_location();
        let name = self.parse_variable_name("MissingVariableNameInChangeStatement")?;

        let mut indexes = Vec::new();
        while self.match_token(&Token::LBracket(self.current_location())) {
            indexes.push(self.parse_expression()?);
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "MissingRightBracketAfterFieldNameOrIndex",
            )?;
        }

        self.expect_to(&name)?;
        let value = self.parse_expression()?;

        let Some(index) = indexes.pop() else {
            return Ok(Statement::Change {
                name,
                value,
                location: loc,
            });
        };

        let mut object = Expression::Variable {
            name,
            location: name_loc,
        };
        for inner in indexes {
            let location = inner.location();
            object = Expression::Index {
                object: Box::new(object),
                index: Box::new(inner),
                location,
            };
        }
        Ok(Statement::ChangeElement {
            object,
            index,
            value,
            location: loc,
        })
    }

    fn expect_do(&mut self, block_type: &str) -> Result<(), SyntaxError> {
        self.expect_token(
            &Token::Do(self.current_location()),
            &format!("MissingDoToStartBlock: type: {}", block_type),
        )?;
        self.expect_end_of_line()
    }

    /// Statements up to (not including) `end` or `else`.
    fn parse_block(&mut self, block_type: &str) -> Result<Vec<Statement>, SyntaxError> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::End(_) => {
                    self.advance();
                    return Ok(body);
                }
                Token::Else(_) if block_type == "if" || block_type == "else" => return Ok(body),
                Token::Eof(_) => {
                    return Err(self.error(format!("MissingEndAfterBlock: type: {}", block_type)))
                }
                _ => body.push(self.parse_statement(false)?),
            }
        }
    }

    fn parse_if(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        let condition = self.parse_expression()?;
        self.expect_do("if")?;
        let then_branch = self.parse_block("if")?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            if self.check(&Token::If(self.current_location())) {
                let else_if_loc = self.current_location();
                self.advance();
                Some(vec![self.parse_if(else_if_loc)?])
            } else {
                self.expect_do("else")?;
                let body = self.parse_block("else")?;
                if self.check(&Token::Else(self.current_location())) {
                    return Err(self.error("UnexpectedElseAfterElseBlock"));
                }
                self.expect_end_of_line()?;
                Some(body)
            }
        } else {
            self.expect_end_of_line()?;
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    fn parse_repeat(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        let count = self.parse_expression()?;
        self.expect_token(
            &Token::Times(self.current_location()),
            "MissingTimesInRepeat",
        )?;
        self.expect_do("repeat")?;
        let body = self.parse_block("repeat")?;
        self.expect_end_of_line()?;
        Ok(Statement::Repeat {
            count,
            body,
            location: loc,
        })
    }

    fn parse_foreach(&mut self, loc: SourceLocation) -> Result<Statement, SyntaxError> {
        self.expect_token(
            &Token::Each(self.current_location()),
            "MissingEachAfterForKeyword",
        )?;
        let element = self.expect_identifier("MissingElementNameAfterForeachKeyword")?;
        self.expect_token(
            &Token::In(self.current_location()),
            "MissingInAfterElementNameInForeach",
        )?;
        let iterable = self.parse_expression()?;
        self.expect_do("for")?;
        let body = self.parse_block("for")?;
        self.expect_end_of_line()?;
        Ok(Statement::Foreach {
            element,
            iterable,
            body,
            location: loc,
        })
    }

    fn parse_function(&mut self, loc: SourceLocation, top_level: bool) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier("MissingFunctionNameInDeclaration")?;
        if !top_level {
            return Err(SyntaxError::new(
                format!("NestedFunctionDeclaration: name: {}", name),
                loc,
            ));
        }

        let mut params = Vec::new();
        if self.match_token(&Token::With(self.current_location())) {
            loop {
                let param = self.expect_identifier("MissingParameterNameInFunctionDeclaration")?;
                params.push(param);
                if self.match_token(&Token::Comma(self.current_location())) {
                    continue;
                }
                if let Token::Identifier(_, _) = self.peek() {
                    return Err(self.error("MissingCommaBetweenFunctionParameters"));
                }
                break;
            }
        } else if !self.check(&Token::Do(self.current_location()))
            && !self.check(&Token::Newline(self.current_location()))
        {
            return Err(self.error("MissingWithBeforeParametersInFunction"));
        }

        self.expect_do("function")?;
        let body = self.parse_block("function")?;
        self.expect_end_of_line()?;
        Ok(Statement::Function(FunctionDecl {
            name,
            params,
            body,
            location: loc,
        }))
    }
}
