//! Expression parsing
//!
//! Precedence, loosest first: `or`, `and`, equality (`is`, `equals`, `==`,
//! `!=`, `not equals`), comparison, `+ -`, `* / %`, unary (`not`, `!`, `-`),
//! then indexing and primaries.

use super::Parser;
use crate::jikiscript::ast::*;
use crate::jikiscript::lexer::Token;
use crate::syntax::SyntaxError;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or(self.current_location())) {
            let location = self.previous_location();
            let right = self.parse_and()?;
            left = Expression::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::And(self.current_location())) {
            let location = self.previous_location();
            let right = self.parse_equality()?;
            left = Expression::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_comparison()?;

        loop {
            let location = self.current_location();
            let op = match self.peek() {
                Token::Is(_) | Token::Equals(_) | Token::EqEq(_) => {
                    self.advance();
                    BinaryOp::Equal
                }
                Token::NotEq(_) => {
                    self.advance();
                    BinaryOp::NotEqual
                }
                Token::Not(_)
                    if self.check_ahead(1, &Token::Equals(location))
                        || self.check_ahead(1, &Token::Is(location)) =>
                {
                    self.advance();
                    self.advance();
                    BinaryOp::NotEqual
                }
                Token::Eq(_) => return Err(self.error("UnexpectedEqualsForEquality")),
                _ => break,
            };

            let right = self.parse_comparison()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_term()?;

        loop {
            let location = self.current_location();
            let op = match self.peek() {
                Token::Lt(_) => BinaryOp::Less,
                Token::Le(_) => BinaryOp::LessEqual,
                Token::Gt(_) => BinaryOp::Greater,
                Token::Ge(_) => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.advance();

            let right = self.parse_term()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_factor()?;

        loop {
            let location = self.current_location();
            let op = match self.peek() {
                Token::Plus(_) => BinaryOp::Add,
                Token::Minus(_) => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.parse_factor()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let location = self.current_location();
            let op = match self.peek() {
                Token::Star(_) => BinaryOp::Multiply,
                Token::Slash(_) => BinaryOp::Divide,
                Token::Percent(_) => BinaryOp::Remainder,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.current_location();
        let op = match self.peek() {
            Token::Not(_) | Token::Bang(_) => UnaryOp::Not,
            Token::Minus(_) => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = self.parse_unary()?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
            location,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expression, SyntaxError> {
        let mut expr = self.parse_primary()?;

        while self.match_token(&Token::LBracket(self.current_location())) {
            let location = self.previous_location();
            let index = self.parse_expression()?;
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "MissingRightBracketAfterFieldNameOrIndex",
            )?;
            expr = Expression::Index {
                object: Box::new(expr),
                index: Box::new(index),
                location,
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.current_location();
        let literal = |value| Expression::Literal { value, location };

        match self.peek_token() {
            Token::Number(n, _) => {
                self.advance();
                Ok(literal(Literal::Number(n)))
            }
            Token::String(s, _) => {
                self.advance();
                Ok(literal(Literal::String(s)))
            }
            Token::True(_) => {
                self.advance();
                Ok(literal(Literal::Boolean(true)))
            }
            Token::False(_) => {
                self.advance();
                Ok(literal(Literal::Boolean(false)))
            }
            Token::Null(_) => {
                self.advance();
                Ok(literal(Literal::Null))
            }
            Token::Identifier(name, _) => {
                self.advance();
                if self.match_token(&Token::LParen(self.current_location())) {
                    let args = self.parse_call_arguments()?;
                    Ok(Expression::Call {
                        callee: name,
                        args,
                        location,
                    })
                } else {
                    Ok(Expression::Variable { name, location })
                }
            }
            Token::LParen(_) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "MissingRightParenthesisAfterExpression",
                )?;
                Ok(Expression::Grouping {
                    inner: Box::new(inner),
                    location,
                })
            }
            Token::LBracket(_) => {
                self.advance();
                let elements = self.parse_list_elements()?;
                Ok(Expression::List { elements, location })
            }
            Token::LBrace(_) => {
                self.advance();
                let entries = self.parse_dictionary_entries()?;
                Ok(Expression::Dictionary { entries, location })
            }
            other => Err(self.error(format!("MissingExpression: found: {}", other))),
        }
    }

    /// Arguments after the opening `(`, consuming the closing `)`.
    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        let mut args = Vec::new();
        self.skip_newlines();

        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                args.push(self.parse_expression()?);
                self.skip_newlines();
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
                self.skip_newlines();
            }
        }

        self.expect_token(
            &Token::RParen(self.current_location()),
            "MissingRightParenthesisAfterFunctionCall",
        )?;
        Ok(args)
    }

    fn parse_list_elements(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        let mut elements = Vec::new();
        self.skip_newlines();

        if !self.check(&Token::RBracket(self.current_location())) {
            loop {
                elements.push(self.parse_expression()?);
                self.skip_newlines();
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
                self.skip_newlines();
            }
        }

        self.expect_token(
            &Token::RBracket(self.current_location()),
            "MissingRightBracketAfterListElements",
        )?;
        Ok(elements)
    }

    /// `{"key": value, …}`; keys must be string literals.
    fn parse_dictionary_entries(&mut self) -> Result<Vec<(String, Expression)>, SyntaxError> {
        let mut entries = Vec::new();
        self.skip_newlines();

        if !self.check(&Token::RBrace(self.current_location())) {
            loop {
                let key = match self.peek_token() {
                    Token::String(key, _) => {
                        self.advance();
                        key
                    }
                    other => {
                        return Err(self.error(format!(
                            "InvalidDictionaryKey: found: {}",
                            other
                        )))
                    }
                };
                self.expect_token(
                    &Token::Colon(self.current_location()),
                    "MissingColonAfterDictionaryKey",
                )?;
                self.skip_newlines();
                let value = self.parse_expression()?;
                entries.push((key, value));
                self.skip_newlines();
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
                self.skip_newlines();
            }
        }

        self.expect_token(
            &Token::RBrace(self.current_location()),
            "MissingRightBraceAfterDictionaryElements",
        )?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::jikiscript::ast::*;
    use crate::jikiscript::parser::parse;

    fn expression(source: &str) -> Expression {
        match parse(&format!("log {}", source)).unwrap().statements.remove(0) {
            Statement::Log { value, .. } => value,
            other => panic!("Expected log statement, got {:?}", other),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        match expression("1 + 2 * 3") {
            Expression::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expression::Binary { op: BinaryOp::Multiply, .. }));
            }
            other => panic!("Expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_natural_language_equality() {
        assert!(matches!(expression("x is 1"), Expression::Binary { op: BinaryOp::Equal, .. }));
        assert!(matches!(
            expression("x not equals 1"),
            Expression::Binary { op: BinaryOp::NotEqual, .. }
        ));
        assert!(matches!(
            expression("not x and y"),
            Expression::Logical { op: LogicalOp::And, .. }
        ));
    }

    #[test]
    fn test_call_and_index() {
        match expression("get_items(1, \"a\")[2]") {
            Expression::Index { object, .. } => match *object {
                Expression::Call { callee, args, .. } => {
                    assert_eq!(callee, "get_items");
                    assert_eq!(args.len(), 2);
                }
                other => panic!("Expected call, got {:?}", other),
            },
            other => panic!("Expected index, got {:?}", other),
        }
    }

    #[test]
    fn test_dictionary_literal() {
        match expression("{\"a\": 1, \"b\": [2]}") {
            Expression::Dictionary { entries, .. } => {
                assert_eq!(entries[0].0, "a");
                assert_eq!(entries[1].0, "b");
            }
            other => panic!("Expected dictionary, got {:?}", other),
        }
    }

    #[test]
    fn test_expression_errors() {
        let err = parse("log (1 + 2").unwrap_err();
        assert_eq!(err.message, "MissingRightParenthesisAfterExpression");

        let err = parse("log x = 1").unwrap_err();
        assert_eq!(err.message, "UnexpectedEqualsForEquality");

        let err = parse("log").unwrap_err();
        assert_eq!(err.message, "MissingExpression: found: end of line");
    }
}
