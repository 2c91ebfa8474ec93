//! Expression parsing
//!
//! Precedence, loosest first: assignment, ternary, `||`, `&&`, equality,
//! comparison, additive, multiplicative, prefix unary, postfix update, then
//! calls, member access and indexing.

use super::Parser;
use crate::javascript::ast::*;
use crate::javascript::lexer::Token;
use crate::syntax::SyntaxError;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression, SyntaxError> {
        let target = self.parse_conditional()?;

        let location = self.current_location();
        let op = match self.peek() {
            Token::Assign(_) => AssignOp::Assign,
            Token::PlusAssign(_) => AssignOp::Add,
            Token::MinusAssign(_) => AssignOp::Subtract,
            Token::StarAssign(_) => AssignOp::Multiply,
            Token::SlashAssign(_) => AssignOp::Divide,
            _ => return Ok(target),
        };
        self.advance();

        if !is_assignable(&target) {
            return Err(self.error("InvalidAssignmentTarget"));
        }

        let value = self.parse_assignment()?;
        Ok(Expression::Assignment {
            target: Box::new(target),
            op,
            value: Box::new(value),
            location,
        })
    }

    fn parse_conditional(&mut self) -> Result<Expression, SyntaxError> {
        let test = self.parse_or()?;

        if !self.match_token(&Token::Question(self.current_location())) {
            return Ok(test);
        }
        let location = self.previous_location();
        let consequent = self.parse_assignment()?;
        self.expect_token(
            &Token::Colon(self.current_location()),
            "MissingColonInTernary",
        )?;
        let alternate = self.parse_assignment()?;

        Ok(Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            location,
        })
    }

    fn parse_or(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.match_token(&Token::OrOr(self.current_location())) {
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
        while self.match_token(&Token::AndAnd(self.current_location())) {
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
                Token::EqEqEq(_) => BinaryOp::StrictEqual,
                Token::NotEqEq(_) => BinaryOp::StrictNotEqual,
                Token::EqEq(_) => BinaryOp::LooseEqual,
                Token::NotEq(_) => BinaryOp::LooseNotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(left, op, right, location);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_additive()?;
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
            let right = self.parse_additive()?;
            left = binary(left, op, right, location);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let location = self.current_location();
            let op = match self.peek() {
                Token::Plus(_) => BinaryOp::Add,
                Token::Minus(_) => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right, location);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, SyntaxError> {
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
            left = binary(left, op, right, location);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.current_location();
        let op = match self.peek() {
            Token::Bang(_) => UnaryOp::Not,
            Token::Minus(_) => UnaryOp::Negate,
            Token::Plus(_) => UnaryOp::Plus,
            Token::PlusPlus(_) | Token::MinusMinus(_) => {
                let op = if matches!(self.advance(), Token::PlusPlus(_)) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                let target = self.parse_unary()?;
                if !is_assignable(&target) {
                    return Err(self.error("InvalidUpdateTarget"));
                }
                return Ok(Expression::Update {
                    target: Box::new(target),
                    op,
                    prefix: true,
                    location,
                });
            }
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
        let expr = self.parse_call()?;

        let op = match self.peek() {
            Token::PlusPlus(_) => UpdateOp::Increment,
            Token::MinusMinus(_) => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        let location = self.current_location();
        self.advance();

        if !is_assignable(&expr) {
            return Err(self.error("InvalidUpdateTarget"));
        }
        Ok(Expression::Update {
            target: Box::new(expr),
            op,
            prefix: false,
            location,
        })
    }

    fn parse_call(&mut self) -> Result<Expression, SyntaxError> {
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();
            if self.match_token(&Token::LParen(location)) {
                let args = self.parse_arguments()?;
                // calls are located at their callee, e.g. the `c` of `console.log(…)`
                let location = expr.location();
                expr = Expression::Call {
                    callee: Box::new(expr),
                    args,
                    location,
                };
            } else if self.match_token(&Token::Dot(location)) {
                let property = self.expect_identifier("MissingPropertyNameAfterDot")?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property,
                    location,
                };
            } else if self.match_token(&Token::LBracket(location)) {
                let index = self.parse_expression()?;
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "MissingRightBracketAfterIndex",
                )?;
                expr = Expression::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    location,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        let mut args = Vec::new();
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }
        self.expect_token(
            &Token::RParen(self.current_location()),
            "MissingRightParenthesisAfterArguments",
        )?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.current_location();
        let literal = |value| Expression::Literal { value, location };

        let expr = match self.peek_token() {
            Token::Number(n, _) => literal(Literal::Number(n)),
            Token::String(s, _) => literal(Literal::String(s)),
            Token::True(_) => literal(Literal::Boolean(true)),
            Token::False(_) => literal(Literal::Boolean(false)),
            Token::Null(_) => literal(Literal::Null),
            Token::Undefined(_) => literal(Literal::Undefined),
            Token::Identifier(name, _) => Expression::Identifier { name, location },
            Token::LParen(_) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "MissingRightParenthesisAfterExpression",
                )?;
                return Ok(Expression::Grouping {
                    inner: Box::new(inner),
                    location,
                });
            }
            Token::LBracket(_) => {
                self.advance();
                let elements = self.parse_array_elements()?;
                return Ok(Expression::Array { elements, location });
            }
            Token::LBrace(_) => {
                self.advance();
                let properties = self.parse_object_properties()?;
                return Ok(Expression::Object {
                    properties,
                    location,
                });
            }
            other => return Err(self.error(format!("MissingExpression: found: {}", other))),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_array_elements(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        let mut elements = Vec::new();
        while !self.check(&Token::RBracket(self.current_location())) {
            elements.push(self.parse_assignment()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_token(
            &Token::RBracket(self.current_location()),
            "MissingRightBracketAfterArrayElements",
        )?;
        Ok(elements)
    }

    /// `{ key: value, "quoted key": value }`; trailing commas allowed.
    fn parse_object_properties(&mut self) -> Result<Vec<(String, Expression)>, SyntaxError> {
        let mut properties = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            let key = match self.peek_token() {
                Token::Identifier(key, _) | Token::String(key, _) => key,
                other => {
                    return Err(self.error(format!("InvalidPropertyName: found: {}", other)))
                }
            };
            self.advance();
            self.expect_token(
                &Token::Colon(self.current_location()),
                "MissingColonAfterPropertyName",
            )?;
            let value = self.parse_assignment()?;
            properties.push((key, value));
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_token(
            &Token::RBrace(self.current_location()),
            "MissingRightBraceAfterObjectProperties",
        )?;
        Ok(properties)
    }
}

fn binary(
    left: Expression,
    op: BinaryOp,
    right: Expression,
    location: crate::syntax::SourceLocation,
) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        location,
    }
}

fn is_assignable(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::Identifier { .. } | Expression::Member { .. } | Expression::Index { .. }
    )
}

#[cfg(test)]
mod tests {
    use crate::javascript::ast::*;
    use crate::javascript::parser::parse;

    fn expression(source: &str) -> Expression {
        match parse(source).unwrap().statements.remove(0) {
            Statement::Expression { expression, .. } => expression,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        match expression("a = b = 1") {
            Expression::Assignment { value, .. } => {
                assert!(matches!(*value, Expression::Assignment { .. }));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_member_call() {
        match expression("console.log(1, 2)") {
            Expression::Call { callee, args, .. } => {
                assert_eq!(callee.callee_name().as_deref(), Some("console.log"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_and_prefix_update() {
        assert!(matches!(expression("i++"), Expression::Update { prefix: false, .. }));
        assert!(matches!(expression("--i"), Expression::Update { prefix: true, .. }));
    }

    #[test]
    fn test_ternary() {
        assert!(matches!(expression("a ? 1 : 2"), Expression::Conditional { .. }));
    }

    #[test]
    fn test_object_literal() {
        match expression("({ x: 1, \"y\": [2, 3], })") {
            Expression::Grouping { inner, .. } => match *inner {
                Expression::Object { properties, .. } => assert_eq!(properties.len(), 2),
                other => panic!("Expected object, got {:?}", other),
            },
            other => panic!("Expected grouping, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("1 = 2").unwrap_err();
        assert_eq!(err.message, "InvalidAssignmentTarget");
    }
}
