//! Lexer for the JavaScript subset
//!
//! Whitespace and newlines are insignificant; semicolons are optional at the
//! end of a statement, so the parser never needs newline tokens. Strings may
//! use single or double quotes; template literals are not supported.

use crate::syntax::{SourceLocation, SyntaxError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64, SourceLocation),
    String(String, SourceLocation),
    Identifier(String, SourceLocation),

    // Keywords
    Let(SourceLocation),
    Const(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    Of(SourceLocation),
    Function(SourceLocation),
    Return(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),

    // Operators
    Plus(SourceLocation),
    Minus(SourceLocation),
    Star(SourceLocation),
    Slash(SourceLocation),
    Percent(SourceLocation),
    PlusPlus(SourceLocation),
    MinusMinus(SourceLocation),
    PlusAssign(SourceLocation),
    MinusAssign(SourceLocation),
    StarAssign(SourceLocation),
    SlashAssign(SourceLocation),
    Assign(SourceLocation),
    EqEq(SourceLocation),
    EqEqEq(SourceLocation),
    NotEq(SourceLocation),
    NotEqEq(SourceLocation),
    Lt(SourceLocation),
    Le(SourceLocation),
    Gt(SourceLocation),
    Ge(SourceLocation),
    AndAnd(SourceLocation),
    OrOr(SourceLocation),
    Bang(SourceLocation),
    Question(SourceLocation),
    Colon(SourceLocation),

    // Punctuation
    LParen(SourceLocation),
    RParen(SourceLocation),
    LBrace(SourceLocation),
    RBrace(SourceLocation),
    LBracket(SourceLocation),
    RBracket(SourceLocation),
    Semicolon(SourceLocation),
    Comma(SourceLocation),
    Dot(SourceLocation),

    Eof(SourceLocation),
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        use Token::*;
        match self {
            Number(_, loc) | String(_, loc) | Identifier(_, loc) => *loc,
            Let(loc) | Const(loc) | If(loc) | Else(loc) | While(loc) | For(loc) | Of(loc)
            | Function(loc) | Return(loc) | Break(loc) | Continue(loc) | True(loc)
            | False(loc) | Null(loc) | Undefined(loc) | Plus(loc) | Minus(loc) | Star(loc)
            | Slash(loc) | Percent(loc) | PlusPlus(loc) | MinusMinus(loc) | PlusAssign(loc)
            | MinusAssign(loc) | StarAssign(loc) | SlashAssign(loc) | Assign(loc)
            | EqEq(loc) | EqEqEq(loc) | NotEq(loc) | NotEqEq(loc) | Lt(loc) | Le(loc)
            | Gt(loc) | Ge(loc) | AndAnd(loc) | OrOr(loc) | Bang(loc) | Question(loc)
            | Colon(loc) | LParen(loc) | RParen(loc) | LBrace(loc) | RBrace(loc)
            | LBracket(loc) | RBracket(loc) | Semicolon(loc) | Comma(loc) | Dot(loc)
            | Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;
        let text = match self {
            Number(n, _) => crate::runtime::value::format_number(*n),
            String(s, _) => format!("\"{}\"", s),
            Identifier(name, _) => name.clone(),
            Let(_) => "let".into(),
            Const(_) => "const".into(),
            If(_) => "if".into(),
            Else(_) => "else".into(),
            While(_) => "while".into(),
            For(_) => "for".into(),
            Of(_) => "of".into(),
            Function(_) => "function".into(),
            Return(_) => "return".into(),
            Break(_) => "break".into(),
            Continue(_) => "continue".into(),
            True(_) => "true".into(),
            False(_) => "false".into(),
            Null(_) => "null".into(),
            Undefined(_) => "undefined".into(),
            Plus(_) => "+".into(),
            Minus(_) => "-".into(),
            Star(_) => "*".into(),
            Slash(_) => "/".into(),
            Percent(_) => "%".into(),
            PlusPlus(_) => "++".into(),
            MinusMinus(_) => "--".into(),
            PlusAssign(_) => "+=".into(),
            MinusAssign(_) => "-=".into(),
            StarAssign(_) => "*=".into(),
            SlashAssign(_) => "/=".into(),
            Assign(_) => "=".into(),
            EqEq(_) => "==".into(),
            EqEqEq(_) => "===".into(),
            NotEq(_) => "!=".into(),
            NotEqEq(_) => "!==".into(),
            Lt(_) => "<".into(),
            Le(_) => "<=".into(),
            Gt(_) => ">".into(),
            Ge(_) => ">=".into(),
            AndAnd(_) => "&&".into(),
            OrOr(_) => "||".into(),
            Bang(_) => "!".into(),
            Question(_) => "?".into(),
            Colon(_) => ":".into(),
            LParen(_) => "(".into(),
            RParen(_) => ")".into(),
            LBrace(_) => "{".into(),
            RBrace(_) => "}".into(),
            LBracket(_) => "[".into(),
            RBracket(_) => "]".into(),
            Semicolon(_) => ";".into(),
            Comma(_) => ",".into(),
            Dot(_) => ".".into(),
            Eof(_) => "end of file".into(),
        };
        write!(f, "{}", text)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            let loc = self.current_location();
            let Some(ch) = self.advance() else {
                tokens.push(Token::Eof(loc));
                break;
            };
            tokens.push(self.next_token(ch, loc)?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self, ch: char, loc: SourceLocation) -> Result<Token, SyntaxError> {
        let token = match ch {
            '"' | '\'' => return self.string_literal(ch, loc),
            '0'..='9' => return self.number_literal(ch, loc),
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                return Ok(self.identifier_or_keyword(ch, loc))
            }
            '+' => {
                if self.match_char('+') {
                    Token::PlusPlus(loc)
                } else if self.match_char('=') {
                    Token::PlusAssign(loc)
                } else {
                    Token::Plus(loc)
                }
            }
            '-' => {
                if self.match_char('-') {
                    Token::MinusMinus(loc)
                } else if self.match_char('=') {
                    Token::MinusAssign(loc)
                } else {
                    Token::Minus(loc)
                }
            }
            '*' => {
                if self.match_char('=') {
                    Token::StarAssign(loc)
                } else {
                    Token::Star(loc)
                }
            }
            '/' => {
                if self.match_char('=') {
                    Token::SlashAssign(loc)
                } else {
                    Token::Slash(loc)
                }
            }
            '%' => Token::Percent(loc),
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Token::EqEqEq(loc)
                    } else {
                        Token::EqEq(loc)
                    }
                } else {
                    Token::Assign(loc)
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Token::NotEqEq(loc)
                    } else {
                        Token::NotEq(loc)
                    }
                } else {
                    Token::Bang(loc)
                }
            }
            '<' => {
                if self.match_char('=') {
                    Token::Le(loc)
                } else {
                    Token::Lt(loc)
                }
            }
            '>' => {
                if self.match_char('=') {
                    Token::Ge(loc)
                } else {
                    Token::Gt(loc)
                }
            }
            '&' if self.match_char('&') => Token::AndAnd(loc),
            '|' if self.match_char('|') => Token::OrOr(loc),
            '?' => Token::Question(loc),
            ':' => Token::Colon(loc),
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),
            '[' => Token::LBracket(loc),
            ']' => Token::RBracket(loc),
            ';' => Token::Semicolon(loc),
            ',' => Token::Comma(loc),
            '.' => Token::Dot(loc),
            other => {
                return Err(SyntaxError::new(
                    format!("UnknownCharacter: character: {}", other),
                    loc,
                ))
            }
        };
        Ok(token)
    }

    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, SyntaxError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance();
                return Ok(Token::String(string, loc));
            }
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '\\' {
                match self.advance() {
                    Some('n') => string.push('\n'),
                    Some('t') => string.push('\t'),
                    Some(other) => string.push(other),
                    None => break,
                }
            } else {
                string.push(ch);
            }
        }

        Err(SyntaxError::new(
            format!("MissingQuoteToTerminateString: string: {}", string),
            loc,
        ))
    }

    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        text.push(first_digit);

        while let Some(ch) = self.peek() {
            let fraction_start = ch == '.'
                && !text.contains('.')
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit());
            if ch.is_ascii_digit() || fraction_start {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        text.parse::<f64>()
            .map(|value| Token::Number(value, loc))
            .map_err(|_| SyntaxError::new(format!("InvalidNumber: number: {}", text), loc))
    }

    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "let" => Token::Let(loc),
            "const" => Token::Const(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "for" => Token::For(loc),
            "of" => Token::Of(loc),
            "function" => Token::Function(loc),
            "return" => Token::Return(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "null" => Token::Null(loc),
            "undefined" => Token::Undefined(loc),
            _ => Token::Identifier(ident, loc),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    let loc = self.current_location();
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(SyntaxError::new("UnterminatedComment", loc));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    #[test]
    fn test_declaration() {
        let tokens = lex("let x = 5;");
        assert!(matches!(tokens[0], Token::Let(_)));
        assert!(matches!(tokens[1], Token::Identifier(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Assign(_)));
        assert!(matches!(tokens[3], Token::Number(n, _) if n == 5.0));
        assert!(matches!(tokens[4], Token::Semicolon(_)));
        assert!(matches!(tokens[5], Token::Eof(_)));
    }

    #[test]
    fn test_equality_operators() {
        let tokens = lex("a === b !== c == d != e");
        assert!(matches!(tokens[1], Token::EqEqEq(_)));
        assert!(matches!(tokens[3], Token::NotEqEq(_)));
        assert!(matches!(tokens[5], Token::EqEq(_)));
        assert!(matches!(tokens[7], Token::NotEq(_)));
    }

    #[test]
    fn test_member_access_after_number_literal() {
        let tokens = lex("xs[1].length");
        assert!(matches!(tokens[2], Token::Number(n, _) if n == 1.0));
        assert!(matches!(tokens[4], Token::Dot(_)));
    }

    #[test]
    fn test_comments_and_locations() {
        let tokens = lex("// first\n/* block\ncomment */ x");
        assert!(matches!(tokens[0], Token::Identifier(_, loc) if loc.line == 3));
    }

    #[test]
    fn test_single_quoted_string() {
        let tokens = lex("'hi there'");
        assert!(matches!(tokens[0], Token::String(ref s, _) if s == "hi there"));
    }

    #[test]
    fn test_template_literal_rejected() {
        let err = Lexer::new("`x`").tokenize().unwrap_err();
        assert_eq!(err.message, "UnknownCharacter: character: `");
    }
}
