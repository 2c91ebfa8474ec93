//! Lexer for JikiScript
//!
//! Converts source text into a flat [`Token`] stream. Unlike most languages
//! newlines are significant: they terminate statements, so the lexer emits a
//! [`Token::Newline`] for each one (runs of blank lines collapse into one).
//!
//! Number literals are validated here so learners get targeted messages such
//! as `NumberStartsWithZero: suggestion: 123`.

use crate::syntax::{SourceLocation, SyntaxError};
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries its [`SourceLocation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64, SourceLocation),
    String(String, SourceLocation),
    Identifier(String, SourceLocation),

    // Keywords
    Set(SourceLocation),
    To(SourceLocation),
    Change(SourceLocation),
    Log(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    Do(SourceLocation),
    End(SourceLocation),
    Repeat(SourceLocation),
    Times(SourceLocation),
    For(SourceLocation),
    Each(SourceLocation),
    In(SourceLocation),
    Function(SourceLocation),
    With(SourceLocation),
    Return(SourceLocation),
    Break(SourceLocation),
    /// `next` or `continue`; the lexeme is kept for error messages.
    Continue(String, SourceLocation),
    And(SourceLocation),
    Or(SourceLocation),
    Not(SourceLocation),
    Is(SourceLocation),
    Equals(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Null(SourceLocation),

    // Operators
    Plus(SourceLocation),
    Minus(SourceLocation),
    Star(SourceLocation),
    Slash(SourceLocation),
    Percent(SourceLocation),
    EqEq(SourceLocation),
    NotEq(SourceLocation),
    Bang(SourceLocation),
    Lt(SourceLocation),
    Le(SourceLocation),
    Gt(SourceLocation),
    Ge(SourceLocation),
    /// A lone `=`, only ever reported as an error.
    Eq(SourceLocation),

    // Punctuation
    LParen(SourceLocation),
    RParen(SourceLocation),
    LBracket(SourceLocation),
    RBracket(SourceLocation),
    LBrace(SourceLocation),
    RBrace(SourceLocation),
    Comma(SourceLocation),
    Colon(SourceLocation),

    Newline(SourceLocation),
    Eof(SourceLocation),
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc)
            | Token::String(_, loc)
            | Token::Identifier(_, loc)
            | Token::Continue(_, loc) => *loc,
            Token::Set(loc)
            | Token::To(loc)
            | Token::Change(loc)
            | Token::Log(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::Do(loc)
            | Token::End(loc)
            | Token::Repeat(loc)
            | Token::Times(loc)
            | Token::For(loc)
            | Token::Each(loc)
            | Token::In(loc)
            | Token::Function(loc)
            | Token::With(loc)
            | Token::Return(loc)
            | Token::Break(loc)
            | Token::And(loc)
            | Token::Or(loc)
            | Token::Not(loc)
            | Token::Is(loc)
            | Token::Equals(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Null(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Bang(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::Eq(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::Comma(loc)
            | Token::Colon(loc)
            | Token::Newline(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Source text of the token as the learner typed it.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Number(n, _) => crate::runtime::value::format_number(*n),
            Token::String(s, _) => format!("\"{}\"", s),
            Token::Identifier(name, _) | Token::Continue(name, _) => name.clone(),
            Token::Set(_) => "set".into(),
            Token::To(_) => "to".into(),
            Token::Change(_) => "change".into(),
            Token::Log(_) => "log".into(),
            Token::If(_) => "if".into(),
            Token::Else(_) => "else".into(),
            Token::Do(_) => "do".into(),
            Token::End(_) => "end".into(),
            Token::Repeat(_) => "repeat".into(),
            Token::Times(_) => "times".into(),
            Token::For(_) => "for".into(),
            Token::Each(_) => "each".into(),
            Token::In(_) => "in".into(),
            Token::Function(_) => "function".into(),
            Token::With(_) => "with".into(),
            Token::Return(_) => "return".into(),
            Token::Break(_) => "break".into(),
            Token::And(_) => "and".into(),
            Token::Or(_) => "or".into(),
            Token::Not(_) => "not".into(),
            Token::Is(_) => "is".into(),
            Token::Equals(_) => "equals".into(),
            Token::True(_) => "true".into(),
            Token::False(_) => "false".into(),
            Token::Null(_) => "null".into(),
            Token::Plus(_) => "+".into(),
            Token::Minus(_) => "-".into(),
            Token::Star(_) => "*".into(),
            Token::Slash(_) => "/".into(),
            Token::Percent(_) => "%".into(),
            Token::EqEq(_) => "==".into(),
            Token::NotEq(_) => "!=".into(),
            Token::Bang(_) => "!".into(),
            Token::Lt(_) => "<".into(),
            Token::Le(_) => "<=".into(),
            Token::Gt(_) => ">".into(),
            Token::Ge(_) => ">=".into(),
            Token::Eq(_) => "=".into(),
            Token::LParen(_) => "(".into(),
            Token::RParen(_) => ")".into(),
            Token::LBracket(_) => "[".into(),
            Token::RBracket(_) => "]".into(),
            Token::LBrace(_) => "{".into(),
            Token::RBrace(_) => "}".into(),
            Token::Comma(_) => ",".into(),
            Token::Colon(_) => ":".into(),
            Token::Newline(_) => "\\n".into(),
            Token::Eof(_) => "".into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Newline(_) => write!(f, "end of line"),
            Token::Eof(_) => write!(f, "end of file"),
            other => write!(f, "'{}'", other.lexeme()),
        }
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
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            self.skip_blanks_and_comments();

            if self.is_at_end() {
                if !matches!(tokens.last(), None | Some(Token::Newline(_))) {
                    tokens.push(Token::Newline(self.current_location()));
                }
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            let token = self.next_token()?;
            if let Token::Newline(_) = token {
                // collapse blank lines; leading newlines carry no meaning
                if matches!(tokens.last(), None | Some(Token::Newline(_))) {
                    continue;
                }
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::Eof(loc)),
        };

        let token = match ch {
            '\n' => Token::Newline(loc),
            '"' => return self.string_literal(loc),
            '0'..='9' => return self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => return Ok(self.identifier_or_keyword(ch, loc)),
            '+' => Token::Plus(loc),
            '-' => Token::Minus(loc),
            '*' => Token::Star(loc),
            '/' => Token::Slash(loc),
            '%' => Token::Percent(loc),
            '=' => {
                if self.match_char('=') {
                    // `===` reads the same as `==`
                    self.match_char('=');
                    Token::EqEq(loc)
                } else {
                    Token::Eq(loc)
                }
            }
            '!' => {
                if self.match_char('=') {
                    Token::NotEq(loc)
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
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '[' => Token::LBracket(loc),
            ']' => Token::RBracket(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),
            ',' => Token::Comma(loc),
            ':' => Token::Colon(loc),
            other => {
                return Err(SyntaxError::new(
                    format!("UnknownCharacter: character: {}", other),
                    loc,
                ))
            }
        };
        Ok(token)
    }

    /// Strings may not span lines.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, SyntaxError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::String(string, loc));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    match self.advance() {
                        Some('n') => string.push('\n'),
                        Some('t') => string.push('\t'),
                        Some(other) => string.push(other),
                        None => break,
                    }
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(SyntaxError::new(
            format!("MissingDoubleQuoteToTerminateString: string: {}", string),
            loc,
        ))
    }

    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        text.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

        if text.chars().any(|c| c.is_ascii_alphabetic() || c == '_') {
            return Err(SyntaxError::new(
                format!("NumberContainsAlpha: suggestion: {}", digits),
                loc,
            ));
        }
        if text.matches('.').count() > 1 {
            let mut parts = text.splitn(2, '.');
            let whole = parts.next().unwrap_or_default();
            let rest: String = parts.next().unwrap_or_default().replace('.', "");
            return Err(SyntaxError::new(
                format!("NumberWithMultipleDecimalPoints: suggestion: {}.{}", whole, rest),
                loc,
            ));
        }
        if text.ends_with('.') {
            return Err(SyntaxError::new(
                format!("NumberEndsWithDecimalPoint: suggestion: {}", text.trim_end_matches('.')),
                loc,
            ));
        }
        if text.len() > 1 && text.starts_with('0') && !text.starts_with("0.") {
            return Err(SyntaxError::new(
                format!("NumberStartsWithZero: suggestion: {}", text.trim_start_matches('0')),
                loc,
            ));
        }

        let value = text.parse::<f64>().map_err(|_| {
            SyntaxError::new(format!("InvalidNumber: number: {}", text), loc)
        })?;
        Ok(Token::Number(value, loc))
    }

    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "set" => Token::Set(loc),
            "to" => Token::To(loc),
            "change" => Token::Change(loc),
            "log" => Token::Log(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "do" => Token::Do(loc),
            "end" => Token::End(loc),
            "repeat" => Token::Repeat(loc),
            "times" => Token::Times(loc),
            "for" => Token::For(loc),
            "each" => Token::Each(loc),
            "in" => Token::In(loc),
            "function" => Token::Function(loc),
            "with" => Token::With(loc),
            "return" => Token::Return(loc),
            "break" => Token::Break(loc),
            "next" | "continue" => Token::Continue(ident, loc),
            "and" => Token::And(loc),
            "or" => Token::Or(loc),
            "not" => Token::Not(loc),
            "is" => Token::Is(loc),
            "equals" => Token::Equals(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "null" => Token::Null(loc),
            _ => Token::Identifier(ident, loc),
        }
    }

    /// Skip spaces, tabs and `//` comments, stopping at a newline.
    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
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
                _ => break,
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

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
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
    fn test_set_statement() {
        let tokens = lex("set x to 10");
        assert!(matches!(tokens[0], Token::Set(_)));
        assert!(matches!(tokens[1], Token::Identifier(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::To(_)));
        assert!(matches!(tokens[3], Token::Number(n, _) if n == 10.0));
        assert!(matches!(tokens[4], Token::Newline(_)));
        assert!(matches!(tokens[5], Token::Eof(_)));
    }

    #[test]
    fn test_blank_lines_collapse() {
        let tokens = lex("\n\nlog 1\n\n\nlog 2 // trailing\n");
        let newlines = tokens
            .iter()
            .filter(|t| matches!(t, Token::Newline(_)))
            .count();
        assert_eq!(newlines, 2);
        assert_eq!(tokens[0].location().line, 3);
    }

    #[test]
    fn test_next_keeps_lexeme() {
        let tokens = lex("next");
        assert!(matches!(tokens[0], Token::Continue(ref s, _) if s == "next"));
    }

    #[test]
    fn test_malformed_numbers() {
        let err = Lexer::new("set x to 00123").tokenize().unwrap_err();
        assert_eq!(err.message, "NumberStartsWithZero: suggestion: 123");

        let err = Lexer::new("1.3.4").tokenize().unwrap_err();
        assert_eq!(err.message, "NumberWithMultipleDecimalPoints: suggestion: 1.34");

        let err = Lexer::new("123.").tokenize().unwrap_err();
        assert_eq!(err.message, "NumberEndsWithDecimalPoint: suggestion: 123");

        let err = Lexer::new("set x to 123abc").tokenize().unwrap_err();
        assert_eq!(err.message, "NumberContainsAlpha: suggestion: 123");
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("\"abc\nsomething_else\"").tokenize().unwrap_err();
        assert_eq!(err.message, "MissingDoubleQuoteToTerminateString: string: abc");
    }
}
