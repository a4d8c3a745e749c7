//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, LineIndex, Span};
use logos::Logos;

/// Lexer for Compiscript source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    lines: LineIndex,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            lines: LineIndex::new(source),
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if self.at_eof {
            let len = self.inner.source().len();
            return Ok(Token::new(TokenKind::Eof, self.span(len, len)));
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let range = self.inner.span();
                Ok(Token::new(kind, self.span(range.start, range.end)))
            }
            Some(Err(())) => {
                let range = self.inner.span();
                Err(CompileError::lexer(
                    format!("unexpected character '{}'", self.inner.slice()),
                    self.span(range.start, range.end),
                ))
            }
            None => {
                self.at_eof = true;
                let len = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, self.span(len, len)))
            }
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(start, end).with_position(self.lines.position(self.source(), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Position;

    #[test]
    fn test_keywords() {
        let source = "let var const function class foreach in switch print";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Let));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Var));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Const));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Function));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Class));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Foreach));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::In));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Switch));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Print));
    }

    #[test]
    fn test_type_keywords_and_identifiers() {
        let source = "integer string boolean void integers _name x1";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::IntegerType));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::StringType));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::BooleanType));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::VoidType));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "integers"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "_name"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "x1"
        ));
    }

    #[test]
    fn test_operators() {
        let source = "+ - * / % == != < > <= >= && || ! = ? :";
        let kinds: Vec<TokenKind> = Lexer::new(source)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals_and_comments() {
        let source = "42 // trailing\n\"hola \\\"mundo\\\"\" /* block */ true";
        let mut lexer = Lexer::new(source);

        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::IntLiteral(s) if s == "42"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::StringLiteral(s) if s == "\"hola \\\"mundo\\\"\""
        ));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::True));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn test_token_positions() {
        let source = "let x;\n  x = 1;";
        let tokens = Lexer::new(source).tokenize_all().unwrap();

        assert_eq!(tokens[0].span.position(), Position::new(1, 0));
        assert_eq!(tokens[1].span.position(), Position::new(1, 4));
        assert_eq!(tokens[3].span.position(), Position::new(2, 2));
        assert_eq!(tokens[4].span.position(), Position::new(2, 4));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("let @");
        assert!(lexer.next_token().is_ok());

        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, CompileError::Lexer { .. }));
        assert!(err.to_string().contains("unexpected character '@'"));
    }
}
