mod token;
mod tokens;

pub use token::*;
pub use tokens::*;

use once_cell::sync::Lazy;
use std::collections::HashMap;

static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("fn", Token::Function);
    m.insert("let", Token::Let);
    m.insert("true", Token::True);
    m.insert("false", Token::False);
    m.insert("if", Token::If);
    m.insert("else", Token::Else);
    m.insert("return", Token::Return);
    m.insert("do", Token::Do);
    m.insert("while", Token::While);
    m.insert("for", Token::For);
    m.insert("break", Token::Break);
    m.insert("continue", Token::Continue);
    m.insert("null", Token::Null);

    m
});

/// Turns M source text into a stream of tokens. Characters outside the
/// language yield [`Token::Illegal`] instead of failing the whole scan; the
/// parser reports them when it trips over one.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = vec![];

        loop {
            self.eat_whitespace();

            let Some(&next) = self.chars.get(self.pos) else {
                break;
            };

            let token = match next {
                c if c.is_alphabetic() || c == '_' => self.lex_identifier(),
                '0'..='9' => self.lex_number(),
                '"' | '\'' => self.lex_string(next),
                _ => self.lex_operator(),
            };
            tokens.push(token);
        }

        tokens
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.get(self.pos).copied();
        self.pos += 1;
        next
    }

    fn eat_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek() {
            self.pos += 1;
        }
    }

    fn lex_identifier(&mut self) -> Token {
        let mut stack = vec![];

        while let Some(next) = self.peek() {
            if !next.is_alphanumeric() && next != '_' {
                break;
            }
            stack.push(next);
            self.pos += 1;
        }

        let read = stack.iter().collect::<String>();

        match KEYWORDS.get(read.as_str()) {
            Some(keyword) => keyword.clone(),
            None => Token::Ident(read),
        }
    }

    fn lex_number(&mut self) -> Token {
        let mut stack = vec![];

        while let Some(next @ '0'..='9') = self.peek() {
            stack.push(next);
            self.pos += 1;
        }

        // a dot only belongs to the literal when a digit follows it
        if self.peek() == Some('.') && matches!(self.peek_next(), Some('0'..='9')) {
            stack.push('.');
            self.pos += 1;
            while let Some(next @ '0'..='9') = self.peek() {
                stack.push(next);
                self.pos += 1;
            }
            return Token::Float(stack.iter().collect());
        }

        Token::Int(stack.iter().collect())
    }

    fn lex_string(&mut self, quote: char) -> Token {
        self.pos += 1;

        let mut value = String::new();
        while let Some(next) = self.advance() {
            match next {
                c if c == quote => break,
                '\\' => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some(c) if c == quote => value.push(quote),
                    // unrecognized escapes keep the backslash verbatim
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => break,
                },
                c => value.push(c),
            }
        }

        Token::Str(value)
    }

    fn lex_operator(&mut self) -> Token {
        let Some(next) = self.advance() else {
            return Token::Eof;
        };

        match next {
            '=' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::Eq
            }
            '=' => Token::Reassign,
            '!' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::NotEq
            }
            '!' => Token::Bang,
            '<' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::Lte
            }
            '<' => Token::Lt,
            '>' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::Gte
            }
            '>' => Token::Gt,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' => Token::Colon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            other => Token::Illegal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_alphabetic_id() {
        let lexer = Lexer::new("letter");

        assert_eq!(vec![Token::Ident("letter".into())], lexer.lex())
    }

    #[test]
    fn test_lex_numeric() {
        let lexer = Lexer::new("1337");

        assert_eq!(vec![Token::Int("1337".into())], lexer.lex())
    }

    #[test]
    fn test_lex_float() {
        let lexer = Lexer::new("13.37");

        assert_eq!(vec![Token::Float("13.37".into())], lexer.lex())
    }

    #[test]
    fn test_lex_int_followed_by_dot() {
        let lexer = Lexer::new("1.");

        assert_eq!(
            vec![Token::Int("1".into()), Token::Illegal(".".into())],
            lexer.lex()
        )
    }

    #[test]
    fn test_lex_function() {
        let lexer = Lexer::new("fn () {}");

        assert_eq!(
            vec![
                Token::Function,
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
            ],
            lexer.lex()
        );
    }

    #[test]
    fn test_lex_let() {
        let lexer = Lexer::new("let foo = 42;");

        assert_eq!(
            vec![
                Token::Let,
                Token::Ident("foo".into()),
                Token::Reassign,
                Token::Int("42".into()),
                Token::Semicolon,
            ],
            lexer.lex()
        );
    }

    #[test]
    fn test_lex_multichar_operators() {
        let lexer = Lexer::new("== != <= >= = ! < >");

        assert_eq!(
            vec![
                Token::Eq,
                Token::NotEq,
                Token::Lte,
                Token::Gte,
                Token::Reassign,
                Token::Bang,
                Token::Lt,
                Token::Gt,
            ],
            lexer.lex()
        );
    }

    #[test]
    fn test_lex_string_escapes() {
        let lexer = Lexer::new(r#""Hello\tWorld!\n""#);

        assert_eq!(vec![Token::Str("Hello\tWorld!\n".into())], lexer.lex());
    }

    #[test]
    fn test_lex_single_quoted_string() {
        let lexer = Lexer::new(r"'it\'s'");

        assert_eq!(vec![Token::Str("it's".into())], lexer.lex());
    }

    #[test]
    fn test_lex_unknown_escape_kept_verbatim() {
        let lexer = Lexer::new(r#""a\qb""#);

        assert_eq!(vec![Token::Str("a\\qb".into())], lexer.lex());
    }

    #[test]
    fn test_lex_illegal_char() {
        let lexer = Lexer::new("1 @ 2");

        assert_eq!(
            vec![
                Token::Int("1".into()),
                Token::Illegal("@".into()),
                Token::Int("2".into()),
            ],
            lexer.lex()
        );
    }

    #[test]
    fn test_lex_keywords() {
        let lexer = Lexer::new("if else while do for break continue return null true false");

        assert_eq!(
            vec![
                Token::If,
                Token::Else,
                Token::While,
                Token::Do,
                Token::For,
                Token::Break,
                Token::Continue,
                Token::Return,
                Token::Null,
                Token::True,
                Token::False,
            ],
            lexer.lex()
        );
    }
}
