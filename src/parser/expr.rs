use crate::lexer::Token;

use super::{
    ast::{Expression, IndexExpression, InfixOperator, PrefixOperator},
    Parser,
};

/// Binding strength of an operator token, low to high. Unary operators bind
/// tighter than `+`/`-` but looser than `*`/`/`, so `-b*c` reads as
/// `(-(b*c))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Reassign,
    Equals,
    LessGreater,
    Sum,
    Prefix,
    Product,
    Call,
    Index,
    IndexColon,
}

fn token_precedence(token: &Token) -> Precedence {
    match token {
        Token::Reassign => Precedence::Reassign,
        Token::Eq | Token::NotEq => Precedence::Equals,
        Token::Lt | Token::Gt | Token::Lte | Token::Gte => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Asterisk | Token::Slash => Precedence::Product,
        Token::LParen => Precedence::Call,
        Token::LBracket => Precedence::Index,
        Token::Colon => Precedence::IndexColon,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(token: &Token) -> Option<InfixOperator> {
    let operator = match token {
        Token::Plus => InfixOperator::Plus,
        Token::Minus => InfixOperator::Minus,
        Token::Asterisk => InfixOperator::Asterisk,
        Token::Slash => InfixOperator::Slash,
        Token::Lt => InfixOperator::Lt,
        Token::Gt => InfixOperator::Gt,
        Token::Lte => InfixOperator::Lte,
        Token::Gte => InfixOperator::Gte,
        Token::Eq => InfixOperator::Eq,
        Token::NotEq => InfixOperator::NotEq,
        Token::Reassign => InfixOperator::Reassign,
        _ => return None,
    };
    Some(operator)
}

impl Parser {
    /// Pratt precedence climbing: parse a prefix expression for the current
    /// token, then keep folding infix expressions while the next token binds
    /// tighter than `precedence`. Stops at `;` and EOF.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.is_peek(&Token::Semicolon)
            && !self.is_peek(&Token::Eof)
            && precedence < token_precedence(&self.peek)
        {
            left = if infix_operator(&self.peek).is_some() {
                self.next_token();
                self.parse_infix_expression(left)?
            } else if self.is_peek(&Token::LParen) {
                self.next_token();
                self.parse_call_expression(left)?
            } else if self.is_peek(&Token::LBracket) {
                self.next_token();
                self.parse_index_expression(left)?
            } else {
                return Some(left);
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur.clone() {
            Token::Ident(name) => Some(Expression::Identifier(name)),
            Token::Int(literal) => self.parse_integer_literal(&literal),
            Token::Float(literal) => self.parse_float_literal(&literal),
            Token::Str(value) => Some(Expression::Str(value)),
            Token::True => Some(Expression::Boolean(true)),
            Token::False => Some(Expression::Boolean(false)),
            Token::Null => Some(Expression::Null),
            Token::Bang | Token::Minus => self.parse_prefix_expression(),
            Token::LParen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Function => self.parse_function_expression(),
            Token::LBracket => self.parse_array_expression(),
            Token::LBrace => self.parse_hash_expression(),
            Token::For => self.parse_for_expression(),
            Token::While => self.parse_while_expression(),
            Token::Do => self.parse_do_while_expression(),
            other => {
                self.append_error(format!(
                    "cannot parse token {} with literal {} as expression",
                    other.kind(),
                    other
                ));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self, literal: &str) -> Option<Expression> {
        match literal.parse::<u64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(err) => {
                self.append_error(format!("cannot parse {literal} as uint: {err}"));
                None
            }
        }
    }

    fn parse_float_literal(&mut self, literal: &str) -> Option<Expression> {
        match literal.parse::<f64>() {
            Ok(value) => Some(Expression::Float(value)),
            Err(err) => {
                self.append_error(format!("cannot parse {literal} as float: {err}"));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = match self.cur {
            Token::Minus => PrefixOperator::Minus,
            _ => PrefixOperator::Bang,
        };
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let Some(operator) = infix_operator(&self.cur) else {
            unreachable!()
        };

        let precedence = token_precedence(&self.cur);
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if !self.is_peek(&Token::RParen) {
            let got = self.peek.clone();
            self.append_token_error(&Token::RParen, &got);
            self.next_token();
            return None;
        }
        self.next_token();

        Some(expression)
    }

    /// `if (<EXPR>) <BLOCK>` with an optional `else <BLOCK>`.
    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.next_token();
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let condition = Box::new(self.parse_expression(Precedence::Lowest)?);
        self.next_token();
        if !self.is_cur(&Token::RParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RParen, &got);
            return None;
        }
        self.next_token();

        let consequence = self.parse_block()?;
        if !self.is_cur(&Token::RBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RBrace, &got);
            return None;
        }

        // no else branch is perfectly legal
        if !self.is_peek(&Token::Else) {
            return Some(Expression::If {
                condition,
                consequence,
                alternative: None,
            });
        }
        self.next_token();
        self.next_token();

        let alternative = self.parse_block()?;
        if !self.is_cur(&Token::RBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RBrace, &got);
            return None;
        }

        Some(Expression::If {
            condition,
            consequence,
            alternative: Some(alternative),
        })
    }

    /// `fn (<IDENT>, ...) <BLOCK>`
    fn parse_function_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let parameters = self.parse_function_parameters()?;
        if !self.is_cur(&Token::RParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RParen, &got);
            return None;
        }
        self.next_token();

        let body = self.parse_block()?;
        Some(Expression::Function { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let mut parameters = vec![];
        if self.is_cur(&Token::RParen) {
            return Some(parameters);
        }
        parameters.push(self.cur.to_string());

        while self.is_peek(&Token::Comma) {
            self.next_token();
            self.next_token();
            parameters.push(self.cur.to_string());
        }

        self.next_token();
        if !self.is_cur(&Token::RParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RParen, &got);
            return None;
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_call_arguments()?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let mut arguments = vec![];
        if self.is_cur(&Token::RParen) {
            return Some(arguments);
        }
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.is_peek(&Token::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.is_peek(&Token::RParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RParen, &got);
            return None;
        }
        self.next_token();

        Some(arguments)
    }

    fn parse_array_expression(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(Token::RBracket)?;
        Some(Expression::Array(elements))
    }

    fn parse_expression_list(&mut self, end: Token) -> Option<Vec<Expression>> {
        let mut list = vec![];
        if self.is_peek(&end) {
            self.next_token();
            return Some(list);
        }
        self.next_token();

        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.is_peek(&Token::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.is_peek(&end) {
            let got = self.peek.clone();
            self.append_token_error(&end, &got);
            return None;
        }
        self.next_token();

        Some(list)
    }

    /// `<EXPR>[start?:end?:stride?]`. Every slot is optional; the `*_set`
    /// flags track which colons were written so the empty index `a[]` and
    /// the full slice `a[::]` both parse (and are told apart at runtime).
    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let mut index = IndexExpression {
            left: Box::new(left),
            start: None,
            start_set: false,
            end: None,
            end_set: false,
            stride: None,
            stride_set: false,
        };

        self.next_token();
        if self.is_cur(&Token::RBracket) {
            return Some(Expression::Index(index));
        }

        // start index, up to : or ]
        if !self.is_cur(&Token::Colon) {
            index.start = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            index.start_set = true;
            self.next_token();
        }
        if self.is_cur(&Token::RBracket) {
            return Some(Expression::Index(index));
        }
        if !self.is_cur(&Token::Colon) {
            let literal = self.cur.to_string();
            self.append_error(format!("Expected : or ], but got: {literal}"));
            return None;
        }
        index.start_set = true;
        index.end_set = true;
        self.next_token();
        if self.is_cur(&Token::RBracket) {
            return Some(Expression::Index(index));
        }

        // end index, up to : or ]
        if !self.is_cur(&Token::Colon) {
            index.end = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            index.end_set = true;
            self.next_token();
        }
        if self.is_cur(&Token::RBracket) {
            return Some(Expression::Index(index));
        }
        if !self.is_cur(&Token::Colon) {
            let literal = self.cur.to_string();
            self.append_error(format!("Expected : or ], but got: {literal}"));
            return None;
        }
        index.stride_set = true;
        self.next_token();
        if self.is_cur(&Token::RBracket) {
            return Some(Expression::Index(index));
        }

        // stride, up to ]
        index.stride = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
        self.next_token();
        if !self.is_cur(&Token::RBracket) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RBracket, &got);
            return None;
        }

        Some(Expression::Index(index))
    }

    /// `{<EXPR>: <EXPR>, ...}` with keys kept in writing order.
    fn parse_hash_expression(&mut self) -> Option<Expression> {
        let mut pairs = vec![];

        self.next_token();
        while !self.is_cur(&Token::RBrace) && !self.is_cur(&Token::Eof) {
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.is_peek(&Token::Colon) {
                let got = self.peek.clone();
                self.append_token_error(&Token::Colon, &got);
                return None;
            }
            self.next_token();
            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.is_peek(&Token::RBrace) && !self.is_peek(&Token::Comma) {
                self.append_error(format!(
                    "expecting token RBRACE or COMMA, but got {} with literal {} instead",
                    self.peek.kind(),
                    self.peek
                ));
                return None;
            }
            if self.is_peek(&Token::Comma) {
                self.next_token();
            }
            self.next_token();
        }

        if !self.is_cur(&Token::RBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RBrace, &got);
            return None;
        }

        Some(Expression::Hash(pairs))
    }

    /// `for (<STMT>?; <EXPR>?; <STMT>?) <BLOCK>` with all three header
    /// clauses optional.
    fn parse_for_expression(&mut self) -> Option<Expression> {
        self.next_token();
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let init = if !self.is_cur(&Token::Semicolon) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        self.next_token();

        let test = if !self.is_cur(&Token::Semicolon) {
            let test = self.parse_expression(Precedence::Lowest)?;
            self.next_token();
            Some(Box::new(test))
        } else {
            None
        };
        self.next_token();

        let update = if !self.is_cur(&Token::RParen) {
            let update = self.parse_statement()?;
            self.next_token();
            Some(Box::new(update))
        } else {
            None
        };
        self.next_token();

        let body = self.parse_block()?;
        Some(Expression::For {
            init,
            test,
            update,
            body,
        })
    }

    /// `while (<EXPR>?) <BLOCK>`; an omitted test loops forever.
    fn parse_while_expression(&mut self) -> Option<Expression> {
        self.next_token();
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let test = if !self.is_cur(&Token::RParen) {
            let test = self.parse_expression(Precedence::Lowest)?;
            self.next_token();
            Some(Box::new(test))
        } else {
            None
        };
        self.next_token();

        if !self.is_cur(&Token::LBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LBrace, &got);
            return None;
        }
        let body = self.parse_block()?;

        Some(Expression::While { test, body })
    }

    /// `do <BLOCK> while (<EXPR>?)`
    fn parse_do_while_expression(&mut self) -> Option<Expression> {
        self.next_token();
        if !self.is_cur(&Token::LBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LBrace, &got);
            return None;
        }

        let body = self.parse_block()?;
        if !self.is_cur(&Token::RBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::RBrace, &got);
            return None;
        }
        self.next_token();

        if !self.is_cur(&Token::While) {
            let got = self.cur.clone();
            self.append_token_error(&Token::While, &got);
            return None;
        }
        self.next_token();
        if !self.is_cur(&Token::LParen) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LParen, &got);
            return None;
        }
        self.next_token();

        let test = if !self.is_cur(&Token::RParen) {
            let test = self.parse_expression(Precedence::Lowest)?;
            self.next_token();
            Some(Box::new(test))
        } else {
            None
        };

        Some(Expression::DoWhile { test, body })
    }
}
