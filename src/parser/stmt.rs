use crate::lexer::Token;

use super::{
    ast::{Block, Statement},
    expr::Precedence,
    Parser,
};

impl Parser {
    /// Parse a single statement, leaving `cur` on its final token (the
    /// optional trailing `;` included).
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            Token::Break => self.parse_break_statement(),
            Token::Continue => self.parse_continue_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `let <IDENT> = <EXPR>`
    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !matches!(self.peek, Token::Ident(_)) {
            let got = self.peek.clone();
            self.append_token_error(&Token::Ident(String::new()), &got);
            return None;
        }
        self.next_token();
        let Token::Ident(name) = self.cur.clone() else {
            unreachable!()
        };

        if !self.is_peek(&Token::Reassign) {
            let got = self.peek.clone();
            self.append_token_error(&Token::Reassign, &got);
            return None;
        }
        self.next_token();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.is_peek(&Token::Semicolon) {
            self.next_token();
        }

        Some(Statement::Let { name, value })
    }

    /// `return <EXPR>`
    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.is_peek(&Token::Semicolon) {
            self.next_token();
        }

        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;

        // expressions without a trailing ; are legal (e.g. the last line of
        // a repl entry), so a missing semicolon is not an error
        if self.is_peek(&Token::Semicolon) {
            self.next_token();
        }

        Some(Statement::Expression(expression))
    }

    fn parse_break_statement(&mut self) -> Option<Statement> {
        self.next_token();
        Some(Statement::Break)
    }

    fn parse_continue_statement(&mut self) -> Option<Statement> {
        self.next_token();
        Some(Statement::Continue)
    }

    /// Parse a braced block, as used by conditionals, loops and function
    /// bodies. Leaves `cur` on the closing `}`.
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        if !self.is_cur(&Token::LBrace) {
            let got = self.cur.clone();
            self.append_token_error(&Token::LBrace, &got);
            return None;
        }
        self.next_token();

        let mut block = Block::default();
        while !self.is_cur(&Token::RBrace) && !self.is_cur(&Token::Eof) {
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
            self.next_token();
        }

        Some(block)
    }
}
