use std::iter::Peekable;

use crate::{
    diagnostics::Diagnostics,
    error::{Error, Result},
    expr::Expr,
    stmt::Stmt,
    token::*,
    value::Value,
};

const EQUALITY_TOKENS: &[&TokenKind] = &[
    &TokenKind::BangEqual,
    &TokenKind::EqualEqual,
];

const COMPARISON_TOKENS: &[&TokenKind] = &[
    &TokenKind::Greater,
    &TokenKind::GreaterEqual,
    &TokenKind::Less,
    &TokenKind::LessEqual,
];

const TERM_TOKENS: &[&TokenKind] = &[
    &TokenKind::Minus,
    &TokenKind::Plus,
];

const FACTOR_TOKENS: &[&TokenKind] = &[
    &TokenKind::Star,
    &TokenKind::Slash,
];

const UNARY_TOKENS: &[&TokenKind] = &[
    &TokenKind::Bang,
    &TokenKind::Minus,
];

const MAX_ARGUMENTS: usize = 255;

/// Recursive-descent parser. Syntax errors are collected rather than
/// returned: after each one the parser skips to the next statement boundary
/// and carries on, so a single pass can surface several of them.
pub struct Parser<T> {
    tokens: T,
    errors: Vec<Error>,
    line: usize,
    loop_depth: usize,
    function_depth: usize,
}

impl <T: Iterator<Item = Token>> Parser<Peekable<T>> {
    pub fn new(tokens: T) -> Self {
        let tokens = tokens.peekable();
        Parser {
            tokens,
            errors: Vec::new(),
            line: 1,
            loop_depth: 0,
            function_depth: 0,
        }
    }

    pub fn parse(&mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        tracing::debug!("parsing program");
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        tracing::debug!(statements = statements.len(), errors = self.errors.len(), "parsed program");
        diagnostics.extend(self.errors.drain(..));
        statements
    }

    /// Parses a single expression that must span the whole input.
    /// Non-fatal diagnostics raised on the way (such as an invalid
    /// assignment target) are returned as the error.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        let expr = self.expression()?;
        if let Some(e) = self.errors.drain(..).next() {
            return Err(e)
        }
        if !self.is_at_end() {
            return Err(Error::syntactic(self.current_token(), "Expect end of expression."))
        }
        Ok(expr)
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_single(&TokenKind::Fun).is_some() {
            self.function("function")
        } else if self.match_single(&TokenKind::Var).is_some() {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(statement) => Some(statement),
            Err(error) => {
                self.errors.push(error);
                self.synchronise();
                None
            },
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(&TokenKind::Identifier, "Expected variable name.")?;

        let initializer = if self.match_single(&TokenKind::Equal).is_some() {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(&TokenKind::Semicolon, "Expected ';' after variable declaration.")?;
        Ok(Stmt::new_var(name, initializer))
    }

    fn statement(&mut self) -> Result<Stmt> {
        if let Some(token) = self.match_single(&TokenKind::Break) {
            self.break_statement(token)
        } else if self.match_single(&TokenKind::For).is_some() {
            self.for_statement()
        } else if self.match_single(&TokenKind::If).is_some() {
            self.if_statement()
        } else if self.match_single(&TokenKind::Print).is_some() {
            self.print_statement()
        } else if let Some(token) = self.match_single(&TokenKind::Return) {
            self.return_statement(token)
        } else if self.match_single(&TokenKind::While).is_some() {
            self.while_statement()
        } else if self.match_single(&TokenKind::LeftBrace).is_some() {
            Ok(Stmt::new_block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    fn break_statement(&mut self, keyword: Token) -> Result<Stmt> {
        if self.loop_depth == 0 {
            self.errors.push(Error::syntactic(keyword.clone(), "Can't use 'break' outside of a loop."));
        }
        self.consume(&TokenKind::Semicolon, "Expected ';' after 'break'.")?;
        Ok(Stmt::new_break(keyword))
    }

    // for (init; cond; incr) body
    //   => { init; while (cond) { body; incr; } }
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(&TokenKind::LeftParen, "Expected '(' after 'for'.")?;

        let initializer = if self.match_single(&TokenKind::Semicolon).is_some() {
            None
        } else if self.match_single(&TokenKind::Var).is_some() {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check_next(&TokenKind::Semicolon) {
            self.expression()?
        } else { Expr::new_literal(Value::from(true)) };

        self.consume(&TokenKind::Semicolon, "Expected ';' after loop condition.")?;

        let increment = if !self.check_next(&TokenKind::RightParen) {
            Some(Stmt::new_expression(self.expression()?))
        } else { None };

        self.consume(&TokenKind::RightParen, "Expected ')' after for clauses.")?;

        let body = self.loop_body()?;

        let mut body_statements = vec![body];
        body_statements.extend(increment);
        let while_loop = Stmt::new_while(condition, Box::new(Stmt::new_block(body_statements)));

        let mut statements: Vec<Stmt> = initializer.into_iter().collect();
        statements.push(while_loop);
        Ok(Stmt::new_block(statements))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(&TokenKind::LeftParen, "Expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(&TokenKind::RightParen, "Expected ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_single(&TokenKind::Else).is_some() {
            Some(Box::new(self.statement()?))
        } else { None };

        Ok(Stmt::new_if(condition, then_branch, else_branch))
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "Expected ';' after value.")?;
        Ok(Stmt::new_print(expression))
    }

    fn return_statement(&mut self, keyword: Token) -> Result<Stmt> {
        if self.function_depth == 0 {
            self.errors.push(Error::syntactic(keyword.clone(), "Can't return from top-level code."));
        }
        let value = if !self.check_next(&TokenKind::Semicolon) {
            Some(self.expression()?)
        } else { None };
        self.consume(&TokenKind::Semicolon, "Expected ';' after return value.")?;
        Ok(Stmt::new_return(keyword, value))
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(&TokenKind::LeftParen, "Expected '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(&TokenKind::RightParen, "Expected ')' after condition.")?;
        let body = Box::new(self.loop_body()?);

        Ok(Stmt::new_while(condition, body))
    }

    fn loop_body(&mut self) -> Result<Stmt> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::new_expression(expression))
    }

    fn function(&mut self, kind: &str) -> Result<Stmt> {
        let name = self.consume(
            &TokenKind::Identifier,
            format!("Expected {} name.", kind).as_str()
        )?;
        self.consume(
            &TokenKind::LeftParen,
            format!("Expected '(' after {} name.", kind).as_str()
        )?;

        let mut params = Vec::new();
        if !self.check_next(&TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let token = self.current_token();
                    self.errors.push(Error::syntactic(token, "Can't have more than 255 parameters."));
                }
                params.push(self.consume(&TokenKind::Identifier, "Expected parameter name.")?);
                if self.match_single(&TokenKind::Comma).is_none() { break }
            }
        }

        self.consume(&TokenKind::RightParen, "Expected ')' after parameters.")?;
        self.consume(
            &TokenKind::LeftBrace,
            format!("Expected '{{' before {} body.", kind).as_str()
        )?;

        // A function body starts outside of any loop: `break` can't cross
        // a call boundary.
        let enclosing_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        self.loop_depth = enclosing_loops;

        Ok(Stmt::new_function(name, params, body?.into()))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check_next(&TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }

        self.consume(&TokenKind::RightBrace, "Expected '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;
        if let Some(equals) = self.match_single(&TokenKind::Equal) {
            let value = self.assignment()?;
            if let Expr::Variable(lhs) = expr {
                Ok(Expr::new_assign(lhs.name, Box::new(value)))
            } else {
                // Reported, but the parser isn't confused: keep going with
                // the left-hand side.
                self.errors.push(Error::syntactic(equals, "Invalid assignment target."));
                Ok(expr)
            }
        } else {
            Ok(expr)
        }
    }

    fn or(&mut self) -> Result<Expr> {
        let mut e = self.and()?;

        while let Some(op) = self.match_single(&TokenKind::Or) {
            let right = Box::new(self.and()?);
            e = Expr::new_logical(Box::new(e), op, right);
        }

        Ok(e)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut e = self.equality()?;

        while let Some(op) = self.match_single(&TokenKind::And) {
            let right = Box::new(self.equality()?);
            e = Expr::new_logical(Box::new(e), op, right);
        }

        Ok(e)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::comparison,
            EQUALITY_TOKENS
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::term,
            COMPARISON_TOKENS
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::factor,
            TERM_TOKENS
        )
    }

    fn factor(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::unary,
            FACTOR_TOKENS
        )
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(token) = self.match_any(UNARY_TOKENS) {
            let right = Box::new(self.unary()?);
            Ok(Expr::new_unary(token, right))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Result<Expr> {
        let mut e = self.primary()?;

        while self.match_single(&TokenKind::LeftParen).is_some() {
            e = self.finish_call(e)?;
        }

        Ok(e)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut args = Vec::new();

        if !self.check_next(&TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGUMENTS {
                    let token = self.current_token();
                    self.errors.push(Error::syntactic(token, "Can't have more than 255 arguments."));
                }
                args.push(self.expression()?);
                if self.match_single(&TokenKind::Comma).is_none() { break }
            }
        }
        let paren = self.consume(
            &TokenKind::RightParen,
            "Expected ')' after arguments."
        )?;

        Ok(Expr::new_call(Box::new(callee), paren, args))
    }

    fn primary(&mut self) -> Result<Expr> {
        let kind = self.tokens.peek().map(|t| t.kind.clone());

        let literal = match kind {
            Some(TokenKind::True) => Value::from(true),
            Some(TokenKind::False) => Value::from(false),
            Some(TokenKind::Nil) => Value::Nil,
            Some(TokenKind::Number(n)) => Value::from(n),
            Some(TokenKind::String(s)) => Value::from(s),
            Some(TokenKind::Identifier) => {
                let name = self.advance().ok_or_else(|| self.unexpected_end())?;
                return Ok(Expr::new_variable(name))
            },
            Some(TokenKind::LeftParen) => {
                self.advance();
                let expression = Box::new(self.expression()?);
                self.consume(&TokenKind::RightParen, "Expected ')' after expression.")?;
                return Ok(Expr::new_grouping(expression))
            },
            _ => return Err(Error::syntactic(self.current_token(), "Expect expression.")),
        };

        self.advance();
        Ok(Expr::new_literal(literal))
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens.peek().map_or(true, Token::is_eof)
    }

    /// Consumes the next token unless it's the end of input.
    fn advance(&mut self) -> Option<Token> {
        if self.is_at_end() {
            return None
        }
        let token = self.tokens.next()?;
        self.line = token.line;
        Some(token)
    }

    /// The token an error should point at. A stream that ran out without an
    /// explicit `EndOfFile` is treated as if it had one.
    fn current_token(&mut self) -> Token {
        match self.tokens.peek() {
            Some(token) => token.clone(),
            None => Token::new(TokenKind::EndOfFile, "", self.line),
        }
    }

    fn unexpected_end(&mut self) -> Error {
        Error::syntactic(self.current_token(), "Unexpected end of input.")
    }

    fn check_next(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek()
            .map(|t| &t.kind == kind)
            .unwrap_or(false)
    }

    fn consume(&mut self, kind: &TokenKind, error_msg: &str) -> Result<Token> {
        match self.match_single(kind) {
            Some(token) => Ok(token),
            None => Err(Error::syntactic(self.current_token(), error_msg)),
        }
    }

    fn match_binary_precedence_with_tokens(
        &mut self,
        parse: impl Fn(&mut Self) -> Result<Expr>,
        kinds: &[&TokenKind]
    ) -> Result<Expr> {
        let mut e = parse(self)?;

        while let Some(token) = self.match_any(kinds) {
            let right = Box::new(parse(self)?);
            e = Expr::new_binary(Box::new(e), token, right)
        }

        Ok(e)
    }

    fn match_single(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check_next(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn match_any(&mut self, kinds: &[&TokenKind]) -> Option<Token> {
        kinds.iter().find_map(|k| self.match_single(k))
    }

    fn synchronise(&mut self) {
        tracing::trace!(line = self.line, "synchronising after syntax error");
        while let Some(token) = self.advance() {
            if token.kind == TokenKind::Semicolon { return }

            if self.tokens.peek().map_or(true, |next| next.kind.starts_declaration()) {
                return
            }
        }
    }
}
