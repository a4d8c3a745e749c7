//! Recursive descent parser for Compiscript

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for Compiscript
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Span of the last consumed token
    previous: Span,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous: Span::default(),
        })
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut statements = Vec::new();

        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program::new(statements))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        self.previous = prev.span;
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(CompileError::parser(
                format!("expected {}, found {}", kind, self.current.kind),
                self.current.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            let token = self.advance()?;
            Ok((name, token.span))
        } else {
            Err(CompileError::parser(
                format!("expected identifier, found {}", self.current.kind),
                self.current.span,
            ))
        }
    }

    /// Span from `start` through the last consumed token
    fn finish(&self, start: Span) -> Span {
        start.merge(self.previous)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;

        match &self.current.kind {
            TokenKind::Let | TokenKind::Var => {
                let decl = self.parse_var_decl()?;
                Ok(Stmt::new(StmtKind::VarDecl(decl), self.finish(start)))
            }
            TokenKind::Const => {
                let decl = self.parse_const_decl()?;
                Ok(Stmt::new(StmtKind::ConstDecl(decl), self.finish(start)))
            }
            TokenKind::Function => {
                let decl = self.parse_function_decl()?;
                Ok(Stmt::new(StmtKind::Function(decl), self.finish(start)))
            }
            TokenKind::Class => {
                let decl = self.parse_class_decl()?;
                Ok(Stmt::new(StmtKind::Class(decl), self.finish(start)))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Foreach => self.parse_foreach_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Break => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Break, self.finish(start)))
            }
            TokenKind::Continue => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Continue, self.finish(start)))
            }
            TokenKind::Return => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Return(value), self.finish(start)))
            }
            TokenKind::Print => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let value = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Print(value), self.finish(start)))
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Block(block), span))
            }
            _ => self.parse_simple_statement(true),
        }
    }

    /// Assignment or expression statement
    fn parse_simple_statement(&mut self, require_semi: bool) -> CompileResult<Stmt> {
        let start = self.current.span;
        let expr = self.parse_expression()?;

        let kind = if self.match_token(&TokenKind::Eq)? {
            let target = match expr.kind {
                ExprKind::Identifier(name) => AssignTarget::Variable {
                    name,
                    span: expr.span,
                },
                ExprKind::Property { object, name } => AssignTarget::Member {
                    object: *object,
                    member: name,
                    span: expr.span,
                },
                _ => {
                    return Err(CompileError::parser("invalid assignment target", expr.span));
                }
            };
            let value = self.parse_expression()?;
            StmtKind::Assign { target, value }
        } else {
            StmtKind::Expr(expr)
        };

        if require_semi {
            self.expect(TokenKind::Semi)?;
        }
        Ok(Stmt::new(kind, self.finish(start)))
    }

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start = self.current.span;
        self.expect(TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Block::new(statements, self.finish(start)))
    }

    /// Block, or a single statement wrapped in one
    fn parse_branch(&mut self) -> CompileResult<Block> {
        if self.check(&TokenKind::LBrace) {
            self.parse_block()
        } else {
            let stmt = self.parse_statement()?;
            let span = stmt.span;
            Ok(Block::new(vec![stmt], span))
        }
    }

    fn parse_parenthesized(&mut self) -> CompileResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::If)?;
        let condition = self.parse_parenthesized()?;
        let then_branch = self.parse_branch()?;
        let else_branch = if self.match_token(&TokenKind::Else)? {
            Some(self.parse_branch()?)
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            self.finish(start),
        ))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::While)?;
        let condition = self.parse_parenthesized()?;
        let body = self.parse_branch()?;

        Ok(Stmt::new(StmtKind::While { condition, body }, self.finish(start)))
    }

    fn parse_do_while_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::Do)?;
        let body = self.parse_block()?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_parenthesized()?;
        self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(StmtKind::DoWhile { body, condition }, self.finish(start)))
    }

    fn parse_for_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = if self.match_token(&TokenKind::Semi)? {
            None
        } else if self.check(&TokenKind::Let) || self.check(&TokenKind::Var) {
            let decl_start = self.current.span;
            let decl = self.parse_var_decl()?;
            Some(Box::new(Stmt::new(StmtKind::VarDecl(decl), self.finish(decl_start))))
        } else {
            Some(Box::new(self.parse_simple_statement(true)?))
        };

        let condition = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement(false)?))
        };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_branch()?;

        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                update,
                body,
            },
            self.finish(start),
        ))
    }

    fn parse_foreach_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::Foreach)?;
        self.expect(TokenKind::LParen)?;
        let (binding, _) = self.expect_identifier()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_branch()?;

        Ok(Stmt::new(
            StmtKind::Foreach {
                binding,
                iterable,
                body,
            },
            self.finish(start),
        ))
    }

    fn parse_switch_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::Switch)?;
        let discriminant = self.parse_parenthesized()?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            if self.check(&TokenKind::Case) {
                let case_start = self.current.span;
                self.advance()?;
                let value = self.parse_expression()?;
                self.expect(TokenKind::Colon)?;
                let body = self.parse_case_body()?;
                cases.push(SwitchCase::new(value, body, self.finish(case_start)));
            } else if self.check(&TokenKind::Default) {
                let default_span = self.current.span;
                self.advance()?;
                self.expect(TokenKind::Colon)?;
                if default.is_some() {
                    return Err(CompileError::parser(
                        "multiple default labels in one switch",
                        default_span,
                    ));
                }
                default = Some(self.parse_case_body()?);
            } else {
                break;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(
            StmtKind::Switch {
                discriminant,
                cases,
                default,
            },
            self.finish(start),
        ))
    }

    fn parse_case_body(&mut self) -> CompileResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::Case)
            && !self.check(&TokenKind::Default)
            && !self.check(&TokenKind::RBrace)
            && !self.at_end()
        {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_try_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.expect(TokenKind::Try)?;
        let try_block = self.parse_block()?;
        self.expect(TokenKind::Catch)?;
        self.expect(TokenKind::LParen)?;
        let (catch_name, _) = self.expect_identifier()?;
        self.expect(TokenKind::RParen)?;
        let catch_block = self.parse_block()?;

        Ok(Stmt::new(
            StmtKind::TryCatch {
                try_block,
                catch_name,
                catch_block,
            },
            self.finish(start),
        ))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_var_decl(&mut self) -> CompileResult<VarDecl> {
        let start = self.current.span;
        self.advance()?; // let / var
        let (name, _) = self.expect_identifier()?;
        let ty = self.parse_optional_annotation()?;
        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        Ok(VarDecl::new(name, ty, init, self.finish(start)))
    }

    fn parse_const_decl(&mut self) -> CompileResult<ConstDecl> {
        let start = self.current.span;
        self.expect(TokenKind::Const)?;
        let (name, _) = self.expect_identifier()?;
        let ty = self.parse_optional_annotation()?;
        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        Ok(ConstDecl::new(name, ty, init, self.finish(start)))
    }

    fn parse_optional_annotation(&mut self) -> CompileResult<Option<TypeAnnotation>> {
        if self.match_token(&TokenKind::Colon)? {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn parse_type(&mut self) -> CompileResult<TypeAnnotation> {
        let start = self.current.span;
        let name = if let Some(builtin) = self.current.kind.builtin_type_name() {
            builtin.to_string()
        } else if let TokenKind::Identifier(name) = &self.current.kind {
            name.clone()
        } else {
            return Err(CompileError::parser(
                format!("expected type, found {}", self.current.kind),
                self.current.span,
            ));
        };
        self.advance()?;

        let mut dimensions = 0;
        while self.match_token(&TokenKind::LBracket)? {
            self.expect(TokenKind::RBracket)?;
            dimensions += 1;
        }

        Ok(TypeAnnotation::new(name, dimensions, self.finish(start)))
    }

    fn parse_function_decl(&mut self) -> CompileResult<FunctionDecl> {
        let start = self.current.span;
        self.expect(TokenKind::Function)?;
        let (name, _) = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, param_span) = self.expect_identifier()?;
                let ty = self.parse_optional_annotation()?;
                params.push(Param::new(param, ty, self.finish(param_span)));
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = self.parse_optional_annotation()?;
        let body = self.parse_block()?;

        Ok(FunctionDecl::new(name, params, return_type, body, self.finish(start)))
    }

    fn parse_class_decl(&mut self) -> CompileResult<ClassDecl> {
        let start = self.current.span;
        self.expect(TokenKind::Class)?;
        let (name, _) = self.expect_identifier()?;
        let superclass = if self.match_token(&TokenKind::Colon)? {
            Some(self.expect_identifier()?.0)
        } else {
            None
        };

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let member = match &self.current.kind {
                TokenKind::Let | TokenKind::Var => ClassMember::Var(self.parse_var_decl()?),
                TokenKind::Const => ClassMember::Const(self.parse_const_decl()?),
                TokenKind::Function => ClassMember::Function(self.parse_function_decl()?),
                other => {
                    return Err(CompileError::parser(
                        format!("expected class member, found {other}"),
                        self.current.span,
                    ));
                }
            };
            members.push(member);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(ClassDecl::new(name, superclass, members, self.finish(start)))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.parse_ternary_expression()
    }

    fn parse_ternary_expression(&mut self) -> CompileResult<Expr> {
        let condition = self.parse_logical_or_expression()?;

        if self.match_token(&TokenKind::Question)? {
            let then_expr = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let else_expr = self.parse_ternary_expression()?;
            let span = condition.span.merge(else_expr.span);
            return Ok(Expr::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                },
                span,
            ));
        }

        Ok(condition)
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_logical_or_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_logical_and_expression()?;

        while self.match_token(&TokenKind::PipePipe)? {
            let right = self.parse_logical_and_expression()?;
            left = Self::binary(BinaryOp::LogOr, left, right);
        }

        Ok(left)
    }

    fn parse_logical_and_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_equality_expression()?;

        while self.match_token(&TokenKind::AmpAmp)? {
            let right = self.parse_equality_expression()?;
            left = Self::binary(BinaryOp::LogAnd, left, right);
        }

        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_relational_expression()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_relational_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_additive_expression()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_additive_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> CompileResult<Expr> {
        let start = self.current.span;

        let op = match &self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix_expression(),
        };
        self.advance()?;
        let operand = self.parse_unary_expression()?;
        let span = start.merge(operand.span);

        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix_expression(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            let start_span = expr.span;
            match &self.current.kind {
                TokenKind::LBracket => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.finish(start_span),
                    );
                }
                TokenKind::LParen => {
                    self.advance()?;
                    let args = self.parse_argument_list(&TokenKind::RParen)?;
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        self.finish(start_span),
                    );
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let (name, _) = self.expect_identifier()?;
                    expr = Expr::new(
                        ExprKind::Property {
                            object: Box::new(expr),
                            name,
                        },
                        self.finish(start_span),
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Comma-separated expressions up to (not including) `close`
    fn parse_argument_list(&mut self, close: &TokenKind) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();

        if self.check(close) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        Ok(args)
    }

    fn parse_primary_expression(&mut self) -> CompileResult<Expr> {
        let span = self.current.span;

        match &self.current.kind {
            TokenKind::IntLiteral(s) => {
                let value = self.parse_int_literal(s)?;
                self.advance()?;
                Ok(Expr::new(ExprKind::IntLiteral(value), span))
            }
            TokenKind::StringLiteral(s) => {
                let s = s.clone();
                self.advance()?;
                let value = self.parse_string_literal(&s, span)?;
                Ok(Expr::new(ExprKind::StringLiteral(value), span))
            }
            TokenKind::True => {
                self.advance()?;
                Ok(Expr::new(ExprKind::BoolLiteral(true), span))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(Expr::new(ExprKind::BoolLiteral(false), span))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Null, span))
            }
            TokenKind::This => {
                self.advance()?;
                Ok(Expr::new(ExprKind::This, span))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(Expr::new(ExprKind::Identifier(name), span))
            }
            TokenKind::New => {
                self.advance()?;
                let (class, _) = self.expect_identifier()?;
                let args = if self.match_token(&TokenKind::LParen)? {
                    let args = self.parse_argument_list(&TokenKind::RParen)?;
                    self.expect(TokenKind::RParen)?;
                    args
                } else {
                    Vec::new()
                };
                Ok(Expr::new(ExprKind::New { class, args }, self.finish(span)))
            }
            TokenKind::LBracket => {
                self.advance()?;
                let elements = self.parse_argument_list(&TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::new(ExprKind::Array(elements), self.finish(span)))
            }
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(CompileError::parser(
                format!("unexpected token in expression: {}", self.current.kind),
                span,
            )),
        }
    }

    // =========================================================================
    // Literal parsing helpers
    // =========================================================================

    fn parse_int_literal(&self, s: &str) -> CompileResult<i64> {
        s.parse().map_err(|_| {
            CompileError::parser(format!("integer literal out of range: {s}"), self.current.span)
        })
    }

    fn parse_string_literal(&self, s: &str, span: Span) -> CompileResult<String> {
        let inner = s
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(s);
        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            let escaped = match chars.next() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('r') => '\r',
                Some('\\') => '\\',
                Some('"') => '"',
                Some(other) => {
                    return Err(CompileError::parser(
                        format!("unknown escape sequence '\\{other}'"),
                        span,
                    ));
                }
                None => {
                    return Err(CompileError::parser("unterminated escape sequence", span));
                }
            };
            result.push(escaped);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_declarations() {
        let program = parse("let x: integer = 42; const NAME: string = \"a\"; var items: integer[][];");

        assert_eq!(program.statements.len(), 3);
        if let StmtKind::VarDecl(v) = &program.statements[0].kind {
            assert_eq!(v.name, "x");
            assert_eq!(v.ty.as_ref().map(|t| t.name.as_str()), Some("integer"));
            assert!(matches!(v.init.as_ref().map(|e| &e.kind), Some(ExprKind::IntLiteral(42))));
        } else {
            panic!("expected variable declaration");
        }
        assert!(matches!(&program.statements[1].kind, StmtKind::ConstDecl(c) if c.name == "NAME"));
        if let StmtKind::VarDecl(v) = &program.statements[2].kind {
            let ty = v.ty.as_ref().unwrap();
            assert_eq!(ty.to_string(), "integer[][]");
            assert!(v.init.is_none());
        } else {
            panic!("expected variable declaration");
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("let r = 1 + 2 * 3 < 10 && !done || flag;");

        let StmtKind::VarDecl(v) = &program.statements[0].kind else {
            panic!("expected variable declaration");
        };
        let Some(ExprKind::Binary { op, left, .. }) = v.init.as_ref().map(|e| &e.kind) else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::LogOr);
        let ExprKind::Binary { op, left, .. } = &left.kind else {
            panic!("expected &&");
        };
        assert_eq!(*op, BinaryOp::LogAnd);
        let ExprKind::Binary { op, left, .. } = &left.kind else {
            panic!("expected <");
        };
        assert_eq!(*op, BinaryOp::Lt);
        let ExprKind::Binary { op, right, .. } = &left.kind else {
            panic!("expected +");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_parse_assignments() {
        let program = parse("x = 1; this.name = name; a.b.c = 2;");

        assert!(matches!(
            &program.statements[0].kind,
            StmtKind::Assign { target: AssignTarget::Variable { name, .. }, .. } if name == "x"
        ));
        assert!(matches!(
            &program.statements[1].kind,
            StmtKind::Assign {
                target: AssignTarget::Member { object: Expr { kind: ExprKind::This, .. }, member, .. },
                ..
            } if member == "name"
        ));
        assert!(matches!(
            &program.statements[2].kind,
            StmtKind::Assign { target: AssignTarget::Member { member, .. }, .. } if member == "c"
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = Parser::new("f() = 3;").unwrap().parse().unwrap_err();
        assert!(err.to_string().contains("invalid assignment target"));
    }

    #[test]
    fn test_parse_class_and_calls() {
        let source = r#"
            class Perro : Animal {
                let nombre: string;
                function constructor(nombre: string) { this.nombre = nombre; }
                function ladrar(): string { return this.nombre; }
            }
            let p: Perro = new Perro("Firulais");
            print(p.ladrar());
        "#;
        let program = parse(source);

        let StmtKind::Class(class) = &program.statements[0].kind else {
            panic!("expected class declaration");
        };
        assert_eq!(class.name, "Perro");
        assert_eq!(class.superclass.as_deref(), Some("Animal"));
        assert_eq!(class.members.len(), 3);
        assert!(matches!(&class.members[1], ClassMember::Function(f) if f.is_constructor()));

        let StmtKind::Print(expr) = &program.statements[2].kind else {
            panic!("expected print");
        };
        let ExprKind::Call { callee, args } = &expr.kind else {
            panic!("expected call");
        };
        assert!(args.is_empty());
        assert!(matches!(&callee.kind, ExprKind::Property { name, .. } if name == "ladrar"));
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"
            function factorial(n: integer): integer {
                if (n <= 1) return 1;
                return n * factorial(n - 1);
            }
            for (let i: integer = 0; i < 3; i = i + 1) { continue; }
            foreach (x in [1, 2]) { print(x); }
            do { break; } while (false);
            switch (x) { case 1: print(1); case 2: default: print(0); }
            try { print(1); } catch (e) { print(e); }
        "#;
        let program = parse(source);
        assert_eq!(program.statements.len(), 6);

        let StmtKind::Function(f) = &program.statements[0].kind else {
            panic!("expected function");
        };
        assert!(matches!(
            &f.body.statements[0].kind,
            StmtKind::If { then_branch, else_branch: None, .. } if then_branch.statements.len() == 1
        ));

        let StmtKind::For { init, condition, update, .. } = &program.statements[1].kind else {
            panic!("expected for");
        };
        assert!(matches!(init.as_deref().map(|s| &s.kind), Some(StmtKind::VarDecl(_))));
        assert!(condition.is_some());
        assert!(matches!(update.as_deref().map(|s| &s.kind), Some(StmtKind::Assign { .. })));

        let StmtKind::Switch { cases, default, .. } = &program.statements[4].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(cases[1].body.is_empty());
        assert_eq!(default.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_ternary_and_index() {
        let program = parse("let v = ok ? items[0] : -1;");

        let StmtKind::VarDecl(v) = &program.statements[0].kind else {
            panic!("expected variable declaration");
        };
        let Some(ExprKind::Ternary { then_expr, else_expr, .. }) = v.init.as_ref().map(|e| &e.kind) else {
            panic!("expected ternary");
        };
        assert!(matches!(then_expr.kind, ExprKind::Index { .. }));
        assert!(matches!(else_expr.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_string_escapes() {
        let program = parse(r#"print("a\tb\"c\"");"#);
        let StmtKind::Print(expr) = &program.statements[0].kind else {
            panic!("expected print");
        };
        assert_eq!(expr.kind, ExprKind::StringLiteral("a\tb\"c\"".to_string()));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = Parser::new("let x = 1").unwrap().parse().unwrap_err();
        assert_eq!(err.to_string(), "Parser error at 1:9: expected ';', found end of file");
    }
}
