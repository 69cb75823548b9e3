use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Statements and expressions that may nest inside one another
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser for the playground script language
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Current nesting of statements, operands and operator chains
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the entire script (the body of the implicit async wrapper)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.nodes.push(self.parse_statement()?);
        }

        Ok(program)
    }

    fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nest()?;
        let stmt = self.parse_statement_node();
        self.depth -= 1;
        stmt
    }

    /// Parse a statement
    fn parse_statement_node(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_terminator("Expected ';' after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_terminator("Expected ';' after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        // `async function` declaration; a bare `async` is not supported
        if self.match_token(&Token::Async(loc)) {
            self.expect_token(&Token::Function(loc), "Expected 'function' after 'async'")?;
            return self.parse_function_definition(true, loc);
        }

        if self.match_token(&Token::Function(loc)) {
            return self.parse_function_definition(false, loc);
        }

        if self.match_token(&Token::LBrace(loc)) {
            let statements = self.parse_block_statements()?;
            self.expect_token(&Token::RBrace(loc), "Expected '}' after block")?;
            return Ok(AstNode::Block {
                statements,
                location: loc,
            });
        }

        // Empty statement
        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                location: loc,
            });
        }

        if self.is_declaration_keyword() {
            let decl = self.parse_variable_declaration()?;
            self.expect_terminator("Expected ';' after variable declaration")?;
            return Ok(decl);
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_terminator("Expected ';' after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse function definition after the `function` keyword: name(params) { body }
    fn parse_function_definition(
        &mut self,
        is_async: bool,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let name = self.expect_identifier()?;

        self.expect_token(&Token::LParen(loc), "Expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen(loc)) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.match_token(&Token::Comma(loc)) {
                    break;
                }
            }
        }
        self.expect_token(&Token::RParen(loc), "Expected ')' after parameters")?;
        self.expect_token(&Token::LBrace(loc), "Expected '{' before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_token(&Token::RBrace(loc), "Expected '}' after function body")?;

        Ok(AstNode::FunctionDef {
            name,
            params,
            body,
            is_async,
            location: loc,
        })
    }

    /// Parse block statements (inside braces, excluding the braces themselves)
    fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.at_statement_end(loc) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_terminator("Expected ';' after return")?;

        Ok(AstNode::Return { expr, location: loc })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(loc)) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let body = self.parse_statement_or_block()?;

        self.expect_token(&Token::While(loc), "Expected 'while' after do body")?;
        self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after do-while condition")?;
        self.expect_terminator("Expected ';' after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'for'")?;

        // Init (optional)
        let init = if self.check(&Token::Semicolon(loc)) {
            None
        } else if self.is_declaration_keyword() {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&Token::Semicolon(loc), "Expected ';' after for init")?;

        // Condition (optional)
        let condition = if self.check(&Token::Semicolon(loc)) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&Token::Semicolon(loc), "Expected ';' after for condition")?;

        // Increment (optional)
        let increment = if self.check(&Token::RParen(loc)) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(&Token::RParen(loc), "Expected ')' after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse variable declaration without its terminator: const|let|var name [= init]
    fn parse_variable_declaration(&mut self) -> Result<AstNode, ParseError> {
        let kind = match self.advance() {
            Token::Const(_) => DeclKind::Const,
            Token::Let(_) => DeclKind::Let,
            _ => DeclKind::Var,
        };
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        let init = if self.match_token(&Token::Eq(loc)) {
            Some(Box::new(self.parse_expression()?))
        } else if kind.is_const() {
            return Err(ParseError {
                message: format!("Missing initializer in const declaration of '{}'", name),
                location: loc,
            });
        } else {
            None
        };

        Ok(AstNode::VarDecl {
            kind,
            name,
            init,
            location: loc,
        })
    }

    /// Parse statement or block (for if/while/for bodies)
    fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let statements = self.parse_block_statements()?;
            self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after block")?;
            Ok(statements)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse expression (top-level entry point)
    fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        self.nest()?;
        let expr = self.parse_assignment_node();
        self.depth -= 1;
        expr
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment_node(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;

        let loc = self.current_location();
        let compound_op = if self.match_token(&Token::Eq(loc)) {
            None
        } else if self.match_token(&Token::PlusEq(loc)) {
            Some(BinOp::Add)
        } else if self.match_token(&Token::MinusEq(loc)) {
            Some(BinOp::Sub)
        } else if self.match_token(&Token::StarEq(loc)) {
            Some(BinOp::Mul)
        } else if self.match_token(&Token::SlashEq(loc)) {
            Some(BinOp::Div)
        } else if self.match_token(&Token::PercentEq(loc)) {
            Some(BinOp::Mod)
        } else {
            return Ok(expr);
        };

        if !expr.is_assignable() {
            return Err(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location: loc,
            });
        }

        let rhs = Box::new(self.parse_assignment()?);
        Ok(match compound_op {
            None => AstNode::Assignment {
                target: Box::new(expr),
                rhs,
                location: loc,
            },
            Some(op) => AstNode::CompoundAssignment {
                target: Box::new(expr),
                op,
                rhs,
                location: loc,
            },
        })
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_assignment()?);
            self.expect_token(&Token::Colon(loc), "Expected ':' in ternary expression")?;
            let false_expr = Box::new(self.parse_assignment()?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;
        let mut links = 0;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            self.nest()?;
            links += 1;
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;
        let mut links = 0;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            self.nest()?;
            links += 1;
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse equality (== != === !==)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;
        let mut links = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else if self.match_token(&Token::EqEqEq(loc)) {
                BinOp::StrictEq
            } else if self.match_token(&Token::NotEqEq(loc)) {
                BinOp::StrictNe
            } else {
                break;
            };

            self.nest()?;

            links += 1;

            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;
        let mut links = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            self.nest()?;

            links += 1;

            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let mut links = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            self.nest()?;

            links += 1;

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;
        let mut links = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            self.nest()?;

            links += 1;

            let right = Box::new(self.parse_unary()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse unary (! - + ++ -- await)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = if self.match_token(&Token::Bang(loc)) {
            UnOp::Not
        } else if self.match_token(&Token::Minus(loc)) {
            UnOp::Neg
        } else if self.match_token(&Token::Plus(loc)) {
            UnOp::Plus
        } else if self.match_token(&Token::PlusPlus(loc)) {
            UnOp::PreInc
        } else if self.match_token(&Token::MinusMinus(loc)) {
            UnOp::PreDec
        } else if self.match_token(&Token::Await(loc)) {
            UnOp::Await
        } else {
            return self.parse_postfix();
        };

        self.nest()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = operand?;
        if matches!(op, UnOp::PreInc | UnOp::PreDec) && !operand.is_assignable() {
            return Err(ParseError {
                message: "Invalid operand for prefix increment/decrement".to_string(),
                location: loc,
            });
        }

        Ok(AstNode::UnaryOp {
            op,
            operand: Box::new(operand),
            location: loc,
        })
    }

    /// Parse postfix (++ -- [] . ())
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;
        let mut links = 0;

        loop {
            let loc = self.current_location();

            if self.check(&Token::PlusPlus(loc)) || self.check(&Token::MinusMinus(loc)) {
                // A line break before ++/-- ends the expression
                if loc.line != self.previous_location().line {
                    break;
                }
                let op = if self.match_token(&Token::PlusPlus(loc)) {
                    UnOp::PostInc
                } else {
                    self.advance();
                    UnOp::PostDec
                };
                if !expr.is_assignable() {
                    return Err(ParseError {
                        message: "Invalid operand for postfix increment/decrement".to_string(),
                        location: loc,
                    });
                }
                self.nest()?;
                links += 1;
                expr = AstNode::UnaryOp {
                    op,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(&Token::RBracket(loc), "Expected ']' after index")?;
                self.nest()?;
                links += 1;
                expr = AstNode::Index {
                    object: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let name = self.expect_property_name()?;
                self.nest()?;
                links += 1;
                expr = AstNode::Member {
                    object: Box::new(expr),
                    name,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after arguments")?;
                self.nest()?;
                links += 1;
                expr = AstNode::Call {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else {
                break;
            }
        }

        self.depth -= links;
        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, variables, array literals, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::NumberLiteral(n, loc) => {
                self.advance();
                Ok(AstNode::NumberLiteral(n, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                Ok(AstNode::StringLiteral(s, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(AstNode::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(AstNode::BoolLiteral(false, loc))
            }
            Token::Null(location) => {
                self.advance();
                Ok(AstNode::Null { location })
            }
            Token::Undefined(location) => {
                self.advance();
                Ok(AstNode::Undefined { location })
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(AstNode::Variable(name, loc))
            }
            Token::LBracket(_) => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&Token::RBracket(loc)) {
                    elements.push(self.parse_assignment()?);
                    if !self.match_token(&Token::Comma(loc)) {
                        break;
                    }
                }
                self.expect_token(&Token::RBracket(loc), "Expected ']' after array elements")?;
                Ok(AstNode::ArrayLiteral {
                    elements,
                    location: loc,
                })
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after expression")?;
                Ok(expr)
            }
            _ => Err(ParseError {
                message: format!("Unexpected token: {}", self.peek()),
                location: loc,
            }),
        }
    }

    // ===== Helper methods =====

    /// Enter one nesting level, failing past [`MAX_NESTING_DEPTH`]
    fn nest(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError {
                message: format!("Nesting exceeds {} levels", MAX_NESTING_DEPTH),
                location: self.current_location(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn is_declaration_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Const(_) | Token::Let(_) | Token::Var(_)
        )
    }

    /// Whether the current token may end a statement without an explicit ';'
    fn at_statement_end(&self, previous: SourceLocation) -> bool {
        matches!(
            self.peek(),
            Token::Semicolon(_) | Token::RBrace(_) | Token::Eof(_)
        ) || self.current_location().line != previous.line
    }

    /// Accept ';', or insert one before '}', end of input or a line break
    fn expect_terminator(&mut self, message: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(());
        }
        if self.at_statement_end(self.previous_location()) {
            return Ok(());
        }
        Err(ParseError {
            message: format!("{}, found {}", message, self.peek()),
            location: self.current_location(),
        })
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek_token();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    fn previous_location(&self) -> SourceLocation {
        if self.position == 0 {
            return SourceLocation::new(1, 1);
        }
        self.tokens[self.position - 1].location()
    }

    fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected property name after '.', found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    #[test]
    fn test_parse_declaration_with_array_literal() {
        let program = parse("const list = [3, 1, 2];");

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::VarDecl { kind, name, init, .. } => {
                assert_eq!(*kind, DeclKind::Const);
                assert_eq!(name, "list");
                assert!(matches!(
                    init.as_deref(),
                    Some(AstNode::ArrayLiteral { elements, .. }) if elements.len() == 3
                ));
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_async_function_and_await() {
        let program = parse("async function sort() { await highlightElement(0); }\nawait sort();");

        assert_eq!(program.nodes.len(), 2);
        match &program.nodes[0] {
            AstNode::FunctionDef { name, is_async, body, .. } => {
                assert_eq!(name, "sort");
                assert!(*is_async);
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
        assert!(matches!(
            &program.nodes[1],
            AstNode::ExpressionStatement { expr, .. }
                if matches!(**expr, AstNode::UnaryOp { op: UnOp::Await, .. })
        ));
    }

    #[test]
    fn test_parse_for_loop_with_member_bound() {
        let program = parse("for (let i = 0; i < list.length - 1; i++) { x += list[i]; }");

        match &program.nodes[0] {
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                assert!(matches!(init.as_deref(), Some(AstNode::VarDecl { .. })));
                assert!(matches!(
                    condition.as_deref(),
                    Some(AstNode::BinaryOp { op: BinOp::Lt, .. })
                ));
                assert!(matches!(
                    increment.as_deref(),
                    Some(AstNode::UnaryOp { op: UnOp::PostInc, .. })
                ));
                assert!(matches!(
                    &body[0],
                    AstNode::ExpressionStatement { expr, .. }
                        if matches!(**expr, AstNode::CompoundAssignment { op: BinOp::Add, .. })
                ));
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_automatic_semicolon_insertion() {
        let program = parse("let a = 1\nlet b = a + 2\nlog(b)");
        assert_eq!(program.nodes.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line_is_error() {
        let mut parser = Parser::new("let a = 1 let b = 2;").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("Expected ';'"));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let mut parser = Parser::new("1 = 2;").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.to_string().contains("Invalid left-hand side"));
    }

    #[test]
    fn test_const_requires_initializer() {
        let mut parser = Parser::new("const x;").unwrap();
        assert!(parser.parse_program().is_err());
    }

    fn nesting_error(source: &str) -> ParseError {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap_err()
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("log({}1{});", "(".repeat(40), ")".repeat(40));
        let program = parse(&source);
        assert_eq!(program.nodes.len(), 1);
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let source = format!("log({}1{});", "(".repeat(20_000), ")".repeat(20_000));
        let err = nesting_error(&source);
        assert!(err.message.contains("Nesting exceeds"));
        assert_eq!(err.location.line, 1);
    }

    #[test]
    fn test_deep_blocks_and_operator_chains_are_rejected() {
        let blocks = format!("{}{}", "{".repeat(20_000), "}".repeat(20_000));
        assert!(nesting_error(&blocks).message.contains("Nesting exceeds"));

        let unary = format!("let x = {}1;", "!".repeat(20_000));
        assert!(nesting_error(&unary).message.contains("Nesting exceeds"));

        let sum = format!("let x = 1{};", " + 1".repeat(20_000));
        assert!(nesting_error(&sum).message.contains("Nesting exceeds"));

        let assign = format!("{}0;", "a = ".repeat(20_000));
        assert!(nesting_error(&assign).message.contains("Nesting exceeds"));
    }
}
