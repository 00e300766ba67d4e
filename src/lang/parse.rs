//! Recursive-descent parser for the expression language.
//!
//! Grammar:
//!
//!     statements : statement (DELIMITER statement)*
//!     statement  : expr (ASSIGN statement)?        # when expr ends as a bare symbol
//!                | SYMBOL factor*                   # application form
//!     expr       : term ((PLUS | MINUS) term)*
//!     term       : factor ((MUL | DIV) factor)*
//!     factor     : NUMBER | MONEY | SYMBOL | LPAREN expr RPAREN
//!
//! `statement` is where the grammar is subtle. After `expr` returns, a bare
//! symbol can still go two ways, decided by one token of lookahead:
//!
//! * next token is ASSIGN: consume it and parse another `statement` as the
//!   right-hand side (so `a = b = 3` chains).
//! * anything else: the symbol becomes the head of an application and every
//!   following `factor` is greedily consumed as an argument. A bare symbol
//!   with no trailing factors is therefore a zero-argument application, not
//!   a plain variable reference.
//!
//! The assignment check must run before the application wrapping; swapping
//! them would turn `x = 5` into an application of `x`.

use crate::lang::ast::Node;
use crate::lang::error::{Error, Result};
use crate::lang::lexer::Lexer;
use crate::lang::token::{Token, TokenKind};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Single token of lookahead; the only buffering over the lexer
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self> {
        Self::with_lexer(Lexer::new(source))
    }

    /// Take over an existing token stream
    pub fn with_lexer(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;

        Ok(Parser { lexer, current })
    }

    /// Advance past the current token if it matches `expected`
    ///
    /// This is the parser's sole error-detection point for malformed token
    /// sequences.
    fn eat(&mut self, expected: TokenKind) -> Result<()> {
        if self.current.kind() == expected {
            self.current = self.lexer.next_token()?;
            Ok(())
        } else {
            Err(Error::syntax(format!(
                "Invalid syntax on token: {}",
                self.current
            )))
        }
    }

    /// statements: statement (DELIMITER statement)*
    fn statements(&mut self) -> Result<Node> {
        let mut nodes = Vec::new();

        if let Some(statement) = self.statement()? {
            nodes.push(statement);
        }

        while self.current.kind() == TokenKind::Delimiter {
            self.eat(TokenKind::Delimiter)?;

            if let Some(statement) = self.statement()? {
                nodes.push(statement);
            }
        }

        Ok(Node::Statements(nodes))
    }

    /// statement: expr (ASSIGN statement)? | SYMBOL factor*
    fn statement(&mut self) -> Result<Option<Node>> {
        let mut node = match self.expr()? {
            Some(node) => node,
            None => return Ok(None),
        };

        if matches!(node, Node::Symbol(_)) && self.current.kind() == TokenKind::Assign {
            self.eat(TokenKind::Assign)?;

            let right = match self.statement()? {
                Some(right) => right,
                None => {
                    return Err(Error::syntax(format!(
                        "Invalid syntax on token: {}",
                        self.current
                    )))
                }
            };

            node = Node::Assign(Box::new(node), Box::new(right));
        }

        if let Node::Symbol(name) = node {
            let mut parameters = Vec::new();
            while let Some(factor) = self.factor()? {
                parameters.push(factor);
            }

            node = Node::Apply(name, parameters);
        }

        Ok(Some(node))
    }

    /// expr: term ((PLUS | MINUS) term)*
    fn expr(&mut self) -> Result<Option<Node>> {
        let mut node = match self.term()? {
            Some(node) => node,
            None => return Ok(None),
        };

        while matches!(self.current.kind(), TokenKind::Plus | TokenKind::Minus) {
            let operator = self.current.kind();
            self.eat(operator)?;

            let right = self.required(Self::term)?;
            node = Node::BinaryOperator(Box::new(node), operator, Box::new(right));
        }

        Ok(Some(node))
    }

    /// term: factor ((MUL | DIV) factor)*
    fn term(&mut self) -> Result<Option<Node>> {
        let mut node = match self.factor()? {
            Some(node) => node,
            None => return Ok(None),
        };

        while matches!(self.current.kind(), TokenKind::Star | TokenKind::Slash) {
            let operator = self.current.kind();
            self.eat(operator)?;

            let right = self.required(Self::factor)?;
            node = Node::BinaryOperator(Box::new(node), operator, Box::new(right));
        }

        Ok(Some(node))
    }

    /// factor: NUMBER | MONEY | SYMBOL | LPAREN expr RPAREN
    ///
    /// Returns `None` when the current token cannot begin a factor; callers
    /// use that both to stop argument gathering and to report a missing
    /// operand.
    fn factor(&mut self) -> Result<Option<Node>> {
        let node = match &self.current {
            Token::Number(n) => {
                let n = *n;
                self.eat(TokenKind::Number)?;
                Node::Number(n)
            }
            Token::Money(m) => {
                let m = *m;
                self.eat(TokenKind::Money)?;
                Node::Money(m)
            }
            Token::Symbol(name) => {
                let name = name.clone();
                self.eat(TokenKind::Symbol)?;
                Node::Symbol(name)
            }
            Token::LParen => {
                self.eat(TokenKind::LParen)?;
                let node = self.required(Self::expr)?;
                self.eat(TokenKind::RParen)?;
                node
            }
            _ => return Ok(None),
        };

        Ok(Some(node))
    }

    /// Run a production that must yield a node, eg. the right operand of a
    /// binary operator
    fn required(&mut self, production: fn(&mut Self) -> Result<Option<Node>>) -> Result<Node> {
        match production(self)? {
            Some(node) => Ok(node),
            None => Err(Error::syntax(format!(
                "Invalid syntax on token: {}",
                self.current
            ))),
        }
    }

    /// Parse the whole input into a root `Statements` node
    ///
    /// Fails if any tokens remain after the last statement.
    pub fn parse(&mut self) -> Result<Node> {
        let node = self.statements()?;

        if self.current.kind() != TokenKind::Eof {
            return Err(Error::syntax(format!(
                "Trailing input at token: {}",
                self.current
            )));
        }

        Ok(node)
    }
}

#[cfg(test)]
use crate::lang::money::{Currency, Money};

#[cfg(test)]
fn parse(input: &str) -> Result<Node> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
fn stmts(nodes: Vec<Node>) -> Node {
    Node::Statements(nodes)
}

#[cfg(test)]
fn binop(left: Node, operator: TokenKind, right: Node) -> Node {
    Node::BinaryOperator(Box::new(left), operator, Box::new(right))
}

#[test]
fn test_parse_precedence() {
    let data = vec![
        (
            "2 + 3 * 4",
            stmts(vec![binop(
                Node::Number(2.0),
                TokenKind::Plus,
                binop(Node::Number(3.0), TokenKind::Star, Node::Number(4.0)),
            )]),
        ),
        (
            "(2 + 3) * 4",
            stmts(vec![binop(
                binop(Node::Number(2.0), TokenKind::Plus, Node::Number(3.0)),
                TokenKind::Star,
                Node::Number(4.0),
            )]),
        ),
        (
            "1 - 2 - 3",
            stmts(vec![binop(
                binop(Node::Number(1.0), TokenKind::Minus, Node::Number(2.0)),
                TokenKind::Minus,
                Node::Number(3.0),
            )]),
        ),
        (
            "8 / 4 / 2",
            stmts(vec![binop(
                binop(Node::Number(8.0), TokenKind::Slash, Node::Number(4.0)),
                TokenKind::Slash,
                Node::Number(2.0),
            )]),
        ),
        (
            "1 + 2 * 3 - 4",
            stmts(vec![binop(
                binop(
                    Node::Number(1.0),
                    TokenKind::Plus,
                    binop(Node::Number(2.0), TokenKind::Star, Node::Number(3.0)),
                ),
                TokenKind::Minus,
                Node::Number(4.0),
            )]),
        ),
    ];

    for (input, expected) in data {
        assert_eq!(parse(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_parse_assignment() {
    let data = vec![
        (
            "x = 5",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("x".to_string())),
                Box::new(Node::Number(5.0)),
            )]),
        ),
        (
            // Assignment chains right-to-left through `statement`
            "a = b = 3",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("a".to_string())),
                Box::new(Node::Assign(
                    Box::new(Node::Symbol("b".to_string())),
                    Box::new(Node::Number(3.0)),
                )),
            )]),
        ),
        (
            // The target survives parenthesization
            "(x) = 1",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("x".to_string())),
                Box::new(Node::Number(1.0)),
            )]),
        ),
        (
            "price = $9.99",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("price".to_string())),
                Box::new(Node::Money(Money::new(999, Currency::Usd))),
            )]),
        ),
    ];

    for (input, expected) in data {
        assert_eq!(parse(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_parse_application() {
    let data = vec![
        (
            // A surviving bare symbol is a zero-argument application
            "foo",
            stmts(vec![Node::Apply("foo".to_string(), vec![])]),
        ),
        (
            "print x 2",
            stmts(vec![Node::Apply(
                "print".to_string(),
                vec![Node::Symbol("x".to_string()), Node::Number(2.0)],
            )]),
        ),
        (
            // Parenthesized arguments may be whole expressions
            "abs (1 - 2)",
            stmts(vec![Node::Apply(
                "abs".to_string(),
                vec![binop(Node::Number(1.0), TokenKind::Minus, Node::Number(2.0))],
            )]),
        ),
        (
            // A symbol inside an expression stays a plain reference
            "x + 1",
            stmts(vec![binop(
                Node::Symbol("x".to_string()),
                TokenKind::Plus,
                Node::Number(1.0),
            )]),
        ),
        (
            // The right-hand side of an assignment is a statement, so a
            // bare symbol there is an application too
            "y = x",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("y".to_string())),
                Box::new(Node::Apply("x".to_string(), vec![])),
            )]),
        ),
    ];

    for (input, expected) in data {
        assert_eq!(parse(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_parse_statement_sequences() {
    let data = vec![
        (
            "x = 1; x + 1",
            stmts(vec![
                Node::Assign(
                    Box::new(Node::Symbol("x".to_string())),
                    Box::new(Node::Number(1.0)),
                ),
                binop(Node::Symbol("x".to_string()), TokenKind::Plus, Node::Number(1.0)),
            ]),
        ),
        (
            // Trailing delimiter is accepted; the empty statement is skipped
            "x = 1;",
            stmts(vec![Node::Assign(
                Box::new(Node::Symbol("x".to_string())),
                Box::new(Node::Number(1.0)),
            )]),
        ),
        ("", stmts(vec![])),
        (";;", stmts(vec![])),
    ];

    for (input, expected) in data {
        assert_eq!(parse(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_parse_errors() {
    let data = vec![
        // Missing operand
        "2 +",
        "* 3",
        "1 + * 2",
        // Unbalanced parens
        "(2 + 3",
        "2)",
        "()",
        // Assignment needs a right-hand side
        "x =",
        "= 2",
        // A number cannot head an application, so the argument is trailing input
        "2 3",
        // Trailing input after a complete expression statement
        "1 + 2 x",
    ];

    for input in data {
        let err = parse(input).unwrap_err();
        assert!(
            matches!(err, Error::Syntax { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}

#[test]
fn test_parse_from_lexer() {
    let lexer = Lexer::new("1 + 2");
    let node = Parser::with_lexer(lexer).unwrap().parse().unwrap();

    assert_eq!(
        node,
        stmts(vec![binop(
            Node::Number(1.0),
            TokenKind::Plus,
            Node::Number(2.0)
        )])
    );
}

#[test]
fn test_parse_lexical_errors_propagate() {
    let data = vec!["2 ? 3", "$", "x = $1.234"];

    for input in data {
        let err = parse(input).unwrap_err();
        assert!(
            matches!(err, Error::Lexical { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}
