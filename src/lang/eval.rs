use std::fmt;
use std::io::Write;

use log::debug;

use crate::lang::ast::Node;
use crate::lang::error::{Error, Result};
use crate::lang::functions::Function;
use crate::lang::money::Money;
use crate::lang::namespace::Namespace;
use crate::lang::token::TokenKind;

/// A computed value
///
/// Which arithmetic applies is decided here, at evaluation time, by the
/// runtime pairing of operand values; the tree has no type information.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Number(f64),
    Money(Money),
    Function(Function),
}

impl Value {
    pub fn type_str(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Money(_) => "money",
            Value::Function(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Money(m) => write!(f, "{}", m),
            Value::Function(func) => write!(f, "{}()", func),
        }
    }
}

pub struct Eval<'a> {
    /// Where `print` output goes
    sink: &'a mut dyn Write,
    namespace: Namespace<Value>,
}

impl<'a> Eval<'a> {
    /// Create a new `Eval` instance
    ///
    /// `sink` is where output should be written, eg. the result of `print`
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Eval {
            sink,
            namespace: Namespace::new(Value::Function),
        }
    }

    /// Evaluate a root node
    ///
    /// Returns `None` only for an empty statement sequence, which has no
    /// value.
    pub fn eval(&mut self, node: &Node) -> Result<Option<Value>> {
        match node {
            Node::Statements(nodes) => {
                let mut last = None;
                for node in nodes {
                    last = Some(self.eval_node(node)?);
                }

                Ok(last)
            }
            node => self.eval_node(node).map(Some),
        }
    }

    fn eval_node(&mut self, node: &Node) -> Result<Value> {
        match node {
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::Money(m) => Ok(Value::Money(*m)),
            Node::Symbol(name) => self.namespace.get(name).map(Clone::clone),
            Node::BinaryOperator(left, operator, right) => {
                let lhs = self.eval_node(left)?;
                let rhs = self.eval_node(right)?;

                apply_operator(*operator, lhs, rhs)
            }
            Node::Assign(target, value) => {
                let name = match &**target {
                    Node::Symbol(name) => name.clone(),
                    _ => return Err(Error::syntax("Expression cannot be used as a name")),
                };

                let val = self.eval_node(value)?;
                debug!("assign: {} = {}", name, val);

                Ok(self.namespace.set(name, val))
            }
            Node::Apply(head, parameters) => {
                let target = self.namespace.get(head)?.clone();

                let mut args = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    args.push(self.eval_node(parameter)?);
                }

                match target {
                    Value::Function(func) => self.call(func, &args),
                    // Applying a data binding to nothing yields the binding;
                    // this is how a bare trailing symbol reads a variable
                    value if args.is_empty() => Ok(value),
                    value => Err(Error::arithmetic(format!(
                        "'{}' ({}) is not callable",
                        head,
                        value.type_str()
                    ))),
                }
            }
            Node::Statements(nodes) => {
                let mut last = None;
                for node in nodes {
                    last = Some(self.eval_node(node)?);
                }

                last.ok_or_else(|| Error::arithmetic("Empty statement sequence has no value"))
            }
        }
    }

    fn call(&mut self, func: Function, args: &[Value]) -> Result<Value> {
        if let Some(arity) = func.arity() {
            if args.len() != arity {
                return Err(Error::arithmetic(format!(
                    "'{}' requires {} argument(s), got {}",
                    func,
                    arity,
                    args.len()
                )));
            }
        }

        match func {
            Function::Print => {
                if args.is_empty() {
                    return Err(Error::arithmetic("'print' requires at least 1 argument"));
                }

                for arg in args {
                    writeln!(self.sink, "{}", arg)?;
                }

                // args is non-empty here
                Ok(args.last().unwrap().clone())
            }
            Function::Abs => match &args[0] {
                Value::Number(n) => Ok(Value::Number(n.abs())),
                Value::Money(m) => Ok(Value::Money(Money::new(m.minor.abs(), m.currency))),
                v => Err(Error::arithmetic(format!("Cannot take 'abs' of {}", v.type_str()))),
            },
            Function::Neg => match &args[0] {
                Value::Number(n) => Ok(Value::Number(-n)),
                Value::Money(m) => Ok(Value::Money(Money::new(-m.minor, m.currency))),
                v => Err(Error::arithmetic(format!("Cannot negate {}", v.type_str()))),
            },
            Function::Round => match &args[0] {
                Value::Number(n) => Ok(Value::Number(n.round())),
                Value::Money(m) => m.round_major().map(Value::Money),
                v => Err(Error::arithmetic(format!("Cannot round {}", v.type_str()))),
            },
        }
    }
}

/// Apply a binary-operator token to two computed values
///
/// Each operator maps to exactly one arithmetic function; any other token
/// category in operator position is an arithmetic error. The functions
/// resolve Number/Money coercion themselves.
fn apply_operator(operator: TokenKind, lhs: Value, rhs: Value) -> Result<Value> {
    if !operator.is_binary_operator() {
        return Err(Error::arithmetic(format!(
            "Operation '{}' is not defined",
            operator
        )));
    }

    match operator {
        TokenKind::Plus => add(lhs, rhs),
        TokenKind::Minus => sub(lhs, rhs),
        TokenKind::Star => mul(lhs, rhs),
        TokenKind::Slash => div(lhs, rhs),
        operator => panic!("Unhandled binary operator: {}", operator),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Money(l), Value::Money(r)) => l.checked_add(r).map(Value::Money),
        // A plain number promotes into the money operand's currency, read
        // as major units
        (Value::Money(l), Value::Number(r)) => {
            l.checked_add(Money::from_number(r, l.currency)?).map(Value::Money)
        }
        (Value::Number(l), Value::Money(r)) => {
            Money::from_number(l, r.currency)?.checked_add(r).map(Value::Money)
        }
        (l, r) => Err(Error::arithmetic(format!(
            "Cannot add {} and {}",
            l.type_str(),
            r.type_str()
        ))),
    }
}

fn sub(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l - r)),
        (Value::Money(l), Value::Money(r)) => l.checked_sub(r).map(Value::Money),
        (Value::Money(l), Value::Number(r)) => {
            l.checked_sub(Money::from_number(r, l.currency)?).map(Value::Money)
        }
        (Value::Number(l), Value::Money(r)) => {
            Money::from_number(l, r.currency)?.checked_sub(r).map(Value::Money)
        }
        (l, r) => Err(Error::arithmetic(format!(
            "Cannot subtract {} from {}",
            r.type_str(),
            l.type_str()
        ))),
    }
}

fn mul(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l * r)),
        // Money absorbs numeric scaling from either side
        (Value::Money(l), Value::Number(r)) => l.scale(r).map(Value::Money),
        (Value::Number(l), Value::Money(r)) => r.scale(l).map(Value::Money),
        (Value::Money(l), Value::Money(r)) => Err(Error::arithmetic(format!(
            "Cannot multiply {} by {}",
            l, r
        ))),
        (l, r) => Err(Error::arithmetic(format!(
            "Cannot multiply {} and {}",
            l.type_str(),
            r.type_str()
        ))),
    }
}

fn div(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => {
            if r == 0.0 {
                return Err(Error::arithmetic("Divide by zero"));
            }

            Ok(Value::Number(l / r))
        }
        (Value::Money(l), Value::Number(r)) => l.checked_div(r).map(Value::Money),
        (Value::Money(l), Value::Money(r)) => Err(Error::arithmetic(format!(
            "Cannot divide {} by {}",
            l, r
        ))),
        (l, r) => Err(Error::arithmetic(format!(
            "Cannot divide {} by {}",
            l.type_str(),
            r.type_str()
        ))),
    }
}

#[cfg(test)]
use crate::lang::money::Currency;
#[cfg(test)]
use crate::lang::parse::Parser;

#[cfg(test)]
fn eval_with_sink(input: &str, sink: &mut dyn Write) -> Result<Option<Value>> {
    let ast = Parser::new(input)?.parse()?;
    Eval::new(sink).eval(&ast)
}

#[cfg(test)]
fn eval_src(input: &str) -> Result<Option<Value>> {
    let mut sink: Vec<u8> = Vec::new();
    eval_with_sink(input, &mut sink)
}

#[test]
fn test_number_arithmetic() {
    let data = vec![
        ("2 + 3 * 4", 14.0),
        ("(2 + 3) * 4", 20.0),
        ("10 - 2 - 3", 5.0),
        ("8 / 4 / 2", 1.0),
        ("1.5 * 4", 6.0),
        ("7 / 2", 3.5),
    ];

    for (input, expected) in data {
        assert_eq!(
            eval_src(input).unwrap(),
            Some(Value::Number(expected)),
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_money_arithmetic() {
    let data = vec![
        ("$10 + $2.50", Money::new(1250, Currency::Usd)),
        ("$10 - $2.50", Money::new(750, Currency::Usd)),
        ("$10 + 5", Money::new(1500, Currency::Usd)),
        ("5 + $10", Money::new(1500, Currency::Usd)),
        ("$10 - 5", Money::new(500, Currency::Usd)),
        ("20 - £5.50", Money::new(1450, Currency::Gbp)),
        ("$10 * 2", Money::new(2000, Currency::Usd)),
        ("3 * €5", Money::new(1500, Currency::Eur)),
        ("$10 / 4", Money::new(250, Currency::Usd)),
        ("$1 / 3", Money::new(33, Currency::Usd)),
    ];

    for (input, expected) in data {
        assert_eq!(
            eval_src(input).unwrap(),
            Some(Value::Money(expected)),
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_money_errors() {
    let data = vec![
        // Mismatched currencies
        "$1 + €1",
        "£1 - $1",
        // No currency-squared values
        "$2 * $3",
        "$2 / $2",
        // Number divided by money is not defined
        "5 / $1",
        "$1 / 0",
    ];

    for input in data {
        let err = eval_src(input).unwrap_err();
        assert!(
            matches!(err, Error::Arithmetic { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}

#[test]
fn test_assignment_persists_across_statements() {
    let data = vec![
        ("x = 5; x + 1", Value::Number(6.0)),
        ("x = 1; x = 2; x", Value::Number(2.0)),
        ("x = 1; x = x + 1; x + 1", Value::Number(3.0)),
        ("a = b = 3; a + b", Value::Number(6.0)),
        ("price = $8; price * 1.5", Value::Money(Money::new(1200, Currency::Usd))),
    ];

    for (input, expected) in data {
        assert_eq!(eval_src(input).unwrap(), Some(expected), "input: {:?}", input);
    }
}

#[test]
fn test_assignment_returns_assigned_value() {
    assert_eq!(eval_src("x = 5").unwrap(), Some(Value::Number(5.0)));
}

#[test]
fn test_unbound_name() {
    let data = vec!["y + 1", "x = y", "frobnicate 1 2"];

    for input in data {
        let err = eval_src(input).unwrap_err();
        assert!(
            matches!(err, Error::Unbound { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}

#[test]
fn test_divide_by_zero() {
    let err = eval_src("1 / 0").unwrap_err();
    assert!(matches!(err, Error::Arithmetic { .. }));

    let err = eval_src("x = 0; 1 / x").unwrap_err();
    assert!(matches!(err, Error::Arithmetic { .. }));
}

#[test]
fn test_bare_symbol_is_zero_argument_application() {
    // `x` as a whole statement parses as Apply(x, []); the data binding
    // must still come back out
    assert_eq!(eval_src("x = 7; x").unwrap(), Some(Value::Number(7.0)));

    assert_eq!(
        eval_src("m = €4.20; m").unwrap(),
        Some(Value::Money(Money::new(420, Currency::Eur)))
    );
}

#[test]
fn test_apply_data_with_arguments_fails() {
    let err = eval_src("x = 1; x 2 3").unwrap_err();
    assert!(matches!(err, Error::Arithmetic { .. }));
}

#[test]
fn test_builtin_functions() {
    let data = vec![
        ("abs (0 - 3)", Value::Number(3.0)),
        ("abs ($0 - $3)", Value::Money(Money::new(300, Currency::Usd))),
        ("neg 3", Value::Number(-3.0)),
        ("neg €1.10", Value::Money(Money::new(-110, Currency::Eur))),
        ("round 2.5", Value::Number(3.0)),
        ("round $1.49", Value::Money(Money::new(100, Currency::Usd))),
        ("round $1.50", Value::Money(Money::new(200, Currency::Usd))),
    ];

    for (input, expected) in data {
        assert_eq!(eval_src(input).unwrap(), Some(expected), "input: {:?}", input);
    }
}

#[test]
fn test_builtin_arity() {
    let data = vec!["abs 1 2", "neg", "round 1 2", "print"];

    for input in data {
        let err = eval_src(input).unwrap_err();
        assert!(
            matches!(err, Error::Arithmetic { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}

#[test]
fn test_print_writes_to_sink() {
    let mut sink: Vec<u8> = Vec::new();

    let result = eval_with_sink("x = $2.50; print x (x * 2)", &mut sink).unwrap();
    assert_eq!(result, Some(Value::Money(Money::new(500, Currency::Usd))));
    assert_eq!(String::from_utf8(sink).unwrap(), "$2.50\n$5.00\n");
}

#[test]
fn test_empty_input_has_no_value() {
    assert_eq!(eval_src("").unwrap(), None);
    assert_eq!(eval_src(";;").unwrap(), None);
}

#[test]
fn test_undefined_operator_rejected() {
    // The parser never builds this shape; the evaluator still refuses it
    let node = Node::BinaryOperator(
        Box::new(Node::Number(1.0)),
        TokenKind::Assign,
        Box::new(Node::Number(2.0)),
    );

    let mut sink: Vec<u8> = Vec::new();
    let err = Eval::new(&mut sink).eval(&node).unwrap_err();
    assert!(matches!(err, Error::Arithmetic { .. }));
}

#[test]
fn test_assign_target_must_be_symbol() {
    // Speculative shape built by hand; rejected at evaluation time
    let node = Node::Assign(Box::new(Node::Number(1.0)), Box::new(Node::Number(2.0)));

    let mut sink: Vec<u8> = Vec::new();
    let err = Eval::new(&mut sink).eval(&node).unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
}
