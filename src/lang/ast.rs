use crate::lang::money::Money;
use crate::lang::token::TokenKind;

/// A parsed program fragment
///
/// The tree is inert data: evaluating a node never mutates the tree itself,
/// only the namespace (through `Assign`, and transitively `Apply`).
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    /// Numeric literal; evaluates to itself
    Number(f64),
    /// Currency-tagged literal; evaluates to itself
    Money(Money),
    /// Variable reference; evaluates to the name's current binding
    Symbol(String),
    /// (left, operator, right)
    ///
    /// The operator is kept as a token category. Evaluation rejects any
    /// category outside the binary-operator subset.
    BinaryOperator(Box<Node>, TokenKind, Box<Node>),
    /// (target, value)
    ///
    /// The target must be a `Symbol`. That is enforced at evaluation time,
    /// not construction time, since callers may build speculative shapes.
    Assign(Box<Node>, Box<Node>),
    /// (head, arguments)
    ///
    /// A name applied to zero or more trailing operands, eg. `print x 2`.
    Apply(String, Vec<Node>),
    /// Ordered sequence; evaluates every node and yields the last value
    Statements(Vec<Node>),
}
