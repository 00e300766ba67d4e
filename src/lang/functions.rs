use std::fmt;

use lazy_static::lazy_static;

/// Builtin functions callable through application, eg. `abs x` or
/// `print subtotal total`
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Function {
    Print,
    Abs,
    Neg,
    Round,
}

impl Function {
    /// Required argument count, or `None` if variadic
    pub fn arity(self) -> Option<usize> {
        match self {
            Function::Print => None,
            Function::Abs => Some(1),
            Function::Neg => Some(1),
            Function::Round => Some(1),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Print => write!(f, "print"),
            Function::Abs => write!(f, "abs"),
            Function::Neg => write!(f, "neg"),
            Function::Round => write!(f, "round"),
        }
    }
}

lazy_static! {
    pub static ref FUNCTIONS: Vec<Function> = vec![
        Function::Print,
        Function::Abs,
        Function::Neg,
        Function::Round,
    ];
}
