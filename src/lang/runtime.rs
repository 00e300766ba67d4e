use std::io::Write;

use log::debug;

use crate::lang::error::Result;
use crate::lang::eval::{Eval, Value};
use crate::lang::parse::Parser;

/// One interpreter session: a parser front end over a single evaluator
///
/// Variable state lives in the evaluator's namespace and persists across
/// `eval` calls, so a REPL gets session semantics for free. Not thread-safe;
/// callers wanting concurrency create one `Runtime` per thread.
pub struct Runtime<'a> {
    eval: Eval<'a>,
}

impl<'a> Runtime<'a> {
    /// Create a new `Runtime` instance
    ///
    /// `sink` is where output should be written, eg. the result of `print`
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Runtime {
            eval: Eval::new(sink),
        }
    }

    /// Parse and evaluate `source`, returning the last statement's value
    ///
    /// `None` means the input held no statements at all.
    pub fn eval(&mut self, source: &str) -> Result<Option<Value>> {
        debug!("eval: {}", source);

        let ast = Parser::new(source)?.parse()?;
        self.eval.eval(&ast)
    }
}

#[cfg(test)]
use crate::lang::error::Error;
#[cfg(test)]
use crate::lang::money::{Currency, Money};

#[test]
fn test_state_persists_across_calls() {
    let mut sink: Vec<u8> = Vec::new();
    let mut runtime = Runtime::new(&mut sink);

    assert_eq!(
        runtime.eval("subtotal = $10").unwrap(),
        Some(Value::Money(Money::new(1000, Currency::Usd)))
    );
    assert_eq!(
        runtime.eval("subtotal * 1.1").unwrap(),
        Some(Value::Money(Money::new(1100, Currency::Usd)))
    );
}

#[test]
fn test_session_survives_errors() {
    let mut sink: Vec<u8> = Vec::new();
    let mut runtime = Runtime::new(&mut sink);

    runtime.eval("x = 2").unwrap();
    assert!(runtime.eval("x +").is_err());
    assert!(matches!(
        runtime.eval("1 / 0").unwrap_err(),
        Error::Arithmetic { .. }
    ));

    // Bindings made before the failures are still visible
    assert_eq!(runtime.eval("x").unwrap(), Some(Value::Number(2.0)));
}
