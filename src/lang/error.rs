use thiserror::Error;

/// Every way an input can fail, from tokenization through evaluation.
///
/// There is no recovery: the first error aborts the current parse or
/// evaluation and is handed back to the caller as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized character or malformed literal
    #[error("Lexical error: {msg}")]
    Lexical { msg: String },
    /// Unexpected token while parsing
    #[error("Syntax error: {msg}")]
    Syntax { msg: String },
    /// Lookup of a name that was never assigned
    #[error("Unknown name: {name}")]
    Unbound { name: String },
    /// Undefined operation, divide by zero, currency mismatch
    #[error("Arithmetic error: {msg}")]
    Arithmetic { msg: String },
    /// Output sink failure (eg. while servicing `print`)
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn lexical<S: Into<String>>(msg: S) -> Self {
        Error::Lexical { msg: msg.into() }
    }

    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax { msg: msg.into() }
    }

    pub fn unbound<S: Into<String>>(name: S) -> Self {
        Error::Unbound { name: name.into() }
    }

    pub fn arithmetic<S: Into<String>>(msg: S) -> Self {
        Error::Arithmetic { msg: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
