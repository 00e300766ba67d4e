use std::iter::Peekable;
use std::str::Chars;

use crate::lang::error::{Error, Result};
use crate::lang::money::{Currency, Money};
use crate::lang::token::Token;

/// Lazy, forward-only tokenizer
///
/// The parser pulls one token at a time via `next_token()`; there is no
/// backtracking and no buffering beyond the parser's single token of
/// lookahead. Once the input is exhausted, `next_token()` yields `Eof`.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Character offset into the source, for error reporting
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            pos: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }

        c
    }

    fn eat_while<F: Fn(char) -> bool>(&mut self, f: F) -> String {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if !f(c) {
                break;
            }

            s.push(c);
            self.bump();
        }

        s
    }

    /// number: [0-9]+ ('.' [0-9]+)?
    fn number(&mut self) -> Result<f64> {
        let mut lexeme = self.eat_while(|c| c.is_ascii_digit());

        if let Some('.') = self.chars.peek() {
            self.bump();
            let frac = self.eat_while(|c| c.is_ascii_digit());
            if frac.is_empty() {
                return Err(Error::lexical(format!(
                    "Missing digits after '.' at offset {}",
                    self.pos
                )));
            }

            lexeme.push('.');
            lexeme.push_str(&frac);
        }

        lexeme
            .parse()
            .map_err(|_| Error::lexical(format!("Malformed number literal: {}", lexeme)))
    }

    /// money: sigil [0-9]+ ('.' [0-9] [0-9]?)?
    ///
    /// Parsed digit-by-digit into minor units so amounts never pass through
    /// floating point. At most two decimal places are allowed.
    fn money(&mut self, currency: Currency) -> Result<Money> {
        let units = self.eat_while(|c| c.is_ascii_digit());
        if units.is_empty() {
            return Err(Error::lexical(format!(
                "Expected an amount after '{}' at offset {}",
                currency, self.pos
            )));
        }

        let units: i64 = units
            .parse()
            .map_err(|_| Error::lexical(format!("Money literal out of range: {}{}", currency, units)))?;
        let mut minor = units
            .checked_mul(100)
            .ok_or_else(|| Error::lexical(format!("Money literal out of range: {}{}", currency, units)))?;

        if let Some('.') = self.chars.peek() {
            self.bump();
            let frac = self.eat_while(|c| c.is_ascii_digit());
            let cents = match frac.len() {
                1 => frac.parse::<i64>().unwrap() * 10,
                2 => frac.parse::<i64>().unwrap(),
                0 => {
                    return Err(Error::lexical(format!(
                        "Missing digits after '.' at offset {}",
                        self.pos
                    )))
                }
                _ => {
                    return Err(Error::lexical(format!(
                        "Money supports at most two decimal places: {}{}.{}",
                        currency, units, frac
                    )))
                }
            };

            minor += cents;
        }

        Ok(Money::new(minor, currency))
    }

    fn symbol(&mut self) -> String {
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Produce the next token, advancing past it
    pub fn next_token(&mut self) -> Result<Token> {
        while let Some(c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        if c.is_ascii_digit() {
            return Ok(Token::Number(self.number()?));
        }

        if let Some(currency) = Currency::from_sigil(c) {
            self.bump();
            return Ok(Token::Money(self.money(currency)?));
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Token::Symbol(self.symbol()));
        }

        self.bump();
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '=' => Token::Assign,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ';' => Token::Delimiter,
            c => {
                return Err(Error::lexical(format!(
                    "Unrecognized character '{}' at offset {}",
                    c,
                    self.pos - 1
                )))
            }
        };

        Ok(token)
    }
}

#[cfg(test)]
fn lex(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_lex_expressions() {
    let data = vec![
        (
            "2 + 3 * 4",
            vec![
                Token::Number(2.0),
                Token::Plus,
                Token::Number(3.0),
                Token::Star,
                Token::Number(4.0),
                Token::Eof,
            ],
        ),
        (
            "(1.5 - x) / rate;",
            vec![
                Token::LParen,
                Token::Number(1.5),
                Token::Minus,
                Token::Symbol("x".to_string()),
                Token::RParen,
                Token::Slash,
                Token::Symbol("rate".to_string()),
                Token::Delimiter,
                Token::Eof,
            ],
        ),
        (
            "total = $12.50",
            vec![
                Token::Symbol("total".to_string()),
                Token::Assign,
                Token::Money(Money::new(1250, Currency::Usd)),
                Token::Eof,
            ],
        ),
        (
            "€3+£0.9",
            vec![
                Token::Money(Money::new(300, Currency::Eur)),
                Token::Plus,
                Token::Money(Money::new(90, Currency::Gbp)),
                Token::Eof,
            ],
        ),
        ("_tax_21", vec![Token::Symbol("_tax_21".to_string()), Token::Eof]),
        ("", vec![Token::Eof]),
        ("   \t\n ", vec![Token::Eof]),
    ];

    for (input, expected) in data {
        assert_eq!(lex(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_lex_whitespace_ignored() {
    let data = vec![
        ("1+2", "1 + 2"),
        ("x=  $5", "x = $5"),
        (" a ;b ", "a; b"),
    ];

    for (input, baseline) in data {
        assert_eq!(lex(input).unwrap(), lex(baseline).unwrap());
    }
}

#[test]
fn test_lex_errors() {
    let data = vec!["?", "2 & 3", "$", "€ 5", "$1.234", "1.", "$1.", "$99999999999999999999"];

    for input in data {
        let err = lex(input).unwrap_err();
        assert!(
            matches!(err, Error::Lexical { .. }),
            "input: {:?}, err: {}",
            input,
            err
        );
    }
}
