use std::fmt;

use crate::lang::error::{Error, Result};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// The sigil that introduces a money literal for this currency
    pub fn sigil(self) -> char {
        match self {
            Currency::Usd => '$',
            Currency::Eur => '€',
            Currency::Gbp => '£',
        }
    }

    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '$' => Some(Currency::Usd),
            '€' => Some(Currency::Eur),
            '£' => Some(Currency::Gbp),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sigil())
    }
}

/// A currency-tagged amount
///
/// Amounts are held in minor units (cents/pence) so money stays exact no
/// matter how many additions a session runs. Scaling by a plain number goes
/// through `f64` and rounds half-away-from-zero back to a minor unit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Money {
    pub minor: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(minor: i64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Promote a plain number into this currency, reading it as major units
    pub fn from_number(n: f64, currency: Currency) -> Result<Self> {
        Ok(Money {
            minor: to_minor(n * 100.0)?,
            currency,
        })
    }

    fn check_currency(self, other: Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(Error::arithmetic(format!(
                "Mismatched currencies: '{}' vs '{}'",
                self, other
            )));
        }

        Ok(())
    }

    pub fn checked_add(self, other: Money) -> Result<Money> {
        self.check_currency(other)?;

        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or_else(|| Error::arithmetic(format!("{} + {} overflows", self, other)))?;

        Ok(Money::new(minor, self.currency))
    }

    pub fn checked_sub(self, other: Money) -> Result<Money> {
        self.check_currency(other)?;

        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or_else(|| Error::arithmetic(format!("{} - {} overflows", self, other)))?;

        Ok(Money::new(minor, self.currency))
    }

    /// Scale the amount by a plain number
    pub fn scale(self, n: f64) -> Result<Money> {
        Ok(Money::new(to_minor(self.minor as f64 * n)?, self.currency))
    }

    /// Divide the amount by a plain number
    pub fn checked_div(self, n: f64) -> Result<Money> {
        if n == 0.0 {
            return Err(Error::arithmetic("Divide by zero"));
        }

        Ok(Money::new(to_minor(self.minor as f64 / n)?, self.currency))
    }

    /// Round to the nearest whole major unit
    pub fn round_major(self) -> Result<Money> {
        let major = (self.minor as f64 / 100.0).round();

        Ok(Money::new(to_minor(major * 100.0)?, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();

        write!(f, "{}{}{}.{:02}", sign, self.currency, abs / 100, abs % 100)
    }
}

/// Round a computed amount back to whole minor units
fn to_minor(x: f64) -> Result<i64> {
    let rounded = x.round();
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(Error::arithmetic(format!("Amount out of range: {}", x)));
    }

    Ok(rounded as i64)
}

#[test]
fn test_money_add_sub() {
    let data = vec![
        ((1000, Currency::Usd), (250, Currency::Usd), 1250),
        ((0, Currency::Eur), (99, Currency::Eur), 99),
        ((-500, Currency::Gbp), (500, Currency::Gbp), 0),
    ];

    for ((l, lc), (r, rc), expected) in data {
        let sum = Money::new(l, lc).checked_add(Money::new(r, rc)).unwrap();
        assert_eq!(sum, Money::new(expected, lc));

        let diff = sum.checked_sub(Money::new(r, rc)).unwrap();
        assert_eq!(diff, Money::new(l, lc));
    }
}

#[test]
fn test_money_currency_mismatch() {
    let usd = Money::new(100, Currency::Usd);
    let eur = Money::new(100, Currency::Eur);

    assert!(usd.checked_add(eur).is_err());
    assert!(usd.checked_sub(eur).is_err());
}

#[test]
fn test_money_scale_rounds_to_minor_unit() {
    let data = vec![
        ((1000, Currency::Usd), 2.0, 2000),
        ((1000, Currency::Usd), 0.333, 333),
        ((999, Currency::Eur), 0.5, 500),
        ((-999, Currency::Eur), 0.5, -500),
    ];

    for ((minor, currency), by, expected) in data {
        let scaled = Money::new(minor, currency).scale(by).unwrap();
        assert_eq!(scaled, Money::new(expected, currency));
    }
}

#[test]
fn test_money_div() {
    let m = Money::new(1000, Currency::Usd);

    assert_eq!(m.checked_div(4.0).unwrap(), Money::new(250, Currency::Usd));
    assert!(m.checked_div(0.0).is_err());
}

#[test]
fn test_money_round_major() {
    let data = vec![
        ((149, Currency::Usd), 100),
        ((150, Currency::Usd), 200),
        ((-150, Currency::Gbp), -200),
        ((200, Currency::Eur), 200),
    ];

    for ((minor, currency), expected) in data {
        let rounded = Money::new(minor, currency).round_major().unwrap();
        assert_eq!(rounded, Money::new(expected, currency));
    }
}

#[test]
fn test_money_display() {
    let data = vec![
        (Money::new(1250, Currency::Usd), "$12.50"),
        (Money::new(5, Currency::Eur), "€0.05"),
        (Money::new(-325, Currency::Gbp), "-£3.25"),
        (Money::new(0, Currency::Usd), "$0.00"),
    ];

    for (money, expected) in data {
        assert_eq!(money.to_string(), expected);
    }
}
