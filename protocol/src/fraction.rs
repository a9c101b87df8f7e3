//! Exact rational arithmetic for monetary values.
//!
//! Every value field in the transaction graph is a [`Fraction`]. Splitting a
//! coin three ways must conserve value *exactly* — `1/3 + 1/3 + 1/3 == 1`,
//! not `0.99999999...` — so no floating point anywhere near money.
//!
//! Fractions are always stored in lowest terms with a strictly positive
//! denominator; the sign lives on the numerator. That makes equality and
//! ordering plain field comparisons, which matters because verification
//! compares input and output sums for exact parity.
//!
//! Components are `i128`. None of the repos in this ecosystem reach for a
//! bigint, and a reduced fraction produced by realistic split/merge chains
//! stays far below 128 bits. Intermediate products are pre-reduced across
//! the diagonal (gcd of one side's numerator with the other's denominator)
//! to keep growth in check.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur constructing or dividing fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FractionError {
    /// A zero denominator or a division by a zero fraction.
    #[error("division by zero")]
    DivisionByZero,

    /// A string that is neither an integer nor `"num|den"`.
    #[error("malformed fraction literal")]
    MalformedLiteral,
}

/// An exact rational number in lowest terms.
///
/// Invariants (upheld by every constructor and operation):
///
/// - `den > 0` — the sign is carried by `num`.
/// - `gcd(num, den) == 1` — always reduced.
///
/// Because of these invariants, the derived `PartialEq`/`Eq`/`Hash` are
/// structural *and* mathematical: `2/4` and `1/2` are the same value and
/// the same bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    num: i128,
    den: i128,
}

impl Fraction {
    /// The additive identity, `0`.
    pub const ZERO: Fraction = Fraction { num: 0, den: 1 };

    /// The multiplicative identity, `1`.
    pub const ONE: Fraction = Fraction { num: 1, den: 1 };

    /// Creates a fraction `num / den`, reduced to lowest terms.
    ///
    /// Fails with [`FractionError::DivisionByZero`] when `den == 0`.
    pub fn new(num: i128, den: i128) -> Result<Fraction, FractionError> {
        if den == 0 {
            return Err(FractionError::DivisionByZero);
        }
        Ok(Fraction::reduced(num, den))
    }

    /// The numerator of the reduced form. Negative iff the value is negative.
    pub fn numerator(&self) -> i128 {
        self.num
    }

    /// The denominator of the reduced form. Always strictly positive.
    pub fn denominator(&self) -> i128 {
        self.den
    }

    /// `true` iff the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Normalizes sign and divides out the gcd. `den` must be non-zero.
    fn reduced(num: i128, den: i128) -> Fraction {
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den);
        Fraction {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    /// Exact sum.
    pub fn plus(self, other: Fraction) -> Fraction {
        // Use lcm(a.den, b.den) as the common denominator instead of the
        // raw product to keep intermediates small.
        let g = gcd(self.den, other.den);
        let num = self.num * (other.den / g) + other.num * (self.den / g);
        let den = (self.den / g) * other.den;
        Fraction::reduced(num, den)
    }

    /// Exact difference.
    pub fn minus(self, other: Fraction) -> Fraction {
        self.plus(other.negate())
    }

    /// Exact product.
    pub fn times(self, other: Fraction) -> Fraction {
        // Cross-reduce before multiplying so products of long split chains
        // do not blow up the intermediates.
        let g1 = gcd(self.num, other.den);
        let g2 = gcd(other.num, self.den);
        Fraction::reduced(
            (self.num / g1) * (other.num / g2),
            (self.den / g2) * (other.den / g1),
        )
    }

    /// Exact quotient. Fails when `other` is zero.
    pub fn divided_by(self, other: Fraction) -> Result<Fraction, FractionError> {
        if other.num == 0 {
            return Err(FractionError::DivisionByZero);
        }
        Ok(self.times(Fraction::reduced(other.den, other.num)))
    }

    /// The additive inverse.
    pub fn negate(self) -> Fraction {
        Fraction {
            num: -self.num,
            den: self.den,
        }
    }

    /// Strict less-than. Equivalent to `self < other`.
    pub fn is_less_than(self, other: Fraction) -> bool {
        self < other
    }
}

/// Greatest common divisor, always positive. `gcd(0, 0)` is defined as 1 so
/// reduction never divides by zero (the zero fraction reduces to `0/1`).
fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}

impl From<i128> for Fraction {
    fn from(n: i128) -> Fraction {
        Fraction { num: n, den: 1 }
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Fraction {
        Fraction::from(n as i128)
    }
}

impl From<u64> for Fraction {
    fn from(n: u64) -> Fraction {
        Fraction::from(n as i128)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Fraction) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Fraction) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order.
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

impl Add for Fraction {
    type Output = Fraction;
    fn add(self, rhs: Fraction) -> Fraction {
        self.plus(rhs)
    }
}

impl Sub for Fraction {
    type Output = Fraction;
    fn sub(self, rhs: Fraction) -> Fraction {
        self.minus(rhs)
    }
}

impl Mul for Fraction {
    type Output = Fraction;
    fn mul(self, rhs: Fraction) -> Fraction {
        self.times(rhs)
    }
}

impl Div for Fraction {
    type Output = Result<Fraction, FractionError>;
    fn div(self, rhs: Fraction) -> Result<Fraction, FractionError> {
        self.divided_by(rhs)
    }
}

impl Neg for Fraction {
    type Output = Fraction;
    fn neg(self) -> Fraction {
        self.negate()
    }
}

impl fmt::Display for Fraction {
    /// The canonical serialized form, shared by fingerprints and the wire
    /// format: a bare integer when the value is whole or zero, otherwise
    /// `"num|den"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 || self.num == 0 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}|{}", self.num, self.den)
        }
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    /// Parses the canonical form: `"3"`, `"-3"`, or `"3|13"`.
    fn from_str(s: &str) -> Result<Fraction, FractionError> {
        match s.split_once('|') {
            None => {
                let num: i128 = s.trim().parse().map_err(|_| FractionError::MalformedLiteral)?;
                Ok(Fraction::from(num))
            }
            Some((num, den)) => {
                let num: i128 = num.trim().parse().map_err(|_| FractionError::MalformedLiteral)?;
                let den: i128 = den.trim().parse().map_err(|_| FractionError::MalformedLiteral)?;
                Fraction::new(num, den)
            }
        }
    }
}
