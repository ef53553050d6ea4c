// Exact rational offsets and durations.
//
// Score time is measured in whole notes and has to be exact: a triplet
// eighth is 1/12, and two indicators either start at the same offset or they
// don't. `Offset` is a normalized fraction (`i64` numerator, positive `i64`
// denominator, lowest terms), so derived equality and hashing agree with
// numeric equality. Negative offsets are meaningful: a reapplied indicator
// sits at -1 so that anything actually written at the top of a section wins.
//
// Serialized as `"n/d"` (or `"n"` for whole numbers) so section metadata
// stays readable.

use crate::error::ScoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// An exact point in (or span of) score time, in whole notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    num: i64,
    den: i64,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Offset {
    pub const ZERO: Offset = Offset { num: 0, den: 1 };

    /// `num / den` in lowest terms.
    ///
    /// # Panics
    /// If `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "offset denominator must be non-zero");
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den).max(1);
        Self {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub const fn whole(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn is_negative(self) -> bool {
        self.num < 0
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Ord for Offset {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying keeps the order.
        (i128::from(self.num) * i128::from(other.den))
            .cmp(&(i128::from(other.num) * i128::from(self.den)))
    }
}

impl PartialOrd for Offset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        self + (-rhs)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset {
            num: -self.num,
            den: self.den,
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Offset {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |reason| ScoreError::BadOffset {
            text: s.to_string(),
            reason,
        };
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n, d),
            None => (s, "1"),
        };
        let num: i64 = num.trim().parse().map_err(|_| bad("numerator is not an integer"))?;
        let den: i64 = den.trim().parse().map_err(|_| bad("denominator is not an integer"))?;
        if den == 0 {
            return Err(bad("zero denominator"));
        }
        Ok(Offset::new(num, den))
    }
}

impl Serialize for Offset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Offset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Offset::new(2, 8), Offset::new(1, 4));
        assert_eq!(Offset::new(3, -6), Offset::new(-1, 2));
        assert_eq!(Offset::new(0, 5), Offset::ZERO);
        assert_eq!(Offset::new(6, 3), Offset::whole(2));
    }

    #[test]
    fn test_ordering() {
        assert!(Offset::new(1, 3) < Offset::new(1, 2));
        assert!(Offset::whole(-1) < Offset::ZERO);
        assert!(Offset::new(3, 4) > Offset::new(2, 3));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Offset::new(1, 4) + Offset::new(1, 8), Offset::new(3, 8));
        assert_eq!(Offset::new(1, 4) - Offset::new(1, 2), Offset::new(-1, 4));
        assert!((-Offset::whole(1)).is_negative());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("3/8".parse::<Offset>().unwrap(), Offset::new(3, 8));
        assert_eq!("-1".parse::<Offset>().unwrap(), Offset::whole(-1));
        let err = "1/0".parse::<Offset>().unwrap_err();
        assert!(matches!(err, ScoreError::BadOffset { reason: "zero denominator", .. }));
        assert_eq!(
            "x".parse::<Offset>().unwrap_err().to_string(),
            "bad offset \"x\": numerator is not an integer"
        );
        assert_eq!(Offset::new(3, 8).to_string(), "3/8");
        assert_eq!(Offset::whole(-1).to_string(), "-1");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Offset::new(5, 4)).unwrap();
        assert_eq!(json, "\"5/4\"");
        let back: Offset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Offset::new(5, 4));
    }
}
