//! Native token amounts.
//!
//! Amounts are held as integer lamports to avoid floating-point drift. The
//! operator-facing unit (the whole token) only appears at the edges: parsing
//! input and the persisted `amount` field.

use std::fmt;
use std::ops::Add;

/// Number of lamports in one whole token.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// A native token amount in the smallest on-chain unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lamports(u64);

impl Lamports {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a whole-token quantity to lamports, rounding to the nearest unit.
    ///
    /// Returns `None` for negative, non-finite, or out-of-range values.
    pub fn from_sol(sol: f64) -> Option<Self> {
        if !sol.is_finite() || sol < 0.0 {
            return None;
        }
        let raw = (sol * LAMPORTS_PER_SOL as f64).round();
        if raw > u64::MAX as f64 {
            return None;
        }
        Some(Self(raw as u64))
    }

    /// The amount expressed in whole tokens.
    pub fn to_sol(&self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Add for Lamports {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", self.to_sol())
    }
}

/// Serde adapter persisting a [`Lamports`] value as a whole-token JSON number.
///
/// The number goes through an `f64`, so the value survives a save and load
/// exactly only up to 2^53 lamports (about 9 million tokens). Larger amounts
/// come back rounded to the nearest representable value.
pub mod as_sol {
    use super::Lamports;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Lamports, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(amount.to_sol())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Lamports, D::Error> {
        let sol = f64::deserialize(deserializer)?;
        Lamports::from_sol(sol)
            .ok_or_else(|| de::Error::custom(format!("invalid token amount: {sol}")))
    }
}
