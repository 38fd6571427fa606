//! Compensation value types.
//!
//! Amounts are carried in integer minor units (cents) so that arithmetic
//! and persistence never touch floating point.

use super::error::{DomainError, ParseCompensationKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of compensation offered for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationKind {
    /// Payment credited against tuition.
    Tuition,
    /// Direct stipend payment.
    Stipend,
    /// Scholarship award.
    Scholarship,
}

impl CompensationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::Stipend => "stipend",
            Self::Scholarship => "scholarship",
        }
    }
}

impl fmt::Display for CompensationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CompensationKind {
    type Error = ParseCompensationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tuition" => Ok(Self::Tuition),
            "stipend" => Ok(Self::Stipend),
            "scholarship" => Ok(Self::Scholarship),
            _ => Err(ParseCompensationKindError(value.to_owned())),
        }
    }
}

/// Compensation amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompensationAmount(i64);

impl CompensationAmount {
    /// Largest permitted amount: 100 000.00 in minor units.
    pub const MAX_MINOR_UNITS: i64 = 10_000_000;

    /// Creates a validated compensation amount.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::CompensationOutOfRange`] when the amount is
    /// zero, negative, or above [`Self::MAX_MINOR_UNITS`].
    pub const fn new(minor_units: i64) -> Result<Self, DomainError> {
        if minor_units <= 0 || minor_units > Self::MAX_MINOR_UNITS {
            return Err(DomainError::CompensationOutOfRange(minor_units));
        }
        Ok(Self(minor_units))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CompensationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compensation offered for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compensation {
    amount: CompensationAmount,
    kind: CompensationKind,
}

impl Compensation {
    /// Creates a compensation offer.
    #[must_use]
    pub const fn new(amount: CompensationAmount, kind: CompensationKind) -> Self {
        Self { amount, kind }
    }

    /// Returns the offered amount.
    #[must_use]
    pub const fn amount(&self) -> CompensationAmount {
        self.amount
    }

    /// Returns the compensation kind.
    #[must_use]
    pub const fn kind(&self) -> CompensationKind {
        self.kind
    }
}
