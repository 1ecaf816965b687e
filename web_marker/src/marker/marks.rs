use serde::{Deserialize, Serialize};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

/// A fractional amount of marks.
///
/// Integral amounts are displayed with one decimal (`1.0`), anything else with the
/// shortest representation that reads back to the same value (`0.5`, `1.25`).
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marks(f64);

impl Marks {
    pub const ZERO: Marks = Marks(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl AddAssign<f64> for Marks {
    fn add_assign(&mut self, rhs: f64) {
        self.0 += rhs;
    }
}

impl AddAssign for Marks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Add for Marks {
    type Output = Marks;

    fn add(self, rhs: Self) -> Self::Output {
        Marks(self.0 + rhs.0)
    }
}

impl Sum for Marks {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Marks::ZERO, |acc, marks| acc + marks)
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
