#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literal representations.
//!
//! A literal is a variable together with a polarity. Every representation
//! offers O(1) negation and a dense `index()` used to key per-literal tables
//! such as watch lists.
use core::ops::{Neg, Not};
use std::fmt::Debug;
use std::hash::Hash;

/// Variables are numbered from 1; 0 is never a valid variable.
pub type Variable = u32;

pub trait Literal: Copy + Debug + Eq + Hash + Ord + Default + Send + Sync + 'static {
    fn new(var: Variable, polarity: bool) -> Self;
    fn variable(self) -> Variable;

    /// `true` for the positive literal `x`, `false` for `¬x`.
    fn polarity(self) -> bool;

    #[must_use]
    fn negated(self) -> Self;

    fn is_negated(self) -> bool {
        !self.polarity()
    }

    fn is_positive(self) -> bool {
        self.polarity()
    }

    /// Dense index: `2 * var` for the positive literal, `2 * var + 1` for the negative one.
    fn index(self) -> usize {
        self.variable() as usize * 2 + usize::from(self.is_negated())
    }

    #[must_use]
    fn from_i32(value: i32) -> Self {
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn to_i32(self) -> i32 {
        let var = self.variable() as i32;
        if self.polarity() { var } else { -var }
    }
}

/// Encodes `var * 2 + is_negated`, so negation is a single xor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DoubleLiteral(u32);

impl Literal for DoubleLiteral {
    fn new(var: Variable, polarity: bool) -> Self {
        Self(var * 2 + u32::from(!polarity))
    }

    fn variable(self) -> Variable {
        self.0 / 2
    }

    fn polarity(self) -> bool {
        self.0 % 2 == 0
    }

    fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Keeps the variable in the low 31 bits and the polarity in the top bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedLiteral(u32);

impl Literal for PackedLiteral {
    fn new(var: Variable, polarity: bool) -> Self {
        Self(var & 0x7FFF_FFFF | (u32::from(polarity) << 31))
    }

    fn variable(self) -> Variable {
        self.0 & 0x7FFF_FFFF
    }

    fn polarity(self) -> bool {
        (self.0 >> 31) != 0
    }

    fn negated(self) -> Self {
        Self(self.0 ^ 0x8000_0000)
    }
}

macro_rules! impl_negation {
    ($($ty:ty),*) => {
        $(
            impl Neg for $ty {
                type Output = Self;

                fn neg(self) -> Self::Output {
                    self.negated()
                }
            }

            impl Not for $ty {
                type Output = Self;

                fn not(self) -> Self::Output {
                    self.negated()
                }
            }
        )*
    };
}

impl_negation!(DoubleLiteral, PackedLiteral);

#[cfg(test)]
mod tests {
    use super::*;

    fn check_roundtrip<L: Literal>() {
        for value in [1, -1, 7, -7, 1024, -99_999] {
            let lit = L::from_i32(value);
            assert_eq!(lit.to_i32(), value);
            assert_eq!(lit.negated().to_i32(), -value);
            assert_eq!(lit.negated().negated(), lit);
        }
    }

    #[test]
    fn test_double_literal() {
        check_roundtrip::<DoubleLiteral>();

        let pos = DoubleLiteral::new(3, true);
        let neg = DoubleLiteral::new(3, false);
        assert!(pos.is_positive());
        assert!(neg.is_negated());
        assert_eq!(!pos, neg);
        assert_eq!(-neg, pos);
        assert_eq!(pos.index(), 6);
        assert_eq!(neg.index(), 7);
    }

    #[test]
    fn test_packed_literal() {
        check_roundtrip::<PackedLiteral>();

        assert_eq!(
            PackedLiteral::new(1, false).negated(),
            PackedLiteral::new(1, true)
        );
        assert_eq!(PackedLiteral::new(5, true).index(), 10);
        assert_eq!(PackedLiteral::new(5, false).index(), 11);
    }

    #[test]
    fn test_complementary() {
        let a = DoubleLiteral::from_i32(4);
        let b = DoubleLiteral::from_i32(-4);
        assert_eq!(a.variable(), b.variable());
        assert_ne!(a.polarity(), b.polarity());
        assert_ne!(a, b);
    }
}
