use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::{FRACBITS, FRACUNIT, fixed_to_float, float_to_fixed};

/// 16.16 signed fixed point. The whole plane pipeline runs on these; the only
/// float involvement is at the view seam where world coordinates come in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const UNIT: Self = Self(FRACUNIT);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value << FRACBITS)
    }

    #[inline]
    pub fn from_float(value: f32) -> Self {
        Self(float_to_fixed(value))
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Whole part, flooring towards negative infinity
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    #[inline]
    pub const fn to_float(self) -> f32 {
        fixed_to_float(self.0)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

/// FixedMul: widen through i64 so intermediate products cannot overflow
impl Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> FRACBITS) as i32)
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Plain integer scale, no shift
impl Mul<i32> for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

/// FixedDiv. Division by zero saturates rather than trapping, same as the
/// sign-checked early-out in the original `FixedDiv2`.
impl Div for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        let result = ((self.0 as i64) << FRACBITS) / rhs.0 as i64;
        if result > i32::MAX as i64 {
            Self::MAX
        } else if result < i32::MIN as i64 {
            Self::MIN
        } else {
            Self(result as i32)
        }
    }
}

/// Divide by a plain integer, keeping the fraction
impl Div<i32> for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i32) -> Self {
        if rhs == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        Self(self.0 / rhs)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl From<f32> for Fixed {
    fn from(value: f32) -> Self {
        Self::from_float(value)
    }
}

impl From<Fixed> for f32 {
    fn from(value: Fixed) -> Self {
        value.to_float()
    }
}

impl From<Fixed> for i32 {
    fn from(value: Fixed) -> Self {
        value.to_int()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_identities() {
        let a = Fixed::from_int(42);
        assert_eq!(a * Fixed::UNIT, a);
        assert_eq!(Fixed::ZERO * a, Fixed::ZERO);
        assert_eq!(Fixed::from_int(3) * Fixed::from_int(4), Fixed::from_int(12));
        assert_eq!(
            Fixed::from_float(1.5) * Fixed::from_int(2),
            Fixed::from_int(3)
        );
    }

    #[test]
    fn div_round_trip() {
        let a = Fixed::from_int(100);
        let b = Fixed::from_int(7);
        let q = a / b;
        // 16 bits of fraction: the round trip loses at most one ulp per op
        assert!((q * b - a).abs() < Fixed::from_bits(b.to_bits().abs()));
        assert_eq!(Fixed::from_int(12) / Fixed::from_int(4), Fixed::from_int(3));
    }

    #[test]
    fn div_by_zero_saturates() {
        assert_eq!(Fixed::from_int(5) / Fixed::ZERO, Fixed::MAX);
        assert_eq!(Fixed::from_int(-5) / Fixed::ZERO, Fixed::MIN);
    }

    #[test]
    fn int_floor_semantics() {
        assert_eq!(Fixed::from_float(2.75).to_int(), 2);
        assert_eq!(Fixed::from_bits(-(FRACUNIT / 2)).to_int(), -1);
    }
}
