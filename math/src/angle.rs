use std::f32::consts::TAU;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use lazy_static::lazy_static;

use crate::Fixed;

/// Size of the fine trig table (one full turn)
pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// BAM bits dropped when indexing the fine table
pub const ANGLETOFINESHIFT: u32 = 19;
/// BAM bits dropped when mapping a view angle to a sky texture column
pub const ANGLETOSKYSHIFT: u32 = 22;

pub const ANG45: Angle = Angle(0x2000_0000);
pub const ANG90: Angle = Angle(0x4000_0000);
pub const ANG180: Angle = Angle(0x8000_0000);
pub const ANG270: Angle = Angle(0xC000_0000);

lazy_static! {
    /// Quarter-turn of overlap on the end so cosine can index `+ FINEANGLES/4`
    /// without wrapping
    static ref FINESINE: Vec<Fixed> = {
        let mut table = Vec::with_capacity(FINEANGLES + FINEANGLES / 4);
        for i in 0..FINEANGLES + FINEANGLES / 4 {
            // sample mid-slot like the original table generator
            let rad = (i as f32 + 0.5) * TAU / FINEANGLES as f32;
            table.push(Fixed::from_float(rad.sin()));
        }
        table
    };
}

/// Binary angle measure: a full turn is the full `u32` range, so wrapping
/// arithmetic is angle arithmetic.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Angle(u32);

impl Angle {
    #[inline]
    pub const fn new(bam: u32) -> Self {
        Self(bam)
    }

    #[inline]
    pub fn from_radians(rad: f32) -> Self {
        let mut turns = rad / TAU;
        turns -= turns.floor();
        Self((turns * 4_294_967_296.0) as u64 as u32)
    }

    #[inline]
    pub fn from_degrees(deg: f32) -> Self {
        Self::from_radians(deg.to_radians())
    }

    #[inline]
    pub const fn bam(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn to_fine(self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    #[inline]
    pub fn sin(self) -> Fixed {
        FINESINE[self.to_fine()]
    }

    #[inline]
    pub fn cos(self) -> Fixed {
        FINESINE[self.to_fine() + FINEANGLES / 4]
    }
}

impl Add for Angle {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Angle {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Angle {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_symmetry() {
        let eps = Fixed::from_float(0.001);
        assert!((ANG90.sin() - Fixed::UNIT).abs() < eps);
        assert!(ANG180.sin().abs() < eps);
        assert!((ANG270.sin() + Fixed::UNIT).abs() < eps);
        assert!((Angle::new(0).cos() - Fixed::UNIT).abs() < eps);
        assert!((ANG180.cos() + Fixed::UNIT).abs() < eps);
    }

    #[test]
    fn wrap_around() {
        assert_eq!(ANG270 + ANG180, ANG90);
        assert_eq!(Angle::new(0) - ANG90, ANG270);
        assert_eq!(-ANG90, ANG270);
    }

    #[test]
    fn radian_conversion() {
        // f32 rounding means conversions land within a few thousand BAMs
        // of the exact constant, far below one fine-table slot
        fn close(a: Angle, b: Angle) -> bool {
            (a - b).bam().min((b - a).bam()) < 1 << 16
        }
        assert!(close(Angle::from_radians(std::f32::consts::FRAC_PI_2), ANG90));
        assert!(close(Angle::from_degrees(-90.0), ANG270));
        assert!(close(Angle::from_degrees(45.0), ANG45));
        // fine index of a straight-ahead angle lands in the first quadrant
        assert!(ANG45.to_fine() <= FINEANGLES / 4);
    }
}
