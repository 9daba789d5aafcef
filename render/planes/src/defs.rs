use std::fmt;

use glam::Vec2;
use math::{Angle, Fixed};

/// Column silhouette value meaning "no wall clipped here yet". Only the top
/// edge carries the sentinel; the bottom array is zeroed on (re)allocation
/// since a claimed column always writes both edges together.
pub const UNCLAIMED: i32 = i32::MAX;

/// One horizontal surface gathered during BSP traversal. Columns claim a
/// vertical interval each; the draw pass later sweeps those intervals in to
/// spans. The silhouette arrays carry one border column each side so the
/// sweep can terminate without branching at the edges.
pub struct VisPlane {
    pub height: Fixed,
    pub picnum: usize,
    pub lightlevel: i32,
    pub special: i32,
    pub minx: i32,
    pub maxx: i32,
    top: Vec<i32>,
    bottom: Vec<i32>,
}

impl VisPlane {
    pub(crate) fn new(screen_width: usize) -> Self {
        Self {
            height: Fixed::ZERO,
            picnum: 0,
            lightlevel: 0,
            special: 0,
            minx: screen_width as i32,
            maxx: -1,
            top: vec![UNCLAIMED; screen_width + 2],
            bottom: vec![0; screen_width + 2],
        }
    }

    /// Screen column to border-offset array index. `x == -1` and `x == width`
    /// address the border slots.
    #[inline]
    const fn index(x: i32) -> usize {
        (x + 1) as usize
    }

    #[inline]
    pub fn top(&self, x: i32) -> i32 {
        self.top[Self::index(x)]
    }

    #[inline]
    pub fn bottom(&self, x: i32) -> i32 {
        self.bottom[Self::index(x)]
    }

    /// A column is claimed once a wall segment has recorded its open interval
    #[inline]
    pub fn is_unclaimed(&self, x: i32) -> bool {
        self.top(x) == UNCLAIMED
    }

    /// Record the visible interval for one column. `top..=bottom` inclusive,
    /// in screen rows; a reversed pair marks the column as having no rows.
    #[inline]
    pub fn set_column(&mut self, x: i32, top: i32, bottom: i32) {
        self.top[Self::index(x)] = top;
        self.bottom[Self::index(x)] = bottom;
    }

    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx
    }

    /// Reset a pooled plane for a fresh claim. The silhouette is wiped so
    /// stale intervals from the previous owner cannot leak in to the sweep.
    pub(crate) fn reuse(
        &mut self,
        height: Fixed,
        picnum: usize,
        lightlevel: i32,
        special: i32,
        minx: i32,
        maxx: i32,
    ) {
        self.height = height;
        self.picnum = picnum;
        self.lightlevel = lightlevel;
        self.special = special;
        self.minx = minx;
        self.maxx = maxx;
        self.top.fill(UNCLAIMED);
        self.bottom.fill(0);
    }

    /// Open the columns just outside the claimed range so the sweep closes
    /// every span at the edges
    pub(crate) fn set_border_sentinels(&mut self) {
        self.top[Self::index(self.minx - 1)] = UNCLAIMED;
        self.top[Self::index(self.maxx + 1)] = UNCLAIMED;
    }
}

impl fmt::Debug for VisPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisPlane")
            .field("height", &self.height)
            .field("picnum", &self.picnum)
            .field("lightlevel", &self.lightlevel)
            .field("special", &self.special)
            .field("minx", &self.minx)
            .field("maxx", &self.maxx)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    North,
    East,
    South,
    West,
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

/// Decoded flat-scroll sector special. Specials come in blocks of three per
/// direction; the position within the block is the speed tier (each tier
/// doubles the scroll rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollEffect {
    pub direction: ScrollDirection,
    pub tier: u32,
}

impl ScrollEffect {
    pub fn from_special(special: i32) -> Option<Self> {
        use ScrollDirection::*;
        let (direction, base) = match special {
            201..=203 => (North, 201),
            204..=206 => (East, 204),
            207..=209 => (South, 207),
            210..=212 => (West, 210),
            213..=215 => (NorthWest, 213),
            216..=218 => (NorthEast, 216),
            219..=221 => (SouthEast, 219),
            222..=224 => (SouthWest, 222),
            _ => return None,
        };
        Some(Self {
            direction,
            tier: (special - base) as u32,
        })
    }

    /// Starting byte offset in to the 64x64 flat for this level tick. The
    /// base phase advances one texel every two ticks; north/west scroll with
    /// the phase, south/east against it, diagonals combine an axis of each.
    pub fn byte_offset(&self, level_tick: u32) -> usize {
        use ScrollDirection::*;
        let scroll = (level_tick >> 1) & 63;
        let with = ((scroll << self.tier) & 63) as usize;
        let against = (((63 - scroll) << self.tier) & 63) as usize;
        let (x, y) = match self.direction {
            North => (0, with),
            East => (against, 0),
            South => (0, against),
            West => (with, 0),
            NorthWest => (with, with),
            NorthEast => (against, with),
            SouthEast => (against, against),
            SouthWest => (with, against),
        };
        x + (y << 6)
    }
}

/// Per-frame view state snapshotted once before the draw pass, instead of
/// each draw function reaching in to player globals
#[derive(Debug, Clone, Copy)]
pub struct ViewFrame {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub angle: Angle,
    pub sin: Fixed,
    pub cos: Fixed,
    pub extra_light: i32,
}

impl ViewFrame {
    pub fn new(xy: Vec2, z: f32, angle: Angle, extra_light: i32) -> Self {
        Self {
            x: Fixed::from_float(xy.x),
            y: Fixed::from_float(xy.y),
            z: Fixed::from_float(z),
            angle,
            sin: angle.sin(),
            cos: angle.cos(),
            extra_light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_claims() {
        let mut pl = VisPlane::new(320);
        assert!(pl.is_empty());
        assert!(pl.is_unclaimed(0));
        assert!(pl.is_unclaimed(319));
        pl.set_column(10, 40, 90);
        assert!(!pl.is_unclaimed(10));
        assert_eq!(pl.top(10), 40);
        assert_eq!(pl.bottom(10), 90);
        pl.reuse(Fixed::from_int(96), 3, 128, 0, 0, 319);
        assert!(pl.is_unclaimed(10));
    }

    #[test]
    fn border_sentinels_stay_outside_claim() {
        let mut pl = VisPlane::new(320);
        pl.reuse(Fixed::ZERO, 0, 0, 0, 0, 319);
        for x in 0..320 {
            pl.set_column(x, 0, 10);
        }
        pl.set_border_sentinels();
        assert!(pl.is_unclaimed(-1));
        assert!(pl.is_unclaimed(320));
        assert!(!pl.is_unclaimed(0));
        assert!(!pl.is_unclaimed(319));
    }

    #[test]
    fn scroll_special_decoding() {
        assert!(ScrollEffect::from_special(0).is_none());
        assert!(ScrollEffect::from_special(200).is_none());
        assert!(ScrollEffect::from_special(225).is_none());

        let e = ScrollEffect::from_special(201).unwrap();
        assert_eq!(e.direction, ScrollDirection::North);
        assert_eq!(e.tier, 0);

        let e = ScrollEffect::from_special(206).unwrap();
        assert_eq!(e.direction, ScrollDirection::East);
        assert_eq!(e.tier, 2);

        let e = ScrollEffect::from_special(224).unwrap();
        assert_eq!(e.direction, ScrollDirection::SouthWest);
        assert_eq!(e.tier, 2);
    }

    #[test]
    fn scroll_offsets() {
        let north = ScrollEffect::from_special(201).unwrap();
        // phase wraps every 128 ticks
        assert_eq!(north.byte_offset(0), 0);
        assert_eq!(north.byte_offset(128), 0);
        // two ticks later the phase is 1: one row down the flat
        assert_eq!(north.byte_offset(130), 64);

        let east = ScrollEffect::from_special(204).unwrap();
        assert_eq!(east.byte_offset(130), 62);

        // fastest tier shifts the phase left twice
        let north_fast = ScrollEffect::from_special(203).unwrap();
        assert_eq!(north_fast.byte_offset(130), 4 << 6);

        // diagonal combines both axes
        let se = ScrollEffect::from_special(219).unwrap();
        assert_eq!(se.byte_offset(130), 62 + (62 << 6));

        // offsets always land inside a 64x64 flat
        for special in 201..=224 {
            let e = ScrollEffect::from_special(special).unwrap();
            for tick in 0..256 {
                assert!(e.byte_offset(tick) < 4096);
            }
        }
    }
}
