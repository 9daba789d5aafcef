//! Column-sweep span emission and the fixed-point flat rasteriser.
//!
//! The sweep walks a plane's columns left to right comparing each column's
//! vertical interval with its neighbour: rows the previous column had but
//! this one lacks close (a span is emitted), rows this column opens record
//! their start. Each visible pixel is touched by exactly one span.

use math::Fixed;
use render_trait::{BufferSize, PixelBuffer};

use crate::{Colourmap, LIGHTZSHIFT, MAXLIGHTZ, PicSource, PlaneError, ViewFrame};

/// Compare neighbouring columns `x - 1` (interval `t1..=b1`) and `x`
/// (`t2..=b2`), emitting finished spans through `span(row, x1, x2)` and
/// recording starts for newly opened rows. `span_start` holds the pending
/// start column per row between calls.
pub(crate) fn make_spans(
    x: i32,
    mut t1: i32,
    mut b1: i32,
    mut t2: i32,
    mut b2: i32,
    span_start: &mut [i32],
    span: &mut impl FnMut(i32, i32, i32) -> Result<(), PlaneError>,
) -> Result<(), PlaneError> {
    // rows above the new top close
    while t1 < t2 && t1 <= b1 {
        span(t1, span_start[t1 as usize], x - 1)?;
        t1 += 1;
    }
    // rows below the new bottom close
    while b1 > b2 && b1 >= t1 {
        span(b1, span_start[b1 as usize], x - 1)?;
        b1 -= 1;
    }
    // rows the new column opens start here
    while t2 < t1 && t2 <= b2 {
        span_start[t2 as usize] = x;
        t2 += 1;
    }
    while b2 > b1 && b2 >= t2 {
        span_start[b2 as usize] = x;
        b2 -= 1;
    }
    Ok(())
}

/// Per-row projection terms reused while consecutive spans sit at the same
/// plane height. Keyed on the height; a mismatch recomputes the row.
pub(crate) struct RowCache {
    height: Vec<Fixed>,
    distance: Vec<Fixed>,
    xstep: Vec<Fixed>,
    ystep: Vec<Fixed>,
}

impl RowCache {
    pub(crate) fn new(screen_height: usize) -> Self {
        Self {
            height: vec![Fixed::MIN; screen_height],
            distance: vec![Fixed::ZERO; screen_height],
            xstep: vec![Fixed::ZERO; screen_height],
            ystep: vec![Fixed::ZERO; screen_height],
        }
    }

    /// `Fixed::MIN` never occurs as a plane height so it marks a stale row
    pub(crate) fn invalidate(&mut self) {
        self.height.fill(Fixed::MIN);
    }

    fn lookup(
        &mut self,
        y: usize,
        plane_height: Fixed,
        yslope: Fixed,
        dy: i32,
        view_sin: Fixed,
        view_cos: Fixed,
    ) -> (Fixed, Fixed, Fixed) {
        if self.height[y] != plane_height {
            self.height[y] = plane_height;
            self.distance[y] = plane_height * yslope;
            self.xstep[y] = (view_sin * plane_height) / dy;
            self.ystep[y] = (view_cos * plane_height) / dy;
        }
        (self.distance[y], self.xstep[y], self.ystep[y])
    }
}

/// Rasterise one horizontal span of a flat
#[allow(clippy::too_many_arguments)]
pub(crate) fn map_plane(
    y: i32,
    x1: i32,
    x2: i32,
    view: &ViewFrame,
    plane_height: Fixed,
    flat: &[u8],
    source_offset: usize,
    light: usize,
    cache: &mut RowCache,
    yslope: &[Fixed],
    size: &BufferSize,
    pic: &impl PicSource,
    pixels: &mut impl PixelBuffer,
) -> Result<(), PlaneError> {
    let centery = size.half_height();
    // the eye-level row never intersects a horizontal plane
    if y == centery {
        return Ok(());
    }

    #[cfg(feature = "safety_check")]
    if x2 < x1 || x1 < 0 || x2 >= size.width() || y < 0 || y >= size.height() {
        return Err(PlaneError::SpanOutOfBounds {
            row: y,
            start: x1,
            end: x2,
        });
    }
    // a malformed span is an upstream bug; in unchecked builds clamp it in to
    // the buffer rather than scribble outside it
    #[cfg(not(feature = "safety_check"))]
    let (x1, x2, y) = {
        let y = y.clamp(0, size.height() - 1);
        let x1 = x1.clamp(0, size.width() - 1);
        let x2 = x2.clamp(x1, size.width() - 1);
        (x1, x2, y)
    };

    let dy = (centery - y).abs();
    let (distance, xstep, ystep) =
        cache.lookup(y as usize, plane_height, yslope[y as usize], dy, view.sin, view.cos);

    let dx = x1 - size.half_width();
    let xfrac = view.x + view.cos * distance + xstep * dx;
    let yfrac = -view.y - view.sin * distance + ystep * dx;

    let colourmap = if let Some(map) = pic.fixed_colourmap() {
        map
    } else {
        let z_index = ((distance.to_bits() >> LIGHTZSHIFT) as usize).min(MAXLIGHTZ - 1);
        pic.zlight(light, z_index)
    };

    DrawSpan {
        source: flat,
        source_offset,
        colourmap,
        xfrac,
        yfrac,
        xstep,
        ystep,
        y,
        x1,
        x2,
    }
    .draw(pic.palette(), pixels);
    Ok(())
}

/// One span's worth of rasteriser state. Mirrors the wall-column drawer but
/// steps horizontally through a 64x64 flat.
struct DrawSpan<'a> {
    source: &'a [u8],
    source_offset: usize,
    colourmap: &'a Colourmap,
    xfrac: Fixed,
    yfrac: Fixed,
    xstep: Fixed,
    ystep: Fixed,
    y: i32,
    x1: i32,
    x2: i32,
}

impl DrawSpan<'_> {
    fn draw(mut self, palette: &[[u8; 3]; 256], pixels: &mut impl PixelBuffer) {
        let y = self.y as usize;
        for x in self.x1..=self.x2 {
            // 6.10 texel coords packed in to a 64x64 spot, scroll applied
            // after so the wrap covers both
            let spot = ((self.yfrac.to_bits() >> 10) & 0x0FC0 | (self.xfrac.to_bits() >> 16) & 63)
                as usize;
            let spot = (spot + self.source_offset) & 4095;

            let px = self.colourmap[self.source[spot] as usize];
            let c = palette[px as usize];
            pixels.set_pixel(x as usize, y, &[c[0], c[1], c[2], 255]);

            self.xfrac += self.xstep;
            self.yfrac += self.ystep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNCLAIMED;

    fn sweep(columns: &[(i32, i32)]) -> Vec<(i32, i32, i32)> {
        let height = 64;
        let mut span_start = vec![0i32; height];
        let mut spans = Vec::new();
        let width = columns.len() as i32;
        let at = |x: i32| -> (i32, i32) {
            if x < 0 || x >= width {
                (UNCLAIMED, 0)
            } else {
                columns[x as usize]
            }
        };
        for x in 0..=width {
            let (t1, b1) = at(x - 1);
            let (t2, b2) = at(x);
            make_spans(x, t1, b1, t2, b2, &mut span_start, &mut |row, x1, x2| {
                spans.push((row, x1, x2));
                Ok(())
            })
            .unwrap();
        }
        spans
    }

    #[test]
    fn rectangle_emits_one_span_per_row() {
        let spans = sweep(&vec![(5, 10); 20]);
        assert_eq!(spans.len(), 6);
        for (row, x1, x2) in spans {
            assert!((5..=10).contains(&row));
            assert_eq!((x1, x2), (0, 19));
        }
    }

    #[test]
    fn stepped_silhouette_splits_at_the_step() {
        // columns 0..=9 cover rows 5..=10, columns 10..=19 cover rows 7..=12
        let mut cols = vec![(5, 10); 10];
        cols.extend(vec![(7, 12); 10]);
        let spans = sweep(&cols);

        // rows 5-6 close at the step, 7-10 run the full width, 11-12 only
        // exist on the right half
        assert_eq!(spans.len(), 8);
        assert!(spans.contains(&(5, 0, 9)));
        assert!(spans.contains(&(6, 0, 9)));
        for row in 7..=10 {
            assert!(spans.contains(&(row, 0, 19)));
        }
        assert!(spans.contains(&(11, 10, 19)));
        assert!(spans.contains(&(12, 10, 19)));
    }

    #[test]
    fn gap_in_columns_closes_and_reopens() {
        let mut cols = vec![(3, 8); 4];
        cols.push((UNCLAIMED, 0));
        cols.extend(vec![(3, 8); 4]);
        let spans = sweep(&cols);
        assert_eq!(spans.len(), 12);
        assert!(spans.contains(&(3, 0, 3)));
        assert!(spans.contains(&(3, 5, 8)));
        assert!(spans.contains(&(8, 0, 3)));
        assert!(spans.contains(&(8, 5, 8)));
    }

    #[test]
    fn degenerate_interval_emits_nothing() {
        // top below bottom means the column has no visible rows
        let spans = sweep(&vec![(10, 5); 8]);
        assert!(spans.is_empty());
    }

    #[test]
    fn row_cache_keys_on_height() {
        let mut cache = RowCache::new(200);
        let slope = Fixed::from_float(0.8);
        let (d1, ..) = cache.lookup(50, Fixed::from_int(96), slope, 50, Fixed::ZERO, Fixed::UNIT);
        assert_eq!(d1, Fixed::from_int(96) * slope);
        // same height hits the cache, a new height recomputes
        let (d2, ..) = cache.lookup(50, Fixed::from_int(96), slope, 50, Fixed::ZERO, Fixed::UNIT);
        assert_eq!(d1, d2);
        let (d3, ..) = cache.lookup(50, Fixed::from_int(32), slope, 50, Fixed::ZERO, Fixed::UNIT);
        assert_eq!(d3, Fixed::from_int(32) * slope);
    }
}
