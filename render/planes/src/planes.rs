//! The visplane registry and the frame draw pass.
//!
//! Wall rendering runs first: for every sector surface it sees it asks
//! [`PlaneRender::find_plane`] for a plane with matching attributes, widens
//! or splits it with [`PlaneRender::check_plane`], and records the visible
//! interval per column. Once the BSP walk completes,
//! [`PlaneRender::draw_all_planes`] turns every silhouette in to spans and
//! rasterises them.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use math::{Angle, Fixed};
use render_trait::{BufferSize, PixelBuffer};

use crate::defs::{ScrollEffect, ViewFrame, VisPlane};
use crate::sky::SkyState;
use crate::spans::{RowCache, make_spans, map_plane};
use crate::{LIGHTLEVELS, LIGHTSEGSHIFT, PicSource, PlaneError};

/// Planes allocated up front; enough for typical scenes
pub const BASE_VISPLANES: usize = 128;
/// The original static limit. Growing past it is legal here but worth a
/// warning since such scenes were a crash in the original engine.
const VANILLA_VISPLANES: usize = 160;
/// Hard ceiling on pool doubling. A scene needing more than this is a bug.
pub const MAX_VISPLANES: usize = 16384;

pub struct PlaneRender {
    /// Index-stable plane pool. Entries below `lastvisplane` are live this
    /// frame; the rest keep their allocations for reuse.
    visplanes: Vec<VisPlane>,
    lastvisplane: usize,
    /// First row below the lowest solid wall per column. The wall renderer
    /// writes these while clipping.
    pub floorclip: Vec<i32>,
    /// Last row above the highest solid wall per column
    pub ceilingclip: Vec<i32>,
    span_start: Vec<i32>,
    cache: RowCache,
    /// Projection slope per screen row
    yslope: Vec<Fixed>,
    /// View-relative angle per screen column, used by the sky mapper
    x_to_view_angle: Vec<Angle>,
    sky: SkyState,
    sky_flatnum: usize,
    size: BufferSize,
}

impl PlaneRender {
    pub fn new(fov: f32, size: BufferSize) -> Self {
        let focal = size.half_width_f32() / (fov / 2.0).tan();
        let centery = size.half_height();

        let mut yslope = Vec::with_capacity(size.height_usize());
        for y in 0..size.height() {
            // sample at row centre, the half-texel keeps the horizon row finite
            let dy = Fixed::from_bits(((y - centery) << 16) + (1 << 15)).abs();
            yslope.push(Fixed::from_float(focal) / dy);
        }

        let mut x_to_view_angle = Vec::with_capacity(size.width_usize());
        for x in 0..size.width() {
            let rad = ((size.half_width_f32() - (x as f32 + 0.5)) / focal).atan();
            x_to_view_angle.push(Angle::from_radians(rad));
        }

        Self {
            visplanes: (0..BASE_VISPLANES)
                .map(|_| VisPlane::new(size.width_usize()))
                .collect(),
            lastvisplane: 0,
            floorclip: vec![size.height(); size.width_usize()],
            ceilingclip: vec![-1; size.width_usize()],
            span_start: vec![0; size.height_usize()],
            cache: RowCache::new(size.height_usize()),
            yslope,
            x_to_view_angle,
            sky: SkyState::new(size.height()),
            sky_flatnum: usize::MAX,
            size,
        }
    }

    /// Reset for a new frame. Pool allocations survive; only the live count
    /// and the clip arrays rewind.
    pub fn clear_planes(&mut self) {
        self.floorclip.fill(self.size.height());
        self.ceilingclip.fill(-1);
        self.lastvisplane = 0;
        self.cache.invalidate();
    }

    pub fn planes_used(&self) -> usize {
        self.lastvisplane
    }

    pub fn plane(&self, index: usize) -> &VisPlane {
        &self.visplanes[index]
    }

    pub fn plane_mut(&mut self, index: usize) -> &mut VisPlane {
        &mut self.visplanes[index]
    }

    /// Level-load sky setup. `sky_flatnum` is the flat number sectors use to
    /// mean sky; scroll rates are per-tick 16.16 column offsets.
    pub fn set_sky_params(
        &mut self,
        sky_flatnum: usize,
        sky1_texture: usize,
        sky2_texture: usize,
        sky1_scroll: Fixed,
        sky2_scroll: Fixed,
        double_sky: bool,
    ) {
        self.sky_flatnum = sky_flatnum;
        self.sky.set_params(
            sky1_texture,
            sky2_texture,
            sky1_scroll,
            sky2_scroll,
            double_sky,
        );
    }

    /// Advance the sky layers one tick
    pub fn scroll_skies(&mut self) {
        self.sky.scroll();
    }

    /// Find a live plane matching the attributes, or claim a fresh one with
    /// an empty silhouette. Low specials do not split surfaces, and all sky
    /// planes fold together since height and light are meaningless for sky.
    pub fn find_plane(
        &mut self,
        mut height: Fixed,
        picnum: usize,
        mut lightlevel: i32,
        mut special: i32,
    ) -> Result<usize, PlaneError> {
        if special < 150 {
            special = 0;
        }
        if picnum == self.sky_flatnum {
            height = Fixed::ZERO;
            lightlevel = 0;
        }

        for (index, plane) in self.visplanes[..self.lastvisplane].iter().enumerate() {
            if height == plane.height
                && picnum == plane.picnum
                && lightlevel == plane.lightlevel
                && special == plane.special
            {
                return Ok(index);
            }
        }

        let index = self.raise_visplanes()?;
        let width = self.size.width();
        self.visplanes[index].reuse(height, picnum, lightlevel, special, width, -1);
        Ok(index)
    }

    /// Extend a plane across `start..=stop`. If any column in the overlap is
    /// already claimed the range cannot share the silhouette, so a new plane
    /// with the same attributes takes over; otherwise the existing plane
    /// widens to the union and keeps its index.
    pub fn check_plane(
        &mut self,
        plane_index: usize,
        start: i32,
        stop: i32,
    ) -> Result<usize, PlaneError> {
        let pl = &self.visplanes[plane_index];
        let (intrl, unionl) = if start < pl.minx {
            (pl.minx, start)
        } else {
            (start, pl.minx)
        };
        let (intrh, unionh) = if stop > pl.maxx {
            (pl.maxx, stop)
        } else {
            (stop, pl.maxx)
        };

        let mut x = intrl;
        while x <= intrh && pl.is_unclaimed(x) {
            x += 1;
        }
        if x > intrh {
            let pl = &mut self.visplanes[plane_index];
            pl.minx = unionl;
            pl.maxx = unionh;
            return Ok(plane_index);
        }

        let (height, picnum, lightlevel, special) =
            (pl.height, pl.picnum, pl.lightlevel, pl.special);
        let index = self.raise_visplanes()?;
        self.visplanes[index].reuse(height, picnum, lightlevel, special, start, stop);
        Ok(index)
    }

    /// Claim the next pool slot, doubling the pool when it runs dry. Old
    /// entries never move so indices held by callers stay valid.
    fn raise_visplanes(&mut self) -> Result<usize, PlaneError> {
        if self.lastvisplane == self.visplanes.len() {
            let old = self.visplanes.len();
            if old >= MAX_VISPLANES {
                return Err(PlaneError::PlanePoolExhausted(old));
            }
            let new_len = (old * 2).min(MAX_VISPLANES);
            if new_len > VANILLA_VISPLANES {
                log::warn!("visplane pool grew to {new_len}");
            }
            let width = self.size.width_usize();
            self.visplanes
                .resize_with(new_len, || VisPlane::new(width));
        }
        let index = self.lastvisplane;
        self.lastvisplane += 1;
        Ok(index)
    }

    /// Rasterise every live plane. Sky planes draw texture columns, the rest
    /// go through the span sweep.
    pub fn draw_all_planes(
        &mut self,
        view: &ViewFrame,
        level_tick: u32,
        pic: &impl PicSource,
        pixels: &mut impl PixelBuffer,
    ) -> Result<(), PlaneError> {
        #[cfg(feature = "hprof")]
        profile!("draw_all_planes");

        #[cfg(feature = "safety_check")]
        if self.lastvisplane > self.visplanes.len() {
            return Err(PlaneError::VisplaneOverflow(self.lastvisplane));
        }

        log::debug!(
            "planes: {} of {} pool entries live this frame",
            self.lastvisplane,
            self.visplanes.len()
        );

        let size = self.size;
        for i in 0..self.lastvisplane {
            if self.visplanes[i].is_empty() {
                continue;
            }
            if self.visplanes[i].picnum == self.sky_flatnum {
                self.sky.draw_sky_plane(
                    &self.visplanes[i],
                    view,
                    &self.x_to_view_angle,
                    size.half_height(),
                    pic,
                    pixels,
                );
                continue;
            }

            self.visplanes[i].set_border_sentinels();
            let pl = &self.visplanes[i];

            let flat = pic.flat(pl.picnum);
            let source_offset = ScrollEffect::from_special(pl.special)
                .map(|effect| effect.byte_offset(level_tick))
                .unwrap_or(0);
            let plane_height = (pl.height - view.z).abs();
            let light = ((pl.lightlevel >> LIGHTSEGSHIFT) + view.extra_light)
                .clamp(0, LIGHTLEVELS - 1) as usize;

            let cache = &mut self.cache;
            let span_start = &mut self.span_start;
            let yslope = self.yslope.as_slice();
            for x in pl.minx..=pl.maxx + 1 {
                make_spans(
                    x,
                    pl.top(x - 1),
                    pl.bottom(x - 1),
                    pl.top(x),
                    pl.bottom(x),
                    span_start,
                    &mut |row, x1, x2| {
                        map_plane(
                            row,
                            x1,
                            x2,
                            view,
                            plane_height,
                            flat,
                            source_offset,
                            light,
                            cache,
                            yslope,
                            &size,
                            pic,
                            pixels,
                        )
                    },
                )?;
            }
        }
        Ok(())
    }
}
