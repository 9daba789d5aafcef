//! Sky planes. A sector whose flat is the sky flat never gets the span
//! treatment; instead each claimed column samples a vertical strip of the sky
//! texture, picked by the view angle so the sky stays fixed while the world
//! turns. Maps can run a second sky layer behind the first for parallax.

use math::{ANGLETOSKYSHIFT, Angle, Fixed};
use render_trait::PixelBuffer;

use crate::{PicSource, ViewFrame, VisPlane};

/// Texture row that lands on the horizon, from the 200-line original mode
pub const SKY_TEXTURE_MID: i32 = 200;

pub(crate) struct SkyState {
    sky1_texture: usize,
    sky2_texture: usize,
    sky1_scroll: Fixed,
    sky2_scroll: Fixed,
    sky1_offset: Fixed,
    sky2_offset: Fixed,
    double_sky: bool,
    /// Vertical texel step per screen row, scaled so any view height shows
    /// the same slice the 200-line mode did
    fracstep: Fixed,
}

impl SkyState {
    pub(crate) fn new(view_height: i32) -> Self {
        Self {
            sky1_texture: 0,
            sky2_texture: 0,
            sky1_scroll: Fixed::ZERO,
            sky2_scroll: Fixed::ZERO,
            sky1_offset: Fixed::ZERO,
            sky2_offset: Fixed::ZERO,
            double_sky: false,
            fracstep: Fixed::from_int(SKY_TEXTURE_MID) / view_height,
        }
    }

    pub(crate) fn set_params(
        &mut self,
        sky1_texture: usize,
        sky2_texture: usize,
        sky1_scroll: Fixed,
        sky2_scroll: Fixed,
        double_sky: bool,
    ) {
        self.sky1_texture = sky1_texture;
        self.sky2_texture = sky2_texture;
        self.sky1_scroll = sky1_scroll;
        self.sky2_scroll = sky2_scroll;
        self.sky1_offset = Fixed::ZERO;
        self.sky2_offset = Fixed::ZERO;
        self.double_sky = double_sky;
    }

    /// Advance the layer offsets by their per-tick scroll rates
    pub(crate) fn scroll(&mut self) {
        self.sky1_offset += self.sky1_scroll;
        self.sky2_offset += self.sky2_scroll;
    }

    /// Draw every claimed column of a sky plane. Skies ignore sector light
    /// entirely and always draw fullbright.
    pub(crate) fn draw_sky_plane(
        &self,
        pl: &VisPlane,
        view: &ViewFrame,
        x_to_view_angle: &[Angle],
        centery: i32,
        pic: &impl PicSource,
        pixels: &mut impl PixelBuffer,
    ) {
        let palette = pic.palette();
        for x in pl.minx..=pl.maxx {
            if pl.is_unclaimed(x) {
                continue;
            }
            let yl = pl.top(x);
            let yh = pl.bottom(x);
            if yl > yh {
                continue;
            }

            let angle = ((view.angle + x_to_view_angle[x as usize]).bam() >> ANGLETOSKYSHIFT) as i32;
            let mut frac = Fixed::from_int(SKY_TEXTURE_MID) + self.fracstep * (yl - centery);

            if self.double_sky {
                // layer one is the mask: palette index zero shows layer two
                let front = pic.texture_column(self.sky1_texture, angle + self.sky1_offset.to_int());
                let back = pic.texture_column(self.sky2_texture, angle + self.sky2_offset.to_int());
                for y in yl..=yh {
                    let fy = frac.to_int();
                    let mut px = front[fy.rem_euclid(front.len() as i32) as usize];
                    if px == 0 {
                        px = back[fy.rem_euclid(back.len() as i32) as usize];
                    }
                    let c = palette[px as usize];
                    pixels.set_pixel(x as usize, y as usize, &[c[0], c[1], c[2], 255]);
                    frac += self.fracstep;
                }
            } else {
                // plane special 200 asks for the secondary sky on its own
                let (texture, offset) = if pl.special == 200 {
                    (self.sky2_texture, self.sky2_offset)
                } else {
                    (self.sky1_texture, self.sky1_offset)
                };
                let source = pic.texture_column(texture, angle + offset.to_int());
                for y in yl..=yh {
                    let px = source[frac.to_int().rem_euclid(source.len() as i32) as usize];
                    let c = palette[px as usize];
                    pixels.set_pixel(x as usize, y as usize, &[c[0], c[1], c[2], 255]);
                    frac += self.fracstep;
                }
            }
        }
    }
}
