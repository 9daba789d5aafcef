//! Software rasterisation of the horizontal planes: floors, ceilings, and the
//! sky behind them.
//!
//! The pipeline is the classic two-phase visplane scheme. During BSP
//! traversal the wall code registers each visible flat surface with
//! [`PlaneRender::find_plane`] / [`PlaneRender::check_plane`] and writes the
//! per-column open intervals in to the returned plane. After traversal,
//! [`PlaneRender::draw_all_planes`] sweeps every plane's column silhouette in
//! to horizontal spans and rasterises them with perspective-correct
//! fixed-point texture stepping. Sky planes skip the span path entirely and
//! draw vertical texture columns keyed off the view angle.

mod defs;
pub mod planes;
mod sky;
mod spans;

use std::error::Error;
use std::fmt;

pub use defs::{ScrollDirection, ScrollEffect, UNCLAIMED, ViewFrame, VisPlane};
pub use planes::{BASE_VISPLANES, MAX_VISPLANES, PlaneRender};
pub use sky::SKY_TEXTURE_MID;

/// Light banding of sector light levels
pub const LIGHTLEVELS: i32 = 16;
/// Shift from a raw sector light (0-255) down to a light band
pub const LIGHTSEGSHIFT: i32 = 4;
/// Number of distance buckets in the diminished-light table
pub const MAXLIGHTZ: usize = 128;
/// Shift from a 16.16 view distance down to a distance bucket
pub const LIGHTZSHIFT: i32 = 20;

/// 256-entry palette remap used for light diminishing and tinting
pub type Colourmap = [u8; 256];
pub type PaletteColour = [u8; 3];

/// Asset access the plane rasteriser needs. The game's texture manager
/// implements this; tests supply a small fixture.
pub trait PicSource {
    /// A 64x64 flat, row-major, one palette index per byte
    fn flat(&self, picnum: usize) -> &[u8];
    /// The flat number sectors use to mean "draw the sky here"
    fn sky_flatnum(&self) -> usize;
    /// One column of a texture, top down, palette indices. `col` wraps.
    fn texture_column(&self, texture: usize, col: i32) -> &[u8];
    /// Distance-diminished colourmap for a light band and distance bucket.
    /// `z_index` must be below [`MAXLIGHTZ`].
    fn zlight(&self, light: usize, z_index: usize) -> &Colourmap;
    /// Render-wide colourmap override (invulnerability and friends). When set
    /// it replaces every zlight lookup.
    fn fixed_colourmap(&self) -> Option<&Colourmap>;
    fn palette(&self) -> &[PaletteColour; 256];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneError {
    /// The visplane pool hit its hard ceiling; the scene cannot be drawn
    PlanePoolExhausted(usize),
    /// More planes marked used than allocated, only possible through misuse
    VisplaneOverflow(usize),
    /// A span landed outside the framebuffer (`safety_check` builds only)
    SpanOutOfBounds { row: i32, start: i32, end: i32 },
}

impl fmt::Display for PlaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaneError::PlanePoolExhausted(count) => {
                write!(f, "visplane pool exhausted at {count} planes")
            }
            PlaneError::VisplaneOverflow(count) => {
                write!(f, "visplane overflow: {count} planes marked used")
            }
            PlaneError::SpanOutOfBounds { row, start, end } => {
                write!(f, "span {start}..={end} on row {row} is outside the buffer")
            }
        }
    }
}

impl Error for PlaneError {}
