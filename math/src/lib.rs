//! Fixed-point and angle primitives for the software renderer.
//!
//! Everything here mirrors the classic 16.16 `fixed_t` / BAM `angle_t` pair:
//! multiplies and divides widen through `i64`, trigonometry goes through a
//! precomputed fine table rather than runtime float calls, so the per-pixel
//! paths never divide floats.

mod angle;
mod fixed;

pub use angle::*;
pub use fixed::*;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Convert a raw `fixed_t` bit pattern to `f32`
pub const fn fixed_to_float(value: i32) -> f32 {
    value as f32 / FRACUNIT as f32
}

/// Convert an `f32` to a raw `fixed_t` bit pattern
pub const fn float_to_fixed(value: f32) -> i32 {
    (value * FRACUNIT as f32) as i32
}
