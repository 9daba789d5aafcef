/// channels should match pixel format
pub const SOFT_PIXEL_CHANNELS: usize = 4;

/// Viewport dimensions cached in every form the draw loops want, so the hot
/// paths never convert
#[derive(Clone, Copy)]
pub struct BufferSize {
    width_usize: usize,
    height_usize: usize,
    width: i32,
    height: i32,
    width_f32: f32,
    height_f32: f32,
}

impl BufferSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width_usize: width,
            height_usize: height,
            width: width as i32,
            height: height as i32,
            width_f32: width as f32,
            height_f32: height as f32,
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn half_width(&self) -> i32 {
        self.width / 2
    }

    pub const fn half_height(&self) -> i32 {
        self.height / 2
    }

    pub const fn width_usize(&self) -> usize {
        self.width_usize
    }

    pub const fn height_usize(&self) -> usize {
        self.height_usize
    }

    pub const fn width_f32(&self) -> f32 {
        self.width_f32
    }

    pub const fn height_f32(&self) -> f32 {
        self.height_f32
    }

    pub const fn half_width_f32(&self) -> f32 {
        self.width_f32 / 2.0
    }

    pub const fn half_height_f32(&self) -> f32 {
        self.height_f32 / 2.0
    }
}

pub trait PixelBuffer {
    fn size(&self) -> &BufferSize;
    fn clear(&mut self);
    fn clear_with_colour(&mut self, colour: &[u8; SOFT_PIXEL_CHANNELS]);
    fn set_pixel(&mut self, x: usize, y: usize, colour: &[u8; SOFT_PIXEL_CHANNELS]);
    fn read_pixel(&self, x: usize, y: usize) -> [u8; SOFT_PIXEL_CHANNELS];
    fn buf_mut(&mut self) -> &mut [u8];
    /// The pitch that should be added/subtracted to go up or down the Y while
    /// keeping X position
    fn pitch(&self) -> usize;
    /// Amount of colour channels, e.g: [R, G, B, A] == 4
    fn channels(&self) -> usize;
    /// Get an index point for this coord to copy a colour array too
    fn get_buf_index(&self, x: usize, y: usize) -> usize;
}

/// Plain RGBA byte buffer. The display backend wraps or copies this in to
/// whatever its streaming texture wants.
pub struct DrawBuffer {
    size: BufferSize,
    /// Total length is width * height * CHANNELS, where CHANNELS is RGBA bytes
    buffer: Vec<u8>,
    stride: usize,
}

impl DrawBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: BufferSize::new(width, height),
            buffer: vec![0; width * height * SOFT_PIXEL_CHANNELS],
            stride: width * SOFT_PIXEL_CHANNELS,
        }
    }
}

impl PixelBuffer for DrawBuffer {
    #[inline(always)]
    fn size(&self) -> &BufferSize {
        &self.size
    }

    #[inline(always)]
    fn clear(&mut self) {
        self.buffer.fill(0);
    }

    #[inline(always)]
    fn clear_with_colour(&mut self, colour: &[u8; SOFT_PIXEL_CHANNELS]) {
        self.buffer
            .chunks_mut(SOFT_PIXEL_CHANNELS)
            .for_each(|n| n.copy_from_slice(colour));
    }

    #[inline(always)]
    fn set_pixel(&mut self, x: usize, y: usize, colour: &[u8; SOFT_PIXEL_CHANNELS]) {
        #[cfg(feature = "safety_check")]
        if x >= self.size.width_usize() || y >= self.size.height_usize() {
            dbg!(x, self.size.width_usize(), y, self.size.height_usize());
            panic!();
        }

        let pos = y * self.stride + x * SOFT_PIXEL_CHANNELS;
        self.buffer[pos..pos + SOFT_PIXEL_CHANNELS].copy_from_slice(colour);
    }

    /// Read the colour of a single pixel at X|Y
    #[inline]
    fn read_pixel(&self, x: usize, y: usize) -> [u8; SOFT_PIXEL_CHANNELS] {
        let pos = y * self.stride + x * SOFT_PIXEL_CHANNELS;
        let mut slice = [0u8; SOFT_PIXEL_CHANNELS];
        slice.copy_from_slice(&self.buffer[pos..pos + SOFT_PIXEL_CHANNELS]);
        slice
    }

    #[inline(always)]
    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    #[inline(always)]
    fn pitch(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    fn channels(&self) -> usize {
        SOFT_PIXEL_CHANNELS
    }

    #[inline(always)]
    fn get_buf_index(&self, x: usize, y: usize) -> usize {
        y * self.stride + x * SOFT_PIXEL_CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_round_trip() {
        let mut buf = DrawBuffer::new(320, 200);
        buf.set_pixel(17, 93, &[250, 120, 16, 255]);
        assert_eq!(buf.read_pixel(17, 93), [250, 120, 16, 255]);
        assert_eq!(buf.read_pixel(18, 93), [0, 0, 0, 0]);
        buf.clear_with_colour(&[1, 2, 3, 255]);
        assert_eq!(buf.read_pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(buf.read_pixel(319, 199), [1, 2, 3, 255]);
    }
}
