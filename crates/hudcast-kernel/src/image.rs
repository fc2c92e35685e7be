//! RGBA output image and color representation.

/// An RGBA color with `f32` channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black, the cleared state of an overlay image.
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to 8-bit normalized channels, clamping to `[0, 1]`.
    ///
    /// Non-finite channels clamp like any out-of-range value (NaN to 0).
    pub fn to_unorm8(self) -> [u8; 4] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// The output image a dispatch writes into: a 2D grid of RGBA unorm8
/// pixels with dimensions fixed for the duration of one dispatch.
///
/// The image is owned by the embedding driver's compositing stage; the
/// kernels only ever overwrite pixels, never read them back.
pub struct OverlayImage {
    width: u32,
    height: u32,
    data: Vec<[u8; 4]>,
}

impl OverlayImage {
    /// Create a cleared (fully transparent) image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![[0; 4]; width as usize * height as usize],
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// Out-of-bounds coordinates return with no effect, mirroring the
    /// bounds check every kernel invocation performs.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y as usize * self.width as usize + x as usize] = color.to_unorm8();
    }

    /// The raw pixel grid in row-major order.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.data
    }

    /// Mutable access to the raw pixel grid, for the pass driver.
    pub(crate) fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.data
    }

    /// The image as tightly packed RGBA bytes, for texture upload.
    pub fn as_raw(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
