/// Display width in pixels.
pub const DISPLAY_WIDTH: usize = 64;
/// Display height in pixels.
pub const DISPLAY_HEIGHT: usize = 32;
/// Number of pixels in the framebuffer.
pub const DISPLAY_PIXELS: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Monochrome framebuffer, one byte per pixel (`0` off, `1` on), row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Framebuffer {
    pixels: Box<[u8]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; DISPLAY_PIXELS].into_boxed_slice(),
        }
    }
}

impl Framebuffer {
    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Read-only view of all pixels, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns `true` when the pixel at (`x`, `y`) is on.
    ///
    /// Coordinates outside the display read as off.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.pixels[Self::index(x, y)] != 0
    }

    /// XORs the pixel at (`x`, `y`) and returns `true` when it was on before.
    ///
    /// Callers clip or wrap coordinates before toggling; out-of-range
    /// coordinates are ignored.
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        let pixel = &mut self.pixels[Self::index(x, y)];
        let was_on = *pixel != 0;
        *pixel ^= 1;
        was_on
    }

    /// Number of pixels currently on.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|pixel| **pixel != 0).count()
    }

    /// Rebuilds a framebuffer from a pixel slice of the display size.
    #[must_use]
    pub fn from_pixels(pixels: &[u8]) -> Option<Self> {
        (pixels.len() == DISPLAY_PIXELS).then(|| Self {
            pixels: pixels.iter().map(|pixel| u8::from(*pixel != 0)).collect(),
        })
    }

    const fn index(x: usize, y: usize) -> usize {
        y * DISPLAY_WIDTH + x
    }
}
