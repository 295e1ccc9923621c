//! CPU-side RGBA images and the procedural wall set used when no texture files
//! are configured.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::RenderingError;

/// Edge length in texels of the procedural wall textures.
pub const PROCEDURAL_TEXTURE_SIZE: u32 = 128;

/// Seed used for the stone texture so every run produces the same image.
pub const STONE_SEED: u64 = 0x5EED_0F57_0E5E;

/// Tightly packed RGBA8 image stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Wraps raw RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError`] when an edge is zero or the buffer length
    /// does not match `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderingError::PixelBufferLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in texels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour of the texel at the provided coordinate, if inside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let texel = self.pixels.get(start..start + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let alpha = u32::from(color[3]);
        for (channel, source) in self.pixels[start..start + 3].iter_mut().zip(color) {
            let blended = (u32::from(source) * alpha + u32::from(*channel) * (255 - alpha)) / 255;
            *channel = blended as u8;
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: [u8; 4]) {
        for row in y..y + height {
            for column in x..x + width {
                self.blend_pixel(column, row, color);
            }
        }
    }

    fn fill_circle(&mut self, center_x: i64, center_y: i64, radius: i64, color: [u8; 4]) {
        for row in -radius..=radius {
            for column in -radius..=radius {
                if column * column + row * row <= radius * radius {
                    self.blend_pixel(center_x + column, center_y + row, color);
                }
            }
        }
    }
}

/// Red brick courses separated by light mortar, with sparse soot specks.
#[must_use]
pub fn brick(width: u32, height: u32) -> TextureImage {
    const MORTAR: [u8; 4] = [210, 200, 190, 255];
    let mut image = TextureImage::filled(width, height, [170, 60, 50, 255]);
    let (w, h) = (i64::from(width), i64::from(height));

    for y in (0..h).step_by(16) {
        image.fill_rect(0, y, w, 3, MORTAR);
    }
    for y in (0..h).step_by(32) {
        for x in (0..w).step_by(32) {
            image.fill_rect(x, y, 3, 13, MORTAR);
            image.fill_rect(x + 16, y + 16, 3, 13, MORTAR);
        }
    }
    for y in 0..h {
        for x in 0..w {
            if (x * y + x * 13 + y * 7) % 97 == 0 {
                image.blend_pixel(x, y, [10, 10, 10, 30]);
            }
        }
    }
    image
}

/// Grey cobbles scattered by a seeded generator, crossed by joint lines.
#[must_use]
pub fn stone(width: u32, height: u32, seed: u64) -> TextureImage {
    let mut image = TextureImage::filled(width, height, [120, 120, 130, 255]);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (w, h) = (i64::from(width), i64::from(height));

    for _ in 0..200 {
        let center_x = rng.gen_range(0..w);
        let center_y = rng.gen_range(0..h);
        let radius = rng.gen_range(6..=16);
        let color = [
            rng.gen_range(100..=140),
            rng.gen_range(100..=140),
            rng.gen_range(110..=150),
            255,
        ];
        image.fill_circle(center_x, center_y, radius, color);
    }
    for y in (0..h).step_by(32) {
        image.fill_rect(0, y, w, 2, [90, 90, 95, 255]);
    }
    image
}

/// Brushed metal gradient with a regular grid of rivets.
#[must_use]
pub fn metal(width: u32, height: u32) -> TextureImage {
    let mut image = TextureImage::filled(width, height, [150, 155, 160, 255]);
    let (w, h) = (i64::from(width), i64::from(height));

    for y in 0..h {
        for x in 0..w {
            let grain = ((x * 5 + y * 3) % 20) as u8;
            image.blend_pixel(x, y, [150 + grain, 155 + grain, 160 + grain, 255]);
        }
    }
    for y in (16..h).step_by(32) {
        for x in (16..w).step_by(32) {
            image.fill_circle(x, y, 3, [80, 80, 80, 255]);
        }
    }
    image
}

/// Brick, stone and metal at the default size, in that order.
#[must_use]
pub fn procedural_set() -> Vec<TextureImage> {
    vec![
        brick(PROCEDURAL_TEXTURE_SIZE, PROCEDURAL_TEXTURE_SIZE),
        stone(PROCEDURAL_TEXTURE_SIZE, PROCEDURAL_TEXTURE_SIZE, STONE_SEED),
        metal(PROCEDURAL_TEXTURE_SIZE, PROCEDURAL_TEXTURE_SIZE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_set_has_three_square_textures() {
        let set = procedural_set();

        assert_eq!(set.len(), 3);
        for image in &set {
            assert_eq!(image.width(), PROCEDURAL_TEXTURE_SIZE);
            assert_eq!(image.height(), PROCEDURAL_TEXTURE_SIZE);
            assert_eq!(image.pixels().len(), 128 * 128 * 4);
        }
    }

    #[test]
    fn stone_is_deterministic_for_a_seed() {
        assert_eq!(stone(64, 64, 7), stone(64, 64, 7));
        assert_ne!(stone(64, 64, 7), stone(64, 64, 8));
    }

    #[test]
    fn brick_draws_mortar_courses() {
        let image = brick(64, 64);

        assert_eq!(image.pixel(5, 0), Some([210, 200, 190, 255]));
        assert_eq!(image.pixel(8, 8), Some([170, 60, 50, 255]));
        assert_eq!(image.pixel(64, 0), None);
    }

    #[test]
    fn metal_rivets_are_dark() {
        let image = metal(64, 64);

        assert_eq!(image.pixel(16, 16), Some([80, 80, 80, 255]));
    }

    #[test]
    fn raw_images_validate_their_buffers() {
        assert_eq!(
            TextureImage::new(2, 2, vec![0; 15]),
            Err(RenderingError::PixelBufferLength {
                expected: 16,
                actual: 15
            })
        );
        assert_eq!(
            TextureImage::new(0, 2, Vec::new()),
            Err(RenderingError::EmptyTexture {
                width: 0,
                height: 2
            })
        );
        assert!(TextureImage::new(1, 1, vec![1, 2, 3, 4]).is_ok());
    }
}
