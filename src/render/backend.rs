use crate::config::TextureFilter;
use crate::error::MapError;
use crate::gid::TileFlip;
use macroquad::prelude::*;
use std::cell::Cell;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

/// What the tile renderer needs from the graphics layer.
///
/// Textures are owned values: dropping one releases the underlying image.
pub trait DrawBackend {
    /// Loaded image handle.
    type Texture;

    /// Blocking load of an image file.
    fn load_texture(&mut self, path: &Path) -> Result<Self::Texture, MapError>;

    /// Alpha modulation applied to subsequent draws of `texture`.
    fn set_opacity(&mut self, texture: &Self::Texture, opacity: f32);

    /// Draws the `src` region of `texture` into `dest` on the target surface.
    fn draw_region(&mut self, texture: &Self::Texture, src: Rect, dest: Rect, flip: TileFlip);
}

/// Tileset texture plus its current alpha modulation.
pub struct MacroquadTexture {
    texture: Texture2D,
    alpha: Cell<f32>,
}

impl MacroquadTexture {
    /// The underlying macroquad texture.
    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }
}

/// Draws straight to the active macroquad camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroquadBackend {
    filter: TextureFilter,
}

impl MacroquadBackend {
    /// Backend sampling loaded textures with `filter`.
    pub fn new(filter: TextureFilter) -> Self {
        Self { filter }
    }
}

impl DrawBackend for MacroquadBackend {
    type Texture = MacroquadTexture;

    fn load_texture(&mut self, path: &Path) -> Result<MacroquadTexture, MapError> {
        let bytes = std::fs::read(path).map_err(|e| MapError::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let image = Image::from_file_with_format(&bytes, None).map_err(|e| MapError::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let texture = Texture2D::from_image(&image);
        texture.set_filter(match self.filter {
            TextureFilter::Nearest => FilterMode::Nearest,
            TextureFilter::Linear => FilterMode::Linear,
        });

        Ok(MacroquadTexture {
            texture,
            alpha: Cell::new(1.0),
        })
    }

    fn set_opacity(&mut self, texture: &MacroquadTexture, opacity: f32) {
        texture.alpha.set(opacity.clamp(0.0, 1.0));
    }

    fn draw_region(&mut self, texture: &MacroquadTexture, src: Rect, dest: Rect, flip: TileFlip) {
        let (flip_x, flip_y, rotation) = flip_params(flip);
        draw_texture_ex(
            &texture.texture,
            dest.x,
            dest.y,
            Color::new(1.0, 1.0, 1.0, texture.alpha.get()),
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(src),
                rotation,
                flip_x,
                flip_y,
                ..Default::default()
            },
        );
    }
}

/// Maps Tiled's flip bits onto macroquad's `(flip_x, flip_y, rotation)`.
/// Macroquad flips in texture space and then rotates the quad about its
/// center; a diagonal flip is a quarter turn combined with a flip.
/// Exact for square tiles.
fn flip_params(flip: TileFlip) -> (bool, bool, f32) {
    if !flip.diagonal {
        return (flip.horizontal, flip.vertical, 0.0);
    }
    match (flip.horizontal, flip.vertical) {
        (false, false) => (false, true, FRAC_PI_2),
        (true, false) => (false, false, FRAC_PI_2),
        (false, true) => (true, true, FRAC_PI_2),
        (true, true) => (true, false, FRAC_PI_2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_flips_pass_through() {
        let f = TileFlip { horizontal: true, vertical: false, diagonal: false };
        assert_eq!(flip_params(f), (true, false, 0.0));
        assert_eq!(flip_params(TileFlip::NONE), (false, false, 0.0));
    }

    #[test]
    fn diagonal_flip_rotates_a_quarter_turn() {
        let d = TileFlip { diagonal: true, ..TileFlip::NONE };
        assert_eq!(flip_params(d), (false, true, FRAC_PI_2));
        let dh = TileFlip { horizontal: true, diagonal: true, ..TileFlip::NONE };
        assert_eq!(flip_params(dh), (false, false, FRAC_PI_2));
    }
}
