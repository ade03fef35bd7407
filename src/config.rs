//! Runtime configuration for map loading and playback.
use std::env;
use std::str::FromStr;

/// Sampling used for tileset textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Crisp pixels; the usual choice for pixel art.
    #[default]
    Nearest,
    /// Smooth interpolation.
    Linear,
}

impl FromStr for TextureFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(TextureFilter::Nearest),
            "linear" => Ok(TextureFilter::Linear),
            other => Err(format!("unknown texture filter '{other}'")),
        }
    }
}

/// Settings for a [`Map`](crate::Map).
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Sampling for every tileset texture.
    pub texture_filter: TextureFilter,
    /// Multiplier applied to frame deltas before they reach tile animations.
    /// 1.0 plays at authored speed, 0.0 freezes them.
    pub animation_speed: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            texture_filter: TextureFilter::default(),
            animation_speed: 1.0,
        }
    }
}

impl MapConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TILEMAP_TEXTURE_FILTER` - `nearest` or `linear` (default: nearest)
    /// - `TILEMAP_ANIMATION_SPEED` - non-negative speed multiplier (default: 1.0)
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(filter) = read_env::<TextureFilter>("TILEMAP_TEXTURE_FILTER") {
            config.texture_filter = filter;
        }

        if let Some(speed) = read_env::<f32>("TILEMAP_ANIMATION_SPEED") {
            if speed.is_finite() && speed >= 0.0 {
                config.animation_speed = speed;
            }
        }

        config
    }

    /// `delta_ms` scaled by `animation_speed`.
    ///
    /// `carry` holds the sub-millisecond remainder between calls, so the sum
    /// of the returned deltas stays within half a millisecond of the scaled
    /// sum of the inputs.
    pub fn scale_delta(&self, delta_ms: u32, carry: &mut f64) -> u32 {
        if self.animation_speed == 1.0 {
            return delta_ms;
        }
        let exact = f64::from(delta_ms) * f64::from(self.animation_speed) + *carry;
        let whole = exact.round().clamp(0.0, f64::from(u32::MAX));
        *carry = (exact - whole).clamp(-0.5, 0.5);
        whole as u32
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}
