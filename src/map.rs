use crate::config::MapConfig;
use crate::error::MapError;
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::render::*;
use std::path::Path;

/// A loaded tile map, ready to be drawn once per frame.
///
/// Owns the compiled render data and one texture per tileset; textures are
/// released when the map is unloaded, reloaded or dropped.
pub struct Map<B: DrawBackend = MacroquadBackend> {
    backend: B,
    config: MapConfig,
    renderer: TileRenderer,
    data: Option<MapRenderData>,
    textures: TilesetTextures<B::Texture>,
    // scaled-delta remainder, in ms
    speed_carry: f64,
}

impl Map<MacroquadBackend> {
    /// Map drawing through macroquad, configured from the environment.
    pub fn macroquad() -> Self {
        let config = MapConfig::from_env();
        Self::with_config(MacroquadBackend::new(config.texture_filter), config)
    }
}

impl<B: DrawBackend> Map<B> {
    /// An empty map drawing through `backend`, with default settings.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, MapConfig::default())
    }

    /// An empty map drawing through `backend`.
    pub fn with_config(backend: B, config: MapConfig) -> Self {
        Self {
            backend,
            config,
            renderer: TileRenderer::new(),
            data: None,
            textures: TilesetTextures::new(),
            speed_carry: 0.0,
        }
    }

    /// Loads a Tiled JSON map and every tileset image it references.
    ///
    /// Any previously loaded map is released first. On error the map is left
    /// unloaded and nothing loaded along the way is kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        self.unload();

        tracing::info!(target: "map", path = %path.display(), "loading map");
        let result = self.try_load(path);
        if let Err(err) = &result {
            tracing::error!(target: "map", path = %path.display(), error = %err, "failed to load map");
        }
        result
    }

    fn try_load(&mut self, path: &Path) -> Result<(), MapError> {
        let (ir, base_dir) = decode_map_file_to_ir(path)?;
        tracing::debug!(
            target: "map",
            width = ir.width,
            height = ir.height,
            tile_w = ir.tile_w,
            tile_h = ir.tile_h,
            tilesets = ir.tilesets.len(),
            layers = ir.layers.len(),
            "map parsed"
        );

        let data = compile_render_data(&ir, &base_dir);
        log_render_summary(&data);

        // Built locally so that an early return drops what was loaded so far.
        let mut textures = TilesetTextures::new();
        for (i, ts) in data.tilesets.iter().enumerate() {
            let image_path = ts.image_path.as_deref().ok_or_else(|| MapError::MissingImage {
                tileset: ts.name.clone(),
            })?;
            tracing::debug!(target: "resource", index = i, tileset = %ts.name, path = %image_path.display(), "loading tileset texture");
            let texture = self.backend.load_texture(image_path)?;
            textures.push(texture);
        }

        self.textures = textures;
        self.data = Some(data);
        tracing::info!(target: "map", "map loaded");
        Ok(())
    }

    /// Releases the current map, its textures and animation progress.
    pub fn unload(&mut self) {
        self.textures.clear();
        self.data = None;
        self.renderer.reset_animations();
        self.speed_carry = 0.0;
    }

    /// Draws the map, advancing tile animations by `delta_ms`.
    /// Does nothing until a map is loaded.
    pub fn render(&mut self, delta_ms: u32) -> FrameStats {
        let Some(data) = &self.data else {
            return FrameStats::default();
        };
        let delta = self.config.scale_delta(delta_ms, &mut self.speed_carry);
        self.renderer
            .render(data, &self.textures, &mut self.backend, delta)
    }

    /// Restarts every tile animation from its first frame.
    pub fn reset_animations(&mut self) {
        self.renderer.reset_animations();
        self.speed_carry = 0.0;
    }

    /// Whether a map is currently loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Map width in pixels, 0 when nothing is loaded.
    pub fn pixel_width(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.pixel_width)
    }

    /// Map height in pixels, 0 when nothing is loaded.
    pub fn pixel_height(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.pixel_height)
    }

    /// Map width in tiles, 0 when nothing is loaded.
    pub fn width(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.map_width)
    }

    /// Map height in tiles.
    pub fn height(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.map_height)
    }

    /// Width of one map cell in pixels.
    pub fn tile_width(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.tile_width)
    }

    /// Height of one map cell in pixels.
    pub fn tile_height(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.tile_height)
    }

    /// Compiled render data of the loaded map.
    pub fn render_data(&self) -> Option<&MapRenderData> {
        self.data.as_ref()
    }

    /// Per-animation clocks driven by [`render`](Self::render).
    pub fn animation_states(&self) -> &AnimationStates {
        self.renderer.animation_states()
    }

    /// Settings this map was created with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The draw backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The draw backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

fn log_render_summary(data: &MapRenderData) {
    let total_animations: usize = data.tilesets.iter().map(|t| t.animations.len()).sum();
    for ts in data.tilesets.iter().filter(|t| !t.animations.is_empty()) {
        tracing::debug!(target: "map", tileset = %ts.name, animations = ts.animations.len(), "tileset animations");
    }

    let mut total_tiles = 0;
    let mut animated_tiles = 0;
    for layer in &data.layers {
        total_tiles += layer.tiles.len();
        animated_tiles += layer.tiles.iter().filter(|t| t.is_animated()).count();
        tracing::debug!(target: "map", layer = %layer.name, tiles = layer.tiles.len(), "layer compiled");
    }
    tracing::debug!(
        target: "map",
        total_animations,
        total_tiles,
        animated_tiles,
        "render data created"
    );
}
