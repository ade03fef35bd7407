use super::animation::{AnimationKey, AnimationStates};
use super::backend::DrawBackend;
use super::data::{MapRenderData, RenderTile};
use macroquad::prelude::*;

/// Per-call draw counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Tiles handed to the backend.
    pub tiles_drawn: usize,
    /// Tiles dropped because of bad data (missing texture, dangling
    /// animation). Hidden layers do not count.
    pub tiles_skipped: usize,
}

/// Tileset textures indexed like `MapRenderData::tilesets`. A slot may be
/// empty; tiles pointing at it are skipped.
pub struct TilesetTextures<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for TilesetTextures<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> TilesetTextures<T> {
    /// No slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the texture for the next tileset.
    pub fn push(&mut self, texture: T) {
        self.slots.push(Some(texture));
    }

    /// Appends an empty slot for a tileset without a texture.
    pub fn push_empty(&mut self) {
        self.slots.push(None);
    }

    /// Texture of tileset `index`, if its slot is filled.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Drops every texture.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of slots, filled or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> FromIterator<T> for TilesetTextures<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Some).collect(),
        }
    }
}

/// Draws compiled layers and owns the animation clocks.
#[derive(Debug, Default)]
pub struct TileRenderer {
    animations: AnimationStates,
}

impl TileRenderer {
    /// Renderer with no animation clocks yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clocks of every animation drawn so far.
    pub fn animation_states(&self) -> &AnimationStates {
        &self.animations
    }

    /// Forgets all playback progress, e.g. before showing a new map.
    pub fn reset_animations(&mut self) {
        self.animations.reset();
    }

    /// Advances animations by `delta_ms`, then draws every visible layer in
    /// order, tiles in emission order.
    pub fn render<B: DrawBackend>(
        &mut self,
        data: &MapRenderData,
        textures: &TilesetTextures<B::Texture>,
        backend: &mut B,
        delta_ms: u32,
    ) -> FrameStats {
        self.animations.advance_all(delta_ms);

        let mut stats = FrameStats::default();
        for layer in data.layers.iter().filter(|l| l.visible) {
            for tile in &layer.tiles {
                if self.draw_tile(data, tile, textures, backend) {
                    stats.tiles_drawn += 1;
                } else {
                    stats.tiles_skipped += 1;
                }
            }
        }
        stats
    }

    fn draw_tile<B: DrawBackend>(
        &mut self,
        data: &MapRenderData,
        tile: &RenderTile,
        textures: &TilesetTextures<B::Texture>,
        backend: &mut B,
    ) -> bool {
        let Some(texture) = textures.get(tile.tileset_index as usize) else {
            tracing::trace!(target: "render", tileset = tile.tileset_index, "no texture for tile");
            return false;
        };

        let Some(src) = self.source_rect(data, tile) else {
            tracing::trace!(
                target: "render",
                tileset = tile.tileset_index,
                animation = ?tile.animation,
                "dangling animation reference"
            );
            return false;
        };

        let translucent = tile.opacity < 1.0;
        if translucent {
            backend.set_opacity(texture, tile.opacity);
        }
        backend.draw_region(texture, src, tile.dest, tile.flip);
        if translucent {
            backend.set_opacity(texture, 1.0);
        }
        true
    }

    fn source_rect(&mut self, data: &MapRenderData, tile: &RenderTile) -> Option<Rect> {
        let Some(animation_index) = tile.animation else {
            return Some(tile.src);
        };

        let animation = data
            .tilesets
            .get(tile.tileset_index as usize)?
            .animations
            .get(animation_index as usize)?;
        let state = self
            .animations
            .get_or_create(AnimationKey::new(tile.tileset_index, animation_index));
        let frame = animation.frame_at(state.elapsed_ms)?;

        Some(Rect::new(
            frame.src_x as f32,
            frame.src_y as f32,
            tile.src.w,
            tile.src.h,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::gid::TileFlip;
    use crate::render::data::*;
    use std::path::Path;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Opacity(usize, f32),
        Draw(usize, Rect, Rect),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn draws(&self) -> Vec<(usize, Rect)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Draw(t, src, _) => Some((*t, *src)),
                    Call::Opacity(..) => None,
                })
                .collect()
        }
    }

    impl DrawBackend for Recorder {
        type Texture = usize;

        fn load_texture(&mut self, _path: &Path) -> Result<usize, MapError> {
            Ok(0)
        }

        fn set_opacity(&mut self, texture: &usize, opacity: f32) {
            self.calls.push(Call::Opacity(*texture, opacity));
        }

        fn draw_region(&mut self, texture: &usize, src: Rect, dest: Rect, _flip: TileFlip) {
            self.calls.push(Call::Draw(*texture, src, dest));
        }
    }

    fn tile(x: f32, tileset_index: u32, animation: Option<u32>) -> RenderTile {
        RenderTile {
            dest: Rect::new(x, 0.0, 8.0, 8.0),
            src: Rect::new(x, 0.0, 8.0, 8.0),
            tileset_index,
            animation,
            opacity: 1.0,
            flip: TileFlip::NONE,
        }
    }

    fn tileset_info(animations: Vec<FlattenedAnimation>) -> TilesetRenderInfo {
        TilesetRenderInfo {
            name: "ts".into(),
            image_path: None,
            tile_width: 8,
            tile_height: 8,
            columns: 4,
            animations,
        }
    }

    fn walk_animation() -> FlattenedAnimation {
        FlattenedAnimation {
            total_duration_ms: 300,
            frames: vec![
                AnimationFrame { src_x: 0, src_y: 0, end_time_ms: 100 },
                AnimationFrame { src_x: 0, src_y: 8, end_time_ms: 300 },
            ],
        }
    }

    fn data(layers: Vec<LayerRenderData>) -> MapRenderData {
        MapRenderData {
            tilesets: vec![tileset_info(vec![walk_animation()]), tileset_info(Vec::new())],
            layers,
            ..Default::default()
        }
    }

    fn layer(visible: bool, tiles: Vec<RenderTile>) -> LayerRenderData {
        LayerRenderData {
            name: "l".into(),
            visible,
            tiles,
        }
    }

    #[test]
    fn draws_layers_then_tiles_in_order() {
        let data = data(vec![
            layer(true, vec![tile(0.0, 0, None), tile(8.0, 1, None)]),
            layer(true, vec![tile(16.0, 0, None)]),
        ]);
        let textures: TilesetTextures<usize> = [10, 11].into_iter().collect();
        let mut backend = Recorder::default();

        let stats = TileRenderer::new().render(&data, &textures, &mut backend, 16);

        let xs: Vec<f32> = backend.draws().iter().map(|(_, src)| src.x).collect();
        assert_eq!(xs, vec![0.0, 8.0, 16.0]);
        assert_eq!(backend.draws()[1].0, 11);
        assert_eq!(stats, FrameStats { tiles_drawn: 3, tiles_skipped: 0 });
    }

    #[test]
    fn hidden_layers_issue_no_draws() {
        let data = data(vec![layer(false, vec![tile(0.0, 0, None), tile(8.0, 0, None)])]);
        let textures: TilesetTextures<usize> = [10, 11].into_iter().collect();
        let mut backend = Recorder::default();

        let stats = TileRenderer::new().render(&data, &textures, &mut backend, 16);

        assert!(backend.calls.is_empty());
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn missing_textures_skip_only_their_tiles() {
        let data = data(vec![layer(
            true,
            vec![tile(0.0, 7, None), tile(8.0, 1, None), tile(16.0, 0, None)],
        )]);
        let mut textures = TilesetTextures::new();
        textures.push(10);
        textures.push_empty();
        let mut backend = Recorder::default();

        let stats = TileRenderer::new().render(&data, &textures, &mut backend, 16);

        assert_eq!(backend.draws(), vec![(10, Rect::new(16.0, 0.0, 8.0, 8.0))]);
        assert_eq!(stats, FrameStats { tiles_drawn: 1, tiles_skipped: 2 });
    }

    #[test]
    fn dangling_animation_index_is_skipped() {
        let data = data(vec![layer(true, vec![tile(0.0, 0, Some(9)), tile(8.0, 1, Some(0))])]);
        let textures: TilesetTextures<usize> = [10, 11].into_iter().collect();
        let mut backend = Recorder::default();

        let stats = TileRenderer::new().render(&data, &textures, &mut backend, 16);

        assert!(backend.calls.is_empty());
        assert_eq!(stats.tiles_skipped, 2);
    }

    #[test]
    fn animated_tiles_follow_shared_clock() {
        let data = data(vec![layer(true, vec![tile(0.0, 0, Some(0)), tile(8.0, 0, Some(0))])]);
        let textures: TilesetTextures<usize> = [10, 11].into_iter().collect();
        let mut renderer = TileRenderer::new();
        let mut backend = Recorder::default();

        // First frame creates the clock at zero.
        renderer.render(&data, &textures, &mut backend, 50);
        // Two tiles, one clock: advanced once per call.
        renderer.render(&data, &textures, &mut backend, 150);
        assert_eq!(
            renderer
                .animation_states()
                .get(AnimationKey::new(0, 0))
                .map(|s| s.elapsed_ms),
            Some(150)
        );
        renderer.render(&data, &textures, &mut backend, 200);

        let src_ys: Vec<f32> = backend.draws().iter().map(|(_, src)| src.y).collect();
        assert_eq!(src_ys, vec![0.0, 0.0, 8.0, 8.0, 0.0, 0.0]);
        assert!(backend.draws().iter().all(|(_, src)| src.w == 8.0 && src.h == 8.0));
    }

    #[test]
    fn opacity_is_restored_after_each_tile() {
        let mut faded = tile(0.0, 0, None);
        faded.opacity = 0.25;
        let data = data(vec![layer(true, vec![faded, tile(8.0, 0, None)])]);
        let textures: TilesetTextures<usize> = [10].into_iter().collect();
        let mut backend = Recorder::default();

        TileRenderer::new().render(&data, &textures, &mut backend, 16);

        assert_eq!(
            backend.calls,
            vec![
                Call::Opacity(10, 0.25),
                Call::Draw(10, Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.0, 0.0, 8.0, 8.0)),
                Call::Opacity(10, 1.0),
                Call::Draw(10, Rect::new(8.0, 0.0, 8.0, 8.0), Rect::new(8.0, 0.0, 8.0, 8.0)),
            ]
        );
    }

    #[test]
    fn reset_restarts_animations() {
        let data = data(vec![layer(true, vec![tile(0.0, 0, Some(0))])]);
        let textures: TilesetTextures<usize> = [10].into_iter().collect();
        let mut renderer = TileRenderer::new();
        let mut backend = Recorder::default();
        renderer.render(&data, &textures, &mut backend, 0);
        renderer.render(&data, &textures, &mut backend, 250);

        renderer.reset_animations();
        assert!(renderer.animation_states().is_empty());

        renderer.render(&data, &textures, &mut backend, 250);
        let last = backend.draws().last().copied().map(|(_, src)| src.y);
        assert_eq!(last, Some(0.0));
    }
}
