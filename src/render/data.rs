use crate::gid::TileFlip;
use macroquad::prelude::*;
use std::path::PathBuf;

/// Renderer-friendly form of a map: everything that can be computed once at
/// load time is computed here, so drawing a frame is a walk over flat lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapRenderData {
    /// `map_width * tile_width`.
    pub pixel_width: u32,
    /// `map_height * tile_height`.
    pub pixel_height: u32,
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Same order as the decoded tilesets.
    pub tilesets: Vec<TilesetRenderInfo>,
    /// Draw order.
    pub layers: Vec<LayerRenderData>,
}

/// Per-tileset data the renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetRenderInfo {
    /// Name as authored.
    pub name: String,
    /// Image path joined with the map directory; `None` when the tileset
    /// declares no image.
    pub image_path: Option<PathBuf>,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Tiles per atlas row.
    pub columns: u32,
    /// Indexed by [`RenderTile::animation`].
    pub animations: Vec<FlattenedAnimation>,
}

/// Animation flattened into a cumulative-time table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlattenedAnimation {
    /// Length of one cycle.
    pub total_duration_ms: u32,
    /// Ordered by `end_time_ms`.
    pub frames: Vec<AnimationFrame>,
}

/// One entry of a [`FlattenedAnimation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Left edge of the frame's tile in the atlas, in pixels.
    pub src_x: u32,
    /// Top edge of the frame's tile in the atlas, in pixels.
    pub src_y: u32,
    /// Sum of this frame's duration and all preceding ones.
    pub end_time_ms: u32,
}

impl FlattenedAnimation {
    /// Index of the frame active at `time_in_cycle`, i.e. the first frame whose
    /// cumulative end time lies after it. Zero-length animations always
    /// resolve to frame 0.
    pub fn frame_index_at(&self, time_in_cycle: u32) -> usize {
        if self.total_duration_ms == 0 || self.frames.is_empty() {
            return 0;
        }
        let idx = self.frames.partition_point(|f| f.end_time_ms <= time_in_cycle);
        idx.min(self.frames.len() - 1)
    }

    /// Frame shown after `elapsed_ms` of playback, wrapping every
    /// `total_duration_ms`. `None` only for an animation without frames.
    pub fn frame_at(&self, elapsed_ms: u64) -> Option<&AnimationFrame> {
        let time_in_cycle = match self.total_duration_ms {
            0 => 0,
            total => (elapsed_ms % u64::from(total)) as u32,
        };
        self.frames.get(self.frame_index_at(time_in_cycle))
    }
}

/// A compiled tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRenderData {
    /// Name as authored.
    pub name: String,
    /// Hidden layers are skipped at draw time.
    pub visible: bool,
    /// Draw order.
    pub tiles: Vec<RenderTile>,
}

/// One placed tile with its geometry resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTile {
    /// World-space rect, anchored to the bottom-left of the cell.
    pub dest: Rect,
    /// Full source rect for static tiles. For animated tiles only `w`/`h` are
    /// meaningful; the position comes from the current animation frame.
    pub src: Rect,
    /// Owning tileset.
    pub tileset_index: u32,
    /// Index into the owning tileset's `animations`, if animated.
    pub animation: Option<u32>,
    /// Layer opacity, clamped to [0, 1].
    pub opacity: f32,
    /// Flip flags from the tile's gid.
    pub flip: TileFlip,
}

impl RenderTile {
    /// Whether the source rect changes over time.
    #[inline]
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}
