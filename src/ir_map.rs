// src/ir_map.rs
use crate::gid::TileId;
use macroquad::prelude::*;

/// Canonical, format-agnostic map. Immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct IrMap {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_w: u32,
    /// Cell height in pixels.
    pub tile_h: u32,
    /// Sorted by `first_gid`.
    pub tilesets: Vec<IrTileset>,
    /// Tile layers in draw order.
    pub layers: Vec<IrLayer>,
}

/// One image atlas sliced into a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct IrTileset {
    /// Name as authored.
    pub name: String,
    /// Global id of the tileset's first tile.
    pub first_gid: u32,
    /// Tiles per atlas row.
    pub columns: u32,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// 0 when the source omits it.
    pub tilecount: u32,
    /// Relative to the map directory. `None` for image-collection tilesets.
    pub image: Option<String>,
    /// Pixels between neighbouring tiles.
    pub spacing: u32,
    /// Pixels around the atlas border.
    pub margin: u32,
    /// Per-tile animations, in the order the tileset lists them.
    pub animations: Vec<IrAnimation>,
}

/// Animation attached to one tile of a tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct IrAnimation {
    /// Local id of the animated tile.
    pub tile_id: u32,
    /// Frames in playback order.
    pub frames: Vec<IrFrame>,
}

/// One step of an [`IrAnimation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrFrame {
    /// Local id of the tile shown during this frame.
    pub tile_id: u32,
    /// How long the frame stays up.
    pub duration_ms: u32,
}

/// A tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct IrLayer {
    /// Name as authored.
    pub name: String,
    /// Hidden layers are kept but never drawn.
    pub visible: bool,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,
    /// World offset in pixels.
    pub offset: Vec2,
    /// Finite layers hold exactly one chunk covering the map.
    pub chunks: Vec<IrChunk>,
}

/// Dense rectangular region of a layer, in tile coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct IrChunk {
    /// Column of the chunk's top-left cell.
    pub x: i32,
    /// Row of the chunk's top-left cell.
    pub y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Row-major, `width * height` entries.
    pub data: Vec<TileId>,
}

impl IrChunk {
    /// Non-empty cells as `(tile_x, tile_y, id)`, row-major.
    ///
    /// Coordinates saturate at the `i32` bounds.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, TileId)> + '_ {
        let w = self.width.max(1) as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, id)| !id.is_empty())
            .map(move |(idx, id)| {
                (
                    self.x.saturating_add_unsigned((idx % w) as u32),
                    self.y.saturating_add_unsigned((idx / w) as u32),
                    *id,
                )
            })
    }
}
