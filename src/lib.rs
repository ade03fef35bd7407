#![warn(missing_docs)]
//! Tiled JSON map runtime for Macroquad.
//!
//! A map is decoded into a format-agnostic [`IrMap`], compiled once into
//! [`MapRenderData`] (flat per-layer tile lists with precomputed rects and
//! flattened animation tables), then drawn every frame by a [`TileRenderer`]
//! through a [`DrawBackend`]. [`Map`] ties the pieces together.

mod config;
mod error;
mod gid;
mod ir_map;
mod loader {
    pub mod json_loader;
}
mod map;
mod render;

pub use config::{MapConfig, TextureFilter};
pub use error::{MapError, Result};
pub use gid::{TileFlip, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use ir_map::{IrAnimation, IrChunk, IrFrame, IrLayer, IrMap, IrTileset};
pub use loader::json_loader::{decode_map_file_to_ir, decode_map_str_to_ir};
pub use map::Map;
pub use render::*;
