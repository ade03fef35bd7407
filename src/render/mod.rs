mod animation;
mod backend;
mod compile;
mod data;
mod renderer;

pub use animation::{AnimationKey, AnimationState, AnimationStates};
pub use backend::{DrawBackend, MacroquadBackend, MacroquadTexture};
pub use compile::{compile_render_data, tileset_index_for_gid};
pub use data::{
    AnimationFrame, FlattenedAnimation, LayerRenderData, MapRenderData, RenderTile,
    TilesetRenderInfo,
};
pub use renderer::{FrameStats, TileRenderer, TilesetTextures};
