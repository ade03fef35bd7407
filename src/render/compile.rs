use super::data::*;
use crate::gid::TileId;
use crate::ir_map::{IrAnimation, IrLayer, IrMap, IrTileset};
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Turns a decoded map into its render form. Pure apart from joining image
/// paths onto `base_dir`; the same input always yields the same output.
pub fn compile_render_data(ir: &IrMap, base_dir: &Path) -> MapRenderData {
    let tilesets: Vec<TilesetRenderInfo> = ir
        .tilesets
        .iter()
        .map(|ts| tileset_render_info(ts, base_dir))
        .collect();

    // local tile id -> animation index, per tileset
    let anim_lookup: Vec<HashMap<u32, u32>> = ir.tilesets.iter().map(animation_lookup).collect();

    let first_gids: Vec<u32> = ir.tilesets.iter().map(|t| t.first_gid).collect();

    let layers = ir
        .layers
        .iter()
        .map(|layer| compile_layer(ir, layer, &first_gids, &anim_lookup))
        .collect();

    MapRenderData {
        pixel_width: ir.width.saturating_mul(ir.tile_w),
        pixel_height: ir.height.saturating_mul(ir.tile_h),
        map_width: ir.width,
        map_height: ir.height,
        tile_width: ir.tile_w,
        tile_height: ir.tile_h,
        tilesets,
        layers,
    }
}

/// Index of the tileset owning `gid`: the last one whose `first_gid` is not
/// above it. `first_gids` must be sorted ascending.
#[inline]
pub fn tileset_index_for_gid(first_gids: &[u32], gid: u32) -> Option<usize> {
    first_gids.partition_point(|&first| first <= gid).checked_sub(1)
}

/// Top-left pixel of local tile `id` inside a tileset image.
#[inline]
fn tile_origin(ts: &IrTileset, id: u32) -> (u32, u32) {
    let cols = ts.columns.max(1);
    let col = id % cols;
    let row = id / cols;
    let sx = ts
        .margin
        .saturating_add(col.saturating_mul(ts.tile_w.saturating_add(ts.spacing)));
    let sy = ts
        .margin
        .saturating_add(row.saturating_mul(ts.tile_h.saturating_add(ts.spacing)));
    (sx, sy)
}

fn flatten_animation(ts: &IrTileset, anim: &IrAnimation) -> FlattenedAnimation {
    let mut elapsed = 0u32;
    let frames = anim
        .frames
        .iter()
        .map(|f| {
            elapsed = elapsed.saturating_add(f.duration_ms);
            let (src_x, src_y) = tile_origin(ts, f.tile_id);
            AnimationFrame {
                src_x,
                src_y,
                end_time_ms: elapsed,
            }
        })
        .collect();

    FlattenedAnimation {
        total_duration_ms: elapsed,
        frames,
    }
}

fn tileset_render_info(ts: &IrTileset, base_dir: &Path) -> TilesetRenderInfo {
    TilesetRenderInfo {
        name: ts.name.clone(),
        image_path: ts.image.as_ref().map(|img| base_dir.join(img)),
        tile_width: ts.tile_w,
        tile_height: ts.tile_h,
        columns: ts.columns,
        animations: ts
            .animations
            .iter()
            .map(|a| flatten_animation(ts, a))
            .collect(),
    }
}

fn animation_lookup(ts: &IrTileset) -> HashMap<u32, u32> {
    let mut lookup = HashMap::with_capacity(ts.animations.len());
    for (i, anim) in ts.animations.iter().enumerate() {
        if let Some(previous) = lookup.insert(anim.tile_id, i as u32) {
            tracing::warn!(
                target: "map",
                tileset = %ts.name,
                tile = anim.tile_id,
                previous,
                used = i,
                "tile has more than one animation, keeping the last"
            );
        }
    }
    lookup
}

fn compile_layer(
    ir: &IrMap,
    layer: &IrLayer,
    first_gids: &[u32],
    anim_lookup: &[HashMap<u32, u32>],
) -> LayerRenderData {
    let opacity = layer.opacity.clamp(0.0, 1.0);
    let tw = ir.tile_w as f32;
    let th = ir.tile_h as f32;

    let mut tiles = Vec::new();
    for chunk in &layer.chunks {
        for (x, y, id) in chunk.cells() {
            let Some((ts_index, ts, src, animation)) = compile_tile(ir, id, first_gids, anim_lookup)
            else {
                tracing::warn!(
                    target: "map",
                    layer = %layer.name,
                    gid = id.clean(),
                    "tile id is not owned by any tileset, skipping"
                );
                continue;
            };

            // Tiled anchors tiles to the bottom-left of their cell
            let dest_x = layer.offset.x + x as f32 * tw;
            let dest_y = layer.offset.y + (y as f32 + 1.0) * th - ts.tile_h as f32;
            tiles.push(RenderTile {
                dest: Rect::new(dest_x, dest_y, ts.tile_w as f32, ts.tile_h as f32),
                src,
                tileset_index: ts_index,
                animation,
                opacity,
                flip: id.flip(),
            });
        }
    }

    LayerRenderData {
        name: layer.name.clone(),
        visible: layer.visible,
        tiles,
    }
}

fn compile_tile<'a>(
    ir: &'a IrMap,
    id: TileId,
    first_gids: &[u32],
    anim_lookup: &[HashMap<u32, u32>],
) -> Option<(u32, &'a IrTileset, Rect, Option<u32>)> {
    let gid = id.clean();
    let ts_index = tileset_index_for_gid(first_gids, gid)?;
    let ts = &ir.tilesets[ts_index];
    let local = gid - ts.first_gid;

    let animation = anim_lookup[ts_index].get(&local).copied();
    let (sx, sy) = match animation {
        Some(_) => (0, 0), // resolved per frame
        None => tile_origin(ts, local),
    };
    let src = Rect::new(sx as f32, sy as f32, ts.tile_w as f32, ts.tile_h as f32);

    Some((ts_index as u32, ts, src, animation))
}
