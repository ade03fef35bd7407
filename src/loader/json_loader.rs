// src/loader/json_loader.rs
use crate::error::MapError;
use crate::gid::TileId;
use crate::ir_map::*;
use base64::Engine as _;
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    chunks: Vec<JsonChunk>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    compression: Option<String>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonChunk {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: JsonValue,
}

/// Either an external reference (`source`) or an embedded tileset, whose
/// remaining fields are kept aside in `inline`.
#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: JsonValue,
}

#[derive(Deserialize)]
struct JsonMap {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default)]
    animation: Vec<JsonFrame>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

fn tileset_to_ir(first_gid: u32, ts: JsonTileset) -> IrTileset {
    let animations = ts
        .tiles
        .into_iter()
        .filter(|t| !t.animation.is_empty())
        .map(|t| IrAnimation {
            tile_id: t.id,
            frames: t
                .animation
                .into_iter()
                .map(|f| IrFrame {
                    tile_id: f.tileid,
                    duration_ms: f.duration,
                })
                .collect(),
        })
        .collect();

    IrTileset {
        name: ts.name,
        first_gid,
        columns: ts.columns,
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        image: ts.image.filter(|i| !i.is_empty()),
        spacing: ts.spacing,
        margin: ts.margin,
        animations,
    }
}

fn load_tileset(
    entry: JsonTilesetRef,
    map_path: &Path,
    map_dir: &Path,
) -> Result<IrTileset, MapError> {
    let JsonTilesetRef {
        firstgid,
        source,
        inline,
    } = entry;

    let ts: JsonTileset = match source {
        Some(source) => {
            if !source.ends_with(".json") {
                return Err(MapError::InvalidMap(format!(
                    "External tileset must be JSON: {source}"
                )));
            }
            let ts_path = map_dir.join(&source);
            let ext_txt = std::fs::read_to_string(&ts_path).map_err(|source| MapError::Io {
                path: ts_path.clone(),
                source,
            })?;
            serde_json::from_str(&ext_txt).map_err(|source| MapError::Json {
                path: ts_path,
                source,
            })?
        }
        None => serde_json::from_value(inline).map_err(|source| MapError::Json {
            path: map_path.to_path_buf(),
            source,
        })?,
    };

    Ok(tileset_to_ir(firstgid, ts))
}

fn decode_tile_data(
    layer: &str,
    data: JsonValue,
    encoding: Option<&str>,
    compression: Option<&str>,
) -> Result<Vec<TileId>, MapError> {
    if let Some(c) = compression.filter(|c| !c.is_empty()) {
        return Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: c.to_owned(),
        });
    }

    match encoding.unwrap_or("csv") {
        "csv" => {
            let ids: Vec<u32> = serde_json::from_value(data).map_err(|e| {
                MapError::InvalidMap(format!("layer '{layer}' data is not a list of ids: {e}"))
            })?;
            Ok(ids.into_iter().map(TileId).collect())
        }
        "base64" => {
            let JsonValue::String(text) = data else {
                return Err(MapError::InvalidMap(format!(
                    "layer '{layer}' declares base64 data but is not a string"
                )));
            };
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|source| MapError::Base64 {
                    layer: layer.to_owned(),
                    source,
                })?;
            if bytes.len() % 4 != 0 {
                return Err(MapError::InvalidMap(format!(
                    "layer '{layer}' base64 data is not a whole number of ids"
                )));
            }
            Ok(bytes
                .chunks_exact(4)
                .map(|b| TileId(u32::from_le_bytes([b[0], b[1], b[2], b[3]])))
                .collect())
        }
        other => Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: other.to_owned(),
        }),
    }
}

fn build_chunk(
    layer: &str,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Vec<TileId>,
) -> Result<IrChunk, MapError> {
    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(MapError::InvalidLayerSize {
            layer: layer.to_owned(),
            expected,
            actual: data.len(),
        });
    }
    Ok(IrChunk {
        x,
        y,
        width,
        height,
        data,
    })
}

fn tile_layer_to_ir(l: JsonLayer, infinite: bool) -> Result<IrLayer, MapError> {
    let encoding = l.encoding.as_deref();
    let compression = l.compression.as_deref();

    let chunks = if infinite || (l.data.is_none() && !l.chunks.is_empty()) {
        l.chunks
            .into_iter()
            .map(|c| {
                let data = decode_tile_data(&l.name, c.data, encoding, compression)?;
                build_chunk(&l.name, c.x, c.y, c.width, c.height, data)
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let data = match l.data {
            Some(d) => decode_tile_data(&l.name, d, encoding, compression)?,
            None => Vec::new(),
        };
        vec![build_chunk(&l.name, 0, 0, l.width, l.height, data)?]
    };

    Ok(IrLayer {
        name: l.name,
        visible: l.visible,
        opacity: l.opacity,
        offset: vec2(l.offsetx, l.offsety),
        chunks,
    })
}

/// Decodes an in-memory Tiled JSON map. `map_path` is only used for error
/// reports; external tilesets are resolved against `map_dir`.
pub fn decode_map_str_to_ir(
    txt: &str,
    map_path: &Path,
    map_dir: &Path,
) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(txt).map_err(|source| MapError::Json {
        path: map_path.to_path_buf(),
        source,
    })?;

    if j.tilesets.is_empty() {
        return Err(MapError::NoTilesets);
    }

    let mut ir_tilesets = j
        .tilesets
        .into_iter()
        .map(|entry| load_tileset(entry, map_path, map_dir))
        .collect::<Result<Vec<_>, _>>()?;

    // Sort by first_gid so gid ownership is a simple range lookup
    ir_tilesets.sort_by_key(|t| t.first_gid);

    let mut ir_layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        let is_tiles = l.kind.as_deref().map_or(true, |k| k == "tilelayer");
        if is_tiles {
            ir_layers.push(tile_layer_to_ir(l, j.infinite)?);
        } else {
            tracing::debug!(target: "map", layer = %l.name, kind = ?l.kind, "skipping non-tile layer");
        }
    }

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets: ir_tilesets,
        layers: ir_layers,
    })
}

/// Reads a Tiled JSON map from disk. Returns the decoded map together with
/// the directory tileset images are resolved against.
pub fn decode_map_file_to_ir(path: impl AsRef<Path>) -> Result<(IrMap, PathBuf), MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let txt = std::fs::read_to_string(p).map_err(|source| MapError::Io {
        path: p.to_path_buf(),
        source,
    })?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let ir = decode_map_str_to_ir(&txt, p, &map_dir)?;
    Ok((ir, map_dir))
}
