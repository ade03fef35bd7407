// tests/common/mod.rs
#![allow(dead_code)]

use macroquad::prelude::Rect;
use macroquad_tiled_anim::{DrawBackend, MapError, TileFlip};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Files starting with this marker "decode"; anything else fails to load.
pub const FAKE_IMAGE: &[u8] = b"FAKEIMG";

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Load(PathBuf),
    Opacity(PathBuf, f32),
    Draw { texture: PathBuf, src: Rect, dest: Rect },
}

/// Texture handle that reports its own release.
pub struct FakeTexture {
    pub path: PathBuf,
    released: Rc<RefCell<Vec<PathBuf>>>,
}

impl Drop for FakeTexture {
    fn drop(&mut self) {
        self.released.borrow_mut().push(self.path.clone());
    }
}

/// Backend that records every call instead of touching a GPU.
#[derive(Default)]
pub struct RecordingBackend {
    pub ops: Vec<Op>,
    pub released: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingBackend {
    pub fn draws(&self) -> Vec<(Rect, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Draw { src, dest, .. } => Some((*src, *dest)),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.draws().len()
    }

    pub fn released(&self) -> Vec<PathBuf> {
        self.released.borrow().clone()
    }
}

impl DrawBackend for RecordingBackend {
    type Texture = FakeTexture;

    fn load_texture(&mut self, path: &Path) -> Result<FakeTexture, MapError> {
        self.ops.push(Op::Load(path.to_path_buf()));
        let bytes = fs::read(path).map_err(|e| MapError::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !bytes.starts_with(FAKE_IMAGE) {
            return Err(MapError::ImageLoad {
                path: path.to_path_buf(),
                reason: "not an image".into(),
            });
        }
        Ok(FakeTexture {
            path: path.to_path_buf(),
            released: Rc::clone(&self.released),
        })
    }

    fn set_opacity(&mut self, texture: &FakeTexture, opacity: f32) {
        self.ops.push(Op::Opacity(texture.path.clone(), opacity));
    }

    fn draw_region(&mut self, texture: &FakeTexture, src: Rect, dest: Rect, _flip: TileFlip) {
        self.ops.push(Op::Draw {
            texture: texture.path.clone(),
            src,
            dest,
        });
    }
}

/// One 4-column tileset (8x8 tiles, first gid 1) whose local tile 0 animates
/// through tiles 0 (100ms) and 4 (200ms).
pub const TILESET_JSON: &str = r#"{
  "name":"terrain",
  "tilewidth":8,
  "tileheight":8,
  "tilecount":8,
  "columns":4,
  "image":"tiles.png",
  "tiles":[
    {"id":0,"animation":[{"tileid":0,"duration":100},{"tileid":4,"duration":200}]}
  ]
}"#;

/// Writes `map.json`, `tileset.json` and a loadable `tiles.png` into `dir`.
pub fn write_map(dir: &Path, map_json: &str) -> PathBuf {
    let map_path = dir.join("map.json");
    fs::write(&map_path, map_json).expect("failed to write map");
    fs::write(dir.join("tileset.json"), TILESET_JSON).expect("failed to write tileset");
    fs::write(dir.join("tiles.png"), FAKE_IMAGE).expect("failed to write image");
    map_path
}
