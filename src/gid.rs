// Tiled stores flip flags in the top three bits of every global id.

/// Horizontal flip, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Anti-diagonal flip, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Strips the flip bits from a raw id.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // bit 28 is free

/// Raw global tile id as stored in layer data, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u32);

impl TileId {
    /// The id exactly as stored.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// The id without flip flags.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// True for gid 0, whatever the flags.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
    /// See [`FLIP_H`].
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// See [`FLIP_V`].
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// See [`FLIP_D`].
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }

    /// All three flip flags.
    #[inline]
    pub fn flip(self) -> TileFlip {
        TileFlip {
            horizontal: self.flip_h(),
            vertical: self.flip_v(),
            diagonal: self.flip_d(),
        }
    }
}

/// Orientation flags of a placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileFlip {
    /// Mirrored left to right.
    pub horizontal: bool,
    /// Mirrored top to bottom.
    pub vertical: bool,
    /// Anti-diagonal flip (x/y swap), applied before the other two.
    pub diagonal: bool,
}

impl TileFlip {
    /// Unflipped.
    pub const NONE: TileFlip = TileFlip {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };
}
