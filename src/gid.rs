//! Global tile ids and the flip flags packed into their top three bits.

/// Horizontal flip, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip (swap of x and y), bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// The lower 29 bits: the global tile id itself.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// A tile id as stored in layer data or an object's `gid`, flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// The id exactly as stored, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
    /// The global tile id with the flip flags cleared.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }
    /// Bit 31 is set.
    #[inline]
    pub fn flip_h(self) -> bool {
        (self.0 & FLIP_H) != 0
    }
    /// Bit 30 is set.
    #[inline]
    pub fn flip_v(self) -> bool {
        (self.0 & FLIP_V) != 0
    }
    /// Bit 29 is set.
    #[inline]
    pub fn flip_d(self) -> bool {
        (self.0 & FLIP_D) != 0
    }

    /// Cell orientation for a tile-layer id, folding the diagonal flag into a
    /// rotation.
    pub fn orientation(self) -> Orientation {
        Orientation::from_flags(self.flip_h(), self.flip_v(), self.flip_d())
    }
}

/// Clockwise rotation of a cell, in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// Upright
    #[default]
    None,
    /// A quarter turn
    Cw90,
    /// Upside down
    Cw180,
    /// Three quarter turns
    Cw270,
}

impl Rotation {
    /// The rotation in degrees, clockwise.
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

/// How a tile is drawn inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Orientation {
    /// Mirror along the vertical axis, applied before rotating
    pub flip_h: bool,
    /// Mirror along the horizontal axis, applied before rotating
    pub flip_v: bool,
    /// Clockwise rotation
    pub rotation: Rotation,
}

impl Orientation {
    /// Translate the editor's (h, v, diagonal) flags into flips plus rotation.
    pub fn from_flags(flip_h: bool, flip_v: bool, flip_d: bool) -> Self {
        let (flip_h, flip_v, rotation) = match (flip_h, flip_v, flip_d) {
            (true, true, true) => (true, false, Rotation::Cw270),
            (true, false, true) => (false, false, Rotation::Cw270),
            (false, true, true) => (false, false, Rotation::Cw90),
            (false, false, true) => (false, true, Rotation::Cw270),
            (h, v, false) => (h, v, Rotation::None),
        };
        Orientation {
            flip_h,
            flip_v,
            rotation,
        }
    }
}
