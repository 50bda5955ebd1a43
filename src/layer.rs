use crate::assets::ImageRegion;
use crate::error::{MapError, Result};
use crate::gid::Orientation;
use crate::object::MapObject;
use crate::properties::Properties;
use macroquad::math::Vec2;

/// Index path of a layer from the top of the tree: `[2, 0]` is the first child
/// of the third top-level layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LayerPath(Vec<usize>);

impl LayerPath {
    /// The empty path: the map's top level, not a layer itself.
    pub fn root() -> Self {
        LayerPath(Vec::new())
    }

    /// Path of the `index`-th child below this one.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        LayerPath(path)
    }

    /// Child indices from the top level down.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// True for [`LayerPath::root`].
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for LayerPath {
    fn from(v: Vec<usize>) -> Self {
        LayerPath(v)
    }
}

/// One node of the layer tree.
#[derive(Debug)]
pub struct Layer {
    /// Name given in the editor
    pub name: String,
    /// 0.0 to 1.0
    pub opacity: f32,
    /// Visibility flag as written
    pub visible: bool,
    /// Pixel offset, as written by the editor
    pub offset: Vec2,
    /// Effective parallax factor: the layer's own factor times all of its
    /// ancestor groups'.
    pub parallax: Vec2,
    /// Custom properties
    pub properties: Properties,
    /// Path of the enclosing group, `None` for top-level layers
    pub parent: Option<LayerPath>,
    /// Variant payload
    pub kind: LayerKind,
}

/// What a layer holds.
#[derive(Debug)]
pub enum LayerKind {
    /// Child layers in draw order
    Group(Vec<Layer>),
    /// A tile grid
    Tiles(TileLayer),
    /// Placed objects in document order
    Objects(Vec<MapObject>),
    /// A single image
    Image(ImageLayer),
}

impl Layer {
    /// True for group layers.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group(_))
    }

    /// Child layers; empty unless this is a group.
    pub fn children(&self) -> &[Layer] {
        match &self.kind {
            LayerKind::Group(children) => children,
            _ => &[],
        }
    }

    /// The grid of a tile layer.
    pub fn tiles(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tiles(t) => Some(t),
            _ => None,
        }
    }

    /// Objects of an object layer; empty for other kinds.
    pub fn objects(&self) -> &[MapObject] {
        match &self.kind {
            LayerKind::Objects(objects) => objects,
            _ => &[],
        }
    }

    /// The payload of an image layer.
    pub fn image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Image(i) => Some(i),
            _ => None,
        }
    }
}

/// One grid slot of a tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Global tile id, flags cleared. Resolve with
    /// [`TileSets::tile`](crate::TileSets::tile) to see the current variant.
    pub tile: u32,
    /// Flips and rotation decoded from the id's flag bits
    pub orientation: Orientation,
}

/// A fixed-size grid of optional cells.
#[derive(Debug)]
pub struct TileLayer {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Map tile size in pixels
    pub tile_width: u32,
    /// Map tile size in pixels
    pub tile_height: u32,
    /// Row-major, `width * height`; row 0 is the bottom row under Y-flip
    pub cells: Vec<Option<Cell>>,
}

impl TileLayer {
    /// An empty grid. Fails when `width * height` does not fit in memory
    /// addressing.
    pub fn new(width: usize, height: usize, tile_width: u32, tile_height: u32) -> Result<Self> {
        let count = width.checked_mul(height).ok_or_else(|| {
            MapError::InvalidTileData(format!("layer size {width}x{height} is too large"))
        })?;
        Ok(TileLayer {
            width,
            height,
            tile_width,
            tile_height,
            cells: vec![None; count],
        })
    }

    /// Cell at column `x`, row `y`; `None` when empty or out of bounds.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    /// Store a cell; out-of-bounds positions are ignored.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Some(cell);
        }
    }
}

/// Payload of an image layer.
#[derive(Debug)]
pub struct ImageLayer {
    /// `None` when the layer names no image
    pub image: Option<ImageRegion>,
    /// Position of the image's anchor corner in model space
    pub position: Vec2,
}
