use crate::layer::LayerPath;
use crate::properties::Properties;
use macroquad::math::{Rect, Vec2};
use std::collections::HashMap;

/// A placed object from an object layer or a tile's collision group.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    /// 0 when the editor wrote no id
    pub id: u32,
    /// Name given in the editor
    pub name: Option<String>,
    /// The object's `type` (or `class`) string
    pub kind: Option<String>,
    /// Visibility flag as written
    pub visible: bool,
    /// Geometry in model space
    pub shape: ObjectShape,
    /// Custom properties plus the synthesized geometry entries
    /// (`x`, `y`, `width`, `height`, and `id`, `type`, `rotation` when present).
    pub properties: Properties,
}

impl MapObject {
    /// Anchor position in model space.
    pub fn position(&self) -> Vec2 {
        match &self.shape {
            ObjectShape::Rectangle(r) | ObjectShape::Ellipse(r) => r.point(),
            ObjectShape::Polygon(p) | ObjectShape::Polyline(p) => p.position,
            ObjectShape::Tile(t) => t.position,
        }
    }
}

/// Object geometry. Rectangles and ellipses are anchored at their bottom-left
/// corner under Y-flip.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    /// Plain rectangle, also used for points
    Rectangle(Rect),
    /// Ellipse inscribed in the rectangle
    Ellipse(Rect),
    /// Closed vertex loop
    Polygon(Poly),
    /// Open vertex chain
    Polyline(Poly),
    /// A placed tile
    Tile(TileStamp),
}

/// Vertex list for polygons and polylines.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    /// Object origin
    pub position: Vec2,
    /// Offsets from `position`
    pub vertices: Vec<Vec2>,
}

/// An object that stamps a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileStamp {
    /// Global id of the stamped tile, flags cleared; `None` if no tileset owns it
    pub tile: Option<u32>,
    /// Horizontal flip flag of the gid
    pub flip_h: bool,
    /// Vertical flip flag of the gid
    pub flip_v: bool,
    /// Anchor corner in model space
    pub position: Vec2,
    /// Stamp size over the tile's own size
    pub scale: Vec2,
    /// Degrees, as written by the editor
    pub rotation: f32,
}

/// Where an object lives inside a [`Map`](crate::Map).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectLocation {
    /// `index`-th object of the object layer at `layer`
    Layer {
        /// Path of the object layer
        layer: LayerPath,
        /// Position in the layer's object list
        index: usize,
    },
    /// `index`-th collision object of tile `tile` in tileset `tileset`
    Tile {
        /// Tileset index in [`TileSets`](crate::TileSets)
        tileset: usize,
        /// Global id of the tile
        tile: u32,
        /// Position in the tile's object list
        index: usize,
    },
}

/// Object id to location, for every object with a non-zero id.
pub type ObjectIndex = HashMap<u32, ObjectLocation>;
