use crate::assets::ImageRegion;
use crate::object::MapObject;
use crate::properties::Properties;
use macroquad::math::Vec2;
use std::collections::BTreeMap;

/// One tileset of a map, inline or external.
#[derive(Debug, Clone)]
pub struct TileSet {
    /// Name given in the editor
    pub name: Option<String>,
    /// Global id of local tile 0
    pub first_gid: u32,
    /// Tiles keyed by global id
    pub tiles: BTreeMap<u32, Tile>,
    /// Custom properties plus `firstgid`
    pub properties: Properties,
}

impl TileSet {
    /// An empty tileset.
    pub fn new(name: Option<String>, first_gid: u32) -> Self {
        TileSet {
            name,
            first_gid,
            tiles: BTreeMap::new(),
            properties: Properties::new(),
        }
    }

    /// Tile stored under `gid`.
    pub fn tile(&self, gid: u32) -> Option<&Tile> {
        self.tiles.get(&gid)
    }

    /// Tile stored under `gid`, mutably.
    pub fn tile_mut(&mut self, gid: u32) -> Option<&mut Tile> {
        self.tiles.get_mut(&gid)
    }

    /// Insert or replace the tile stored under `gid`.
    pub fn put_tile(&mut self, gid: u32, tile: Tile) {
        self.tiles.insert(gid, tile);
    }
}

/// A tile is either one image region or an animation over sibling tiles.
#[derive(Debug, Clone)]
pub enum Tile {
    /// A single image region
    Static(StaticTile),
    /// Frames cycling through static tiles of the same tileset
    Animated(AnimatedTile),
}

/// A tile drawn from one image region.
#[derive(Debug, Clone)]
pub struct StaticTile {
    /// Global id
    pub id: u32,
    /// Where the tile's pixels are
    pub region: ImageRegion,
    /// Drawing offset in model space
    pub offset: Vec2,
    /// Custom properties plus `terrain`, `probability` and `type`
    pub properties: Properties,
    /// Collision shapes attached in the editor
    pub objects: Vec<MapObject>,
}

impl StaticTile {
    /// A tile with no properties or collision shapes.
    pub fn new(id: u32, region: ImageRegion, offset: Vec2) -> Self {
        StaticTile {
            id,
            region,
            offset,
            properties: Properties::new(),
            objects: Vec::new(),
        }
    }
}

/// An animated tile. Properties and collision shapes are taken over from
/// the static tile it replaced.
#[derive(Debug, Clone)]
pub struct AnimatedTile {
    /// Global id of the tile this animation replaced
    pub id: u32,
    /// Frames in play order, never empty
    pub frames: Vec<AnimationFrame>,
    /// Properties of the replaced tile
    pub properties: Properties,
    /// Collision shapes of the replaced tile
    pub objects: Vec<MapObject>,
}

/// One step of an animation.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    /// Copy of the static tile shown during this frame
    pub tile: StaticTile,
    /// Milliseconds
    pub duration: u32,
}

impl Tile {
    /// Global id.
    pub fn id(&self) -> u32 {
        match self {
            Tile::Static(t) => t.id,
            Tile::Animated(t) => t.id,
        }
    }

    /// The static region, or the first frame's for animations.
    pub fn region(&self) -> Option<&ImageRegion> {
        match self {
            Tile::Static(t) => Some(&t.region),
            Tile::Animated(t) => t.frames.first().map(|f| &f.tile.region),
        }
    }

    /// Tile properties.
    pub fn properties(&self) -> &Properties {
        match self {
            Tile::Static(t) => &t.properties,
            Tile::Animated(t) => &t.properties,
        }
    }

    /// Tile properties, mutably.
    pub fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Tile::Static(t) => &mut t.properties,
            Tile::Animated(t) => &mut t.properties,
        }
    }

    /// Collision shapes attached in the editor.
    pub fn objects(&self) -> &[MapObject] {
        match self {
            Tile::Static(t) => &t.objects,
            Tile::Animated(t) => &t.objects,
        }
    }

    /// Collision shapes, mutably.
    pub fn objects_mut(&mut self) -> &mut Vec<MapObject> {
        match self {
            Tile::Static(t) => &mut t.objects,
            Tile::Animated(t) => &mut t.objects,
        }
    }

    /// True for [`Tile::Animated`].
    pub fn is_animated(&self) -> bool {
        matches!(self, Tile::Animated(_))
    }
}

/// All tilesets of a map, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TileSets(Vec<TileSet>);

impl TileSets {
    /// No tilesets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tileset; its index is the previous [`TileSets::len`].
    pub fn push(&mut self, tileset: TileSet) {
        self.0.push(tileset);
    }

    /// Number of tilesets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no tilesets.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tilesets in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, TileSet> {
        self.0.iter()
    }

    /// Tileset at `index`.
    pub fn get(&self, index: usize) -> Option<&TileSet> {
        self.0.get(index)
    }

    /// Tileset at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TileSet> {
        self.0.get_mut(index)
    }

    /// First tileset with this name.
    pub fn by_name(&self, name: &str) -> Option<&TileSet> {
        self.0.iter().find(|ts| ts.name.as_deref() == Some(name))
    }

    /// The tileset owning `gid`: among tilesets that declare the id, the one
    /// with the greatest `first_gid` not above it.
    pub fn owner(&self, gid: u32) -> Option<&TileSet> {
        self.0
            .iter()
            .filter(|ts| ts.first_gid <= gid && ts.tiles.contains_key(&gid))
            .max_by_key(|ts| ts.first_gid)
    }

    /// Look up a tile by global id, flags already cleared.
    pub fn tile(&self, gid: u32) -> Option<&Tile> {
        self.owner(gid)?.tile(gid)
    }
}

impl<'a> IntoIterator for &'a TileSets {
    type Item = &'a TileSet;
    type IntoIter = std::slice::Iter<'a, TileSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
