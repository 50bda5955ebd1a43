use crate::layer::{Layer, LayerKind, LayerPath};
use crate::loader::PropertyOwner;
use crate::object::{MapObject, ObjectIndex, ObjectLocation};
use crate::properties::Properties;
use crate::tileset::TileSets;

/// A decoded map. Built once per decode and not touched by the loader after.
#[derive(Debug, Default)]
pub struct Map {
    /// `orthogonal`, `isometric`, `staggered` or `hexagonal`
    pub orientation: Option<String>,
    /// Size in tiles
    pub width: u32,
    /// Size in tiles
    pub height: u32,
    /// Tile grid size in pixels
    pub tile_width: u32,
    /// Tile grid size in pixels
    pub tile_height: u32,
    /// Hexagonal maps only
    pub hex_side_length: u32,
    /// `x` or `y` on staggered and hexagonal maps
    pub stagger_axis: Option<String>,
    /// `odd` or `even` on staggered and hexagonal maps
    pub stagger_index: Option<String>,
    /// As written, e.g. `#202020`
    pub background_color: Option<String>,
    /// Pixel size, adjusted for staggered layouts. Saturates instead of
    /// wrapping.
    pub width_in_pixels: u32,
    /// See `width_in_pixels`
    pub height_in_pixels: u32,
    /// Map attributes plus custom map properties
    pub properties: Properties,
    /// Tilesets in declaration order
    pub tilesets: TileSets,
    /// Top-level layers in draw order
    pub layers: Vec<Layer>,
    pub(crate) object_index: ObjectIndex,
}

impl Map {
    /// Layer at `path`; `None` for the root path or a dangling one.
    pub fn layer(&self, path: &LayerPath) -> Option<&Layer> {
        let (first, rest) = path.indices().split_first()?;
        let mut layer = self.layers.get(*first)?;
        for &i in rest {
            layer = layer.children().get(i)?;
        }
        Some(layer)
    }

    pub(crate) fn layer_mut(&mut self, path: &LayerPath) -> Option<&mut Layer> {
        layer_in_mut(&mut self.layers, path)
    }

    /// Depth-first walk over every layer with its path.
    pub fn walk_layers(&self) -> Vec<(LayerPath, &Layer)> {
        fn walk<'a>(
            layers: &'a [Layer],
            parent: &LayerPath,
            out: &mut Vec<(LayerPath, &'a Layer)>,
        ) {
            for (i, layer) in layers.iter().enumerate() {
                let path = parent.child(i);
                out.push((path.clone(), layer));
                walk(layer.children(), &path, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.layers, &LayerPath::root(), &mut out);
        out
    }

    /// First layer with this name, searching groups depth-first.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.walk_layers()
            .into_iter()
            .map(|(_, l)| l)
            .find(|l| l.name == name)
    }

    /// Object with this id, wherever it lives.
    pub fn object(&self, id: u32) -> Option<&MapObject> {
        self.object_at(self.object_index.get(&id)?)
    }

    /// Object stored at `location`.
    pub fn object_at(&self, location: &ObjectLocation) -> Option<&MapObject> {
        match location {
            ObjectLocation::Layer { layer, index } => self.layer(layer)?.objects().get(*index),
            ObjectLocation::Tile {
                tileset,
                tile,
                index,
            } => self
                .tilesets
                .get(*tileset)?
                .tile(*tile)?
                .objects()
                .get(*index),
        }
    }

    fn object_at_mut(&mut self, location: &ObjectLocation) -> Option<&mut MapObject> {
        match location {
            ObjectLocation::Layer { layer, index } => match &mut self.layer_mut(layer)?.kind {
                LayerKind::Objects(objects) => objects.get_mut(*index),
                _ => None,
            },
            ObjectLocation::Tile {
                tileset,
                tile,
                index,
            } => self
                .tilesets
                .get_mut(*tileset)?
                .tile_mut(*tile)?
                .objects_mut()
                .get_mut(*index),
        }
    }

    /// Object id to location for every object with a non-zero id.
    pub fn objects_by_id(&self) -> &ObjectIndex {
        &self.object_index
    }

    pub(crate) fn properties_mut(&mut self, owner: &PropertyOwner) -> Option<&mut Properties> {
        match owner {
            PropertyOwner::Map => Some(&mut self.properties),
            PropertyOwner::TileSet(i) => Some(&mut self.tilesets.get_mut(*i)?.properties),
            PropertyOwner::Tile { tileset, tile } => Some(
                self.tilesets
                    .get_mut(*tileset)?
                    .tile_mut(*tile)?
                    .properties_mut(),
            ),
            PropertyOwner::Layer(path) => Some(&mut self.layer_mut(path)?.properties),
            PropertyOwner::Object(location) => Some(&mut self.object_at_mut(location)?.properties),
        }
    }
}

pub(crate) fn layer_in_mut<'a>(layers: &'a mut [Layer], path: &LayerPath) -> Option<&'a mut Layer> {
    let (first, rest) = path.indices().split_first()?;
    let mut layer = layers.get_mut(*first)?;
    for &i in rest {
        layer = match &mut layer.kind {
            LayerKind::Group(children) => children.get_mut(i)?,
            _ => return None,
        };
    }
    Some(layer)
}
