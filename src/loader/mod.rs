//! TMJ decoding: turns a parsed map document into a [`Map`].

mod data;
mod json;
mod layer;
mod object;
mod tileset;

pub use data::decode_tile_ids;
pub use tileset::{GridTileBuilder, StaticTileBuilder, TileImage, TileSetImage, TileSetSource};

use crate::assets::{DocumentSource, FsDocuments, ImageResolver};
use crate::error::{MapError, Result};
use crate::layer::LayerPath;
use crate::map::Map;
use crate::object::{ObjectIndex, ObjectLocation};
use crate::properties::{cast_property, scalar_text, Properties, PropertyValue};
use json::{JsonMap, JsonProperty};
use macroquad::miniquad::{MipmapFilterMode, TextureParams};
use macroquad::texture::{FilterMode, Texture2D};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Decode options.
///
/// The texture fields do not affect decoding. They describe how the host
/// should create or adjust the tileset textures, see
/// [`LoaderConfig::texture_params`] and [`LoaderConfig::configure_texture`].
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// Allocate mipmaps for textures built from [`LoaderConfig::texture_params`]
    pub generate_mipmaps: bool,
    /// Filter used when a texture is drawn smaller than its size
    pub min_filter: FilterMode,
    /// Filter used when a texture is drawn larger than its size
    pub mag_filter: FilterMode,
    /// Express object positions and sizes in tiles instead of pixels
    pub convert_object_to_tile_space: bool,
    /// Make Y point up. Every renderer that draws the model needs this on.
    pub flip_y: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            generate_mipmaps: false,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            convert_object_to_tile_space: false,
            flip_y: true,
        }
    }
}

impl LoaderConfig {
    /// The one filter [`Texture2D::set_filter`] can apply. It sets
    /// minification and magnification together, so `mag_filter` wins when
    /// the two differ: tile maps are usually drawn at or above their size.
    pub fn texture_filter(&self) -> FilterMode {
        self.mag_filter
    }

    /// Apply [`LoaderConfig::texture_filter`] to a texture the host already
    /// loaded through macroquad.
    pub fn configure_texture(&self, texture: &Texture2D) {
        texture.set_filter(self.texture_filter());
    }

    /// Parameters for a tileset texture created through miniquad, where
    /// both filters and mipmapping can be set separately.
    pub fn texture_params(&self, width: u32, height: u32) -> TextureParams {
        let mipmap_filter = match (self.generate_mipmaps, self.min_filter) {
            (false, _) => MipmapFilterMode::None,
            (true, FilterMode::Linear) => MipmapFilterMode::Linear,
            (true, FilterMode::Nearest) => MipmapFilterMode::Nearest,
        };
        TextureParams {
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            mipmap_filter,
            allocate_mipmaps: self.generate_mipmaps,
            width,
            height,
            ..TextureParams::default()
        }
    }
}

/// The property bag a deferred object reference writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PropertyOwner {
    Map,
    TileSet(usize),
    Tile { tileset: usize, tile: u32 },
    Layer(LayerPath),
    Object(ObjectLocation),
}

/// An `object` property waiting for the whole map to exist.
#[derive(Debug)]
struct PendingObjectRef {
    owner: PropertyOwner,
    name: String,
    target: u32,
}

/// Scratch state for one decode call.
pub(crate) struct DecodeContext<'a> {
    pub config: &'a LoaderConfig,
    pub map_path: &'a Path,
    pub tile_width: u32,
    pub tile_height: u32,
    pub height_in_pixels: f32,
    pub object_index: ObjectIndex,
    pending: Vec<PendingObjectRef>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(config: &'a LoaderConfig, map_path: &'a Path) -> Self {
        DecodeContext {
            config,
            map_path,
            tile_width: 0,
            tile_height: 0,
            height_in_pixels: 0.0,
            object_index: ObjectIndex::new(),
            pending: Vec::new(),
        }
    }

    /// Scale from pixels to the configured object space.
    pub fn object_scale(&self) -> (f32, f32) {
        if self.config.convert_object_to_tile_space {
            (1.0 / self.tile_width as f32, 1.0 / self.tile_height as f32)
        } else {
            (1.0, 1.0)
        }
    }

    /// Cast `props` into `into`. `object` properties are queued against
    /// `owner` instead and written when the decode finishes.
    pub fn load_properties(
        &mut self,
        props: &[JsonProperty],
        owner: PropertyOwner,
        into: &mut Properties,
    ) -> Result<()> {
        for p in props {
            if p.kind.as_deref() == Some("object") {
                let text = scalar_text(&p.value);
                let target = text.trim().parse::<u32>().map_err(|_| {
                    MapError::InvalidObjectReference {
                        name: p.name.clone(),
                        value: text.clone().into_owned(),
                    }
                })?;
                self.pending.push(PendingObjectRef {
                    owner: owner.clone(),
                    name: p.name.clone(),
                    target,
                });
            } else {
                let value = cast_property(&p.name, &p.value, p.kind.as_deref())?;
                into.insert(p.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Record an object's location; id 0 means "no id" and is never indexed.
    pub fn register_object(&mut self, id: u32, location: ObjectLocation) {
        if id != 0 {
            self.object_index.insert(id, location);
        }
    }

    /// Write every queued object reference, in the order it was queued.
    fn resolve_pending(&mut self, map: &mut Map) {
        for PendingObjectRef {
            owner,
            name,
            target,
        } in self.pending.drain(..)
        {
            let resolved = self.object_index.contains_key(&target).then_some(target);
            if resolved.is_none() {
                log::warn!("property '{name}' references missing object {target}");
            } else {
                log::debug!("property '{name}' resolved to object {target}");
            }
            match map.properties_mut(&owner) {
                Some(bag) => bag.insert(name, PropertyValue::Object(resolved)),
                None => log::warn!("no property bag at {owner:?} for '{name}'"),
            }
        }
    }
}

/// Decode a parsed TMJ document. `path` is the document's own path; every
/// relative reference inside it resolves against its directory.
pub fn load_map(
    root: &JsonValue,
    path: &Path,
    config: &LoaderConfig,
    documents: &mut dyn DocumentSource,
    tiles: &mut dyn StaticTileBuilder,
    images: &mut dyn ImageResolver,
) -> Result<Map> {
    let j = JsonMap::deserialize(root).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut ctx = DecodeContext::new(config, path);
    let mut map = map_attributes(&j);
    ctx.tile_width = map.tile_width;
    ctx.tile_height = map.tile_height;
    ctx.height_in_pixels = map.height_in_pixels as f32;

    let mut properties = std::mem::take(&mut map.properties);
    ctx.load_properties(&j.properties, PropertyOwner::Map, &mut properties)?;
    map.properties = properties;

    for ts in &j.tilesets {
        let index = map.tilesets.len();
        let tileset = tileset::load_tileset(
            &mut ctx,
            &map.tilesets,
            ts,
            index,
            documents,
            tiles,
            images,
        )?;
        map.tilesets.push(tileset);
    }

    let root_path = LayerPath::root();
    for l in &j.layers {
        layer::load_layer(&mut ctx, &map.tilesets, &mut map.layers, &root_path, l, images)?;
    }

    layer::propagate_parallax(&mut map.layers);

    ctx.resolve_pending(&mut map);
    map.object_index = ctx.object_index;

    log::info!(
        "decoded map {:?}: {} tilesets, {} layers, {} indexed objects",
        path,
        map.tilesets.len(),
        map.layers.len(),
        map.object_index.len()
    );
    Ok(map)
}

fn map_attributes(j: &JsonMap) -> Map {
    let mut map = Map {
        orientation: j.orientation.clone(),
        width: j.width,
        height: j.height,
        tile_width: j.tilewidth,
        tile_height: j.tileheight,
        hex_side_length: j.hexsidelength,
        stagger_axis: j.staggeraxis.clone(),
        stagger_index: j.staggerindex.clone(),
        background_color: j.backgroundcolor.clone(),
        width_in_pixels: j.width.saturating_mul(j.tilewidth),
        height_in_pixels: j.height.saturating_mul(j.tileheight),
        ..Map::default()
    };

    if map.orientation.as_deref() == Some("staggered") && map.height > 1 {
        map.width_in_pixels = map.width_in_pixels.saturating_add(map.tile_width / 2);
        map.height_in_pixels = (map.height_in_pixels / 2).saturating_add(map.tile_height / 2);
    }

    let props = &mut map.properties;
    if let Some(o) = &j.orientation {
        props.insert("orientation", PropertyValue::String(o.clone()));
    }
    props.insert("width", PropertyValue::I64(j.width.into()));
    props.insert("height", PropertyValue::I64(j.height.into()));
    props.insert("tilewidth", PropertyValue::I64(j.tilewidth.into()));
    props.insert("tileheight", PropertyValue::I64(j.tileheight.into()));
    props.insert("hexsidelength", PropertyValue::I64(j.hexsidelength.into()));
    if let Some(s) = &j.staggeraxis {
        props.insert("staggeraxis", PropertyValue::String(s.clone()));
    }
    if let Some(s) = &j.staggerindex {
        props.insert("staggerindex", PropertyValue::String(s.clone()));
    }
    if let Some(s) = &j.backgroundcolor {
        props.insert("backgroundcolor", PropertyValue::String(s.clone()));
    }
    map
}

/// Loader front-end holding the collaborators and the id index of the last
/// successful decode. Each call gets its own scratch state, so separate
/// loaders can decode concurrently.
pub struct TmjLoader<D = FsDocuments, T = GridTileBuilder> {
    documents: D,
    tiles: T,
    id_to_object: Option<ObjectIndex>,
}

impl TmjLoader {
    /// A loader reading documents from disk and slicing tilesets as grids.
    pub fn new() -> Self {
        Self::with_sources(FsDocuments, GridTileBuilder)
    }
}

impl Default for TmjLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DocumentSource, T: StaticTileBuilder> TmjLoader<D, T> {
    /// A loader over custom document and static-tile sources.
    pub fn with_sources(documents: D, tiles: T) -> Self {
        TmjLoader {
            documents,
            tiles,
            id_to_object: None,
        }
    }

    /// Decode an already parsed document found at `path`.
    pub fn load(
        &mut self,
        root: &JsonValue,
        path: &Path,
        config: &LoaderConfig,
        images: &mut dyn ImageResolver,
    ) -> Result<Map> {
        let map = load_map(root, path, config, &mut self.documents, &mut self.tiles, images)?;
        self.id_to_object = Some(map.object_index.clone());
        Ok(map)
    }

    /// Fetch the document at `path` through the document source, then decode it.
    pub fn load_file(
        &mut self,
        path: &Path,
        config: &LoaderConfig,
        images: &mut dyn ImageResolver,
    ) -> Result<Map> {
        let root = self.documents.document(path)?;
        self.load(&root, path, config, images)
    }

    /// Object locations from the last successful decode, `None` before one.
    pub fn id_to_object(&self) -> Option<&ObjectIndex> {
        self.id_to_object.as_ref()
    }
}
