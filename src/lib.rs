#![warn(missing_docs)]

//! Tiled JSON (TMJ) map decoder for Macroquad.
//!
//! Decodes a map document into a [`Map`]: tilesets with static and animated
//! tiles, a tree of group, tile, object and image layers, typed properties and
//! resolved object references. Y points up by default
//! ([`LoaderConfig::flip_y`]); rendering and texture loading stay with the host.
//!
//! ```no_run
//! use macroquad_tmj::{LoaderConfig, PreloadedImages, TmjLoader};
//! use std::path::Path;
//!
//! let mut images = PreloadedImages::new();
//! images.insert("assets/tiles.png", 256, 256);
//!
//! let mut loader = TmjLoader::new();
//! let map = loader
//!     .load_file(Path::new("assets/level.tmj"), &LoaderConfig::default(), &mut images)
//!     .expect("map decodes");
//! println!("{} layers", map.layers.len());
//! ```

mod assets;
mod error;
mod gid;
mod layer;
mod loader;
mod map;
mod object;
mod path;
mod properties;
mod tileset;

pub use assets::{DocumentSource, FsDocuments, ImageRegion, ImageResolver, PreloadedImages};
pub use error::{MapError, Result};
pub use gid::{Orientation, Rotation, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use layer::{Cell, ImageLayer, Layer, LayerKind, LayerPath, TileLayer};
pub use loader::{
    decode_tile_ids, load_map, GridTileBuilder, LoaderConfig, StaticTileBuilder, TileImage,
    TileSetImage, TileSetSource, TmjLoader,
};
pub use map::Map;
pub use object::{MapObject, ObjectIndex, ObjectLocation, ObjectShape, Poly, TileStamp};
pub use path::resolve_relative;
pub use properties::{cast_property, parse_argb, Properties, PropertyValue};
pub use tileset::{AnimatedTile, AnimationFrame, StaticTile, Tile, TileSet, TileSets};
