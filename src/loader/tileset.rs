use super::json::{JsonFrame, JsonTileset};
use super::{object, DecodeContext, PropertyOwner};
use crate::assets::{DocumentSource, ImageRegion, ImageResolver};
use crate::error::{MapError, Result};
use crate::object::ObjectLocation;
use crate::path::resolve_relative;
use crate::properties::PropertyValue;
use crate::tileset::{AnimatedTile, AnimationFrame, StaticTile, Tile, TileSet, TileSets};
use macroquad::math::{vec2, Vec2};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

/// The atlas image of a tileset, path already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSetImage {
    /// Resolved image path
    pub path: PathBuf,
    /// Size as declared in the document; 0 when not written
    pub width: u32,
    /// Size as declared in the document; 0 when not written
    pub height: u32,
}

/// A tile that brings its own image (image-collection tilesets).
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    /// Local id, offset from `first_gid`
    pub id: u32,
    /// Resolved image path
    pub path: PathBuf,
}

/// What a [`StaticTileBuilder`] gets to work with for one tileset.
#[derive(Debug, Clone)]
pub struct TileSetSource<'a> {
    /// Tileset name, if any
    pub name: Option<&'a str>,
    /// Global id of the tileset's local tile 0
    pub first_gid: u32,
    /// Grid cell width in pixels
    pub tile_width: u32,
    /// Grid cell height in pixels
    pub tile_height: u32,
    /// Pixels between neighbouring tiles
    pub spacing: u32,
    /// Pixels around the tile grid
    pub margin: u32,
    /// Document the tileset was read from (the map, or an external tileset)
    pub document: &'a Path,
    /// `tileoffset` as written, Y down
    pub offset: Vec2,
    /// Copied from [`LoaderConfig::flip_y`](crate::LoaderConfig::flip_y)
    pub flip_y: bool,
    /// Atlas image; `None` for image collections
    pub image: Option<TileSetImage>,
    /// Per-tile images of an image collection
    pub tile_images: Vec<TileImage>,
}

impl TileSetSource<'_> {
    /// Tile offset in model space.
    pub fn tile_offset(&self) -> Vec2 {
        if self.flip_y {
            vec2(self.offset.x, -self.offset.y)
        } else {
            self.offset
        }
    }

    /// A static tile carrying this tileset's offset.
    pub fn static_tile(&self, gid: u32, region: ImageRegion) -> StaticTile {
        StaticTile::new(gid, region, self.tile_offset())
    }

    /// Global id of local tile `local`.
    pub fn global_id(&self, local: u32) -> Result<u32> {
        global_id(self.first_gid, local)
    }
}

/// Fills a tileset with its static tiles. Runs once per tileset, before any
/// per-tile properties, collision objects or animations are applied.
pub trait StaticTileBuilder {
    /// Put the static tiles of `source` into `tileset`.
    fn add_static_tiles(
        &mut self,
        source: &TileSetSource<'_>,
        tileset: &mut TileSet,
        images: &mut dyn ImageResolver,
    ) -> Result<()>;
}

/// Slices the atlas image into a grid, or takes one image per tile when the
/// tileset has no atlas.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridTileBuilder;

impl StaticTileBuilder for GridTileBuilder {
    fn add_static_tiles(
        &mut self,
        source: &TileSetSource<'_>,
        tileset: &mut TileSet,
        images: &mut dyn ImageResolver,
    ) -> Result<()> {
        let Some(image) = &source.image else {
            for t in &source.tile_images {
                let gid = source.global_id(t.id)?;
                let region = images.image(&t.path)?;
                tileset.put_tile(gid, Tile::Static(source.static_tile(gid, region)));
            }
            return Ok(());
        };

        let sheet = images.image(&image.path)?;
        let (tw, th) = (source.tile_width, source.tile_height);
        let (width, height) = (sheet.width() as u32, sheet.height() as u32);
        if tw == 0 || th == 0 || width < tw || height < th {
            log::warn!(
                "tileset {:?}: {}x{} tiles do not fit a {}x{} image",
                source.name,
                tw,
                th,
                width,
                height
            );
            return Ok(());
        }

        let row_step = th.saturating_add(source.spacing) as usize;
        let column_step = tw.saturating_add(source.spacing) as usize;
        let mut local = 0;
        for y in (source.margin..=height - th).step_by(row_step) {
            for x in (source.margin..=width - tw).step_by(column_step) {
                let gid = source.global_id(local)?;
                let region = sheet.sub_region(x as f32, y as f32, tw as f32, th as f32);
                tileset.put_tile(gid, Tile::Static(source.static_tile(gid, region)));
                local += 1;
            }
        }
        Ok(())
    }
}

/// Build the `index`-th tileset of the map from its record.
pub(crate) fn load_tileset(
    ctx: &mut DecodeContext,
    tilesets: &TileSets,
    entry: &JsonTileset,
    index: usize,
    documents: &mut dyn DocumentSource,
    tiles: &mut dyn StaticTileBuilder,
    images: &mut dyn ImageResolver,
) -> Result<TileSet> {
    let external;
    let (j, document) = match &entry.source {
        Some(source) => {
            let path = resolve_relative(ctx.map_path, source);
            external = load_external(&path, documents)?;
            (&external, path)
        }
        None => (entry, ctx.map_path.to_path_buf()),
    };
    let first_gid = entry.firstgid;

    let mut tileset = TileSet::new(j.name.clone(), first_gid);
    ctx.load_properties(
        &j.properties,
        PropertyOwner::TileSet(index),
        &mut tileset.properties,
    )?;
    // The map's value wins over a custom property of the same name.
    tileset
        .properties
        .insert("firstgid", PropertyValue::I64(first_gid.into()));

    let source = TileSetSource {
        name: j.name.as_deref(),
        first_gid,
        tile_width: j.tilewidth,
        tile_height: j.tileheight,
        spacing: j.spacing,
        margin: j.margin,
        document: &document,
        offset: j
            .tileoffset
            .as_ref()
            .map_or(Vec2::ZERO, |o| vec2(o.x as f32, o.y as f32)),
        flip_y: ctx.config.flip_y,
        image: non_empty(j.image.as_deref()).map(|image| TileSetImage {
            path: resolve_relative(&document, image),
            width: j.imagewidth,
            height: j.imageheight,
        }),
        tile_images: j
            .tiles
            .iter()
            .filter_map(|t| {
                non_empty(t.image.as_deref()).map(|image| TileImage {
                    id: t.id,
                    path: resolve_relative(&document, image),
                })
            })
            .collect(),
    };
    tiles.add_static_tiles(&source, &mut tileset, images)?;

    for t in &j.tiles {
        let gid = global_id(first_gid, t.id)?;
        let Some(tile) = tileset.tile_mut(gid) else {
            log::debug!("tileset {:?}: no tile {} to decorate", j.name, t.id);
            continue;
        };

        let props = tile.properties_mut();
        if let Some(terrain) = &t.terrain {
            props.insert("terrain", PropertyValue::String(terrain_text(terrain)));
        }
        if let Some(probability) = t.probability {
            props.insert("probability", PropertyValue::F32(probability));
        }
        if let Some(kind) = t.kind.as_ref().or(t.class.as_ref()) {
            props.insert("type", PropertyValue::String(kind.clone()));
        }
        ctx.load_properties(
            &t.properties,
            PropertyOwner::Tile {
                tileset: index,
                tile: gid,
            },
            props,
        )?;

        if let Some(group) = &t.objectgroup {
            // Collision shapes flip against the tile's own height.
            let anchor = tile.region().map_or(0.0, ImageRegion::height);
            let base = tile.objects().len();
            for (i, o) in group.objects.iter().enumerate() {
                let location = ObjectLocation::Tile {
                    tileset: index,
                    tile: gid,
                    index: base + i,
                };
                let obj = object::load_object(ctx, tilesets, o, anchor, location)?;
                tile.objects_mut().push(obj);
            }
        }
    }

    // Frames point at sibling tiles, so every static tile has to exist first.
    let mut animations: Vec<(u32, Vec<AnimationFrame>)> = Vec::new();
    for t in &j.tiles {
        let Some(frames) = t.animation.as_deref() else {
            continue;
        };
        let gid = global_id(first_gid, t.id)?;
        animations.push((gid, animation_frames(&tileset, gid, frames)));
    }
    for (gid, frames) in animations {
        if frames.is_empty() {
            log::warn!(
                "tileset {:?}: animation of tile {gid} has no usable frames",
                j.name
            );
            continue;
        }
        match tileset.tiles.remove(&gid) {
            Some(Tile::Static(original)) => tileset.put_tile(
                gid,
                Tile::Animated(AnimatedTile {
                    id: gid,
                    frames,
                    properties: original.properties,
                    objects: original.objects,
                }),
            ),
            Some(other) => tileset.put_tile(gid, other),
            None => log::warn!("tileset {:?}: animated tile {gid} does not exist", j.name),
        }
    }

    log::debug!(
        "tileset {:?}: first gid {}, {} tiles",
        tileset.name,
        first_gid,
        tileset.tiles.len()
    );
    Ok(tileset)
}

fn load_external(path: &Path, documents: &mut dyn DocumentSource) -> Result<JsonTileset> {
    let wrap = |source: MapError| MapError::ExternalTileset {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    let root = documents.document(path).map_err(wrap)?;
    JsonTileset::deserialize(&root).map_err(|source| {
        wrap(MapError::Json {
            path: path.to_path_buf(),
            source,
        })
    })
}

fn animation_frames(tileset: &TileSet, gid: u32, frames: &[JsonFrame]) -> Vec<AnimationFrame> {
    frames
        .iter()
        .filter_map(|f| {
            // A frame id past the gid range cannot name a tile either.
            let frame = global_id(tileset.first_gid, f.tileid).ok();
            match frame.and_then(|id| tileset.tile(id)) {
                Some(Tile::Static(tile)) => Some(AnimationFrame {
                    tile: tile.clone(),
                    duration: f.duration,
                }),
                _ => {
                    log::warn!("animation of tile {gid}: frame tile {} is missing", f.tileid);
                    None
                }
            }
        })
        .collect()
}

/// Terrain is either a string or the older array of corner indices.
fn terrain_text(terrain: &JsonValue) -> String {
    match terrain {
        JsonValue::Array(corners) => corners
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn global_id(first_gid: u32, local: u32) -> Result<u32> {
    first_gid
        .checked_add(local)
        .ok_or(MapError::GidOverflow { first_gid, local })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
