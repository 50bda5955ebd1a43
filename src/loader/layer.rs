use super::data::decode_tile_ids;
use super::json::JsonLayer;
use super::{object, DecodeContext, PropertyOwner};
use crate::assets::ImageResolver;
use crate::error::Result;
use crate::gid::TileId;
use crate::layer::{Cell, ImageLayer, Layer, LayerKind, LayerPath, TileLayer};
use crate::map::layer_in_mut;
use crate::object::{MapObject, ObjectLocation};
use crate::path::resolve_relative;
use crate::properties::Properties;
use crate::tileset::TileSets;
use macroquad::math::vec2;
use std::collections::VecDeque;

/// Build one layer record and append it to `siblings`, the child list of the
/// group at `parent` (or the map's top level for the root path). Unknown layer
/// kinds are skipped.
pub(crate) fn load_layer(
    ctx: &mut DecodeContext,
    tilesets: &TileSets,
    siblings: &mut Vec<Layer>,
    parent: &LayerPath,
    j: &JsonLayer,
    images: &mut dyn ImageResolver,
) -> Result<()> {
    let path = parent.child(siblings.len());
    let kind = match j.kind.as_str() {
        "group" => {
            let mut children = Vec::with_capacity(j.layers.len());
            for child in &j.layers {
                load_layer(ctx, tilesets, &mut children, &path, child, images)
                    .map_err(|e| e.in_layer(&j.name))?;
            }
            LayerKind::Group(children)
        }
        "tilelayer" => {
            let tiles = tile_layer(ctx, tilesets, j).map_err(|e| e.in_layer(&j.name))?;
            LayerKind::Tiles(tiles)
        }
        "objectgroup" => {
            let objects =
                object_layer(ctx, tilesets, j, &path).map_err(|e| e.in_layer(&j.name))?;
            LayerKind::Objects(objects)
        }
        "imagelayer" => {
            let image = image_layer(ctx, j, images).map_err(|e| e.in_layer(&j.name))?;
            LayerKind::Image(image)
        }
        other => {
            log::warn!("skipping layer {:?} of unknown type {other:?}", j.name);
            return Ok(());
        }
    };

    let mut properties = Properties::new();
    ctx.load_properties(&j.properties, PropertyOwner::Layer(path.clone()), &mut properties)
        .map_err(|e| e.in_layer(&j.name))?;

    log::debug!("layer {:?} ({}) at {:?}", j.name, j.kind, path.indices());
    siblings.push(Layer {
        name: j.name.clone(),
        opacity: j.opacity,
        visible: j.visible,
        offset: vec2(j.offsetx, j.offsety),
        parallax: vec2(j.parallaxx, j.parallaxy),
        properties,
        parent: (!parent.is_root()).then(|| parent.clone()),
        kind,
    });
    Ok(())
}

fn tile_layer(ctx: &DecodeContext, tilesets: &TileSets, j: &JsonLayer) -> Result<TileLayer> {
    let (width, height) = (j.width, j.height);
    let ids = decode_tile_ids(
        &j.data,
        j.encoding.as_deref(),
        j.compression.as_deref(),
        width,
        height,
    )?;

    let mut layer = TileLayer::new(width, height, ctx.tile_width, ctx.tile_height)?;
    if layer.cells.is_empty() {
        return Ok(layer);
    }
    for y in 0..height {
        // The only place rows are reordered: row 0 ends up at the bottom.
        let row = if ctx.config.flip_y { height - 1 - y } else { y };
        for x in 0..width {
            let id = TileId(ids[y * width + x]);
            if tilesets.tile(id.clean()).is_some() {
                layer.set_cell(
                    x,
                    row,
                    Cell {
                        tile: id.clean(),
                        orientation: id.orientation(),
                    },
                );
            }
        }
    }
    Ok(layer)
}

fn object_layer(
    ctx: &mut DecodeContext,
    tilesets: &TileSets,
    j: &JsonLayer,
    path: &LayerPath,
) -> Result<Vec<MapObject>> {
    let anchor = ctx.height_in_pixels;
    let mut objects = Vec::with_capacity(j.objects.len());
    for (index, o) in j.objects.iter().enumerate() {
        let location = ObjectLocation::Layer {
            layer: path.clone(),
            index,
        };
        objects.push(object::load_object(ctx, tilesets, o, anchor, location)?);
    }
    Ok(objects)
}

fn image_layer(
    ctx: &DecodeContext,
    j: &JsonLayer,
    images: &mut dyn ImageResolver,
) -> Result<ImageLayer> {
    let mut y = if ctx.config.flip_y {
        ctx.height_in_pixels - j.offsety
    } else {
        j.offsety
    };

    let image = match j.image.as_ref().and_then(|i| i.source()) {
        Some(source) => {
            let region = images.image(&resolve_relative(ctx.map_path, source))?;
            if ctx.config.flip_y {
                y -= region.height();
            }
            Some(region)
        }
        None => None,
    };

    Ok(ImageLayer {
        image,
        position: vec2(j.offsetx, y),
    })
}

/// Fold every group's parallax factor into its descendants, breadth-first
/// from the top-level groups, so a group is final before its children use it.
pub(crate) fn propagate_parallax(layers: &mut [Layer]) {
    let mut queue: VecDeque<LayerPath> = layers
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_group())
        .map(|(i, _)| LayerPath::root().child(i))
        .collect();

    while let Some(path) = queue.pop_front() {
        let Some(group) = layer_in_mut(layers, &path) else {
            continue;
        };
        let factor = group.parallax;
        if let LayerKind::Group(children) = &mut group.kind {
            for (i, child) in children.iter_mut().enumerate() {
                child.parallax *= factor;
                if child.is_group() {
                    queue.push_back(path.child(i));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageRegion, PreloadedImages};
    use crate::error::MapError;
    use crate::gid::{Rotation, FLIP_D, FLIP_H};
    use crate::loader::LoaderConfig;
    use crate::tileset::{StaticTile, Tile, TileSet};
    use macroquad::math::Vec2;
    use serde_json::json;
    use std::path::Path;

    fn record(value: serde_json::Value) -> JsonLayer {
        serde_json::from_value(value).expect("layer record")
    }

    fn ctx(config: &LoaderConfig) -> DecodeContext<'_> {
        let mut ctx = DecodeContext::new(config, Path::new("maps/level.tmj"));
        ctx.tile_width = 16;
        ctx.tile_height = 16;
        ctx.height_in_pixels = 64.0;
        ctx
    }

    fn four_tiles() -> TileSets {
        let mut ts = TileSet::new(None, 1);
        for gid in 1..=4 {
            let region = ImageRegion::full("t.png", 16.0, 16.0);
            ts.put_tile(gid, Tile::Static(StaticTile::new(gid, region, Vec2::ZERO)));
        }
        let mut sets = TileSets::new();
        sets.push(ts);
        sets
    }

    fn load(config: &LoaderConfig, j: serde_json::Value) -> Result<Vec<Layer>> {
        let mut ctx = ctx(config);
        let mut layers = Vec::new();
        load_layer(
            &mut ctx,
            &four_tiles(),
            &mut layers,
            &LayerPath::root(),
            &record(j),
            &mut PreloadedImages::new(),
        )?;
        Ok(layers)
    }

    #[test]
    fn tile_rows_are_inverted_under_flip() {
        let j = json!({
            "type": "tilelayer", "name": "ground", "width": 2, "height": 2,
            "data": [1, 0, 3, 9]
        });
        let layers = load(&LoaderConfig::default(), j.clone()).unwrap();
        let tiles = layers[0].tiles().expect("tile layer");
        assert_eq!(tiles.cell(0, 1).map(|c| c.tile), Some(1));
        assert_eq!(tiles.cell(0, 0).map(|c| c.tile), Some(3));
        // 0 and ids no tileset owns stay empty
        assert!(tiles.cell(1, 1).is_none());
        assert!(tiles.cell(1, 0).is_none());

        let config = LoaderConfig {
            flip_y: false,
            ..LoaderConfig::default()
        };
        let layers = load(&config, j).unwrap();
        let tiles = layers[0].tiles().expect("tile layer");
        assert_eq!(tiles.cell(0, 0).map(|c| c.tile), Some(1));
        assert_eq!(tiles.cell(0, 1).map(|c| c.tile), Some(3));
    }

    #[test]
    fn degenerate_grid_sizes_do_not_iterate_rows() {
        // zero columns times any row count is an empty grid
        let j = json!({"type": "tilelayer", "width": 0, "height": u64::MAX, "data": []});
        let layers = load(&LoaderConfig::default(), j).unwrap();
        let tiles = layers[0].tiles().expect("tile layer");
        assert!(tiles.cells.is_empty());

        let j = json!({
            "type": "tilelayer", "name": "vast", "width": u64::MAX, "height": 2, "data": [1]
        });
        let err = load(&LoaderConfig::default(), j).unwrap_err();
        let MapError::Layer { name, source } = err else {
            panic!("expected a layer error");
        };
        assert_eq!(name, "vast");
        assert!(matches!(*source, MapError::InvalidTileData(_)));
    }

    #[test]
    fn cells_honour_diagonal_flip() {
        let gid = u64::from(FLIP_H | FLIP_D | 2);
        let j = json!({"type": "tilelayer", "width": 1, "height": 1, "data": [gid]});
        let layers = load(&LoaderConfig::default(), j).unwrap();
        let cell = layers[0].tiles().and_then(|t| t.cell(0, 0)).copied().expect("cell");
        assert_eq!(cell.tile, 2);
        assert!(!cell.orientation.flip_h);
        assert!(!cell.orientation.flip_v);
        assert_eq!(cell.orientation.rotation, Rotation::Cw270);
    }

    #[test]
    fn common_fields_and_defaults() {
        let j = json!({
            "type": "group", "name": "outer", "opacity": 0.5, "offsetx": 4, "offsety": 8,
            "layers": [{"type": "objectgroup", "name": "inner", "visible": false}]
        });
        let layers = load(&LoaderConfig::default(), j).unwrap();
        let outer = &layers[0];
        assert_eq!(outer.opacity, 0.5);
        assert!(outer.visible);
        assert_eq!(outer.offset, vec2(4.0, 8.0));
        assert_eq!(outer.parallax, vec2(1.0, 1.0));
        assert_eq!(outer.parent, None);

        let inner = &outer.children()[0];
        assert_eq!(inner.name, "inner");
        assert!(!inner.visible);
        assert_eq!(inner.parent, Some(LayerPath::from(vec![0])));
    }

    #[test]
    fn unknown_layer_kinds_are_skipped() {
        let layers = load(&LoaderConfig::default(), json!({"type": "hologram"})).unwrap();
        assert!(layers.is_empty());
    }

    #[test]
    fn errors_name_the_layer() {
        let j = json!({
            "type": "group", "name": "outer",
            "layers": [{"type": "tilelayer", "name": "bad", "width": 1, "height": 1,
                        "data": "AAAA", "encoding": "base32"}]
        });
        let err = load(&LoaderConfig::default(), j).unwrap_err();
        let MapError::Layer { name, source } = err else {
            panic!("expected a layer error");
        };
        assert_eq!(name, "outer");
        assert!(matches!(*source, MapError::Layer { ref name, .. } if name == "bad"));
    }

    #[test]
    fn image_layer_anchor() {
        let mut images = PreloadedImages::new();
        images.insert("maps/bg/sky.png", 128, 24);
        let config = LoaderConfig::default();
        let mut ctx = ctx(&config);
        let mut layers = Vec::new();
        let j = record(json!({
            "type": "imagelayer", "name": "sky", "offsetx": 3, "offsety": 10,
            "image": "bg/sky.png"
        }));
        load_layer(&mut ctx, &TileSets::new(), &mut layers, &LayerPath::root(), &j, &mut images)
            .unwrap();
        let image = layers[0].image().expect("image layer");
        // 64 - 10 - 24
        assert_eq!(image.position, vec2(3.0, 30.0));
        assert_eq!(image.image.as_ref().map(|i| i.width()), Some(128.0));

        let j = record(json!({"type": "imagelayer", "offsety": 10, "image": {"source": ""}}));
        load_layer(&mut ctx, &TileSets::new(), &mut layers, &LayerPath::root(), &j, &mut images)
            .unwrap();
        let empty = layers[1].image().expect("image layer");
        assert!(empty.image.is_none());
        assert_eq!(empty.position, vec2(0.0, 54.0));
    }

    #[test]
    fn object_layers_index_their_objects() {
        let config = LoaderConfig::default();
        let mut ctx = ctx(&config);
        let mut layers = Vec::new();
        let j = record(json!({"type": "group", "layers": [
            {"type": "tilelayer", "width": 0, "height": 0, "data": []},
            {"type": "objectgroup", "objects": [{"id": 12}, {"id": 13}]}
        ]}));
        load_layer(
            &mut ctx,
            &TileSets::new(),
            &mut layers,
            &LayerPath::root(),
            &j,
            &mut PreloadedImages::new(),
        )
        .unwrap();
        assert_eq!(
            ctx.object_index.get(&13),
            Some(&ObjectLocation::Layer {
                layer: vec![0, 1].into(),
                index: 1
            })
        );
    }

    fn group(parallax: Vec2, children: Vec<Layer>) -> Layer {
        Layer {
            kind: LayerKind::Group(children),
            ..leaf(parallax)
        }
    }

    fn leaf(parallax: Vec2) -> Layer {
        Layer {
            name: String::new(),
            opacity: 1.0,
            visible: true,
            offset: Vec2::ZERO,
            parallax,
            properties: Properties::new(),
            parent: None,
            kind: LayerKind::Objects(Vec::new()),
        }
    }

    #[test]
    fn parallax_multiplies_down_the_tree() {
        let mut layers = vec![
            group(
                vec2(2.0, 2.0),
                vec![group(vec2(3.0, 1.0), vec![leaf(vec2(1.0, 1.0))])],
            ),
            leaf(vec2(0.5, 0.25)),
        ];
        propagate_parallax(&mut layers);

        let middle = &layers[0].children()[0];
        assert_eq!(middle.parallax, vec2(6.0, 2.0));
        assert_eq!(middle.children()[0].parallax, vec2(6.0, 2.0));
        assert_eq!(layers[0].parallax, vec2(2.0, 2.0));
        assert_eq!(layers[1].parallax, vec2(0.5, 0.25));
    }
}
