// tests/map_tests.rs

use macroquad::math::vec2;
use macroquad_tmj::{
    load_map, FsDocuments, GridTileBuilder, ImageRegion, LayerPath, LoaderConfig, Map, MapError,
    ObjectLocation, ObjectShape, PreloadedImages, TmjLoader,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn decode(root: Value, config: &LoaderConfig) -> Result<Map, MapError> {
    let mut images = PreloadedImages::new();
    images.insert("maps/tiles.png", 32, 16);
    images.insert("maps/bg.png", 64, 8);
    let mut loader = TmjLoader::with_sources(HashMap::<PathBuf, Value>::new(), GridTileBuilder);
    loader.load(&root, Path::new("maps/level.tmj"), config, &mut images)
}

fn nested_map() -> Value {
    json!({
        "width": 4, "height": 4, "tilewidth": 16, "tileheight": 16,
        "tilesets": [{
            "firstgid": 1, "name": "tiles", "image": "tiles.png",
            "tilewidth": 16, "tileheight": 16,
            "tiles": [{"id": 1, "objectgroup": {"objects": [
                {"id": 50, "x": 0, "y": 0, "width": 16, "height": 4}
            ]}}]
        }],
        "layers": [
            {"type": "group", "name": "world", "parallaxx": 2, "parallaxy": 2, "layers": [
                {"type": "group", "name": "far", "parallaxx": 3, "parallaxy": 1, "layers": [
                    {"type": "objectgroup", "name": "clouds", "objects": [
                        {"id": 3, "x": 8, "y": 8, "ellipse": true, "width": 4, "height": 2,
                         "properties": [{"name": "follow", "type": "object", "value": "50"}]}
                    ]}
                ]}
            ]},
            {"type": "imagelayer", "name": "backdrop", "parallaxx": 0.5, "image": "bg.png"},
            {"type": "objectgroup", "name": "props", "objects": [
                {"id": 9, "gid": 2, "x": 16, "y": 32, "width": 32, "height": 16}
            ]}
        ]
    })
}

#[test]
fn parallax_composes_through_nested_groups() {
    let map = decode(nested_map(), &LoaderConfig::default()).expect("decode");

    let clouds = map.layer_by_name("clouds").expect("clouds");
    assert_eq!(clouds.parallax, vec2(6.0, 2.0));
    assert_eq!(clouds.parent, Some(LayerPath::from(vec![0, 0])));
    assert_eq!(map.layer(&LayerPath::from(vec![0, 0])).map(|l| l.parallax), Some(vec2(6.0, 2.0)));

    // top-level leaves keep their own factor
    let backdrop = map.layer_by_name("backdrop").expect("backdrop");
    assert_eq!(backdrop.parallax, vec2(0.5, 1.0));
    let image = backdrop.image().expect("image layer");
    // 64 - 0 - 8
    assert_eq!(image.position, vec2(0.0, 56.0));
    assert_eq!(
        image.image,
        Some(ImageRegion::full("maps/bg.png", 64.0, 8.0))
    );
}

#[test]
fn walk_visits_every_layer_depth_first() {
    let map = decode(nested_map(), &LoaderConfig::default()).expect("decode");
    let layers = map.walk_layers();
    let names: Vec<&str> = layers.iter().map(|(_, l)| l.name.as_str()).collect();
    assert_eq!(names, vec!["world", "far", "clouds", "backdrop", "props"]);
}

#[test]
fn objects_are_reachable_by_id_and_location() {
    let map = decode(nested_map(), &LoaderConfig::default()).expect("decode");

    let collision = ObjectLocation::Tile {
        tileset: 0,
        tile: 2,
        index: 0,
    };
    assert_eq!(map.objects_by_id().get(&50), Some(&collision));
    assert_eq!(map.object_at(&collision).map(|o| o.id), Some(50));

    // a layer object may reference a tile's collision object
    let cloud = map.object(3).expect("cloud");
    assert_eq!(cloud.properties.get_object("follow"), Some(50));
    assert!(matches!(cloud.shape, ObjectShape::Ellipse(_)));

    let ObjectShape::Tile(stamp) = &map.object(9).expect("stamp").shape else {
        panic!("expected a tile stamp");
    };
    assert_eq!(stamp.tile, Some(2));
    assert_eq!(stamp.scale, vec2(2.0, 1.0));
    // 64 - 32: stamps keep the flipped anchor
    assert_eq!(stamp.position, vec2(16.0, 32.0));
}

#[test]
fn tile_space_conversion_scales_objects() {
    let config = LoaderConfig {
        convert_object_to_tile_space: true,
        ..LoaderConfig::default()
    };
    let map = decode(nested_map(), &config).expect("decode");

    let cloud = map.object(3).expect("cloud");
    // x 8 / 16, y (64 - 8) / 16 minus height 2 / 16
    assert_eq!(cloud.properties.get_f32("x"), Some(0.5));
    assert_eq!(cloud.properties.get_f32("y"), Some(3.375));
    assert_eq!(cloud.properties.get_f32("width"), Some(0.25));
}

#[test]
fn staggered_maps_adjust_pixel_size() {
    let root = json!({
        "orientation": "staggered", "staggeraxis": "y", "staggerindex": "odd",
        "width": 10, "height": 6, "tilewidth": 32, "tileheight": 16
    });
    let map = decode(root, &LoaderConfig::default()).expect("decode");
    assert_eq!(map.width_in_pixels, 336);
    assert_eq!(map.height_in_pixels, 56);
    assert_eq!(map.properties.get_string("staggeraxis"), Some("y"));
    assert_eq!(map.stagger_index.as_deref(), Some("odd"));
}

#[test]
fn bad_property_types_name_the_layer() {
    let root = json!({
        "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
        "layers": [{"type": "objectgroup", "name": "enemies", "objects": [
            {"id": 1, "properties": [{"name": "hp", "type": "vector", "value": "1,2"}]}
        ]}]
    });
    let err = decode(root, &LoaderConfig::default()).unwrap_err();
    let MapError::Layer { name, source } = err else {
        panic!("expected a layer error");
    };
    assert_eq!(name, "enemies");
    let message = source.to_string();
    assert!(message.contains("vector"));
    assert!(message.contains("string, bool, int, float, color"));
}

#[test]
fn malformed_object_reference_fails_at_decode() {
    let root = json!({
        "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
        "properties": [{"name": "spawn", "type": "object", "value": "north"}]
    });
    let err = decode(root, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, MapError::InvalidObjectReference { ref value, .. } if value == "north"));
}

#[test]
fn decode_with_explicit_collaborators() {
    let mut images = |path: &Path| -> macroquad_tmj::Result<ImageRegion> {
        Ok(ImageRegion::full(path, 16.0, 16.0))
    };
    let root = json!({
        "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
        "tilesets": [{"firstgid": 1, "image": "one.png", "tilewidth": 16, "tileheight": 16}],
        "layers": [{"type": "tilelayer", "width": 1, "height": 1, "data": [1]}]
    });
    let map = load_map(
        &root,
        Path::new("level.tmj"),
        &LoaderConfig::default(),
        &mut FsDocuments,
        &mut GridTileBuilder,
        &mut images,
    )
    .expect("decode");
    assert_eq!(
        map.tilesets.tile(1).and_then(|t| t.region()).map(|r| r.image.clone()),
        Some(PathBuf::from("one.png"))
    );
    assert_eq!(
        map.layers[0].tiles().and_then(|t| t.cell(0, 0)).map(|c| c.tile),
        Some(1)
    );
}
