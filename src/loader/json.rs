//! Serde views of the TMJ/TSJ records the decoder reads. Unknown fields are
//! ignored; missing optional fields fall back to the editor's defaults.

use serde::Deserialize;
use serde_json::Value as JsonValue;

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}
fn first_gid() -> u32 {
    1
}

#[derive(Deserialize)]
pub(crate) struct JsonMap {
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub hexsidelength: u32,
    #[serde(default)]
    pub staggeraxis: Option<String>,
    #[serde(default)]
    pub staggerindex: Option<String>,
    #[serde(default)]
    pub backgroundcolor: Option<String>,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,
    #[serde(default)]
    pub tilesets: Vec<JsonTileset>,
    #[serde(default)]
    pub layers: Vec<JsonLayer>,
}

#[derive(Deserialize)]
pub(crate) struct JsonProperty {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: JsonValue,
}

#[derive(Deserialize)]
pub(crate) struct JsonLayer {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub offsetx: f32,
    #[serde(default)]
    pub offsety: f32,
    #[serde(default = "one")]
    pub parallaxx: f32,
    #[serde(default = "one")]
    pub parallaxy: f32,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,

    // tilelayer
    #[serde(default)]
    pub width: usize,
    #[serde(default)]
    pub height: usize,
    #[serde(default)]
    pub data: JsonValue,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,

    // objectgroup
    #[serde(default)]
    pub objects: Vec<JsonObject>,

    // imagelayer
    #[serde(default)]
    pub image: Option<JsonImageRef>,

    // group
    #[serde(default)]
    pub layers: Vec<JsonLayer>,
}

/// An image layer's image: a bare path, or `{ "source": path }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonImageRef {
    Path(String),
    Source { source: String },
}

impl JsonImageRef {
    /// The path, or `None` when the editor left it empty.
    pub fn source(&self) -> Option<&str> {
        let s = match self {
            JsonImageRef::Path(s) => s,
            JsonImageRef::Source { source } => source,
        };
        (!s.is_empty()).then_some(s.as_str())
    }
}

#[derive(Deserialize)]
pub(crate) struct JsonObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub ellipse: Option<bool>,
    #[serde(default)]
    pub polygon: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    pub polyline: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    pub gid: Option<JsonValue>,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
pub(crate) struct JsonObjectPoint {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Deserialize, Default)]
pub(crate) struct JsonObjectGroup {
    #[serde(default)]
    pub objects: Vec<JsonObject>,
}

/// A tileset record: inline in a map, a map's reference to an external
/// document (`firstgid` + `source`), or the external document itself.
#[derive(Deserialize)]
pub(crate) struct JsonTileset {
    #[serde(default = "first_gid")]
    pub firstgid: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagewidth: u32,
    #[serde(default)]
    pub imageheight: u32,
    #[serde(default)]
    pub tileoffset: Option<JsonTileOffset>,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,
    #[serde(default)]
    pub tiles: Vec<JsonTile>,
}

#[derive(Deserialize, Default)]
pub(crate) struct JsonTileOffset {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

#[derive(Deserialize)]
pub(crate) struct JsonTile {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub terrain: Option<JsonValue>,
    #[serde(default)]
    pub probability: Option<f32>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,
    #[serde(default)]
    pub objectgroup: Option<JsonObjectGroup>,
    #[serde(default)]
    pub animation: Option<Vec<JsonFrame>>,
}

#[derive(Deserialize)]
pub(crate) struct JsonFrame {
    pub tileid: u32,
    pub duration: u32,
}
