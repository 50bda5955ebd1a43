use super::json::{JsonObject, JsonObjectPoint};
use super::{DecodeContext, PropertyOwner};
use crate::error::{MapError, Result};
use crate::gid::TileId;
use crate::object::{MapObject, ObjectLocation, ObjectShape, Poly, TileStamp};
use crate::properties::{scalar_text, Properties, PropertyValue};
use crate::tileset::{Tile, TileSets};
use macroquad::math::{vec2, Rect, Vec2};
use serde_json::Value as JsonValue;

/// Build one object. `anchor_height` is the height Y is flipped against: the
/// map's pixel height, or a tile's own image height for collision shapes.
/// The object is registered under `location` in the id index.
pub(crate) fn load_object(
    ctx: &mut DecodeContext,
    tilesets: &TileSets,
    j: &JsonObject,
    anchor_height: f32,
    location: ObjectLocation,
) -> Result<MapObject> {
    let (scale_x, scale_y) = ctx.object_scale();
    let flip_y = ctx.config.flip_y;

    let x = j.x * scale_x;
    let y = (if flip_y { anchor_height - j.y } else { j.y }) * scale_y;
    let width = j.width.unwrap_or(0.0) * scale_x;
    let height = j.height.unwrap_or(0.0) * scale_y;
    // Top edge in editor space becomes the bottom edge once Y points up.
    let corner_y = if flip_y { y - height } else { y };

    // Vertices are offsets from the anchor, so they flip sign rather than
    // being mirrored against the anchor height.
    let vertex_scale = vec2(scale_x, if flip_y { -scale_y } else { scale_y });
    let poly = |points: &[JsonObjectPoint]| Poly {
        position: vec2(x, y),
        vertices: points
            .iter()
            .map(|p| vec2(p.x, p.y) * vertex_scale)
            .collect(),
    };

    let mut properties = Properties::new();
    let shape = if let Some(points) = &j.polygon {
        ObjectShape::Polygon(poly(points))
    } else if let Some(points) = &j.polyline {
        ObjectShape::Polyline(poly(points))
    } else if j.ellipse.is_some() {
        ObjectShape::Ellipse(Rect::new(x, corner_y, width, height))
    } else if let Some(gid) = &j.gid {
        let raw = parse_gid(j.id, gid)?;
        properties.insert("gid", PropertyValue::I64(raw.into()));
        ObjectShape::Tile(tile_stamp(
            tilesets,
            j,
            TileId(raw),
            vec2(x, if flip_y { y } else { y - height }),
            vec2(scale_x, scale_y),
        ))
    } else {
        ObjectShape::Rectangle(Rect::new(x, corner_y, width, height))
    };

    if let Some(rotation) = j.rotation {
        properties.insert("rotation", PropertyValue::F32(rotation));
    }
    let kind = j.kind.clone().or_else(|| j.class.clone());
    if let Some(kind) = &kind {
        properties.insert("type", PropertyValue::String(kind.clone()));
    }
    if j.id != 0 {
        properties.insert("id", PropertyValue::I64(j.id.into()));
    }
    properties.insert("x", PropertyValue::F32(x));
    let y_property = match &shape {
        ObjectShape::Tile(_) => y,
        _ => corner_y,
    };
    properties.insert("y", PropertyValue::F32(y_property));
    properties.insert("width", PropertyValue::F32(width));
    properties.insert("height", PropertyValue::F32(height));

    ctx.load_properties(
        &j.properties,
        PropertyOwner::Object(location.clone()),
        &mut properties,
    )?;
    ctx.register_object(j.id, location);

    Ok(MapObject {
        id: j.id,
        name: j.name.clone(),
        kind,
        visible: j.visible,
        shape,
        properties,
    })
}

/// Object gids only carry horizontal and vertical flips; the diagonal bit is
/// masked off without turning into a rotation, unlike tile-layer cells.
fn tile_stamp(
    tilesets: &TileSets,
    j: &JsonObject,
    id: TileId,
    position: Vec2,
    object_scale: Vec2,
) -> TileStamp {
    let tile = tilesets.tile(id.clean());
    if tile.is_none() && id.clean() != 0 {
        log::warn!("object {} stamps unknown tile {}", j.id, id.clean());
    }

    let scale = match tile.and_then(Tile::region) {
        Some(region) if region.width() > 0.0 && region.height() > 0.0 => {
            let w = j.width.unwrap_or(region.width());
            let h = j.height.unwrap_or(region.height());
            object_scale * vec2(w / region.width(), h / region.height())
        }
        _ => object_scale,
    };

    TileStamp {
        tile: tile.map(Tile::id),
        flip_h: id.flip_h(),
        flip_v: id.flip_v(),
        position,
        scale,
        rotation: j.rotation.unwrap_or(0.0),
    }
}

fn parse_gid(object: u32, gid: &JsonValue) -> Result<u32> {
    let text = scalar_text(gid);
    gid.as_u64()
        .or_else(|| text.trim().parse::<u64>().ok())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| MapError::InvalidGid {
            object,
            value: text.into_owned(),
        })
}
