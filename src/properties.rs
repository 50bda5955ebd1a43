use crate::error::{MapError, Result};
use macroquad::color::Color;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::HashMap;

/// A typed custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `string`, and anything else given without a type
    String(String),
    /// `int`
    I64(i64),
    /// `float`
    F32(f32),
    /// `bool`
    Bool(bool),
    /// `color`, parsed from `#AARRGGBB` or `#RRGGBB`
    Color(Color),
    /// Id of another object on the map, `None` when the referenced id does not
    /// exist. Look it up with [`Map::object`](crate::Map::object).
    Object(Option<u32>),
}

/// Name-keyed property bag. Inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    /// The value under `name`, whatever its type.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// True when `name` is present, even as an unresolved reference.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the bag holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name and value pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `None` when missing or not a bool. The typed getters below work the
    /// same way and never convert between types.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// An `int` property.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// An `int` property that fits in 32 bits.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// A `float` property.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// A `string` property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// A `color` property.
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            PropertyValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    /// Target of an object-reference property; `None` both when the name is
    /// missing and when the reference did not resolve.
    pub fn get_object(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            PropertyValue::Object(v) => *v,
            _ => None,
        }
    }
}

/// Scalar JSON value as the text the editor wrote.
pub(crate) fn scalar_text(value: &JsonValue) -> Cow<'_, str> {
    match value {
        JsonValue::String(s) => Cow::Borrowed(s.as_str()),
        JsonValue::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Cast a raw property value to its declared type. `object` properties never
/// reach this point; the loader defers them.
pub fn cast_property(name: &str, value: &JsonValue, kind: Option<&str>) -> Result<PropertyValue> {
    let invalid = |kind: &str| MapError::InvalidPropertyValue {
        name: name.to_owned(),
        kind: kind.to_owned(),
        value: scalar_text(value).into_owned(),
    };

    match kind {
        None | Some("string") => Ok(PropertyValue::String(scalar_text(value).into_owned())),
        Some("int") => value
            .as_i64()
            .or_else(|| scalar_text(value).trim().parse().ok())
            .map(PropertyValue::I64)
            .ok_or_else(|| invalid("int")),
        Some("float") => value
            .as_f64()
            .map(|v| v as f32)
            .or_else(|| scalar_text(value).trim().parse().ok())
            .map(PropertyValue::F32)
            .ok_or_else(|| invalid("float")),
        Some("bool") => Ok(PropertyValue::Bool(match value {
            JsonValue::Bool(b) => *b,
            other => scalar_text(other).eq_ignore_ascii_case("true"),
        })),
        Some("color") => parse_argb(&scalar_text(value))
            .map(PropertyValue::Color)
            .ok_or_else(|| invalid("color")),
        Some(other) => Err(MapError::UnsupportedPropertyType {
            name: name.to_owned(),
            kind: other.to_owned(),
        }),
    }
}

/// Parse an editor color. `#AARRGGBB` has its alpha moved to the end so the
/// digits read `RRGGBBAA`; `#RRGGBB` is opaque.
pub fn parse_argb(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if !hex.is_ascii() {
        return None;
    }
    let rgba = match hex.len() {
        8 => format!("{}{}", &hex[2..], &hex[..2]),
        6 => format!("{hex}ff"),
        _ => return None,
    };
    let [r, g, b, a] = u32::from_str_radix(&rgba, 16).ok()?.to_be_bytes();
    Some(Color::from_rgba(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn color_moves_alpha_to_the_end() {
        let c = parse_argb("#80FF0000").expect("valid color");
        assert_eq!(c, Color::from_rgba(0xFF, 0x00, 0x00, 0x80));
        assert_eq!(parse_argb("#00ff00"), Some(Color::from_rgba(0, 255, 0, 255)));
        assert_eq!(parse_argb("#12345"), None);
        assert_eq!(parse_argb("#GG000000"), None);
    }

    #[test]
    fn casts_each_supported_type() {
        assert_eq!(
            cast_property("n", &json!(3), Some("int")).unwrap(),
            PropertyValue::I64(3)
        );
        assert_eq!(
            cast_property("n", &json!("-12"), Some("int")).unwrap(),
            PropertyValue::I64(-12)
        );
        assert_eq!(
            cast_property("f", &json!(9.5), Some("float")).unwrap(),
            PropertyValue::F32(9.5)
        );
        assert_eq!(
            cast_property("b", &json!(true), Some("bool")).unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            cast_property("b", &json!("TRUE"), Some("bool")).unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            cast_property("s", &json!("forest"), None).unwrap(),
            PropertyValue::String("forest".into())
        );
        assert_eq!(
            cast_property("s", &json!(7), Some("string")).unwrap(),
            PropertyValue::String("7".into())
        );
        assert_eq!(
            cast_property("c", &json!("#80FF0000"), Some("color")).unwrap(),
            PropertyValue::Color(Color::from_rgba(255, 0, 0, 128))
        );
    }

    #[test]
    fn unparsable_numbers_are_errors() {
        let err = cast_property("speed", &json!("fast"), Some("float")).unwrap_err();
        assert!(matches!(err, MapError::InvalidPropertyValue { ref name, .. } if name == "speed"));
        let err = cast_property("count", &json!("1.5"), Some("int")).unwrap_err();
        assert!(matches!(err, MapError::InvalidPropertyValue { .. }));
    }

    #[test]
    fn unknown_type_names_the_supported_set() {
        let err = cast_property("mystery", &json!("x"), Some("vector")).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedPropertyType { .. }));
        assert!(err.to_string().contains("string, bool, int, float, color"));
    }

    #[test]
    fn last_write_wins() {
        let mut props = Properties::new();
        props.insert("x", PropertyValue::F32(1.0));
        props.insert("x", PropertyValue::String("over".into()));
        assert_eq!(props.len(), 1);
        assert_eq!(props.get_string("x"), Some("over"));
        assert_eq!(props.get_f32("x"), None);
    }
}
