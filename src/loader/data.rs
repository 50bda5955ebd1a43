//! Layer `data` decoding: plain id arrays, or base64 with optional gzip/zlib.

use crate::error::{MapError, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder};
use serde_json::Value as JsonValue;
use std::io::{self, Read};

/// Decode a layer's `data` into `width * height` raw tile ids, row-major,
/// flip flags still set.
pub fn decode_tile_ids(
    data: &JsonValue,
    encoding: Option<&str>,
    compression: Option<&str>,
    width: usize,
    height: usize,
) -> Result<Vec<u32>> {
    let count = width.checked_mul(height).ok_or_else(|| {
        MapError::InvalidTileData(format!("layer size {width}x{height} is too large"))
    })?;
    match encoding.unwrap_or("") {
        "" | "csv" => plain_ids(data, count),
        "base64" => {
            let text = data.as_str().ok_or_else(|| {
                MapError::InvalidTileData("base64 layer data must be a string".into())
            })?;
            // Editors sometimes wrap long base64 payloads.
            let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let bytes = BASE64_STANDARD.decode(cleaned)?;
            let compression = compression.unwrap_or("");
            // Reserve from the payload size, not the declared layer size.
            // Inflated streams grow the buffer past this as they go.
            let available = match compression {
                "" => bytes.len() / 4,
                _ => bytes.len(),
            };
            let stream: Box<dyn Read + '_> = match compression {
                "" => Box::new(bytes.as_slice()),
                "gzip" => Box::new(GzDecoder::new(bytes.as_slice())),
                "zlib" => Box::new(ZlibDecoder::new(bytes.as_slice())),
                other => {
                    return Err(MapError::UnsupportedCompression {
                        compression: other.to_owned(),
                    })
                }
            };
            read_ids(stream, count, available, compression)
        }
        other => Err(MapError::UnsupportedEncoding {
            encoding: other.to_owned(),
        }),
    }
}

fn plain_ids(data: &JsonValue, count: usize) -> Result<Vec<u32>> {
    let values = data
        .as_array()
        .ok_or_else(|| MapError::InvalidTileData("expected an array of tile ids".into()))?;
    if values.len() < count {
        return Err(MapError::InvalidTileData(format!(
            "expected {count} tile ids, found {}",
            values.len()
        )));
    }
    values
        .iter()
        .take(count)
        .map(|v| {
            v.as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .ok_or_else(|| MapError::InvalidTileData(format!("not a tile id: {v}")))
        })
        .collect()
}

/// `available` only sizes the initial allocation; the declared `count` is
/// not trusted for that.
fn read_ids(
    mut stream: impl Read,
    count: usize,
    available: usize,
    compression: &str,
) -> Result<Vec<u32>> {
    let mut ids = Vec::with_capacity(count.min(available));
    for read in 0..count {
        match stream.read_u32::<LittleEndian>() {
            Ok(id) => ids.push(id),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(MapError::PrematureEndOfTileData {
                    expected: count,
                    read,
                })
            }
            Err(source) => {
                return Err(MapError::Inflate {
                    compression: compression.to_owned(),
                    source,
                })
            }
        }
    }
    Ok(ids)
}
