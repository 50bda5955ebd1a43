use std::io;
use std::path::PathBuf;

/// Everything that can abort a map decode.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A document could not be read from disk
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// A document was not valid JSON, or did not have the expected shape
    #[error("JSON error in {path:?}: {source}")]
    Json {
        /// Document path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Layer data `encoding` is neither csv nor base64
    #[error("unrecognised encoding ({encoding}) for layer data")]
    UnsupportedEncoding {
        /// Declared encoding
        encoding: String,
    },

    /// Layer data `compression` is neither gzip nor zlib
    #[error("unrecognised compression ({compression}) for layer data")]
    UnsupportedCompression {
        /// Declared compression
        compression: String,
    },

    /// Layer data is not valid base64
    #[error("invalid base64 layer data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The compressed layer stream is corrupt
    #[error("error inflating {compression} layer data: {source}")]
    Inflate {
        /// Declared compression
        compression: String,
        /// Underlying error
        source: io::Error,
    },

    /// The decoded stream ran out before `width * height` ids were read
    #[error("premature end of tile data: expected {expected} ids, read {read}")]
    PrematureEndOfTileData {
        /// Number of ids the layer declares
        expected: usize,
        /// Number of complete ids found
        read: usize,
    },

    /// Plain layer data that is not an array of tile ids of the right length
    #[error("invalid tile data: {0}")]
    InvalidTileData(String),

    /// A property declared a type the decoder does not know
    #[error(
        "wrong type given for property {name}, given: {kind}, \
         supported: string, bool, int, float, color"
    )]
    UnsupportedPropertyType {
        /// Property name
        name: String,
        /// Declared type
        kind: String,
    },

    /// A property value could not be parsed as its declared type
    #[error("cannot parse value {value:?} of property {name} as {kind}")]
    InvalidPropertyValue {
        /// Property name
        name: String,
        /// Declared type
        kind: String,
        /// Raw value
        value: String,
    },

    /// An `object` property whose value is not a numeric object id
    #[error("error parsing property [{name}] of type \"object\" with value: [{value}]")]
    InvalidObjectReference {
        /// Property name
        name: String,
        /// Raw value
        value: String,
    },

    /// A tile object's `gid` is not an unsigned integer
    #[error("object {object} has an invalid gid {value:?}")]
    InvalidGid {
        /// Object id (0 when absent)
        object: u32,
        /// Raw gid
        value: String,
    },

    /// A tileset's first gid plus a local tile id does not fit in 32 bits
    #[error("tile {local} of the tileset starting at gid {first_gid} overflows the gid range")]
    GidOverflow {
        /// The tileset's `firstgid`
        first_gid: u32,
        /// Tile id local to the tileset
        local: u32,
    },

    /// An external tileset document could not be loaded
    #[error("error loading external tileset {path:?}: {source}")]
    ExternalTileset {
        /// Resolved tileset path
        path: PathBuf,
        /// What went wrong
        source: Box<MapError>,
    },

    /// The image resolver has no image for this path
    #[error("image not found: {path:?}")]
    ImageNotFound {
        /// Resolved image path
        path: PathBuf,
    },

    /// Failure while building a named layer
    #[error("layer '{name}': {source}")]
    Layer {
        /// Layer name
        name: String,
        /// What went wrong
        source: Box<MapError>,
    },
}

impl MapError {
    pub(crate) fn in_layer(self, name: &str) -> Self {
        MapError::Layer {
            name: name.to_owned(),
            source: Box::new(self),
        }
    }
}

/// Result alias used across the decoder.
pub type Result<T> = std::result::Result<T, MapError>;
