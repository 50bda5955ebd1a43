//! Collaborators the decoder calls out to: document access and image lookup.
//!
//! Images are resolved before the decode runs (whatever schedules texture loads
//! lives on the host side), so both traits are plain blocking lookups.

use crate::error::{MapError, Result};
use macroquad::math::Rect;
use macroquad::texture::Texture2D;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A rectangle of pixels inside a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRegion {
    /// Resolved path of the source image
    pub image: PathBuf,
    /// Pixel rectangle inside the image
    pub rect: Rect,
}

impl ImageRegion {
    /// The whole image.
    pub fn full(image: impl Into<PathBuf>, width: f32, height: f32) -> Self {
        ImageRegion {
            image: image.into(),
            rect: Rect::new(0.0, 0.0, width, height),
        }
    }

    /// A sub-rectangle, positioned relative to this region.
    pub fn sub_region(&self, x: f32, y: f32, width: f32, height: f32) -> Self {
        ImageRegion {
            image: self.image.clone(),
            rect: Rect::new(self.rect.x + x, self.rect.y + y, width, height),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> f32 {
        self.rect.w
    }

    /// Height in pixels.
    pub fn height(&self) -> f32 {
        self.rect.h
    }
}

/// Hands out image regions for resolved image paths.
pub trait ImageResolver {
    /// Region covering the whole image at `path`, or
    /// [`MapError::ImageNotFound`].
    fn image(&mut self, path: &Path) -> Result<ImageRegion>;
}

impl<F> ImageResolver for F
where
    F: FnMut(&Path) -> Result<ImageRegion>,
{
    fn image(&mut self, path: &Path) -> Result<ImageRegion> {
        self(path)
    }
}

/// Images whose sizes are already known, keyed by resolved path.
#[derive(Debug, Clone, Default)]
pub struct PreloadedImages {
    sizes: HashMap<PathBuf, (f32, f32)>,
}

impl PreloadedImages {
    /// No images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image by its pixel size.
    pub fn insert(&mut self, path: impl Into<PathBuf>, width: u32, height: u32) {
        self.sizes.insert(path.into(), (width as f32, height as f32));
    }

    /// Register a texture the host already loaded.
    pub fn insert_texture(&mut self, path: impl Into<PathBuf>, texture: &Texture2D) {
        self.sizes
            .insert(path.into(), (texture.width(), texture.height()));
    }

    /// Number of registered images.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl ImageResolver for PreloadedImages {
    fn image(&mut self, path: &Path) -> Result<ImageRegion> {
        let (w, h) = self
            .sizes
            .get(path)
            .copied()
            .ok_or_else(|| MapError::ImageNotFound {
                path: path.to_path_buf(),
            })?;
        Ok(ImageRegion::full(path, w, h))
    }
}

/// Loads parsed JSON documents (external tilesets, or the map itself).
pub trait DocumentSource {
    /// The parsed document at `path`.
    fn document(&mut self, path: &Path) -> Result<JsonValue>;
}

/// Reads documents from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocuments;

impl DocumentSource for FsDocuments {
    fn document(&mut self, path: &Path) -> Result<JsonValue> {
        let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| MapError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory documents keyed by path.
impl DocumentSource for HashMap<PathBuf, JsonValue> {
    fn document(&mut self, path: &Path) -> Result<JsonValue> {
        self.get(path).cloned().ok_or_else(|| MapError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
        })
    }
}
