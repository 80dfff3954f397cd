//! Source raster held by the session.

use std::io::Cursor;

use georef_remote::ImagePayload;
use image::{ImageFormat, ImageReader};
use thiserror::Error;

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a filename (string) has a supported image extension.
pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Errors while loading the source raster.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Image data is empty")]
    Empty,

    #[error("Unrecognized image format for '{name}'")]
    UnknownFormat { name: String },

    #[error("Failed to read image header for '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image bytes plus what we learned from the header.
///
/// Only the header is decoded; the pixels go to the service untouched.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    /// Filename of the image
    pub name: String,
    /// Raw image data bytes
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self, ImageLoadError> {
        let name = name.into();
        if data.is_empty() {
            return Err(ImageLoadError::Empty);
        }

        let reader = ImageReader::new(Cursor::new(data.as_slice())).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| ImageLoadError::UnknownFormat { name: name.clone() })?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|source| ImageLoadError::Decode {
                name: name.clone(),
                source,
            })?;

        log::debug!("Loaded '{}': {:?} {}x{}", name, format, width, height);

        Ok(Self {
            name,
            data,
            format,
            width,
            height,
        })
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, ImageLoadError> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, data)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Borrow as an upload body.
    pub fn payload(&self) -> ImagePayload<'_> {
        ImagePayload {
            file_name: &self.name,
            mime_type: self.mime_type(),
            bytes: &self.data,
        }
    }
}

#[cfg(test)]
pub(crate) fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test png");
    bytes
}
