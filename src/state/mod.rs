//! Application state management modules.

mod image;
mod session;

pub use image::{IMAGE_EXTENSIONS, ImageLoadError, LoadedImage, is_image_filename};
pub use session::{Phase, PointSink, ResultRef, Session, UploadState, WorkflowState};

#[cfg(test)]
pub(crate) use image::tiny_png;
