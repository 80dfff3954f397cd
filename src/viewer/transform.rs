//! Pan/zoom mathematics for the image viewer.
//!
//! Screen positions are in viewer pixels. The image is drawn centred in the
//! viewport, scaled by `zoom` and shifted by `pan`. Image coordinates have
//! their origin at the top-left corner of the raster.

/// On-screen rectangle the viewer draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen pixels per image pixel
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewTransform {
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Zoom at which the whole image fits the viewport, centred.
    pub fn fit(viewport: &Viewport, image_size: (u32, u32)) -> Self {
        let (width, height) = image_size;
        if width == 0 || height == 0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Self::identity();
        }
        let zoom = (viewport.width / f64::from(width)).min(viewport.height / f64::from(height));
        Self::new(zoom, 0.0, 0.0)
    }

    /// Convert a screen position to image pixel coordinates.
    pub fn screen_to_image(
        &self,
        screen_x: f64,
        screen_y: f64,
        viewport: &Viewport,
        image_size: (u32, u32),
    ) -> (f64, f64) {
        let (center_x, center_y) = viewport.center();

        // Position relative to viewport center, pan removed, zoom undone
        let center_rel_x = (screen_x - center_x - self.pan_x) / self.zoom;
        let center_rel_y = (screen_y - center_y - self.pan_y) / self.zoom;

        // Shift to top-left origin
        (
            center_rel_x + f64::from(image_size.0) / 2.0,
            center_rel_y + f64::from(image_size.1) / 2.0,
        )
    }

    /// Convert image pixel coordinates to a screen position.
    pub fn image_to_screen(
        &self,
        img_x: f64,
        img_y: f64,
        viewport: &Viewport,
        image_size: (u32, u32),
    ) -> (f64, f64) {
        let (center_x, center_y) = viewport.center();

        let center_rel_x = img_x - f64::from(image_size.0) / 2.0;
        let center_rel_y = img_y - f64::from(image_size.1) / 2.0;

        (
            center_x + center_rel_x * self.zoom + self.pan_x,
            center_y + center_rel_y * self.zoom + self.pan_y,
        )
    }

    /// Calculate zoom-to-cursor transformation.
    ///
    /// Keeps the image point under the cursor fixed while zooming.
    pub fn zoom_to_cursor(
        &self,
        new_zoom: f64,
        cursor_x: f64,
        cursor_y: f64,
        viewport: &Viewport,
    ) -> ViewTransform {
        let (center_x, center_y) = viewport.center();
        let cursor_rel_x = cursor_x - center_x;
        let cursor_rel_y = cursor_y - center_y;

        // Image-space point under cursor (before zoom), center-relative
        let img_x = (cursor_rel_x - self.pan_x) / self.zoom;
        let img_y = (cursor_rel_y - self.pan_y) / self.zoom;

        ViewTransform {
            zoom: new_zoom,
            pan_x: cursor_rel_x - img_x * new_zoom,
            pan_y: cursor_rel_y - img_y * new_zoom,
        }
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f64, dy: f64) -> ViewTransform {
        ViewTransform {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}
