//! Rendering: page markup, region layout, painting and PNG rasterization

pub mod layout;
pub mod markup;
pub mod paint;
pub mod raster;

use base64::Engine as Base64Engine;
use scraper::Html;
use sha2::{Digest, Sha256};

use crate::{Result, Rgba, WHITE};

/// A captured region encoded as PNG
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Device pixels (logical size times the capture scale)
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// `data:image/png;base64,...`
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// Hex SHA-256 of the PNG bytes
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Logical width of the captured region
    pub width: u32,
    /// Supersampling factor
    pub scale: u32,
    pub background: Rgba,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { width: 480, scale: 2, background: WHITE }
    }
}

/// Capture the first element matching `selector` in `html`.
///
/// `Ok(None)` means there was nothing rendered to capture.
pub fn capture_region(
    html: &str,
    selector: &str,
    options: &CaptureOptions,
) -> Result<Option<Screenshot>> {
    let document = Html::parse_document(html);
    let layout = match layout::layout_region(&document, selector, options.width)? {
        Some(layout) => layout,
        None => return Ok(None),
    };
    let commands = paint::display_list(&layout, options.background);
    raster::rasterize(&commands, layout.width, layout.height, options.scale).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_region_renders_matching_subtree() {
        let html =
            r#"<html><body><p>outside</p><div id="card"><h2>Inside</h2></div></body></html>"#;
        let opts = CaptureOptions { width: 200, scale: 2, background: WHITE };
        let shot = capture_region(html, "#card", &opts).unwrap().unwrap();
        assert_eq!(shot.width, 400);
        assert!(shot.height > 0);
        assert!(shot.to_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(shot.digest().len(), 64);
    }

    #[test]
    fn capture_region_without_match_is_none() {
        let shot = capture_region("<p>nothing</p>", "#card", &CaptureOptions::default()).unwrap();
        assert!(shot.is_none());
    }
}
