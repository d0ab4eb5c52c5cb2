//! Poster rasterization via Google PDFium.
//!
//! Renders the first page of a poster PDF to the PNG display asset consumed
//! by the presentation layer and by vision extraction.
//!
//! `PdfiumRenderer` is stateless (`Send + Sync`). Each call loads the library
//! handle fresh because the upstream `Pdfium` type is `!Send`; the OS caches
//! dlopen/LoadLibrary, so repeat loads are near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::debug;

use super::types::PosterRenderer;
use super::ExtractionError;

/// Display assets are capped at this width. Presentation layers downscale
/// anyway and vision models gain nothing past it.
const MAX_WIDTH_PX: u32 = 1200;

const POINTS_PER_INCH: f32 = 72.0;

pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Create a renderer, verifying the PDFium library is loadable
    /// (fail-fast at startup rather than per source).
    pub fn new() -> Result<Self, ExtractionError> {
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to the library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::Rendering(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            // pdfium_platform_library_name_at_path() handles platform names:
            //   Windows → pdfium.dll | Linux → libpdfium.so | macOS → libpdfium.dylib
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::Rendering(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Pixel dimensions for a page at `dpi`, width-capped to `MAX_WIDTH_PX` with
/// the aspect ratio preserved.
fn compute_asset_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    if raw_w > MAX_WIDTH_PX as f32 {
        let ratio = MAX_WIDTH_PX as f32 / raw_w;
        (MAX_WIDTH_PX, ((raw_h * ratio) as u32).max(1))
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PosterRenderer for PdfiumRenderer {
    fn render_poster(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::Rendering(format!("Failed to load PDF: {e}")))?;

        let pages = document.pages();
        let page = pages
            .get(0)
            .map_err(|_| ExtractionError::Rendering("Document has no pages".into()))?;

        let (target_w, target_h) =
            compute_asset_dimensions(page.width().value, page.height().value, dpi);

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::Rendering(format!("Rendering failed: {e}")))?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
        let png = cursor.into_inner();

        debug!(
            width = target_w,
            height = target_h,
            png_size = png.len(),
            "Rendered poster page to PNG"
        );
        Ok(png)
    }
}

/// Renderer used when PDFium is not installed. Every render is a recoverable
/// failure; the asset gap is surfaced by validation.
pub struct NullRenderer;

impl PosterRenderer for NullRenderer {
    fn render_poster(&self, _pdf_bytes: &[u8], _dpi: u32) -> Result<Vec<u8>, ExtractionError> {
        Err(ExtractionError::Rendering("No PDF renderer available".into()))
    }
}

/// Mock renderer for tests. Returns a tiny valid PNG, or fails on demand.
pub struct MockRenderer {
    fail: bool,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PosterRenderer for MockRenderer {
    fn render_poster(&self, _pdf_bytes: &[u8], _dpi: u32) -> Result<Vec<u8>, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::Rendering("mock renderer failure".into()));
        }
        let img = image::GrayImage::from_pixel(32, 32, image::Luma([220u8]));
        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
