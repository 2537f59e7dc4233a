//! Thumbnail pipeline: geometry grammar and on-demand rendering.
//!
//! Takes stored bytes, decodes them, resizes per the requested geometry,
//! and encodes to the negotiated output format. Decoding and resizing are
//! CPU-bound, so rendering runs under `spawn_blocking` to keep the async
//! runtime free.

use crate::config::RenderConfig;
use crate::error::{AppError, Result};
use crate::models::OutputFormat;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;
use tracing::debug;

/// Parsed dimension geometry.
///
/// The grammar is intentionally small and lives entirely behind this module:
/// `WxH`, `Wx`, and `xH`, each optionally suffixed with `#` for
/// crop-to-fill. Anything else is rejected as unsupported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometrySpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Crop to fill the target box instead of fitting within it
    pub fill: bool,
}

impl GeometrySpec {
    pub fn parse(token: &str) -> Result<Self> {
        let (dims, fill) = match token.strip_suffix('#') {
            Some(rest) => (rest, true),
            None => (token, false),
        };

        let (width_raw, height_raw) = dims
            .split_once('x')
            .ok_or_else(|| AppError::UnsupportedGeometry(token.to_string()))?;

        let width = parse_dimension(width_raw, token)?;
        let height = parse_dimension(height_raw, token)?;

        if width.is_none() && height.is_none() {
            return Err(AppError::UnsupportedGeometry(token.to_string()));
        }
        // Crop-to-fill needs a fully specified box
        if fill && (width.is_none() || height.is_none()) {
            return Err(AppError::UnsupportedGeometry(token.to_string()));
        }

        Ok(Self {
            width,
            height,
            fill,
        })
    }
}

fn parse_dimension(raw: &str, token: &str) -> Result<Option<u32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(AppError::UnsupportedGeometry(token.to_string())),
    }
}

/// Renders stored bytes into a geometry-matching output encoding
#[derive(Clone)]
pub struct Thumbnailer {
    config: RenderConfig,
}

impl Thumbnailer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render asynchronously on the blocking thread pool
    pub async fn render(
        &self,
        original: Bytes,
        spec: GeometrySpec,
        format: OutputFormat,
    ) -> Result<Bytes> {
        let thumbnailer = self.clone();
        tokio::task::spawn_blocking(move || thumbnailer.render_blocking(&original, spec, format))
            .await
            .map_err(|e| AppError::Internal(format!("Render task panicked: {e}")))?
    }

    fn render_blocking(
        &self,
        original: &[u8],
        spec: GeometrySpec,
        format: OutputFormat,
    ) -> Result<Bytes> {
        let max = self.config.max_dimension;
        if spec.width.is_some_and(|w| w > max) || spec.height.is_some_and(|h| h > max) {
            return Err(AppError::UnsupportedGeometry(format!(
                "requested dimension exceeds {max}px"
            )));
        }

        let img = image::load_from_memory(original)
            .map_err(|e| AppError::DecodeError(e.to_string()))?;

        let resized = if spec.fill {
            match (spec.width, spec.height) {
                (Some(w), Some(h)) => img.resize_to_fill(w, h, FilterType::Triangle),
                _ => {
                    return Err(AppError::UnsupportedGeometry(
                        "crop-to-fill requires both dimensions".to_string(),
                    ))
                }
            }
        } else {
            img.resize(
                spec.width.unwrap_or(max),
                spec.height.unwrap_or(max),
                FilterType::Triangle,
            )
        };

        let data = self.encode(&resized, format)?;
        debug!(
            width = resized.width(),
            height = resized.height(),
            size = data.len(),
            "thumbnail rendered"
        );
        Ok(data)
    }

    fn encode(&self, img: &DynamicImage, format: OutputFormat) -> Result<Bytes> {
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);

        let output = match format {
            OutputFormat::Jpeg => ImageOutputFormat::Jpeg(self.config.jpeg_quality),
            OutputFormat::Png => ImageOutputFormat::Png,
        };

        img.write_to(&mut cursor, output)
            .map_err(|e| AppError::Internal(format!("Failed to encode output: {e}")))?;

        Ok(Bytes::from(buf))
    }
}
