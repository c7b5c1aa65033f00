//! QR encoding for ticket ids.
//!
//! Codes use error-correction level H so a ticket still scans with roughly
//! 30% of the symbol scuffed or covered.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::{Color, QrError};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

use super::{data_uri, PNG_CONTENT_TYPE};

/// Pixels per module in the PNG rendering.
pub const MODULE_PIXELS: u32 = 10;

/// Light border around the symbol, in modules.
pub const QUIET_ZONE: u32 = 4;

#[derive(Debug, Clone)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
    ec_level: EcLevel,
}

impl QrMatrix {
    pub fn encode(payload: &str) -> Result<Self, QrError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)?;
        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self {
            width: code.width(),
            dark,
            ec_level: code.error_correction_level(),
        })
    }

    /// Modules per side, excluding the quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    /// `(x, y)` counts from the top-left module.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let side = (self.width as u32 + 2 * QUIET_ZONE) * MODULE_PIXELS;
        let image = GrayImage::from_fn(side, side, |px, py| {
            let mx = (px / MODULE_PIXELS).checked_sub(QUIET_ZONE);
            let my = (py / MODULE_PIXELS).checked_sub(QUIET_ZONE);
            match (mx, my) {
                (Some(x), Some(y)) if self.is_dark(x as usize, y as usize) => Luma([0u8]),
                _ => Luma([255u8]),
            }
        });

        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(png.into_inner())
    }

    pub fn to_data_uri(&self) -> Result<String, image::ImageError> {
        Ok(data_uri::encode(PNG_CONTENT_TYPE, &self.to_png()?))
    }
}
