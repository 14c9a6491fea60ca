use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{DetectedLabel, PriceResult};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: u32 = 3;
const TEXT_SCALE: f32 = 18.0;

/// Fonts tried when none is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws the chosen label onto a copy of the source image
pub struct Annotator {
    output_path: PathBuf,
    font: Option<FontArc>,
}

impl Annotator {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            font: None,
        }
    }

    /// Load a TrueType font for the text overlay
    pub fn with_font_file(mut self, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| Error::Config(format!("bad font {}: {}", path.display(), e)))?;
        self.font = Some(font);
        Ok(self)
    }

    /// Use the first readable system font, if any
    pub fn with_system_font(mut self) -> Self {
        self.font = FONT_CANDIDATES.iter().find_map(|candidate| {
            let bytes = std::fs::read(candidate).ok()?;
            let font = FontArc::try_from_vec(bytes).ok()?;
            debug!("Using font {}", candidate);
            Some(font)
        });
        if self.font.is_none() {
            warn!("No usable font found, labels will be drawn without text");
        }
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Decode `image`, draw every instance of `label` and write the result
    pub fn annotate(
        &self,
        image: &[u8],
        label: &DetectedLabel,
        price: &PriceResult,
    ) -> Result<PathBuf> {
        let source = image::load_from_memory(image)?;
        let canvas = self.draw(&source, label, price);

        DynamicImage::ImageRgb8(canvas).save(&self.output_path)?;
        Ok(self.output_path.clone())
    }

    pub fn draw(&self, source: &DynamicImage, label: &DetectedLabel, price: &PriceResult) -> RgbImage {
        let (width, height) = source.dimensions();
        let mut canvas = source.to_rgb8();
        let caption = caption(label, price);

        for bbox in &label.instances {
            let rect = bbox.to_pixels(width, height);

            for inset in 0..BOX_THICKNESS {
                let (w, h) = (
                    rect.width.saturating_sub(2 * inset),
                    rect.height.saturating_sub(2 * inset),
                );
                if w == 0 || h == 0 {
                    break;
                }
                draw_hollow_rect_mut(
                    &mut canvas,
                    Rect::at(rect.x + inset as i32, rect.y + inset as i32).of_size(w, h),
                    BOX_COLOR,
                );
            }

            if let Some(font) = &self.font {
                draw_text_mut(
                    &mut canvas,
                    BOX_COLOR,
                    rect.x + BOX_THICKNESS as i32,
                    rect.y + BOX_THICKNESS as i32,
                    PxScale::from(TEXT_SCALE),
                    font,
                    &caption,
                );
            }
        }

        canvas
    }
}

/// Overlay text, e.g. `"Pizza $12.50 92.00%"`
pub fn caption(label: &DetectedLabel, price: &PriceResult) -> String {
    format!("{} {} {:.2}%", label.name, price, label.confidence)
}
