use std::fmt;

/// Bounding box normalised to the image dimensions (all fields in `[0, 1]`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel-space rectangle, always inside the image and at least 1x1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Scale to pixel coordinates for an image of the given size
    pub fn to_pixels(&self, img_width: u32, img_height: u32) -> PixelRect {
        let max_x = img_width.saturating_sub(1);
        let max_y = img_height.saturating_sub(1);

        let x = ((self.left.clamp(0.0, 1.0) * img_width as f32) as u32).min(max_x);
        let y = ((self.top.clamp(0.0, 1.0) * img_height as f32) as u32).min(max_y);
        let w = (self.width.max(0.0) * img_width as f32).round() as u32;
        let h = (self.height.max(0.0) * img_height as f32).round() as u32;

        PixelRect {
            x: x as i32,
            y: y as i32,
            width: w.min(img_width - x).max(1),
            height: h.min(img_height - y).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    /// Percentage in `[0, 100]`
    pub confidence: f32,
    pub instances: Vec<BoundingBox>,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
            instances: Vec::new(),
        }
    }

    pub fn with_instance(mut self, bbox: BoundingBox) -> Self {
        self.instances.push(bbox);
        self
    }
}

/// Price found for a label, or the `Unknown` sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceResult {
    Found(String),
    Unknown,
}

impl PriceResult {
    pub fn is_unknown(&self) -> bool {
        matches!(self, PriceResult::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PriceResult::Found(price) => price,
            PriceResult::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PriceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_box_to_pixels() {
        let bbox = BoundingBox {
            left: 0.25,
            top: 0.5,
            width: 0.5,
            height: 0.25,
        };
        let rect = bbox.to_pixels(200, 100);
        assert_eq!(
            rect,
            PixelRect {
                x: 50,
                y: 50,
                width: 100,
                height: 25
            }
        );
    }

    #[test]
    fn clamps_box_to_image() {
        let bbox = BoundingBox {
            left: 0.9,
            top: -0.1,
            width: 0.5,
            height: 0.0,
        };
        let rect = bbox.to_pixels(100, 100);
        assert_eq!(rect.x, 90);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 10);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn unknown_price_displays_sentinel() {
        assert_eq!(PriceResult::Unknown.to_string(), "Unknown");
        assert_eq!(PriceResult::Found("$4.20".into()).to_string(), "$4.20");
    }
}
