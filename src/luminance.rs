use std::path::Path;

/// Luminance plane of an image, row-major, one `f64` per pixel.
#[derive(Debug, Clone)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

/// ITU-R BT.601 weights used to collapse the three color planes.
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

impl LuminanceGrid {
    /// Builds a grid from already computed luminance values.
    /// Returns `None` if `values` does not hold exactly `width * height` entries.
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// Builds a grid from interleaved RGB bytes (3 per pixel, row-major).
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let values = rgb.chunks_exact(3).map(|px| luma(px[0], px[1], px[2])).collect();
        Self::new(width, height, values)
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Sum of the luminance inside `[x0, x1) × [y0, y1)`.
    pub fn region_sum(&self, x0: usize, x1: usize, y0: usize, y1: usize) -> f64 {
        (y0..y1)
            .map(|y| {
                let row = &self.values[y * self.width..(y + 1) * self.width];
                row[x0..x1].iter().sum::<f64>()
            })
            .sum()
    }
}

/// Decodes an image file and converts it to luminance.
pub fn load(path: impl AsRef<Path>) -> Result<LuminanceGrid, image::ImageError> {
    let rgb = image::open(path.as_ref())?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let values = rgb.pixels().map(|p| luma(p[0], p[1], p[2])).collect();
    log::info!(
        "Loaded image {} ({}x{})",
        path.as_ref().display(),
        width,
        height
    );
    Ok(LuminanceGrid {
        width: width as usize,
        height: height as usize,
        values,
    })
}
