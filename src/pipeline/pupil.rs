use crate::config::PupilMode;
use crate::error::{GazeError, Result};
use crate::shapes::point::Point;
use image::GrayImage;

/// Estimates the pupil center inside a padded eye crop, in crop-local
/// pixel coordinates.
pub trait PupilLocator {
    fn locate(&self, eye: &GrayImage) -> Result<Point>;
}

pub fn from_mode(mode: PupilMode) -> Option<Box<dyn PupilLocator>> {
    match mode {
        PupilMode::Disabled => None,
        PupilMode::DarkCentroid => Some(Box::new(DarkCentroidLocator::default())),
        PupilMode::GradientMeans => Some(Box::new(GradientMeansLocator::default())),
    }
}

/// Variant A: darkness-weighted centroid of the near-darkest pixels.
/// The pupil is reliably the darkest blob in a tight eye crop.
pub struct DarkCentroidLocator {
    /// Gray levels above the crop minimum still counted as pupil.
    pub threshold_margin: u8,
}

impl Default for DarkCentroidLocator {
    fn default() -> Self {
        Self {
            threshold_margin: 30,
        }
    }
}

impl PupilLocator for DarkCentroidLocator {
    fn locate(&self, eye: &GrayImage) -> Result<Point> {
        if eye.width() == 0 || eye.height() == 0 {
            return Err(GazeError::GeometryDegenerate {
                context: "empty eye crop",
            });
        }

        let min_val = eye.pixels().map(|p| p[0]).min().unwrap_or(0);
        let threshold = min_val.saturating_add(self.threshold_margin);

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut weight = 0.0;
        for (x, y, p) in eye.enumerate_pixels() {
            let luma = p[0];
            if luma <= threshold {
                let w = (threshold - luma) as f32 + 1.0;
                sum_x += x as f32 * w;
                sum_y += y as f32 * w;
                weight += w;
            }
        }

        Ok(Point::new(
            (sum_x / weight).round() as i32,
            (sum_y / weight).round() as i32,
        ))
    }
}

/// Variant B: means-of-gradients objective (Timm & Barth 2011). The
/// pupil center is the point most image gradients point away from,
/// weighted toward dark pixels. Exhaustive search; eye crops are tiny.
pub struct GradientMeansLocator {
    /// Fraction of the gradient-magnitude spread kept as evidence.
    pub gradient_threshold: f32,
}

impl Default for GradientMeansLocator {
    fn default() -> Self {
        Self {
            gradient_threshold: 0.3,
        }
    }
}

impl PupilLocator for GradientMeansLocator {
    fn locate(&self, eye: &GrayImage) -> Result<Point> {
        let w = eye.width() as i32;
        let h = eye.height() as i32;
        if w < 3 || h < 3 {
            return Err(GazeError::GeometryDegenerate {
                context: "eye crop too small for gradients",
            });
        }

        // Central-difference gradients, normalized to unit length where
        // the magnitude clears a dynamic threshold.
        let mut grads: Vec<(f32, f32, f32, f32)> = Vec::new(); // x, y, gx, gy
        let mut magnitudes = Vec::new();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let gx = eye.get_pixel((x + 1) as u32, y as u32)[0] as f32
                    - eye.get_pixel((x - 1) as u32, y as u32)[0] as f32;
                let gy = eye.get_pixel(x as u32, (y + 1) as u32)[0] as f32
                    - eye.get_pixel(x as u32, (y - 1) as u32)[0] as f32;
                let mag = (gx * gx + gy * gy).sqrt();
                magnitudes.push(mag);
                grads.push((x as f32, y as f32, gx, gy));
            }
        }

        let mean = magnitudes.iter().sum::<f32>() / magnitudes.len() as f32;
        let variance = magnitudes
            .iter()
            .map(|m| (m - mean) * (m - mean))
            .sum::<f32>()
            / magnitudes.len() as f32;
        let threshold = mean + self.gradient_threshold * variance.sqrt();

        let strong: Vec<(f32, f32, f32, f32)> = grads
            .iter()
            .zip(&magnitudes)
            .filter(|(_, &m)| m > threshold && m > 0.0)
            .map(|(&(x, y, gx, gy), &m)| (x, y, gx / m, gy / m))
            .collect();

        if strong.is_empty() {
            // Flat crop, fall back to its center.
            return Ok(Point::new(w / 2, h / 2));
        }

        let mut best = (0.0f32, w / 2, h / 2);
        for cy in 0..h {
            for cx in 0..w {
                let mut score = 0.0;
                for &(px, py, gx, gy) in &strong {
                    let dx = px - cx as f32;
                    let dy = py - cy as f32;
                    let len = (dx * dx + dy * dy).sqrt();
                    if len <= 0.0 {
                        continue;
                    }
                    let dot = (dx / len) * gx + (dy / len) * gy;
                    if dot > 0.0 {
                        score += dot * dot;
                    }
                }
                // Favor dark centers.
                let darkness = 255 - eye.get_pixel(cx as u32, cy as u32)[0];
                let score = score * darkness as f32;
                if score > best.0 {
                    best = (score, cx, cy);
                }
            }
        }

        Ok(Point::new(best.1, best.2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bright field with a dark disc at (cx, cy).
    fn synthetic_eye(w: u32, h: u32, cx: i32, cy: i32, radius: i32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                image::Luma([20u8])
            } else {
                image::Luma([200u8])
            }
        })
    }

    #[test]
    fn dark_centroid_finds_offset_pupil() {
        let eye = synthetic_eye(40, 20, 28, 11, 4);
        let p = DarkCentroidLocator::default().locate(&eye).unwrap();
        assert!((p.x - 28).abs() <= 1, "x = {}", p.x);
        assert!((p.y - 11).abs() <= 1, "y = {}", p.y);
    }

    #[test]
    fn dark_centroid_rejects_empty_crop() {
        let eye = GrayImage::new(0, 0);
        let err = DarkCentroidLocator::default().locate(&eye).unwrap_err();
        assert!(matches!(err, GazeError::GeometryDegenerate { .. }));
    }

    #[test]
    fn gradient_means_finds_offset_pupil() {
        let eye = synthetic_eye(40, 20, 12, 9, 4);
        let p = GradientMeansLocator::default().locate(&eye).unwrap();
        assert!((p.x - 12).abs() <= 2, "x = {}", p.x);
        assert!((p.y - 9).abs() <= 2, "y = {}", p.y);
    }

    #[test]
    fn gradient_means_rejects_tiny_crop() {
        let eye = GrayImage::new(2, 2);
        let err = GradientMeansLocator::default().locate(&eye).unwrap_err();
        assert!(matches!(err, GazeError::GeometryDegenerate { .. }));
    }

    #[test]
    fn disabled_mode_has_no_locator() {
        assert!(from_mode(PupilMode::Disabled).is_none());
        assert!(from_mode(PupilMode::DarkCentroid).is_some());
        assert!(from_mode(PupilMode::GradientMeans).is_some());
    }
}
