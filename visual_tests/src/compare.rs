use crate::{Result, VisualTestError};
use image::{Rgba, RgbaImage};
use image_compare::Algorithm;

/// Result of comparing two images
pub struct CompareResult {
    /// Similarity score from 0.0 to 1.0
    pub similarity: f64,
    /// Largest per-channel difference over all pixels
    pub max_difference: u8,
}

fn check_dimensions(expected: &RgbaImage, actual: &RgbaImage) -> Result<()> {
    if expected.dimensions() != actual.dimensions() {
        return Err(VisualTestError::Compare(format!(
            "Image dimensions don't match: expected {:?} vs actual {:?}",
            expected.dimensions(),
            actual.dimensions()
        )));
    }
    Ok(())
}

/// Compare two images using SSIM algorithm
pub fn compare_images(expected: &RgbaImage, actual: &RgbaImage) -> Result<CompareResult> {
    check_dimensions(expected, actual)?;

    // SSIM works on RGB; both sides are opaque renders.
    let expected_rgb = image::DynamicImage::ImageRgba8(expected.clone()).to_rgb8();
    let actual_rgb = image::DynamicImage::ImageRgba8(actual.clone()).to_rgb8();

    let result =
        image_compare::rgb_similarity_structure(&Algorithm::MSSIMSimple, &expected_rgb, &actual_rgb)
            .map_err(|e| VisualTestError::Compare(format!("SSIM comparison failed: {}", e)))?;

    let max_difference = expected
        .pixels()
        .zip(actual.pixels())
        .map(|(a, b)| pixel_difference(a, b))
        .max()
        .unwrap_or(0);

    Ok(CompareResult {
        similarity: result.score,
        max_difference,
    })
}

/// Build an image highlighting differences between two images
pub fn generate_diff_image(expected: &RgbaImage, actual: &RgbaImage) -> Result<RgbaImage> {
    check_dimensions(expected, actual)?;
    let (width, height) = expected.dimensions();

    let diff_img = RgbaImage::from_fn(width, height, |x, y| {
        let expected_pixel = expected.get_pixel(x, y);
        let actual_pixel = actual.get_pixel(x, y);
        let diff = pixel_difference(expected_pixel, actual_pixel);

        if diff > 10 {
            // Highlight differences in red
            let intensity = (diff as f32 / 255.0 * 200.0 + 55.0) as u8;
            Rgba([intensity, 0, 0, 255])
        } else {
            // Show original with reduced opacity
            let r = (actual_pixel[0] as u16 / 3) as u8;
            let g = (actual_pixel[1] as u16 / 3) as u8;
            let b = (actual_pixel[2] as u16 / 3) as u8;
            Rgba([r, g, b, 255])
        }
    });

    Ok(diff_img)
}

/// Calculate the maximum channel difference between two pixels
fn pixel_difference(a: &Rgba<u8>, b: &Rgba<u8>) -> u8 {
    let dr = (a[0] as i16 - b[0] as i16).unsigned_abs() as u8;
    let dg = (a[1] as i16 - b[1] as i16).unsigned_abs() as u8;
    let db = (a[2] as i16 - b[2] as i16).unsigned_abs() as u8;
    dr.max(dg).max(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_images() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]));
        let result = compare_images(&img, &img).unwrap();
        assert!(result.similarity > 0.999);
        assert_eq!(result.max_difference, 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RgbaImage::new(4, 4);
        let b = RgbaImage::new(4, 5);
        assert!(compare_images(&a, &b).is_err());
        assert!(generate_diff_image(&a, &b).is_err());
    }

    #[test]
    fn test_diff_highlights_changes() {
        let a = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        let diff = generate_diff_image(&a, &b).unwrap();
        assert_eq!(diff.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(diff.get_pixel(0, 0).0, [85, 85, 85, 255]);
    }
}
